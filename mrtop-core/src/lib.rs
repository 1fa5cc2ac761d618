//! Reactive thermal-comfort engine
//!
//! Turns scattered, unreliable sensor and weather data into mean radiant
//! temperature, operative temperature, PMV/PPD, psychrometrics and mold risk
//! per room, and combines rooms into floor and zone views.
//!
//! Designed for small always-on hosts:
//! - `no_std` + `alloc` capable, with `std` as the default feature
//! - No clock reads, no I/O, no locking inside the model
//! - Every computation degrades to a documented fallback instead of failing
//!
//! ```no_run
//! use mrtop_core::{Notification, QuantityKind, Room, RoomConfig, RoomId, SourceBinding, Unit};
//!
//! let config = RoomConfig::new(RoomId(1), "Living room")
//!     .with_source(QuantityKind::AirTemperature, SourceBinding::new("sensor.living_temp"))
//!     .with_source(QuantityKind::OutdoorTemperature, SourceBinding::new("weather.home"));
//! let mut room = Room::new(config, 120.0).unwrap();
//!
//! let reading = Notification::number("sensor.living_temp", QuantityKind::AirTemperature, 21.3, Unit::Celsius, 0);
//! if let Some(result) = room.handle(&reading, 0) {
//!     println!("MRT {:.1} °C, operative {:.1} °C", result.mrt_final, result.top);
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

#[macro_use]
mod macros;

pub mod aggregator;
pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod home;
pub mod profile;
pub mod psychro;
pub mod resolver;
pub mod room;
pub mod scheduler;
pub mod store;
pub mod thermal;
pub mod time;

// Public API
pub use aggregator::{AggregateResult, AggregationMode, AggregatorNode, AggregatorTree, ChildEntry, ChildRef, RoomSnapshot};
pub use config::{HomeConfig, RoomConfig};
pub use errors::{AggregatorId, ComfortError, ComfortResult, ModelWarning, RoomId};
pub use events::{Notification, QuantityKind, ReadingValue, Unit};
pub use home::Home;
pub use profile::{CoreFactors, CoreField, Preset, ProfileManager, ProfileState, RoomProfile};
pub use psychro::PsychrometricEngine;
pub use resolver::{DataResolver, SourceBinding, Transform};
pub use room::{CalculationResult, Room};
pub use scheduler::UpdateScheduler;
pub use store::{MemoryStore, PersistedRoom, StateStore};
pub use thermal::{ModelState, ThermalModel};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
