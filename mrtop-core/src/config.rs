//! Room and home configuration
//!
//! Configuration is plain data with serde defaults, so a minimal room needs
//! only an id, a name and the sources it reads:
//!
//! ```json
//! {
//!   "id": 1,
//!   "name": "Living room",
//!   "sources": {
//!     "air_temperature": [{ "source_id": "sensor.living_temp" }],
//!     "outdoor_temperature": [{ "source_id": "sensor.outdoor" }, { "source_id": "weather.home" }]
//!   }
//! }
//! ```
//!
//! Validation is explicit: call [`RoomConfig::validate`] or
//! [`HomeConfig::validate`] before building rooms from it.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::aggregator::{AggregatorNode, AggregatorTree, ChildRef};
use crate::constants::comfort::{AIR_SPEED_HVAC, CLO_RANGE, DEFAULT_ALPHA, DEFAULT_CLO, DEFAULT_MET, MET_RANGE};
use crate::constants::physics::DEFAULT_FLOOR_HEIGHT_M;
use crate::constants::resolver::{DEFAULT_ORIENTATION_DEG, DEFAULT_ROOM_AREA_M2};
use crate::constants::time::{DEFAULT_MIN_UPDATE_INTERVAL_MS, MIN_UPDATE_INTERVAL_FLOOR_MS};
use crate::errors::{AggregatorId, ComfortError, ComfortResult, RoomId};
use crate::events::QuantityKind;
use crate::profile::{check_range, Geometry, Preset, ProfileManager, RoomProfile};
use crate::resolver::SourceBinding;
use crate::thermal::RadiantSystem;

/// Radiant heating settings
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RadiantConfig {
    /// Room is heated by a radiant surface
    pub enabled: bool,
    /// Construction
    pub system: RadiantSystem,
    /// Fixed surface target (°C); otherwise the thermostat setpoint is used
    pub target_temp: Option<f32>,
}

/// PMV/PPD settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PmvConfig {
    /// Compute PMV/PPD when humidity is available
    pub enabled: bool,
    /// Clothing insulation (clo)
    pub clo: f32,
    /// Metabolic rate (met)
    pub met: f32,
}

impl Default for PmvConfig {
    fn default() -> Self {
        Self { enabled: true, clo: DEFAULT_CLO, met: DEFAULT_MET }
    }
}

/// Configuration of one room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Unique id within the home
    pub id: RoomId,
    /// Display name
    pub name: String,
    /// Storey, 0 = ground floor
    #[serde(default)]
    pub floor_level: i32,
    /// Floor area (m²)
    #[serde(default = "default_area")]
    pub area_m2: f32,
    /// Compass direction the windows face (degrees)
    #[serde(default = "default_orientation")]
    pub orientation_deg: f32,
    /// MRT smoothing factor
    #[serde(default = "default_alpha")]
    pub alpha: f32,
    /// Exterior wall geometry
    #[serde(default)]
    pub geometry: Option<Geometry>,
    /// Radiant heating
    #[serde(default)]
    pub radiant: RadiantConfig,
    /// PMV/PPD
    #[serde(default)]
    pub pmv: PmvConfig,
    /// Air speed while forced-air HVAC runs (m/s)
    #[serde(default = "default_hvac_air_speed")]
    pub hvac_air_speed: f32,
    /// Minimum time between emitted results (ms)
    #[serde(default = "default_min_interval")]
    pub min_update_interval_ms: u64,
    /// Built-in profile selected until the user picks another
    #[serde(default)]
    pub default_profile: Preset,
    /// Source bindings per quantity, in priority order
    #[serde(default)]
    pub sources: BTreeMap<QuantityKind, Vec<SourceBinding>>,
}

fn default_area() -> f32 {
    DEFAULT_ROOM_AREA_M2
}

fn default_orientation() -> f32 {
    DEFAULT_ORIENTATION_DEG
}

fn default_alpha() -> f32 {
    DEFAULT_ALPHA
}

fn default_hvac_air_speed() -> f32 {
    AIR_SPEED_HVAC
}

fn default_min_interval() -> u64 {
    DEFAULT_MIN_UPDATE_INTERVAL_MS
}

impl RoomConfig {
    /// Room with default settings and no sources
    pub fn new(id: RoomId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            floor_level: 0,
            area_m2: DEFAULT_ROOM_AREA_M2,
            orientation_deg: DEFAULT_ORIENTATION_DEG,
            alpha: DEFAULT_ALPHA,
            geometry: None,
            radiant: RadiantConfig::default(),
            pmv: PmvConfig::default(),
            hvac_air_speed: AIR_SPEED_HVAC,
            min_update_interval_ms: DEFAULT_MIN_UPDATE_INTERVAL_MS,
            default_profile: Preset::default(),
            sources: BTreeMap::new(),
        }
    }

    /// Append a source for `kind`
    pub fn with_source(mut self, kind: QuantityKind, binding: SourceBinding) -> Self {
        self.sources.entry(kind).or_default().push(binding);
        self
    }

    /// True if indoor humidity is configured
    pub fn has_humidity(&self) -> bool {
        self.sources.get(&QuantityKind::RelativeHumidity).is_some_and(|b| !b.is_empty())
    }

    /// Check every field; nothing is modified
    pub fn validate(&self) -> ComfortResult<()> {
        if self.name.trim().is_empty() {
            return Err(ComfortError::InvalidConfiguration { field: "name", reason: "must not be empty" });
        }
        if self.min_update_interval_ms < MIN_UPDATE_INTERVAL_FLOOR_MS {
            return Err(ComfortError::InvalidConfiguration {
                field: "min_update_interval_ms",
                reason: "must be at least one second",
            });
        }
        check_range("hvac_air_speed", self.hvac_air_speed, 0.0, 5.0)?;
        check_range("pmv.clo", self.pmv.clo, CLO_RANGE.0, CLO_RANGE.1)?;
        check_range("pmv.met", self.pmv.met, MET_RANGE.0, MET_RANGE.1)?;
        if self.sources.values().flatten().any(|b| b.source_id.trim().is_empty()) {
            return Err(ComfortError::InvalidConfiguration { field: "sources", reason: "empty source id" });
        }
        self.profile(&ProfileManager::new(self.default_profile)).validate()
    }

    /// Assemble the model profile from this configuration and the active
    /// profile selection
    pub fn profile(&self, profiles: &ProfileManager) -> RoomProfile {
        RoomProfile {
            name: String::from(profiles.active_name()),
            kind: profiles.active_kind(),
            factors: profiles.active_factors(),
            alpha: self.alpha,
            geometry: self.geometry,
            is_radiant_heating: self.radiant.enabled,
            radiant_target_temp: self.radiant.target_temp,
            radiant_system_type: self.radiant.system,
            floor_level: self.floor_level,
            orientation_deg: self.orientation_deg,
            area_m2: self.area_m2,
        }
    }
}

/// Configuration of a whole home
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeConfig {
    /// Site elevation above sea level (m)
    #[serde(default)]
    pub elevation_m: f32,
    /// Storey height (m)
    #[serde(default = "default_floor_height")]
    pub floor_height_m: f32,
    /// Rooms
    #[serde(default)]
    pub rooms: Vec<RoomConfig>,
    /// Aggregator nodes by id
    #[serde(default)]
    pub aggregators: BTreeMap<AggregatorId, AggregatorNode>,
}

fn default_floor_height() -> f32 {
    DEFAULT_FLOOR_HEIGHT_M
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            elevation_m: 0.0,
            floor_height_m: DEFAULT_FLOOR_HEIGHT_M,
            rooms: Vec::new(),
            aggregators: BTreeMap::new(),
        }
    }
}

impl HomeConfig {
    /// Check site values, every room, and the aggregator table
    pub fn validate(&self) -> ComfortResult<()> {
        check_range("elevation_m", self.elevation_m, -500.0, 9000.0)?;
        if self.floor_height_m.is_nan() || self.floor_height_m <= 0.0 {
            return Err(ComfortError::InvalidConfiguration { field: "floor_height_m", reason: "must be positive" });
        }
        let mut ids = BTreeSet::new();
        for room in &self.rooms {
            room.validate()?;
            if !ids.insert(room.id) {
                return Err(ComfortError::DuplicateRoom(room.id));
            }
        }
        for node in self.aggregators.values() {
            for entry in &node.children {
                if let ChildRef::Room(r) = entry.child {
                    if !ids.contains(&r) {
                        return Err(ComfortError::UnknownRoom(r));
                    }
                }
            }
        }
        self.aggregator_tree().map(|_| ())
    }

    /// Build the aggregator table
    pub fn aggregator_tree(&self) -> ComfortResult<AggregatorTree> {
        let mut tree = AggregatorTree::new(self.floor_height_m, self.elevation_m);
        tree.configure(self.aggregators.clone())?;
        Ok(tree)
    }
}
