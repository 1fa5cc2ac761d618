//! One room's calculation cycle
//!
//! A [`Room`] owns everything one room needs and nothing it shares:
//!
//! ```text
//! Notification ──► SourceCache ──► UpdateScheduler ──► DataResolver
//!                                                          │
//!           CalculationResult ◄── Psychro / PMV ◄── ThermalModel
//! ```
//!
//! Rooms are independent single writers. A host may drive each room from its
//! own task; aggregators only ever see the published [`RoomSnapshot`].

use alloc::collections::BTreeSet;
use alloc::string::String;

use serde::Serialize;

use crate::aggregator::RoomSnapshot;
use crate::config::RoomConfig;
use crate::constants::comfort::{CLO_RANGE, MET_RANGE};
use crate::constants::physics::SEA_LEVEL_PRESSURE_HPA;
use crate::errors::{push_warning, ComfortResult, ModelWarning, RoomId, Warnings};
use crate::events::{Notification, QuantityKind, SourceId};
use crate::profile::{check_range, ProfileKind, ProfileManager, RoomProfile};
use crate::psychro::{pmv, PmvInputs, PmvResult, PsychroInputs, PsychroResult, PsychrometricEngine};
use crate::resolver::{AirSpeedRule, DataResolver, ResolveContext, Resolved, SourceCache};
use crate::scheduler::{Admission, UpdateScheduler};
use crate::store::PersistedRoom;
use crate::thermal::{calibration, Calibration, ModelState, ThermalInputs, ThermalModel, ThermalOutput};
use crate::time::Timestamp;

/// Every input of one cycle with its provenance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedInputs {
    /// Indoor air temperature
    pub t_air: Resolved,
    /// Outdoor dry-bulb temperature
    pub t_out: Resolved,
    /// Outdoor temperature including wind chill
    pub t_out_effective: Resolved,
    /// Sustained wind speed
    pub wind_speed: Resolved,
    /// Gust speed
    pub wind_gust: Resolved,
    /// Global irradiance
    pub irradiance: Resolved,
    /// Shading factor
    pub shading: Resolved,
    /// Sun elevation
    pub sun_elevation: Resolved,
    /// Sun azimuth
    pub sun_azimuth: Option<Resolved>,
    /// Indoor air speed
    pub air_speed: Resolved,
    /// Station pressure
    pub pressure_hpa: Resolved,
    /// Indoor relative humidity
    pub rh: Option<Resolved>,
    /// Measured wall surface temperature
    pub wall_surface: Option<Resolved>,
    /// Radiant heating delivering heat this cycle
    pub radiant_active: bool,
    /// Radiant surface target (°C)
    pub radiant_target: f32,
}

/// Published output of one calculation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationResult {
    /// Room
    pub room: RoomId,
    /// Calculation time
    pub timestamp: Timestamp,
    /// Smoothed mean radiant temperature (°C)
    pub mrt_final: f32,
    /// Operative temperature (°C)
    pub top: f32,
    /// Exterior wall heat flux, positive = loss (W/m²)
    pub heat_flux: f32,
    /// Exterior wall heat loss (W)
    pub heat_loss_w: f32,
    /// Humidity metrics, if humidity is configured and available
    pub psychro: Option<PsychroResult>,
    /// PMV/PPD, if enabled and solvable
    pub pmv: Option<PmvResult>,
    /// Insulation calibration status
    pub calibration: Calibration,
    /// Active profile name
    pub profile_name: String,
    /// Active profile kind
    pub profile_kind: ProfileKind,
    /// Model intermediates
    pub thermal: ThermalOutput,
    /// Resolved inputs
    pub inputs: ResolvedInputs,
    /// Everything noteworthy from this cycle
    pub warnings: Warnings,
}

impl CalculationResult {
    /// Dew point (°C)
    pub fn dew_point(&self) -> Option<f32> {
        self.psychro.map(|p| p.dew_point)
    }

    /// Surface RH at the coldest wall (%)
    pub fn mold_risk_pct(&self) -> Option<f32> {
        self.psychro.map(|p| p.mold.surface_rh)
    }

    /// Mold risk category
    pub fn mold_risk_level(&self) -> Option<crate::psychro::MoldRiskLevel> {
        self.psychro.map(|p| p.mold.level)
    }

    /// Values aggregators read
    pub fn snapshot(&self, floor_level: i32, area_m2: f32) -> RoomSnapshot {
        RoomSnapshot {
            top: self.top,
            mrt: self.mrt_final,
            t_air: self.inputs.t_air.value,
            t_out: self.inputs.t_out.value,
            heat_loss_w: self.thermal.heat_loss_w,
            floor_level,
            area_m2,
            timestamp: self.timestamp,
        }
    }
}

/// State and pipeline of one room
#[derive(Debug, Clone)]
pub struct Room {
    config: RoomConfig,
    watched: BTreeSet<SourceId>,
    cache: SourceCache,
    resolver: DataResolver,
    scheduler: UpdateScheduler,
    model: ThermalModel,
    psychro: PsychrometricEngine,
    state: ModelState,
    profiles: ProfileManager,
    last_result: Option<CalculationResult>,
}

impl Room {
    /// Build a room from validated configuration
    pub fn new(config: RoomConfig, elevation_m: f32) -> ComfortResult<Self> {
        config.validate()?;
        let resolver = DataResolver::new(&config.sources, elevation_m);
        let watched = resolver.watched_sources().into_iter().map(String::from).collect();
        Ok(Self {
            watched,
            cache: SourceCache::new(),
            resolver,
            scheduler: UpdateScheduler::new(config.min_update_interval_ms),
            model: ThermalModel::default(),
            psychro: PsychrometricEngine,
            state: ModelState::with_pmv(config.pmv.clo, config.pmv.met),
            profiles: ProfileManager::new(config.default_profile),
            last_result: None,
            config,
        })
    }

    /// Room id
    pub fn id(&self) -> RoomId {
        self.config.id
    }

    /// Configuration
    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Profile library
    pub fn profiles(&self) -> &ProfileManager {
        &self.profiles
    }

    /// Profile library for edits; call [`request_update`](Self::request_update) afterwards
    pub fn profiles_mut(&mut self) -> &mut ProfileManager {
        &mut self.profiles
    }

    /// Smoothed model state
    pub fn state(&self) -> &ModelState {
        &self.state
    }

    /// Last published result
    pub fn last_result(&self) -> Option<&CalculationResult> {
        self.last_result.as_ref()
    }

    /// Values aggregators read
    pub fn snapshot(&self) -> Option<RoomSnapshot> {
        self.last_result
            .as_ref()
            .map(|r| r.snapshot(self.config.floor_level, self.config.area_m2))
    }

    /// Boundary of a held update
    pub fn next_due(&self) -> Option<Timestamp> {
        self.scheduler.next_due()
    }

    /// Model profile for the current selection
    pub fn profile(&self) -> RoomProfile {
        self.config.profile(&self.profiles)
    }

    /// True if any resolution chain reads `source_id`
    pub fn watches(&self, source_id: &str) -> bool {
        self.watched.contains(source_id)
    }

    /// Restore persisted state after a restart
    pub fn restore(&mut self, persisted: PersistedRoom) {
        self.state = persisted.model_state;
        self.profiles = persisted.profiles;
        log_debug!("{} restored (mrt_prev {:?})", self.config.id, self.state.mrt_prev);
    }

    /// State to persist
    pub fn persisted(&self) -> PersistedRoom {
        PersistedRoom {
            model_state: self.state,
            profiles: self.profiles.clone(),
        }
    }

    /// Change the PMV clothing and activity levels
    pub fn set_pmv(&mut self, clo: f32, met: f32) -> ComfortResult<()> {
        check_range("clo", clo, CLO_RANGE.0, CLO_RANGE.1)?;
        check_range("met", met, MET_RANGE.0, MET_RANGE.1)?;
        self.state.pmv_clo = clo;
        self.state.pmv_met = met;
        Ok(())
    }

    /// Consume a notification.
    ///
    /// Returns a result when the scheduler admits an immediate update.
    pub fn handle(&mut self, notification: &Notification, now: Timestamp) -> Option<CalculationResult> {
        if !self.watches(&notification.source_id) {
            return None;
        }
        if !self.cache.ingest(notification) {
            log_debug!("{} ignored out-of-order reading from {}", self.config.id, notification.source_id);
            return None;
        }
        self.request_update(now)
    }

    /// Ask for a recalculation, subject to the update interval
    pub fn request_update(&mut self, now: Timestamp) -> Option<CalculationResult> {
        match self.scheduler.notify(now) {
            Admission::Now => self.calculate(now),
            Admission::Deferred { due } => {
                log_debug!("{} update deferred until {}", self.config.id, due);
                None
            }
        }
    }

    /// Run a held update once it is due
    pub fn poll(&mut self, now: Timestamp) -> Option<CalculationResult> {
        match self.scheduler.poll(now) {
            Ok(()) => self.calculate(now),
            Err(_) => None,
        }
    }

    /// Run one calculation cycle now, bypassing the scheduler.
    ///
    /// Returns `None` without touching any state when the air temperature
    /// has no usable source.
    pub fn calculate(&mut self, now: Timestamp) -> Option<CalculationResult> {
        use QuantityKind::*;

        let ctx = ResolveContext::new(&self.cache, now);
        let r = &self.resolver;

        let t_air = r.resolve_required(AirTemperature, &ctx);
        if !t_air.is_measured() {
            log_debug!("{} skipped: no air temperature", self.config.id);
            return None;
        }

        let profile = self.config.profile(&self.profiles);
        let (t_out, t_out_effective) = r.effective_outdoor(&ctx);
        let wind_speed = r.resolve_required(WindSpeed, &ctx);
        let wind_gust = r.resolve(WindGust, &ctx).unwrap_or_else(|| wind_speed.clone());
        let irradiance = r.resolve(SolarIrradiance, &ctx).unwrap_or_else(|| Resolved::constant(0.0));
        let sun_elevation = r.resolve_required(SunElevation, &ctx);
        let rule = AirSpeedRule {
            hvac_air_speed: self.config.hvac_air_speed,
            radiant: profile.is_radiant_heating,
        };
        let radiant_target = profile
            .radiant_target_temp
            .unwrap_or_else(|| r.resolve_required(RadiantSetpoint, &ctx).value);
        let inputs = ResolvedInputs {
            shading: r.shading(&ctx),
            sun_azimuth: r.resolve(SunAzimuth, &ctx),
            air_speed: r.air_speed(&ctx, rule),
            pressure_hpa: r
                .resolve(StationPressure, &ctx)
                .unwrap_or_else(|| Resolved::constant(SEA_LEVEL_PRESSURE_HPA)),
            rh: if self.config.has_humidity() { r.resolve(RelativeHumidity, &ctx) } else { None },
            wall_surface: r.resolve(WallSurfaceTemperature, &ctx),
            radiant_active: profile.is_radiant_heating && r.hvac_heating(&ctx),
            radiant_target,
            t_air,
            t_out,
            t_out_effective,
            wind_speed,
            wind_gust,
            irradiance,
            sun_elevation,
        };

        let step = self.model.compute(
            &profile,
            &self.state,
            &ThermalInputs {
                t_air: inputs.t_air.value,
                t_out: inputs.t_out.value,
                t_out_effective: inputs.t_out_effective.value,
                wind_speed: inputs.wind_speed.value,
                wind_gust: inputs.wind_gust.value,
                irradiance: inputs.irradiance.value,
                shading: inputs.shading.value,
                sun_elevation: inputs.sun_elevation.is_measured().then_some(inputs.sun_elevation.value),
                sun_azimuth: inputs.sun_azimuth.as_ref().map(|a| a.value),
                air_speed: inputs.air_speed.value,
                radiant_active: inputs.radiant_active,
                radiant_target: inputs.radiant_target,
                now,
            },
        );

        let mut warnings = step.output.warnings.clone();
        if let Some(w) = DataResolver::irradiance_warning(&inputs.irradiance) {
            push_warning(&mut warnings, w);
        }
        if let Some(w) = profile.factors.nominal_warning() {
            push_warning(&mut warnings, w);
        }

        let wall_surface = inputs.wall_surface.as_ref().map(|w| w.value);
        let psychro = inputs.rh.as_ref().map(|rh| {
            self.psychro.compute(&PsychroInputs {
                t_air: inputs.t_air.value,
                rh: rh.value,
                pressure_hpa: inputs.pressure_hpa.value,
                t_out: inputs.t_out.value,
                k_loss: profile.factors.k_loss,
                wall_surface_c: wall_surface,
            })
        });

        let pmv = match (&inputs.rh, self.config.pmv.enabled) {
            (Some(rh), true) => {
                let solved = pmv::compute(&PmvInputs {
                    t_air: inputs.t_air.value,
                    mrt: step.output.mrt_final,
                    air_speed: inputs.air_speed.value,
                    rh: rh.value,
                    met: self.state.pmv_met,
                    clo: self.state.pmv_clo,
                });
                if solved.is_none() {
                    log_warn!("{}: PMV did not converge", self.config.id);
                    push_warning(&mut warnings, ModelWarning::PmvNotConverged);
                }
                solved
            }
            _ => None,
        };

        let calibration = calibration::estimate(
            inputs.t_air.value,
            inputs.t_out.value,
            wall_surface,
            inputs.sun_elevation.value,
        );

        if let Some(next) = step.next_state {
            self.state = next;
        }
        self.scheduler.record_emit(now);

        let result = CalculationResult {
            room: self.config.id,
            timestamp: now,
            mrt_final: step.output.mrt_final,
            top: step.output.top,
            heat_flux: step.output.heat_flux,
            heat_loss_w: step.output.heat_loss_w,
            psychro,
            pmv,
            calibration,
            profile_name: profile.name,
            profile_kind: profile.kind,
            thermal: step.output,
            inputs,
            warnings,
        };
        log_debug!(
            "{}: mrt {:.2} top {:.2} ({} warnings)",
            self.config.id,
            result.mrt_final,
            result.top,
            result.warnings.len()
        );
        self.last_result = Some(result.clone());
        Some(result)
    }
}
