//! Data Resolution with Prioritised Fallback
//!
//! ## Overview
//!
//! A room's model needs a dozen physical quantities, and few homes have a
//! sensor for each. The resolver answers "what is the best current value of
//! X?" by walking an ordered chain of steps per quantity:
//!
//! ```text
//! OutdoorTemperature: Source(sensor.outdoor) → Source(weather.home) → Constant(10 °C)
//! SolarIrradiance:    Source(sensor.pyranometer) → Heuristic(SolarFromWeather)
//! ApparentTemperature: Heuristic(SteadmanApparent) → Source(weather.home) → Heuristic(DryBulbApparent)
//! ```
//!
//! Most chains start with their sources. Apparent temperature starts with the
//! local Steadman estimate, since a weather service's "feels like" value is
//! computed for a different site; the service value is the fallback.
//!
//! A source step is usable when the cached reading is available, numeric and
//! younger than the binding's TTL. Stale data is treated exactly like missing
//! data. Heuristic steps derive a value from other quantities (resolved
//! recursively through their own chains) and are skipped when their inputs are
//! missing. Chains for quantities the model cannot do without end in a
//! constant, so resolution of those never fails.
//!
//! ## Determinism
//!
//! Given the same chain, cache contents and `now`, `resolve` always returns the
//! same step. Marking the first source unavailable moves resolution to the
//! next usable step and nowhere else.
//!
//! ## Air Speed
//!
//! Air speed is not a chain but a maximum over every draft-producing input
//! (open door, open window, forced-air HVAC, fan mode, manual override) with
//! still air as the floor. See [`DataResolver::air_speed`].

pub mod cache;
pub mod heuristics;

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::constants::comfort::{AIR_SPEED_DOOR_OPEN, AIR_SPEED_STILL, AIR_SPEED_WINDOW_OPEN};
use crate::constants::physics::{SEA_LEVEL_PRESSURE_HPA, SOLAR_SENSOR_WARN_W_PER_M2};
use crate::constants::resolver::{
    DEFAULT_AIR_TEMP_C, DEFAULT_CLOUD_COVER_PCT, DEFAULT_OUTDOOR_TEMP_C,
    DEFAULT_PRECIPITATION_MM_PER_H, DEFAULT_SETPOINT_C, DEFAULT_SHADING,
    DEFAULT_SUN_ELEVATION_DEG, DEFAULT_UV_INDEX, DEFAULT_WIND_SPEED_M_PER_S,
};
use crate::constants::time::DEFAULT_SOURCE_TTL_MS;
use crate::errors::ModelWarning;
use crate::events::{QuantityKind, ReadingValue, SourceId};
use crate::time::Timestamp;

pub use cache::{CachedReading, SourceCache};

/// Adjustment applied to a source value after unit normalisation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Transform {
    /// Use the value as reported
    #[default]
    Identity,
    /// Add a calibration offset
    Offset(f32),
    /// Multiply by a factor
    Scale(f32),
    /// Reduce a sea-level pressure to the site elevation
    SeaLevelToStation,
}

impl Transform {
    fn apply(self, value: f32, elevation_m: f32) -> f32 {
        match self {
            Self::Identity => value,
            Self::Offset(by) => value + by,
            Self::Scale(factor) => value * factor,
            Self::SeaLevelToStation => heuristics::station_pressure(value, elevation_m),
        }
    }
}

/// Where a source step reads from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceBinding {
    /// External source id
    pub source_id: SourceId,
    /// Post-normalisation adjustment
    #[serde(default)]
    pub transform: Transform,
    /// Validity window; older readings count as missing
    #[serde(default)]
    pub ttl_ms: Option<u64>,
}

impl SourceBinding {
    /// Binding with identity transform and default TTL
    pub fn new(source_id: impl Into<SourceId>) -> Self {
        Self {
            source_id: source_id.into(),
            transform: Transform::Identity,
            ttl_ms: None,
        }
    }

    /// Set the validity window
    pub fn with_ttl(mut self, ttl_ms: u64) -> Self {
        self.ttl_ms = Some(ttl_ms);
        self
    }

    /// Set the transform
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    fn ttl(&self) -> u64 {
        self.ttl_ms.unwrap_or(DEFAULT_SOURCE_TTL_MS)
    }
}

/// Derived estimates available as resolver steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    /// Apparent temperature from outdoor temperature, humidity and wind
    SteadmanApparent,
    /// Apparent temperature equal to the dry-bulb outdoor temperature
    DryBulbApparent,
    /// Cloud cover from the weather condition text
    CloudFromCondition,
    /// Irradiance from UV, cloud, precipitation and sun elevation
    SolarFromWeather,
    /// Gust speed equal to the sustained wind speed
    GustFromWind,
    /// Station pressure from the sea-level pressure chain
    StationFromSeaLevel,
    /// Maximum over draft-producing inputs
    AirSpeedMax,
}

/// One step of a resolution chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverStep {
    /// Read an external source
    Source(SourceBinding),
    /// Derive from other quantities
    Heuristic(Heuristic),
    /// Fixed value
    Constant(f32),
}

/// Origin of a resolved value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Provenance {
    /// Read from this source
    Source(SourceId),
    /// Derived by this heuristic
    Heuristic(Heuristic),
    /// Fixed default
    Constant,
}

/// Result of resolving one quantity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolved {
    /// Value in canonical units
    pub value: f32,
    /// Where it came from
    pub source: Provenance,
    /// False only when the first step of the chain supplied the value
    pub is_fallback: bool,
}

impl Resolved {
    /// A constant fallback
    pub fn constant(value: f32) -> Self {
        Self {
            value,
            source: Provenance::Constant,
            is_fallback: true,
        }
    }

    /// True if the value came from an external source
    pub fn is_measured(&self) -> bool {
        matches!(self.source, Provenance::Source(_))
    }
}

/// Inputs shared by every resolution in one cycle
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    /// Latest source readings
    pub cache: &'a SourceCache,
    /// Current time for staleness checks
    pub now: Timestamp,
}

impl<'a> ResolveContext<'a> {
    /// Context over `cache` at `now`
    pub fn new(cache: &'a SourceCache, now: Timestamp) -> Self {
        Self { cache, now }
    }
}

/// Inputs to the air-speed maximum that come from configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirSpeedRule {
    /// Air speed while forced-air HVAC is running (m/s)
    pub hvac_air_speed: f32,
    /// Radiant systems heat without moving air
    pub radiant: bool,
}

/// Constant at the end of a quantity's chain, if it has one
pub fn terminal_constant(kind: QuantityKind) -> Option<f32> {
    use QuantityKind::*;
    match kind {
        AirTemperature => Some(DEFAULT_AIR_TEMP_C),
        OutdoorTemperature => Some(DEFAULT_OUTDOOR_TEMP_C),
        WindSpeed => Some(DEFAULT_WIND_SPEED_M_PER_S),
        CloudCover => Some(DEFAULT_CLOUD_COVER_PCT),
        UvIndex => Some(DEFAULT_UV_INDEX),
        Precipitation => Some(DEFAULT_PRECIPITATION_MM_PER_H),
        SeaLevelPressure => Some(SEA_LEVEL_PRESSURE_HPA),
        SunElevation => Some(DEFAULT_SUN_ELEVATION_DEG),
        RadiantSetpoint => Some(DEFAULT_SETPOINT_C),
        _ => None,
    }
}

/// Heuristics tried before the configured sources
pub fn leading_heuristics(kind: QuantityKind) -> &'static [Heuristic] {
    match kind {
        QuantityKind::ApparentTemperature => &[Heuristic::SteadmanApparent],
        _ => &[],
    }
}

/// Heuristics appended after the configured sources
pub fn default_heuristics(kind: QuantityKind) -> &'static [Heuristic] {
    use QuantityKind::*;
    match kind {
        ApparentTemperature => &[Heuristic::DryBulbApparent],
        CloudCover => &[Heuristic::CloudFromCondition],
        SolarIrradiance => &[Heuristic::SolarFromWeather],
        WindGust => &[Heuristic::GustFromWind],
        StationPressure => &[Heuristic::StationFromSeaLevel],
        _ => &[],
    }
}

/// Resolves physical quantities for one room
#[derive(Debug, Clone, Default)]
pub struct DataResolver {
    chains: BTreeMap<QuantityKind, Vec<ResolverStep>>,
    elevation_m: f32,
}

impl DataResolver {
    /// Build chains from per-quantity source bindings.
    ///
    /// Each chain is the quantity's leading heuristics, the configured
    /// sources in order, its default heuristics and its terminal constant.
    pub fn new(bindings: &BTreeMap<QuantityKind, Vec<SourceBinding>>, elevation_m: f32) -> Self {
        let mut chains = BTreeMap::new();
        for kind in QuantityKind::ALL {
            let mut steps: Vec<ResolverStep> =
                leading_heuristics(kind).iter().copied().map(ResolverStep::Heuristic).collect();
            if let Some(b) = bindings.get(&kind) {
                steps.extend(b.iter().cloned().map(ResolverStep::Source));
            }
            steps.extend(default_heuristics(kind).iter().copied().map(ResolverStep::Heuristic));
            if let Some(c) = terminal_constant(kind) {
                steps.push(ResolverStep::Constant(c));
            }
            if !steps.is_empty() {
                chains.insert(kind, steps);
            }
        }
        Self { chains, elevation_m }
    }

    /// Replace a chain wholesale
    pub fn with_chain(mut self, kind: QuantityKind, steps: Vec<ResolverStep>) -> Self {
        self.chains.insert(kind, steps);
        self
    }

    /// Steps tried for `kind`, in order
    pub fn chain(&self, kind: QuantityKind) -> &[ResolverStep] {
        self.chains.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Site elevation used for pressure reduction (m)
    pub fn elevation_m(&self) -> f32 {
        self.elevation_m
    }

    /// Every source id any chain reads
    pub fn watched_sources(&self) -> BTreeSet<&str> {
        self.chains
            .values()
            .flatten()
            .filter_map(|step| match step {
                ResolverStep::Source(b) => Some(b.source_id.as_str()),
                _ => None,
            })
            .collect()
    }

    /// True if `kind` has at least one source binding
    pub fn has_source(&self, kind: QuantityKind) -> bool {
        self.chain(kind).iter().any(|s| matches!(s, ResolverStep::Source(_)))
    }

    /// Resolve a numeric quantity.
    ///
    /// Returns `None` only when every step is unusable and the chain has no
    /// constant.
    pub fn resolve(&self, kind: QuantityKind, ctx: &ResolveContext<'_>) -> Option<Resolved> {
        for (index, step) in self.chain(kind).iter().enumerate() {
            let found = match step {
                ResolverStep::Source(binding) => self
                    .read_number(binding, kind, ctx)
                    .map(|v| (v, Provenance::Source(binding.source_id.clone()))),
                ResolverStep::Heuristic(h) => {
                    self.apply_heuristic(*h, ctx).map(|v| (v, Provenance::Heuristic(*h)))
                }
                ResolverStep::Constant(c) => Some((*c, Provenance::Constant)),
            };
            if let Some((value, source)) = found {
                let is_fallback = index > 0 || !matches!(source, Provenance::Source(_));
                if is_fallback {
                    log_debug!("{} resolved by fallback step {} ({:?})", kind, index, source);
                }
                return Some(Resolved { value, source, is_fallback });
            }
        }
        log_debug!("{} unresolved: no usable step", kind);
        None
    }

    /// Resolve a quantity whose chain ends in a constant
    pub fn resolve_required(&self, kind: QuantityKind, ctx: &ResolveContext<'_>) -> Resolved {
        self.resolve(kind, ctx)
            .unwrap_or_else(|| Resolved::constant(terminal_constant(kind).unwrap_or(0.0)))
    }

    /// First usable textual state among the sources of `kind`
    pub fn resolve_state<'c>(&self, kind: QuantityKind, ctx: &ResolveContext<'c>) -> Option<&'c str> {
        self.sources(kind).find_map(|binding| {
            ctx.cache
                .fresh(&binding.source_id, kind, ctx.now, binding.ttl())
                .and_then(|r| r.value.as_state())
        })
    }

    /// True if any fresh source of a contact quantity reports open
    pub fn any_open(&self, kind: QuantityKind, ctx: &ResolveContext<'_>) -> bool {
        self.sources(kind).any(|binding| {
            ctx.cache
                .fresh(&binding.source_id, kind, ctx.now, binding.ttl())
                .and_then(|r| r.value.as_binary())
                .unwrap_or(false)
        })
    }

    /// Effective outdoor temperature: the apparent temperature when it is
    /// colder than the dry-bulb reading (wind chill), else the dry bulb.
    pub fn effective_outdoor(&self, ctx: &ResolveContext<'_>) -> (Resolved, Resolved) {
        let outdoor = self.resolve_required(QuantityKind::OutdoorTemperature, ctx);
        let effective = match self.resolve(QuantityKind::ApparentTemperature, ctx) {
            Some(apparent) if apparent.value < outdoor.value => apparent,
            _ => outdoor.clone(),
        };
        (outdoor, effective)
    }

    /// Precipitation multiplier for solar estimates
    pub fn rain_multiplier(&self, ctx: &ResolveContext<'_>) -> f32 {
        let wet_condition = self
            .resolve_state(QuantityKind::WeatherCondition, ctx)
            .map(heuristics::is_wet_condition)
            .unwrap_or(false);
        let precipitating = self
            .resolve(QuantityKind::Precipitation, ctx)
            .map(|r| r.value > 0.0)
            .unwrap_or(false);
        heuristics::rain_multiplier(wet_condition || precipitating)
    }

    /// Shading factor in [0, 1] where 1 is unshaded.
    ///
    /// Numbers above 1 are read as a cover position in percent. Textual
    /// states follow cover semantics: open lets sun in, closed blocks it.
    pub fn shading(&self, ctx: &ResolveContext<'_>) -> Resolved {
        for (index, binding) in self.sources(QuantityKind::Shading).enumerate() {
            let reading = match ctx.cache.fresh(&binding.source_id, QuantityKind::Shading, ctx.now, binding.ttl()) {
                Some(r) => r,
                None => continue,
            };
            let factor = match &reading.value {
                ReadingValue::Number(v) if v.is_finite() => {
                    let v = binding.transform.apply(*v, self.elevation_m);
                    if v > 1.0 { v / 100.0 } else { v }
                }
                other => match other.as_binary() {
                    Some(open) => if open { 1.0 } else { 0.0 },
                    None => continue,
                },
            };
            return Resolved {
                value: factor.clamp(0.0, 1.0),
                source: Provenance::Source(binding.source_id.clone()),
                is_fallback: index > 0,
            };
        }
        Resolved::constant(DEFAULT_SHADING)
    }

    /// True while the HVAC system is running or its fan is forced on
    pub fn hvac_active(&self, ctx: &ResolveContext<'_>) -> bool {
        let action_active = self
            .resolve_state(QuantityKind::HvacAction, ctx)
            .map(|a| !matches!(a.trim().to_ascii_lowercase().as_str(), "off" | "idle" | ""))
            .unwrap_or(false);
        let fan_forced = self
            .resolve_state(QuantityKind::FanMode, ctx)
            .map(|m| m.trim().eq_ignore_ascii_case("on"))
            .unwrap_or(false);
        action_active || fan_forced
    }

    /// True while the HVAC system reports it is heating
    pub fn hvac_heating(&self, ctx: &ResolveContext<'_>) -> bool {
        self.resolve_state(QuantityKind::HvacAction, ctx)
            .map(|a| a.trim().eq_ignore_ascii_case("heating"))
            .unwrap_or(false)
    }

    /// Indoor air speed as the maximum over draft-producing inputs (m/s)
    pub fn air_speed(&self, ctx: &ResolveContext<'_>, rule: AirSpeedRule) -> Resolved {
        let hvac_active = self.hvac_active(ctx);
        let mut candidates: Vec<f32> = Vec::with_capacity(5);

        if self.any_open(QuantityKind::DoorOpen, ctx) {
            candidates.push(AIR_SPEED_DOOR_OPEN);
        }
        if self.any_open(QuantityKind::WindowOpen, ctx) {
            candidates.push(AIR_SPEED_WINDOW_OPEN);
        }
        if hvac_active && !rule.radiant {
            candidates.push(rule.hvac_air_speed);
        }
        if let Some(mode) = self.resolve_state(QuantityKind::FanMode, ctx) {
            let auto = mode.trim().eq_ignore_ascii_case("auto");
            if !auto || hvac_active {
                if let Some(speed) = heuristics::fan_mode_speed(mode) {
                    candidates.push(speed);
                }
            }
        }
        if let Some(manual) = self.resolve(QuantityKind::ManualAirSpeed, ctx) {
            if manual.value > AIR_SPEED_STILL {
                candidates.push(manual.value);
            }
        }

        let is_fallback = candidates.is_empty();
        let value = candidates.into_iter().fold(AIR_SPEED_STILL, f32::max);
        Resolved {
            value,
            source: Provenance::Heuristic(Heuristic::AirSpeedMax),
            is_fallback,
        }
    }

    /// Warning for an implausibly high measured irradiance; the value itself is kept
    pub fn irradiance_warning(resolved: &Resolved) -> Option<ModelWarning> {
        (resolved.is_measured() && resolved.value > SOLAR_SENSOR_WARN_W_PER_M2).then(|| {
            log_warn!("irradiance {} W/m² above {} W/m²", resolved.value, SOLAR_SENSOR_WARN_W_PER_M2);
            ModelWarning::IrradianceAboveLimit { value: resolved.value }
        })
    }

    fn sources(&self, kind: QuantityKind) -> impl Iterator<Item = &SourceBinding> {
        self.chain(kind).iter().filter_map(|step| match step {
            ResolverStep::Source(b) => Some(b),
            _ => None,
        })
    }

    fn read_number(&self, binding: &SourceBinding, kind: QuantityKind, ctx: &ResolveContext<'_>) -> Option<f32> {
        let reading = ctx.cache.fresh(&binding.source_id, kind, ctx.now, binding.ttl())?;
        let value = binding.transform.apply(reading.value.as_number()?, self.elevation_m);
        value.is_finite().then_some(value)
    }

    fn apply_heuristic(&self, heuristic: Heuristic, ctx: &ResolveContext<'_>) -> Option<f32> {
        use QuantityKind::*;
        match heuristic {
            Heuristic::SteadmanApparent => {
                let outdoor = self.resolve(OutdoorTemperature, ctx).filter(Resolved::is_measured)?;
                let rh = self.resolve(OutdoorHumidity, ctx)?;
                let wind = self.resolve_required(WindSpeed, ctx);
                Some(heuristics::steadman_apparent(outdoor.value, rh.value, wind.value))
            }
            Heuristic::DryBulbApparent => self.resolve(OutdoorTemperature, ctx).map(|r| r.value),
            Heuristic::CloudFromCondition => self
                .resolve_state(WeatherCondition, ctx)
                .and_then(heuristics::cloud_from_condition),
            Heuristic::SolarFromWeather => {
                let uv = self.resolve_required(UvIndex, ctx).value;
                let cloud = self.resolve_required(CloudCover, ctx).value;
                let elevation = self.resolve_required(SunElevation, ctx).value;
                let rain = self.rain_multiplier(ctx);
                Some(heuristics::solar_estimate(uv, cloud, rain, heuristics::daylight_factor(elevation)))
            }
            Heuristic::GustFromWind => self.resolve(WindSpeed, ctx).map(|r| r.value),
            Heuristic::StationFromSeaLevel => {
                let sea_level = self.resolve_required(SeaLevelPressure, ctx).value;
                Some(heuristics::station_pressure(sea_level, self.elevation_m))
            }
            Heuristic::AirSpeedMax => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Notification, Unit};
    use alloc::vec;

    fn bindings(entries: &[(QuantityKind, &[&str])]) -> BTreeMap<QuantityKind, Vec<SourceBinding>> {
        entries
            .iter()
            .map(|(k, ids)| (*k, ids.iter().map(|id| SourceBinding::new(*id)).collect()))
            .collect()
    }

    #[test]
    fn first_available_source_wins() {
        let resolver = DataResolver::new(
            &bindings(&[(QuantityKind::OutdoorTemperature, &["sensor.out", "weather.home"])]),
            0.0,
        );
        let mut cache = SourceCache::new();
        cache.ingest(&Notification::number("sensor.out", QuantityKind::OutdoorTemperature, 3.0, Unit::Celsius, 0));
        cache.ingest(&Notification::number("weather.home", QuantityKind::OutdoorTemperature, 5.0, Unit::Celsius, 0));

        let ctx = ResolveContext::new(&cache, 1_000);
        let r = resolver.resolve(QuantityKind::OutdoorTemperature, &ctx).unwrap();
        assert_eq!(r.value, 3.0);
        assert_eq!(r.source, Provenance::Source("sensor.out".into()));
        assert!(!r.is_fallback);

        cache.ingest(&Notification::unavailable("sensor.out", QuantityKind::OutdoorTemperature, 500));
        let ctx = ResolveContext::new(&cache, 1_000);
        let r = resolver.resolve(QuantityKind::OutdoorTemperature, &ctx).unwrap();
        assert_eq!(r.value, 5.0);
        assert!(r.is_fallback);
    }

    #[test]
    fn empty_cache_falls_to_constant() {
        let resolver = DataResolver::new(&bindings(&[(QuantityKind::OutdoorTemperature, &["sensor.out"])]), 0.0);
        let cache = SourceCache::new();
        let ctx = ResolveContext::new(&cache, 0);
        let r = resolver.resolve(QuantityKind::OutdoorTemperature, &ctx).unwrap();
        assert_eq!(r.value, DEFAULT_OUTDOOR_TEMP_C);
        assert_eq!(r.source, Provenance::Constant);
        assert!(resolver.resolve(QuantityKind::RelativeHumidity, &ctx).is_none());
    }

    #[test]
    fn stale_source_is_skipped() {
        let resolver = DataResolver::new(&BTreeMap::new(), 0.0).with_chain(
            QuantityKind::WindSpeed,
            vec![
                ResolverStep::Source(SourceBinding::new("anemometer").with_ttl(60_000)),
                ResolverStep::Constant(2.0),
            ],
        );
        let mut cache = SourceCache::new();
        cache.ingest(&Notification::number("anemometer", QuantityKind::WindSpeed, 7.0, Unit::MetersPerSecond, 0));
        let fresh = ResolveContext::new(&cache, 59_000);
        assert_eq!(resolver.resolve(QuantityKind::WindSpeed, &fresh).unwrap().value, 7.0);
        let stale = ResolveContext::new(&cache, 61_000);
        assert_eq!(resolver.resolve(QuantityKind::WindSpeed, &stale).unwrap().value, 2.0);
    }

    #[test]
    fn cloud_cover_from_condition_before_constant() {
        let resolver = DataResolver::new(&bindings(&[(QuantityKind::WeatherCondition, &["weather.home"])]), 0.0);
        let mut cache = SourceCache::new();
        let ctx = ResolveContext::new(&cache, 0);
        assert_eq!(resolver.resolve_required(QuantityKind::CloudCover, &ctx).value, DEFAULT_CLOUD_COVER_PCT);

        cache.ingest(&Notification::state("weather.home", QuantityKind::WeatherCondition, "sunny", 0));
        let ctx = ResolveContext::new(&cache, 0);
        let r = resolver.resolve_required(QuantityKind::CloudCover, &ctx);
        assert_eq!(r.value, 0.0);
        assert_eq!(r.source, Provenance::Heuristic(Heuristic::CloudFromCondition));
    }

    #[test]
    fn apparent_temperature_prefers_steadman_then_dry_bulb() {
        let resolver = DataResolver::new(
            &bindings(&[
                (QuantityKind::OutdoorTemperature, &["sensor.out"]),
                (QuantityKind::OutdoorHumidity, &["sensor.out_rh"]),
                (QuantityKind::WindSpeed, &["sensor.wind"]),
            ]),
            0.0,
        );
        let mut cache = SourceCache::new();
        cache.ingest(&Notification::number("sensor.out", QuantityKind::OutdoorTemperature, 0.0, Unit::Celsius, 0));
        let ctx = ResolveContext::new(&cache, 0);
        let (outdoor, effective) = resolver.effective_outdoor(&ctx);
        assert_eq!(outdoor.value, 0.0);
        assert_eq!(effective.value, 0.0);

        cache.ingest(&Notification::number("sensor.out_rh", QuantityKind::OutdoorHumidity, 50.0, Unit::Percent, 0));
        cache.ingest(&Notification::number("sensor.wind", QuantityKind::WindSpeed, 36.0, Unit::KilometersPerHour, 0));
        let ctx = ResolveContext::new(&cache, 0);
        let (outdoor, effective) = resolver.effective_outdoor(&ctx);
        assert_eq!(outdoor.value, 0.0);
        assert!(effective.value < -8.0);
        assert_eq!(effective.source, Provenance::Heuristic(Heuristic::SteadmanApparent));
    }

    #[test]
    fn apparent_temperature_estimate_outranks_weather_service() {
        let resolver = DataResolver::new(
            &bindings(&[
                (QuantityKind::OutdoorTemperature, &["sensor.out"]),
                (QuantityKind::OutdoorHumidity, &["sensor.out_rh"]),
                (QuantityKind::WindSpeed, &["sensor.wind"]),
                (QuantityKind::ApparentTemperature, &["weather.home"]),
            ]),
            0.0,
        );
        assert_eq!(
            resolver.chain(QuantityKind::ApparentTemperature)[..3],
            [
                ResolverStep::Heuristic(Heuristic::SteadmanApparent),
                ResolverStep::Source(SourceBinding::new("weather.home")),
                ResolverStep::Heuristic(Heuristic::DryBulbApparent),
            ]
        );

        let mut cache = SourceCache::new();
        cache.ingest(&Notification::number("sensor.out", QuantityKind::OutdoorTemperature, 0.0, Unit::Celsius, 0));
        cache.ingest(&Notification::number("sensor.wind", QuantityKind::WindSpeed, 10.0, Unit::MetersPerSecond, 0));
        cache.ingest(&Notification::number("weather.home", QuantityKind::ApparentTemperature, -1.0, Unit::Celsius, 0));

        // no outdoor humidity: the service value is next
        let ctx = ResolveContext::new(&cache, 0);
        let (_, effective) = resolver.effective_outdoor(&ctx);
        assert_eq!(effective.value, -1.0);
        assert_eq!(effective.source, Provenance::Source("weather.home".into()));

        cache.ingest(&Notification::number("sensor.out_rh", QuantityKind::OutdoorHumidity, 50.0, Unit::Percent, 0));
        let ctx = ResolveContext::new(&cache, 0);
        let (outdoor, effective) = resolver.effective_outdoor(&ctx);
        assert_eq!(outdoor.value, 0.0);
        assert_eq!(effective.source, Provenance::Heuristic(Heuristic::SteadmanApparent));
        assert!(effective.value < -1.0);
    }

    #[test]
    fn apparent_temperature_falls_back_to_dry_bulb() {
        let resolver = DataResolver::new(
            &bindings(&[
                (QuantityKind::OutdoorTemperature, &["sensor.out"]),
                (QuantityKind::ApparentTemperature, &["weather.home"]),
            ]),
            0.0,
        );
        let mut cache = SourceCache::new();
        cache.ingest(&Notification::number("sensor.out", QuantityKind::OutdoorTemperature, 3.0, Unit::Celsius, 0));
        let ctx = ResolveContext::new(&cache, 0);
        let apparent = resolver.resolve_required(QuantityKind::ApparentTemperature, &ctx);
        assert_eq!(apparent.value, 3.0);
        assert_eq!(apparent.source, Provenance::Heuristic(Heuristic::DryBulbApparent));
    }

    #[test]
    fn solar_heuristic_dark_at_night_and_sensor_warns() {
        let resolver = DataResolver::new(&bindings(&[(QuantityKind::SunElevation, &["sun"])]), 0.0);
        let mut cache = SourceCache::new();
        cache.ingest(&Notification::number("sun", QuantityKind::SunElevation, -5.0, Unit::Degrees, 0));
        let ctx = ResolveContext::new(&cache, 0);
        assert_eq!(resolver.resolve_required(QuantityKind::SolarIrradiance, &ctx).value, 0.0);

        let measured = Resolved {
            value: 1400.0,
            source: Provenance::Source("pyranometer".into()),
            is_fallback: false,
        };
        assert!(matches!(
            DataResolver::irradiance_warning(&measured),
            Some(ModelWarning::IrradianceAboveLimit { .. })
        ));
        assert!(DataResolver::irradiance_warning(&Resolved::constant(1400.0)).is_none());
    }

    #[test]
    fn station_pressure_reduces_sea_level_attribute() {
        let resolver = DataResolver::new(&bindings(&[(QuantityKind::SeaLevelPressure, &["weather.home"])]), 500.0);
        let mut cache = SourceCache::new();
        cache.ingest(&Notification::number("weather.home", QuantityKind::SeaLevelPressure, 1013.25, Unit::HectoPascal, 0));
        let ctx = ResolveContext::new(&cache, 0);
        let p = resolver.resolve_required(QuantityKind::StationPressure, &ctx);
        assert!((p.value - 954.6).abs() < 0.5);
        assert!(p.is_fallback);
    }

    #[test]
    fn air_speed_takes_maximum() {
        let resolver = DataResolver::new(
            &bindings(&[
                (QuantityKind::WindowOpen, &["window"]),
                (QuantityKind::DoorOpen, &["door"]),
                (QuantityKind::HvacAction, &["climate"]),
                (QuantityKind::FanMode, &["climate"]),
                (QuantityKind::ManualAirSpeed, &["manual"]),
            ]),
            0.0,
        );
        let rule = AirSpeedRule { hvac_air_speed: 0.4, radiant: false };
        let mut cache = SourceCache::new();
        let ctx = ResolveContext::new(&cache, 0);
        let still = resolver.air_speed(&ctx, rule);
        assert_eq!(still.value, AIR_SPEED_STILL);
        assert!(still.is_fallback);

        cache.ingest(&Notification::state("climate", QuantityKind::HvacAction, "heating", 0));
        assert_eq!(resolver.air_speed(&ResolveContext::new(&cache, 0), rule).value, 0.4);
        let radiant = AirSpeedRule { radiant: true, ..rule };
        assert_eq!(resolver.air_speed(&ResolveContext::new(&cache, 0), radiant).value, AIR_SPEED_STILL);

        cache.ingest(&Notification::state("window", QuantityKind::WindowOpen, "on", 0));
        assert_eq!(resolver.air_speed(&ResolveContext::new(&cache, 0), rule).value, AIR_SPEED_WINDOW_OPEN);

        cache.ingest(&Notification::number("manual", QuantityKind::ManualAirSpeed, 0.05, Unit::MetersPerSecond, 0));
        assert_eq!(resolver.air_speed(&ResolveContext::new(&cache, 0), rule).value, AIR_SPEED_WINDOW_OPEN);

        cache.ingest(&Notification::state("door", QuantityKind::DoorOpen, "open", 0));
        assert_eq!(resolver.air_speed(&ResolveContext::new(&cache, 0), rule).value, AIR_SPEED_DOOR_OPEN);

        cache.ingest(&Notification::number("manual", QuantityKind::ManualAirSpeed, 1.2, Unit::MetersPerSecond, 1));
        assert_eq!(resolver.air_speed(&ResolveContext::new(&cache, 1), rule).value, 1.2);
    }

    #[test]
    fn auto_fan_counts_only_while_running() {
        let resolver = DataResolver::new(
            &bindings(&[(QuantityKind::HvacAction, &["climate"]), (QuantityKind::FanMode, &["climate"])]),
            0.0,
        );
        let rule = AirSpeedRule { hvac_air_speed: 0.4, radiant: true };
        let mut cache = SourceCache::new();
        cache.ingest(&Notification::state("climate", QuantityKind::HvacAction, "idle", 0));
        cache.ingest(&Notification::state("climate", QuantityKind::FanMode, "auto", 0));
        assert_eq!(resolver.air_speed(&ResolveContext::new(&cache, 0), rule).value, AIR_SPEED_STILL);

        cache.ingest(&Notification::state("climate", QuantityKind::FanMode, "high", 1));
        assert_eq!(resolver.air_speed(&ResolveContext::new(&cache, 1), rule).value, 0.8);
    }

    #[test]
    fn shading_interprets_positions_and_states() {
        let resolver = DataResolver::new(&bindings(&[(QuantityKind::Shading, &["cover"])]), 0.0);
        let mut cache = SourceCache::new();
        assert_eq!(resolver.shading(&ResolveContext::new(&cache, 0)).value, 1.0);

        cache.ingest(&Notification::number("cover", QuantityKind::Shading, 40.0, Unit::Percent, 0));
        assert!((resolver.shading(&ResolveContext::new(&cache, 0)).value - 0.4).abs() < 1e-6);

        cache.ingest(&Notification::state("cover", QuantityKind::Shading, "closed", 1));
        assert_eq!(resolver.shading(&ResolveContext::new(&cache, 1)).value, 0.0);
    }

    #[test]
    fn rain_from_condition_or_precipitation() {
        let resolver = DataResolver::new(
            &bindings(&[(QuantityKind::WeatherCondition, &["weather"]), (QuantityKind::Precipitation, &["rain_gauge"])]),
            0.0,
        );
        let mut cache = SourceCache::new();
        assert_eq!(resolver.rain_multiplier(&ResolveContext::new(&cache, 0)), 1.0);
        cache.ingest(&Notification::number("rain_gauge", QuantityKind::Precipitation, 1.5, Unit::MillimetersPerHour, 0));
        assert_eq!(resolver.rain_multiplier(&ResolveContext::new(&cache, 0)), 0.4);
    }

    #[test]
    fn watched_sources_cover_all_chains() {
        let resolver = DataResolver::new(
            &bindings(&[(QuantityKind::AirTemperature, &["t"]), (QuantityKind::HvacAction, &["climate"])]),
            0.0,
        );
        let watched = resolver.watched_sources();
        assert!(watched.contains("t"));
        assert!(watched.contains("climate"));
        assert_eq!(watched.len(), 2);
    }
}
