//! Room Profiles and the Profile State Machine
//!
//! ## Overview
//!
//! Four structural factors describe how a room couples to outdoors:
//!
//! | Factor    | Meaning                                          | Range     |
//! |-----------|--------------------------------------------------|-----------|
//! | `f_out`   | share of the envelope that is exterior wall      | 0–1       |
//! | `f_win`   | share of the exterior wall that is glazing       | 0–1       |
//! | `k_loss`  | insulation loss factor (nominal 0.05–0.3)        | (0, 1]    |
//! | `k_solar` | solar gain factor                                | 0–2       |
//!
//! Each room selects one source for these factors:
//!
//! ```text
//!                    edit                      save(name)
//! DefaultSelected ─────────┐            ┌───────────────► CustomSelected
//!                          ▼            │                       │
//!                    UnsavedScratch ────┘                       │ edit
//!                          ▲                                    │
//!                          └────────────────────────────────────┘
//! ```
//!
//! Editing any factor while a default or custom profile is selected copies
//! that profile into the scratch slot, applies the edit there and selects
//! the scratch slot. The original profile is never modified. Selecting the
//! scratch slot again restores whatever it last held.
//!
//! ## Limits
//!
//! A room holds at most [`MAX_CUSTOM_PROFILES`] custom profiles. Saving under
//! an existing custom name overwrites that profile and does not count toward
//! the limit.

pub mod presets;

use alloc::string::String;

use heapless::Vec as BoundedVec;
use serde::{Deserialize, Serialize};

use crate::constants::buffers::{MAX_CUSTOM_PROFILES, MAX_PROFILE_NAME_LEN};
use crate::constants::comfort::{DEFAULT_ALPHA, K_LOSS_MAX, K_LOSS_NOMINAL, K_SOLAR_RANGE};
use crate::constants::resolver::{DEFAULT_ORIENTATION_DEG, DEFAULT_ROOM_AREA_M2};
use crate::errors::{ComfortError, ComfortResult, ModelWarning};
use crate::thermal::RadiantSystem;

pub use presets::Preset;

/// Name of the scratch slot as shown to users
pub const SCRATCH_NAME: &str = "custom";

/// The four structural inputs of the thermal model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreFactors {
    /// Exterior envelope ratio
    pub f_out: f32,
    /// Window share of the exterior wall
    pub f_win: f32,
    /// Insulation loss factor
    pub k_loss: f32,
    /// Solar gain factor
    pub k_solar: f32,
}

impl Default for CoreFactors {
    fn default() -> Self {
        Preset::default().factors()
    }
}

/// Selects one of the four core factors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoreField {
    /// `f_out`
    FOut,
    /// `f_win`
    FWin,
    /// `k_loss`
    KLoss,
    /// `k_solar`
    KSolar,
}

impl CoreFactors {
    /// Value of one field
    pub fn get(&self, field: CoreField) -> f32 {
        match field {
            CoreField::FOut => self.f_out,
            CoreField::FWin => self.f_win,
            CoreField::KLoss => self.k_loss,
            CoreField::KSolar => self.k_solar,
        }
    }

    /// Copy with one field replaced
    pub fn with(mut self, field: CoreField, value: f32) -> Self {
        match field {
            CoreField::FOut => self.f_out = value,
            CoreField::FWin => self.f_win = value,
            CoreField::KLoss => self.k_loss = value,
            CoreField::KSolar => self.k_solar = value,
        }
        self
    }

    /// Check hard ranges
    pub fn validate(&self) -> ComfortResult<()> {
        check_range("f_out", self.f_out, 0.0, 1.0)?;
        check_range("f_win", self.f_win, 0.0, 1.0)?;
        check_range("k_solar", self.k_solar, K_SOLAR_RANGE.0, K_SOLAR_RANGE.1)?;
        if !(self.k_loss > 0.0 && self.k_loss <= K_LOSS_MAX) {
            return Err(ComfortError::OutOfRange {
                name: "k_loss",
                value: self.k_loss,
                min: 0.0,
                max: K_LOSS_MAX,
            });
        }
        Ok(())
    }

    /// Warning if `k_loss` is valid but outside its nominal band
    pub fn nominal_warning(&self) -> Option<ModelWarning> {
        let (lo, hi) = K_LOSS_NOMINAL;
        (self.k_loss < lo || self.k_loss > hi).then_some(ModelWarning::KLossOutsideNominal { value: self.k_loss })
    }
}

pub(crate) fn check_range(name: &'static str, value: f32, min: f32, max: f32) -> ComfortResult<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ComfortError::OutOfRange { name, value, min, max })
    }
}

/// Exterior wall geometry for heat flux
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Gross exterior wall area including windows (m²)
    pub gross_wall_area: f32,
    /// Window area (m²)
    pub window_area: f32,
    /// Window U-value (W/(m²·K))
    pub window_u_value: f32,
}

impl Geometry {
    /// Check areas and U-value
    pub fn validate(&self) -> ComfortResult<()> {
        if self.gross_wall_area.is_nan() || self.gross_wall_area <= 0.0 {
            return Err(ComfortError::InvalidConfiguration {
                field: "gross_wall_area",
                reason: "must be positive",
            });
        }
        check_range("window_area", self.window_area, 0.0, self.gross_wall_area)?;
        check_range("window_u_value", self.window_u_value, 0.0, 10.0)
    }
}

/// Which kind of profile is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    /// Built-in preset
    #[default]
    Default,
    /// Saved by the user
    Custom,
    /// Unsaved edits
    Scratch,
}

/// Everything the thermal model needs to know about a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomProfile {
    /// Name of the active profile
    pub name: String,
    /// Kind of the active profile
    pub kind: ProfileKind,
    /// Structural factors
    #[serde(flatten)]
    pub factors: CoreFactors,
    /// Smoothing factor in (0, 1]
    pub alpha: f32,
    /// Optional exterior wall geometry
    pub geometry: Option<Geometry>,
    /// Room is heated by a radiant surface
    pub is_radiant_heating: bool,
    /// Radiant surface target, overriding the thermostat setpoint (°C)
    pub radiant_target_temp: Option<f32>,
    /// Radiant construction
    pub radiant_system_type: RadiantSystem,
    /// Storey, 0 = ground floor
    pub floor_level: i32,
    /// Compass direction the windows face (degrees)
    pub orientation_deg: f32,
    /// Floor area (m²)
    pub area_m2: f32,
}

impl Default for RoomProfile {
    fn default() -> Self {
        let preset = Preset::default();
        Self {
            name: String::from(preset.key()),
            kind: ProfileKind::Default,
            factors: preset.factors(),
            alpha: DEFAULT_ALPHA,
            geometry: None,
            is_radiant_heating: false,
            radiant_target_temp: None,
            radiant_system_type: RadiantSystem::default(),
            floor_level: 0,
            orientation_deg: DEFAULT_ORIENTATION_DEG,
            area_m2: DEFAULT_ROOM_AREA_M2,
        }
    }
}

impl RoomProfile {
    /// Validate all fields
    pub fn validate(&self) -> ComfortResult<()> {
        self.factors.validate()?;
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(ComfortError::InvalidConfiguration {
                field: "alpha",
                reason: "must be in (0, 1]",
            });
        }
        if let Some(g) = &self.geometry {
            g.validate()?;
        }
        if !(self.area_m2 > 0.0 && self.area_m2.is_finite()) {
            return Err(ComfortError::InvalidConfiguration {
                field: "area_m2",
                reason: "must be positive",
            });
        }
        if let Some(t) = self.radiant_target_temp {
            check_range("radiant_target_temp", t, 5.0, 60.0)?;
        }
        check_range("orientation_deg", self.orientation_deg, 0.0, 360.0)
    }
}

/// A saved custom profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedProfile {
    /// Stable id within the room
    pub id: u32,
    /// User-chosen name
    pub name: String,
    /// Saved factors
    pub factors: CoreFactors,
}

/// Which profile supplies the factors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "profile", rename_all = "snake_case")]
pub enum ProfileState {
    /// A built-in preset
    DefaultSelected(Preset),
    /// A saved custom profile by id
    CustomSelected(u32),
    /// The scratch slot
    UnsavedScratch,
}

impl Default for ProfileState {
    fn default() -> Self {
        Self::DefaultSelected(Preset::default())
    }
}

/// Per-room profile library and selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileManager {
    state: ProfileState,
    scratch: CoreFactors,
    custom: BoundedVec<SavedProfile, MAX_CUSTOM_PROFILES>,
    next_id: u32,
}

impl Default for ProfileManager {
    fn default() -> Self {
        Self::new(Preset::default())
    }
}

impl ProfileManager {
    /// Library with no custom profiles and `preset` selected
    pub fn new(preset: Preset) -> Self {
        Self {
            state: ProfileState::DefaultSelected(preset),
            scratch: preset.factors(),
            custom: BoundedVec::new(),
            next_id: 1,
        }
    }

    /// Current selection
    pub fn state(&self) -> ProfileState {
        self.state
    }

    /// Values held in the scratch slot
    pub fn scratch(&self) -> CoreFactors {
        self.scratch
    }

    /// Saved custom profiles in save order
    pub fn custom_profiles(&self) -> &[SavedProfile] {
        &self.custom
    }

    /// Custom profile by id
    pub fn custom(&self, id: u32) -> Option<&SavedProfile> {
        self.custom.iter().find(|p| p.id == id)
    }

    /// Factors of the active selection
    pub fn active_factors(&self) -> CoreFactors {
        match self.state {
            ProfileState::DefaultSelected(preset) => preset.factors(),
            ProfileState::CustomSelected(id) => self.custom(id).map(|p| p.factors).unwrap_or(self.scratch),
            ProfileState::UnsavedScratch => self.scratch,
        }
    }

    /// Name of the active selection
    pub fn active_name(&self) -> &str {
        match self.state {
            ProfileState::DefaultSelected(preset) => preset.key(),
            ProfileState::CustomSelected(id) => self.custom(id).map(|p| p.name.as_str()).unwrap_or(SCRATCH_NAME),
            ProfileState::UnsavedScratch => SCRATCH_NAME,
        }
    }

    /// Kind of the active selection
    pub fn active_kind(&self) -> ProfileKind {
        match self.state {
            ProfileState::DefaultSelected(_) => ProfileKind::Default,
            ProfileState::CustomSelected(_) => ProfileKind::Custom,
            ProfileState::UnsavedScratch => ProfileKind::Scratch,
        }
    }

    /// Edit one factor.
    ///
    /// Out-of-range values are rejected without any state change. An edit
    /// that changes nothing keeps the current selection. Otherwise the active
    /// factors are copied into scratch, edited there, and scratch becomes the
    /// selection.
    pub fn edit(&mut self, field: CoreField, value: f32) -> ComfortResult<Option<ModelWarning>> {
        let current = self.active_factors();
        self.set_factors(current.with(field, value))
    }

    /// Replace all four factors at once, with the same rules as [`edit`](Self::edit)
    pub fn set_factors(&mut self, factors: CoreFactors) -> ComfortResult<Option<ModelWarning>> {
        factors.validate()?;
        let warning = factors.nominal_warning();
        if let Some(w) = &warning {
            log_warn!("profile edit: {}", w);
        }
        if factors == self.active_factors() {
            return Ok(warning);
        }
        self.scratch = factors;
        self.state = ProfileState::UnsavedScratch;
        Ok(warning)
    }

    /// Save the scratch slot as a custom profile.
    ///
    /// Returns the id of the new or overwritten profile.
    pub fn save(&mut self, name: &str) -> ComfortResult<u32> {
        let name = self.check_name(name)?;
        if self.state != ProfileState::UnsavedScratch {
            return Err(ComfortError::NothingToSave);
        }
        if let Some(existing) = self.custom.iter_mut().find(|p| p.name == name) {
            existing.factors = self.scratch;
            let id = existing.id;
            self.state = ProfileState::CustomSelected(id);
            log_info!("overwrote custom profile '{}' ({})", name, id);
            return Ok(id);
        }
        let id = self.next_id;
        let profile = SavedProfile {
            id,
            name: String::from(name),
            factors: self.scratch,
        };
        self.custom
            .push(profile)
            .map_err(|_| ComfortError::ProfileCapExceeded { cap: MAX_CUSTOM_PROFILES })?;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        self.state = ProfileState::CustomSelected(id);
        log_info!("saved custom profile '{}' ({})", name, id);
        Ok(id)
    }

    /// Delete a custom profile.
    ///
    /// If it was selected, its values move to the scratch slot and the
    /// scratch slot becomes the selection.
    pub fn delete(&mut self, id: u32) -> ComfortResult<()> {
        let index = self
            .custom
            .iter()
            .position(|p| p.id == id)
            .ok_or(ComfortError::UnknownProfile(id))?;
        let removed = self.custom.remove(index);
        if self.state == ProfileState::CustomSelected(id) {
            self.scratch = removed.factors;
            self.state = ProfileState::UnsavedScratch;
        }
        log_info!("deleted custom profile '{}' ({})", removed.name, id);
        Ok(())
    }

    /// Delete a custom profile by name; built-in names are rejected
    pub fn delete_named(&mut self, name: &str) -> ComfortResult<()> {
        let name = name.trim();
        if Self::is_reserved(name) {
            return Err(ComfortError::ReservedProfileName);
        }
        let id = self
            .custom
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.id)
            .ok_or(ComfortError::UnknownProfile(0))?;
        self.delete(id)
    }

    /// Select a built-in preset; scratch values are kept
    pub fn select_default(&mut self, preset: Preset) {
        self.state = ProfileState::DefaultSelected(preset);
    }

    /// Select a saved custom profile
    pub fn select_custom(&mut self, id: u32) -> ComfortResult<()> {
        if self.custom(id).is_none() {
            return Err(ComfortError::UnknownProfile(id));
        }
        self.state = ProfileState::CustomSelected(id);
        Ok(())
    }

    /// Select the scratch slot with the values it last held
    pub fn select_scratch(&mut self) {
        self.state = ProfileState::UnsavedScratch;
    }

    /// Select by display name: a preset key, the scratch name or a custom name
    pub fn select_named(&mut self, name: &str) -> ComfortResult<()> {
        let name = name.trim();
        if let Some(preset) = Preset::from_key(name) {
            self.select_default(preset);
            return Ok(());
        }
        if name.eq_ignore_ascii_case(SCRATCH_NAME) {
            self.select_scratch();
            return Ok(());
        }
        let id = self
            .custom
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.id)
            .ok_or(ComfortError::UnknownProfile(0))?;
        self.select_custom(id)
    }

    fn is_reserved(name: &str) -> bool {
        name.eq_ignore_ascii_case(SCRATCH_NAME) || Preset::from_key(name).is_some()
    }

    fn check_name<'n>(&self, name: &'n str) -> ComfortResult<&'n str> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ComfortError::EmptyProfileName);
        }
        if Self::is_reserved(name) {
            return Err(ComfortError::ReservedProfileName);
        }
        if name.len() > MAX_PROFILE_NAME_LEN {
            return Err(ComfortError::InvalidConfiguration {
                field: "profile_name",
                reason: "too long",
            });
        }
        Ok(name)
    }
}
