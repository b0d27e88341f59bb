// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Joint configuration
//!
//! Every built-in variant has a typed configuration struct with documented
//! defaults. The loosely typed [`ConfigMap`] is an override layer on top:
//! recognised keys are applied, unknown keys are ignored, and missing keys
//! keep their defaults. Angles are given in degrees.

use std::fmt::Debug;

use rustc_hash::FxHashMap;

/// Key/value overrides applied through [`crate::Joint::configure`].
pub type ConfigMap = FxHashMap<String, f64>;

pub const ADDED: &str = "Added";
pub const DOWEL_DIAMETER: &str = "DowelDiameter";
pub const DOWEL_CLEARANCE: &str = "DowelClearance";
pub const DOWEL_COUNT: &str = "DowelCount";
pub const DOWEL_SPACING: &str = "DowelSpacing";
pub const TAPER_ANGLE: &str = "TaperAngle";
pub const TENON_WIDTH: &str = "TenonWidth";
pub const BLIND_OFFSET: &str = "BlindOffset";
pub const INSET: &str = "Inset";
pub const DRAFT_ANGLE: &str = "DraftAngle";
pub const HALF_ANGLE: &str = "HalfAngle";
pub const STEP_COUNT: &str = "StepCount";
pub const STEP_LENGTH: &str = "StepLength";
pub const PIN_WIDTH: &str = "PinWidth";
pub const TENON_LENGTH: &str = "TenonLength";
pub const TAPER_OFFSET: &str = "TaperOffset";
pub const FILLET_RADIUS: &str = "FilletRadius";
pub const PLATE_THICKNESS: &str = "PlateThickness";
pub const PLATE_DIAMETER: &str = "PlateDiameter";

/// Clearance added to cutters so they overshoot the beam faces.
pub const DEFAULT_ADDED: f64 = 10.0;

/// Largest magnitude accepted for any override, in millimetres or degrees.
pub const CONFIG_VALUE_LIMIT: f64 = 1.0e6;

/// Typed configuration of one joint variant.
pub trait VariantConfig: Debug + Clone + Send + Sync {
    /// Recognised keys with their current values.
    fn entries(&self) -> Vec<(&'static str, f64)>;

    /// Set one recognised key; returns `false` for keys this variant ignores.
    fn set(&mut self, key: &str, value: f64) -> bool;

    /// Apply every recognised override within `0..=CONFIG_VALUE_LIMIT`.
    /// Every key is a length, angle or count, so negative values are ignored.
    fn apply(&mut self, values: &ConfigMap, joint: &str) {
        for (key, &value) in values {
            if !(0.0..=CONFIG_VALUE_LIMIT).contains(&value) {
                tracing::trace!(joint, key = key.as_str(), value, "Ignoring out of range configuration value");
                continue;
            }
            if !self.set(key, value) {
                tracing::trace!(joint, key = key.as_str(), "Ignoring unrecognised configuration key");
            }
        }
    }

    fn to_map(&self) -> ConfigMap {
        self.entries()
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect()
    }
}

/// Relief cut on cross-lap notch walls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backcut {
    None,
    Single,
    Double,
}

/// Cross-lap configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossConfig {
    pub added: f64,
    /// Dowel bore diameter; zero for no dowel.
    pub dowel_diameter: f64,
    /// Number of bores in the dowel row.
    pub dowel_count: f64,
    /// Centre distance between neighbouring bores along the row.
    pub dowel_spacing: f64,
    /// Backcut relief angle in degrees, used unless `backcut` is `None`.
    pub taper_angle: f64,
    pub backcut: Backcut,
}

impl CrossConfig {
    pub fn new(backcut: Backcut) -> Self {
        Self {
            added: DEFAULT_ADDED,
            dowel_diameter: 0.0,
            dowel_count: 1.0,
            dowel_spacing: 40.0,
            taper_angle: 10.0,
            backcut,
        }
    }
}

impl Default for CrossConfig {
    fn default() -> Self {
        Self::new(Backcut::None)
    }
}

impl VariantConfig for CrossConfig {
    fn entries(&self) -> Vec<(&'static str, f64)> {
        let mut entries = vec![
            (ADDED, self.added),
            (DOWEL_DIAMETER, self.dowel_diameter),
            (DOWEL_COUNT, self.dowel_count),
            (DOWEL_SPACING, self.dowel_spacing),
        ];
        if self.backcut != Backcut::None {
            entries.push((TAPER_ANGLE, self.taper_angle));
        }
        entries
    }

    fn set(&mut self, key: &str, value: f64) -> bool {
        match key {
            ADDED => self.added = value,
            DOWEL_DIAMETER => self.dowel_diameter = value,
            DOWEL_COUNT => self.dowel_count = value,
            DOWEL_SPACING => self.dowel_spacing = value,
            TAPER_ANGLE if self.backcut != Backcut::None => self.taper_angle = value,
            _ => return false,
        }
        true
    }
}

/// Tenon/mortise configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TenonConfig {
    pub added: f64,
    /// Tenon thickness; zero means a third of the tenon beam's thickness.
    pub tenon_width: f64,
    /// Distance the mortise stops short of the far face; zero cuts through.
    pub blind_offset: f64,
    /// Shoulder inset on each side along the mortise grain.
    pub inset: f64,
    /// Dovetail draft in degrees; only read when `dovetail` is set.
    pub draft_angle: f64,
    pub dovetail: bool,
}

impl TenonConfig {
    pub fn dovetail() -> Self {
        Self {
            draft_angle: 10.0,
            dovetail: true,
            ..Self::default()
        }
    }
}

impl Default for TenonConfig {
    fn default() -> Self {
        Self {
            added: DEFAULT_ADDED,
            tenon_width: 0.0,
            blind_offset: 0.0,
            inset: 0.0,
            draft_angle: 0.0,
            dovetail: false,
        }
    }
}

impl VariantConfig for TenonConfig {
    fn entries(&self) -> Vec<(&'static str, f64)> {
        let mut entries = vec![
            (ADDED, self.added),
            (TENON_WIDTH, self.tenon_width),
            (BLIND_OFFSET, self.blind_offset),
            (INSET, self.inset),
        ];
        if self.dovetail {
            entries.push((DRAFT_ANGLE, self.draft_angle));
        }
        entries
    }

    fn set(&mut self, key: &str, value: f64) -> bool {
        match key {
            ADDED => self.added = value,
            TENON_WIDTH => self.tenon_width = value,
            BLIND_OFFSET => self.blind_offset = value,
            INSET => self.inset = value,
            DRAFT_ANGLE if self.dovetail => self.draft_angle = value,
            _ => return false,
        }
        true
    }
}

/// Configuration for joints that only trim beams against planes
/// (butt corner, flat splice, branch).
#[derive(Debug, Clone, PartialEq)]
pub struct TrimConfig {
    pub added: f64,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self { added: DEFAULT_ADDED }
    }
}

impl VariantConfig for TrimConfig {
    fn entries(&self) -> Vec<(&'static str, f64)> {
        vec![(ADDED, self.added)]
    }

    fn set(&mut self, key: &str, value: f64) -> bool {
        match key {
            ADDED => self.added = value,
            _ => return false,
        }
        true
    }
}

/// Corner half-lap with a connecting dowel.
#[derive(Debug, Clone, PartialEq)]
pub struct CornerLapConfig {
    pub added: f64,
    pub dowel_diameter: f64,
    /// Extra dowel length beyond both beam depths.
    pub dowel_clearance: f64,
    /// Number of bores in the dowel row.
    pub dowel_count: f64,
    /// Centre distance between neighbouring bores along the row.
    pub dowel_spacing: f64,
}

impl Default for CornerLapConfig {
    fn default() -> Self {
        Self {
            added: DEFAULT_ADDED,
            dowel_diameter: 16.0,
            dowel_clearance: 10.0,
            dowel_count: 1.0,
            dowel_spacing: 40.0,
        }
    }
}

impl VariantConfig for CornerLapConfig {
    fn entries(&self) -> Vec<(&'static str, f64)> {
        vec![
            (ADDED, self.added),
            (DOWEL_DIAMETER, self.dowel_diameter),
            (DOWEL_CLEARANCE, self.dowel_clearance),
            (DOWEL_COUNT, self.dowel_count),
            (DOWEL_SPACING, self.dowel_spacing),
        ]
    }

    fn set(&mut self, key: &str, value: f64) -> bool {
        match key {
            ADDED => self.added = value,
            DOWEL_DIAMETER => self.dowel_diameter = value,
            DOWEL_CLEARANCE => self.dowel_clearance = value,
            DOWEL_COUNT => self.dowel_count = value,
            DOWEL_SPACING => self.dowel_spacing = value,
            _ => return false,
        }
        true
    }
}

/// Birdsmouth (V-notch) splice.
#[derive(Debug, Clone, PartialEq)]
pub struct BirdsmouthConfig {
    pub added: f64,
    /// Angle between each V arm and the beam axis, in degrees.
    pub half_angle: f64,
}

impl Default for BirdsmouthConfig {
    fn default() -> Self {
        Self {
            added: DEFAULT_ADDED,
            half_angle: 30.0,
        }
    }
}

impl VariantConfig for BirdsmouthConfig {
    fn entries(&self) -> Vec<(&'static str, f64)> {
        vec![(ADDED, self.added), (HALF_ANGLE, self.half_angle)]
    }

    fn set(&mut self, key: &str, value: f64) -> bool {
        match key {
            ADDED => self.added = value,
            HALF_ANGLE => self.half_angle = value,
            _ => return false,
        }
        true
    }
}

/// Stepped (staircase) scarf splice.
#[derive(Debug, Clone, PartialEq)]
pub struct SteppedSpliceConfig {
    pub added: f64,
    pub step_count: f64,
    /// Total scarf length along the beams; zero means the beam height.
    pub step_length: f64,
    /// Square key size at each tread; zero for no pins.
    pub pin_width: f64,
}

impl Default for SteppedSpliceConfig {
    fn default() -> Self {
        Self {
            added: DEFAULT_ADDED,
            step_count: 2.0,
            step_length: 0.0,
            pin_width: 0.0,
        }
    }
}

impl VariantConfig for SteppedSpliceConfig {
    fn entries(&self) -> Vec<(&'static str, f64)> {
        vec![
            (ADDED, self.added),
            (STEP_COUNT, self.step_count),
            (STEP_LENGTH, self.step_length),
            (PIN_WIDTH, self.pin_width),
        ]
    }

    fn set(&mut self, key: &str, value: f64) -> bool {
        match key {
            ADDED => self.added = value,
            STEP_COUNT => self.step_count = value,
            STEP_LENGTH => self.step_length = value,
            PIN_WIDTH => self.pin_width = value,
            _ => return false,
        }
        true
    }
}

/// Blind tenon splice with a tapered, filleted tenon.
#[derive(Debug, Clone, PartialEq)]
pub struct BlindTenonConfig {
    pub added: f64,
    pub tenon_length: f64,
    /// Inset of the tenon base from the beam faces.
    pub inset: f64,
    /// Further inset of the tenon tip relative to its base.
    pub taper_offset: f64,
    pub fillet_radius: f64,
}

impl Default for BlindTenonConfig {
    fn default() -> Self {
        Self {
            added: DEFAULT_ADDED,
            tenon_length: 80.0,
            inset: 20.0,
            taper_offset: 5.0,
            fillet_radius: 8.0,
        }
    }
}

impl VariantConfig for BlindTenonConfig {
    fn entries(&self) -> Vec<(&'static str, f64)> {
        vec![
            (ADDED, self.added),
            (TENON_LENGTH, self.tenon_length),
            (INSET, self.inset),
            (TAPER_OFFSET, self.taper_offset),
            (FILLET_RADIUS, self.fillet_radius),
        ]
    }

    fn set(&mut self, key: &str, value: f64) -> bool {
        match key {
            ADDED => self.added = value,
            TENON_LENGTH => self.tenon_length = value,
            INSET => self.inset = value,
            TAPER_OFFSET => self.taper_offset = value,
            FILLET_RADIUS => self.fillet_radius = value,
            _ => return false,
        }
        true
    }
}

/// Three- and four-way junctions with a central plate.
#[derive(Debug, Clone, PartialEq)]
pub struct JunctionConfig {
    pub added: f64,
    pub plate_thickness: f64,
    /// Plate diameter; zero means the largest beam dimension.
    pub plate_diameter: f64,
}

impl Default for JunctionConfig {
    fn default() -> Self {
        Self {
            added: DEFAULT_ADDED,
            plate_thickness: 20.0,
            plate_diameter: 0.0,
        }
    }
}

impl VariantConfig for JunctionConfig {
    fn entries(&self) -> Vec<(&'static str, f64)> {
        vec![
            (ADDED, self.added),
            (PLATE_THICKNESS, self.plate_thickness),
            (PLATE_DIAMETER, self.plate_diameter),
        ]
    }

    fn set(&mut self, key: &str, value: f64) -> bool {
        match key {
            ADDED => self.added = value,
            PLATE_THICKNESS => self.plate_thickness = value,
            PLATE_DIAMETER => self.plate_diameter = value,
            _ => return false,
        }
        true
    }
}
