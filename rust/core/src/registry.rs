// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Joint registry - named factories for every joint variant
//!
//! Built-in variants are registered by [`JointRegistry::with_defaults`].
//! Hosts add their own variants with [`JointRegistry::register`] at startup;
//! registering an existing name replaces it.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::beam::Beam;
use crate::classify::JointKind;
use crate::condition::JointCondition;
use crate::config::Backcut;
use crate::error::{Error, Result};
use crate::joint::{
    BirdsmouthSpliceJoint, BlindTenonSpliceJoint, BranchJoint, CornerJoint, CornerLapJoint, CrossJoint,
    FourWayJoint, Joint, SpliceJoint, SteppedSpliceJoint, TenonJoint, VBeamJoint,
};

/// Constructor for one joint variant.
pub type JointFactory = Arc<dyn Fn(&[Beam], &JointCondition) -> Result<Box<dyn Joint>> + Send + Sync>;

/// Registry - maps variant names to factories
#[derive(Clone)]
pub struct JointRegistry {
    entries: FxHashMap<String, (JointKind, JointFactory)>,
    /// Variant used for each category when the caller does not pick one
    defaults: FxHashMap<JointKind, String>,
}

/// Wrap a typed constructor as a registry factory.
pub fn factory<J, F>(make: F) -> JointFactory
where
    J: Joint + 'static,
    F: Fn(&[Beam], &JointCondition) -> Result<J> + Send + Sync + 'static,
{
    Arc::new(move |beams: &[Beam], condition: &JointCondition| -> Result<Box<dyn Joint>> {
        Ok(Box::new(make(beams, condition)?))
    })
}

impl JointRegistry {
    /// Empty registry with no variants and no defaults.
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
            defaults: FxHashMap::default(),
        }
    }

    /// Registry with every built-in variant.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(CrossJoint::NAME, JointKind::Cross, factory(CrossJoint::new));
        registry.register(
            CrossJoint::BACKCUT_NAME,
            JointKind::Cross,
            factory(|beams, condition| CrossJoint::with_backcut(beams, condition, Backcut::Single)),
        );
        registry.register(
            CrossJoint::DOUBLE_BACKCUT_NAME,
            JointKind::Cross,
            factory(|beams, condition| CrossJoint::with_backcut(beams, condition, Backcut::Double)),
        );
        registry.register(TenonJoint::NAME, JointKind::Tenon, factory(TenonJoint::new));
        registry.register(TenonJoint::DOVETAIL_NAME, JointKind::Tenon, factory(TenonJoint::dovetail));
        registry.register(CornerJoint::NAME, JointKind::Corner, factory(CornerJoint::new));
        registry.register(CornerLapJoint::NAME, JointKind::Corner, factory(CornerLapJoint::new));
        registry.register(SpliceJoint::NAME, JointKind::Splice, factory(SpliceJoint::new));
        registry.register(BirdsmouthSpliceJoint::NAME, JointKind::Splice, factory(BirdsmouthSpliceJoint::new));
        registry.register(SteppedSpliceJoint::NAME, JointKind::Splice, factory(SteppedSpliceJoint::new));
        registry.register(BlindTenonSpliceJoint::NAME, JointKind::Splice, factory(BlindTenonSpliceJoint::new));
        registry.register(BranchJoint::NAME, JointKind::Branch, factory(BranchJoint::new));
        registry.register(VBeamJoint::NAME, JointKind::VBeam, factory(VBeamJoint::new));
        registry.register(FourWayJoint::NAME, JointKind::FourWay, factory(FourWayJoint::new));

        for (kind, name) in [
            (JointKind::Cross, CrossJoint::NAME),
            (JointKind::Tenon, TenonJoint::NAME),
            (JointKind::Corner, CornerJoint::NAME),
            (JointKind::Splice, SpliceJoint::NAME),
            (JointKind::Branch, BranchJoint::NAME),
            (JointKind::VBeam, VBeamJoint::NAME),
            (JointKind::FourWay, FourWayJoint::NAME),
        ] {
            registry.defaults.insert(kind, name.to_string());
        }

        registry
    }

    /// Add or replace a variant.
    pub fn register(&mut self, name: impl Into<String>, kind: JointKind, factory: JointFactory) {
        let name = name.into();
        tracing::trace!(name = name.as_str(), kind = %kind, "Registered joint variant");
        self.entries.insert(name, (kind, factory));
    }

    /// Instantiate a variant by name.
    pub fn create(&self, name: &str, beams: &[Beam], condition: &JointCondition) -> Result<Box<dyn Joint>> {
        let (_, factory) = self
            .entries
            .get(name)
            .ok_or_else(|| Error::UnknownJointType(name.to_string()))?;
        factory(beams, condition)
    }

    /// Category a registered variant belongs to.
    pub fn kind_of(&self, name: &str) -> Option<JointKind> {
        self.entries.get(name).map(|(kind, _)| *kind)
    }

    /// Whether a variant is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Variant used for `kind` when the caller names none.
    pub fn default_for(&self, kind: JointKind) -> Option<&str> {
        self.defaults.get(&kind).map(String::as_str)
    }

    /// Choose the variant used for a category; the name must be registered
    /// under that category.
    pub fn set_default(&mut self, kind: JointKind, name: &str) -> Result<()> {
        match self.kind_of(name) {
            Some(registered) if registered == kind => {
                self.defaults.insert(kind, name.to_string());
                Ok(())
            }
            Some(registered) => Err(Error::topology(
                name,
                format!("registered as {}, not {}", registered, kind),
            )),
            None => Err(Error::UnknownJointType(name.to_string())),
        }
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered variants.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no variant is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for JointRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for JointRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JointRegistry")
            .field("names", &self.names())
            .field("defaults", &self.defaults)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{detect_conditions, DetectionSettings};
    use joinery_geometry::{Point3, Vector3};

    fn crossing() -> (Vec<Beam>, JointCondition) {
        let beams = vec![
            Beam::straight(Point3::new(-500.0, 0.0, 0.0), Point3::new(500.0, 0.0, 0.0), Vector3::z(), 100.0, 200.0)
                .unwrap(),
            Beam::straight(Point3::new(0.0, -500.0, 0.0), Point3::new(0.0, 500.0, 0.0), Vector3::z(), 100.0, 200.0)
                .unwrap(),
        ];
        let condition = detect_conditions(&beams, &DetectionSettings::default()).remove(0);
        (beams, condition)
    }

    #[test]
    fn every_kind_has_a_default() {
        let registry = JointRegistry::with_defaults();
        for kind in JointKind::ALL {
            let name = registry.default_for(kind).unwrap();
            assert_eq!(registry.kind_of(name), Some(kind));
        }
        assert_eq!(registry.len(), 14);
        assert!(registry.contains("SteppedSpliceJoint"));
        assert!(!registry.contains("ScarfJoint"));
        assert!(!registry.is_empty());
        assert!(JointRegistry::new().is_empty());
    }

    #[test]
    fn create_by_name() {
        let (beams, condition) = crossing();
        let registry = JointRegistry::with_defaults();

        let joint = registry.create("CrossDoubleBackcutJoint", &beams, &condition).unwrap();
        assert_eq!(joint.type_name(), "CrossDoubleBackcutJoint");
        assert_eq!(joint.kind(), JointKind::Cross);
    }

    #[test]
    fn unknown_names_fail() {
        let (beams, condition) = crossing();
        let registry = JointRegistry::with_defaults();

        let err = registry.create("ScarfJoint", &beams, &condition).unwrap_err();
        assert_eq!(err, Error::UnknownJointType("ScarfJoint".into()));
        assert_eq!(err.status_code(), 11);
    }

    #[test]
    fn hosts_can_register_and_select_variants() {
        let mut registry = JointRegistry::with_defaults();
        registry.register(
            "LappedCross",
            JointKind::Cross,
            factory(|beams, condition| {
                let mut joint = CrossJoint::new(beams, condition)?;
                joint.config.dowel_diameter = 20.0;
                Ok(joint)
            }),
        );
        registry.set_default(JointKind::Cross, "LappedCross").unwrap();
        assert_eq!(registry.default_for(JointKind::Cross), Some("LappedCross"));

        assert!(registry.set_default(JointKind::Corner, "LappedCross").is_err());
        assert!(registry.set_default(JointKind::Corner, "Missing").is_err());

        let names = registry.names();
        assert!(names.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn factories_validate_topology() {
        let (beams, condition) = crossing();
        let registry = JointRegistry::with_defaults();
        assert!(matches!(
            registry.create("CornerJoint", &beams, &condition),
            Err(Error::InvalidTopology { .. })
        ));
    }
}
