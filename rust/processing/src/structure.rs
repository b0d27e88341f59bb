// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Beams and joints of one solved frame.
//!
//! Beams and joints live in flat arrays; joints refer to beams by index
//! through their parts, so there are no back references.

use joinery_core::{Beam, ConfigMap, Construction, Joint};
use joinery_geometry::{Mesh, Solid};
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::types::JointFailure;

/// A created joint and the geometry of its last construction.
#[derive(Debug)]
pub struct JointEntry {
    pub joint: Box<dyn Joint>,
    /// `None` until constructed, or when the last construction failed.
    pub construction: Option<Construction>,
    /// Index of the merged condition this joint was created from.
    pub condition: usize,
}

impl JointEntry {
    pub fn new(joint: Box<dyn Joint>, condition: usize) -> Self {
        Self {
            joint,
            construction: None,
            condition,
        }
    }

    pub fn is_constructed(&self) -> bool {
        self.construction.is_some()
    }

    /// Cutting solids this joint contributes to one beam.
    pub fn solids_for(&self, beam: usize) -> impl Iterator<Item = &Solid> + '_ {
        let construction = self.construction.as_ref();
        self.joint
            .parts()
            .iter()
            .enumerate()
            .filter(move |(_, part)| part.element == beam)
            .flat_map(move |(slot, _)| {
                construction
                    .and_then(|c| c.parts.get(slot))
                    .map(|solids| solids.iter())
                    .into_iter()
                    .flatten()
            })
    }
}

/// Construct every entry, optionally on the rayon pool; outcomes come back
/// in entry order.
pub(crate) fn construct_entries(
    beams: &[Beam],
    joints: &[JointEntry],
    parallel: bool,
) -> Vec<joinery_core::Result<Construction>> {
    if parallel {
        joints.par_iter().map(|entry| entry.joint.construct(beams)).collect()
    } else {
        joints.iter().map(|entry| entry.joint.construct(beams)).collect()
    }
}

#[derive(Debug, Default)]
pub struct Structure {
    pub beams: Vec<Beam>,
    pub joints: Vec<JointEntry>,
}

impl Structure {
    pub fn new(beams: Vec<Beam>) -> Self {
        Self {
            beams,
            joints: Vec::new(),
        }
    }

    fn check_beam(&self, index: usize) -> Result<()> {
        if index < self.beams.len() {
            Ok(())
        } else {
            Err(joinery_core::Error::BeamIndex {
                index,
                count: self.beams.len(),
            }
            .into())
        }
    }

    fn entry_mut(&mut self, index: usize) -> Result<&mut JointEntry> {
        let count = self.joints.len();
        self.joints.get_mut(index).ok_or(Error::JointIndex { index, count })
    }

    /// Indices of the joints a beam takes part in.
    pub fn joints_of(&self, beam: usize) -> Vec<usize> {
        self.joints
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.joint.parts().iter().any(|p| p.element == beam))
            .map(|(index, _)| index)
            .collect()
    }

    /// Union of the cutting solids every joint contributes to one beam.
    pub fn beam_geometry(&self, beam: usize) -> Result<Vec<&Solid>> {
        self.check_beam(beam)?;
        Ok(self.joints.iter().flat_map(|entry| entry.solids_for(beam)).collect())
    }

    /// Cutting solids per beam, indexed like `beams`.
    pub fn all_beam_geometry(&self) -> Vec<Vec<&Solid>> {
        let mut geometry: Vec<Vec<&Solid>> = vec![Vec::new(); self.beams.len()];
        for entry in &self.joints {
            let Some(construction) = &entry.construction else {
                continue;
            };
            for (part, solids) in entry.joint.parts().iter().zip(&construction.parts) {
                if let Some(slot) = geometry.get_mut(part.element) {
                    slot.extend(solids.iter());
                }
            }
        }
        geometry
    }

    /// Shared solids not owned by a single beam, such as junction plates.
    pub fn junction_geometry(&self) -> Vec<&Solid> {
        self.joints
            .iter()
            .filter_map(|entry| entry.construction.as_ref())
            .flat_map(|c| c.junction.iter())
            .collect()
    }

    /// Triangle mesh of one beam's cutting solids.
    pub fn beam_mesh(&self, beam: usize) -> Result<Mesh> {
        let meshes = self
            .beam_geometry(beam)?
            .into_iter()
            .map(Solid::to_mesh)
            .collect::<joinery_geometry::Result<Vec<Mesh>>>()
            .map_err(joinery_core::Error::from)?;
        let mut mesh = Mesh::new();
        mesh.merge_all(&meshes);
        Ok(mesh)
    }

    /// Apply overrides to one joint and rebuild its geometry.
    pub fn configure_joint(&mut self, index: usize, values: &ConfigMap) -> Result<()> {
        let entry = self.entry_mut(index)?;
        entry.joint.configure(values);
        entry.construction = None;
        self.reconstruct_joint(index)
    }

    /// Rebuild one joint; on failure its geometry stays empty.
    pub fn reconstruct_joint(&mut self, index: usize) -> Result<()> {
        let outcome = {
            let count = self.joints.len();
            let entry = self.joints.get(index).ok_or(Error::JointIndex { index, count })?;
            entry.joint.construct(&self.beams)
        };
        let entry = self.entry_mut(index)?;
        match outcome {
            Ok(construction) => {
                entry.construction = Some(construction);
                Ok(())
            }
            Err(err) => {
                entry.construction = None;
                Err(err.into())
            }
        }
    }

    /// Rebuild every joint and report the ones that failed.
    pub fn reconstruct(&mut self, parallel: bool) -> Vec<JointFailure> {
        let outcomes = construct_entries(&self.beams, &self.joints, parallel);
        let mut failures = Vec::new();
        for (index, (entry, outcome)) in self.joints.iter_mut().zip(outcomes).enumerate() {
            match outcome {
                Ok(construction) => entry.construction = Some(construction),
                Err(err) => {
                    entry.construction = None;
                    failures.push(JointFailure::construction(index, entry, &err));
                }
            }
        }
        failures
    }
}
