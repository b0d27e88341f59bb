// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Joinery Processing
//!
//! Structure-level joint solving for timber frames.
//!
//! A solve runs condition detection over every beam pair, classifies each
//! merged condition, creates the configured joint variant and constructs it.
//! Construction runs on the rayon thread pool; failures of single joints are
//! collected and reported without aborting the rest of the frame.
//!
//! ```rust,ignore
//! use joinery_processing::{Solver, SolverConfig};
//!
//! let output = Solver::new(SolverConfig::from_env()).solve(beams)?;
//! for (index, solids) in output.structure.all_beam_geometry().iter().enumerate() {
//!     println!("beam {}: {} cutting solids", index, solids.len());
//! }
//! println!("{}", output.report.to_json()?);
//! ```
//!
//! The library emits `tracing` events and never installs a subscriber.

pub mod config;
pub mod error;
pub mod solver;
pub mod structure;
pub mod types;

pub use config::SolverConfig;
pub use error::{Error, Result};
pub use solver::{solve, SolveOutput, Solver};
pub use structure::{JointEntry, Structure};
pub use types::{DroppedCondition, JointFailure, SolveReport};
