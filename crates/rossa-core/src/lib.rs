#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Rossa Core Library
//!
//! Turns nested parameter documents into ordered measurement sequences and
//! runs them against plugins.
//!
//! # Modules
//!
//! - [`document`]: loading YAML, JSON, and TOML parameter documents
//! - [`combination`]: product and zip expansion of parameter sets
//! - [`template`]: resolving setup and teardown action lists
//! - [`skeleton`]: validating and splitting the main loop
//! - [`sequence`]: building the flat step list
//! - [`plugin`]: the plugin trait, registry, and dry-run plugin
//! - [`runner`]: executing a sequence
//!
//! ```
//! use rossa_core::{ParameterDocument, Sequence};
//!
//! let document: ParameterDocument = r#"
//! main:
//!   thermostat:
//!     temperature: [25, 26, 27]
//!     first:
//!       vdd: [1.0, 1.2]
//! "#
//! .parse()
//! .unwrap();
//!
//! let sequence = Sequence::build(&document).unwrap();
//! assert_eq!(sequence.stats().test_points, 6);
//! ```

pub mod combination;
pub mod document;
pub mod error;
pub mod plugin;
mod proptests;
pub mod rossa;
pub mod runner;
pub mod sequence;
pub mod skeleton;
pub mod template;

// Re-exports for convenience
pub use combination::{ParameterCombination, ParameterSet};
pub use document::{Format, ParameterDocument};
pub use error::{Error, Result};
pub use plugin::{DryRunPlugin, Plugin, PluginRegistry};
pub use rossa::Rossa;
pub use runner::{MeasurementRecord, RunReport, Runner};
pub use sequence::{Sequence, SequenceStats, Step, TestPoint, build_sequence, get_combinations};
pub use skeleton::{LoopSkeleton, check_validity, extract_skeleton};
pub use template::fill_template;
