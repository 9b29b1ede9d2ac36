//! Referentially consistent synthetic dataset generation.
//!
//! Consumes a [`profile::Profile`] and produces the five entity CSV files
//! plus run artifacts, fully determined by the profile's seed.

pub mod engine;
pub mod errors;
pub mod model;
pub mod output;
pub mod profile;

pub use engine::{GenerationEngine, build_dataset};
pub use errors::GenerateError;
pub use model::{GenerateOptions, GenerationReport, GenerationResult, TableReport};
pub use profile::{Bounds, CountSpec, Counts, Profile, ResolvedCounts, ResolvedProfile};
