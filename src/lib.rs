#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

//! # af3score Library
//!
//! This library aggregates the outputs of batched AlphaFold 3 predictions,
//! one run directory per candidate pair, into a single score table. Global
//! confidence metrics are read from each run's summary file, and local
//! interaction scores are computed from the pairwise error matrix and the
//! predicted structure.
//!
//! The central entry points are [`af3_score`] for whole-directory
//! aggregation and [`local_interaction_score`] for scoring a single
//! structure.

mod confidences;
mod error;
mod lis;
mod mapping;
mod metrics;
mod score;
mod sequences;
mod structure;
mod utils;

// Re-export key public types
pub use confidences::{
    chain_order, chain_partition, Confidences, JobData, SummaryConfidences, TokenChains,
};
pub use error::{Error, Result};
pub use lis::{
    block_means, contact_map, local_interaction_score, transform_pae, InteractionScorer,
    LisEngine, LisScore, DEFAULT_DISTANCE_CUTOFF, DEFAULT_PAE_CUTOFF,
};
pub use mapping::{display_name, parse_mapping, Mapping};
pub use metrics::{Extractor, Metric};
pub use score::{af3_score, af3_score_with, Af3Source, MappingOptions, MetricSource, ScoreOptions};
pub use sequences::sequence_index;
pub use structure::{load_structure, representative_points, ResiduePoint};
pub use utils::{run_with_threads, write_table};
