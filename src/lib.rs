//! sprite-dataset - builds a canonical creature sprite dataset
//!
//! Historical sprite archives are fetched, verified and unpacked, every
//! image gets a canonical `{index}[-{form}][-{frame}]` name, duplicates
//! are dropped and the rest is normalized to one canvas size.

pub mod archive;
pub mod config;
pub mod dataset;
pub mod dedupe;
pub mod downloaders;
pub mod error;
pub mod forms;
pub mod hash;
pub mod normalize;
pub mod overrides;
pub mod paths;
pub mod pipeline;
pub mod progress;
pub mod sources;
pub mod stats;
