//! Tagviz CLI - configuration, logging and the build pipeline
//!
//! The `tagviz` binary is a thin shell over this library:
//! - [`Loader`] layers user configuration over the embedded defaults
//! - [`logging::init`] installs the `tracing` subscriber
//! - [`Pipeline`] reads the outline and corpus, builds every artifact in
//!   memory, then writes them atomically

pub mod config;
pub mod logging;
pub mod pipeline;

pub use config::{
    AggregationConfig, ConfigError, ConfigResult, Loader, OutlineConfig, OutputConfig,
    OutputFiles, StrengthConfig, TagvizConfig,
};
pub use logging::LogOptions;
pub use pipeline::{Build, Pipeline, PipelineInputs, RenderedArtifact, RunReport, StrengthCounts};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
