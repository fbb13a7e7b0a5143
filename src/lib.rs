//! Copy DRACOON branding between instances, or save it to and load it from a zip archive.

pub mod app;
pub mod common;
pub mod config;
pub mod domain;
pub mod infra;
pub mod metrics;
pub mod observability;
pub mod pipeline;

#[cfg(test)]
mod test_support;

pub use common::error::{BrandingError, Result};
pub use config::Config;
pub use pipeline::{BrandingScope, TransferOrchestrator};
