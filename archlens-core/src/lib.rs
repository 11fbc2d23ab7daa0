//! archlens-core - Foundation crate for the archlens analyzer
//!
//! Shared functionality used across the analyzer crates:
//!
//! - [`config`] — Strongly-typed configuration with file and environment variable support
//! - [`domain`] — Structural model shared by the analyzers and the pipeline
//! - [`logging`] — Structured logging with tracing
//!
//! # Configuration
//!
//! ```rust,ignore
//! use archlens_core::Config;
//!
//! let config = Config::load()?;
//! ```
//!
//! Environment variables use the `ARCHLENS__` prefix with double underscore
//! separators:
//!
//! ```bash
//! ARCHLENS__WORKER__MAX_WORKERS=8
//! ARCHLENS__BROKER__HOST=rabbit.internal
//! ```

pub mod config;
pub mod domain;
pub mod logging;

pub use config::Config;
pub use logging::init_tracing;
