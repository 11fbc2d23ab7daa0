//! archlens-analysis - Structural source analysis
//!
//! Recovers class, relationship, endpoint, and business-logic information
//! from an extracted project tree without a compiler front end. Extraction
//! is pattern-driven, not grammar-driven; the [`StructuralExtractor`] seam
//! lets a real parser replace the pattern engine without touching the
//! downstream analyzers, which depend only on the data shapes in
//! `archlens-core`.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::use_cases::{AnalysisError, AnalysisOutcome, AnalyzeProjectUseCase};
pub use infrastructure::extractor::{PatternExtractor, StructuralExtractor};
