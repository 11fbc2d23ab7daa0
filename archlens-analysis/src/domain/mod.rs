//! Output data shapes owned by the analysis crate

pub mod buckets;
pub mod documents;
pub mod features;

pub use buckets::ProjectStructure;
pub use documents::{AnalysisDocument, SummaryDocument};
pub use features::{
    ExceptionHandling, FrameworkFeatures, InjectionStyle, ProfileUsage, PropertyUsage,
};
