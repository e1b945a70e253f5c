//! Translation lookup engine.

/// Miss reporting
pub mod report;
/// Translator façade
mod translator;

pub use report::{
    Miss,
    MissCollector,
    MissKind,
    MissReporter,
    RecordedMiss,
    SilentReporter,
    TracingReporter,
};
pub use translator::Translator;
