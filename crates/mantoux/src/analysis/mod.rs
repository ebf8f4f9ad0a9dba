//! Analysis orchestration: kinds, results, the engine.

mod engine;
mod kind;
mod result;

pub use engine::Engine;
pub use kind::{AnalysisKind, KIND_TABLE};
pub use result::AnalysisResult;
