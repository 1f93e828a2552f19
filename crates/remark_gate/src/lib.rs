// Public exports
pub use crate::analysis::{create_classifier, ClassifierGateway, CommentClassifier};
pub use crate::comment_detection::detect_comments;
pub use crate::config::GateConfig;
pub use crate::envelope::{EditOperation, HookInput, ToolInput};
pub use crate::gate::Gate;
pub use crate::report::Verdict;
pub use crate::services::analyzer::AnalyzerCommand;
pub use crate::services::heuristic::HeuristicClassifier;
pub use crate::types::{
    Category,
    Classification,
    ClassifierError,
    CommentKind,
    CommentOccurrence,
    ConfigError,
    EnvelopeError,
};

pub mod constants;
pub mod patterns;

// Internal modules
mod analysis;
mod comment_detection;
mod config;
mod envelope;
mod gate;
mod prompt;
mod report;
mod response;
mod services;
mod types;
