pub mod analyzer;
pub mod heuristic;
