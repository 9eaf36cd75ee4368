//! Line filtering: the compiled matcher and the pattern language on top.

pub mod engine;
pub mod pattern;

pub use engine::{FilterEngine, FilterError};
pub use pattern::compile;
