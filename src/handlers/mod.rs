pub mod analysis;
pub mod prompts;

pub use analysis::{Analyzer, UseCase};
