//! Generation orchestrator

mod builder;
mod orchestrator;

pub use builder::CasebookBuilder;
pub use orchestrator::Casebook;
