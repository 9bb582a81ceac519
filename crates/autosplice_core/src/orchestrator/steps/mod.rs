//! Pipeline step implementations.
//!
//! Each step handles one phase of the edit-automation run.

mod append_ending;
mod import_edit;
mod prepare_project;
mod silence_cut;
mod splice;

pub use append_ending::AppendEndingStep;
pub use import_edit::ImportEditStep;
pub use prepare_project::PrepareProjectStep;
pub use silence_cut::SilenceCutStep;
pub use splice::SpliceStep;
