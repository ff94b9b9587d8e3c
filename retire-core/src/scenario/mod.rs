//! What-if scenarios layered over actual period summaries.

pub mod diff;
pub mod overlay;

pub use diff::{FieldChange, ScenarioChange, ScenarioDiff, ScenarioReport};
pub use overlay::{HypotheticalEdit, HypotheticalEntry, HypotheticalField, HypotheticalOverlay};
