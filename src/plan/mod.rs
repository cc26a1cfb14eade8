mod loader;
mod locate;
mod model;

pub use loader::load_plan;
pub use locate::SourceIndex;
pub use model::{Action, ChangeRecord, Diagnostic, Plan, PlanSummary, Severity};
