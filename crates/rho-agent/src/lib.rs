//! Edit worker: drains the dispatch queue and runs the pack → complete →
//! unpack pipeline against a working copy.

mod check;
mod edit_job;
mod extract;
mod worker;

pub use check::{AlwaysPassCheck, CheckReport, WorkspaceCheck};
pub use edit_job::{edit_branch_name, run_edit_job, EditJob, EditJobContext, EditOutcome};
pub use extract::{extract_edit_targets, parse_edit_targets, EditTargets};
pub use worker::{edit_job_for_event, run_worker, WorkerContext};
