//! Application-level orchestration.
//!
//! This module owns the request lifecycle (one analysis at a time, outcome posted back to
//! the UI) and post-analysis processing such as audit export. UI/CLI layers call into it
//! to keep the workflow state machine free of I/O.

mod controller;
mod post_process;

pub(crate) use controller::{run_controller, UiCommand};
pub(crate) use post_process::process_analysis;
