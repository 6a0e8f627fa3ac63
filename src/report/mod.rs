//! Output sinks for a scan run.
//!
//! - [`terminal`] — colored banner, manifest table and result summary box.
//! - [`pipeline`] — pipeline logging commands that set the task result.

pub mod pipeline;
pub mod terminal;
