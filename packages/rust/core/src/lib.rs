//! Run orchestration: the end-to-end sync pass and the scheduled loop.

pub mod pipeline;
pub mod schedule;

pub use pipeline::{SyncContext, build_units, run_once};
pub use schedule::run_forever;
