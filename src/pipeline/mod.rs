//! Pipeline entry points.
//!
//! - `run_check`: one poll cycle, dispatching new notices to the sinks
//! - `run_rss`: render the latest notices as an RSS feed

pub mod diff;
pub mod poll;
pub mod rss;
#[cfg(test)]
pub(crate) mod testing;

pub use diff::{DiffOutcome, compute_new};
pub use poll::{PollReport, build_sinks, run_check, run_poll};
pub use rss::{run_rss, run_rss_with_feed};
