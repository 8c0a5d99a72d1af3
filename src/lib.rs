//! Git activity analytics: commit retrieval, diff statistics, component and
//! ticket grouping, multi-repository roll-ups and report exports.

pub mod config;
pub mod error;
pub mod git;
pub mod output;
pub mod patterns;
pub mod window;

pub use error::{ReportError, Result};
pub use git::{Commit, GitRepo};
pub use window::TimeWindow;
