//! Skill tracking
//!
//! Check states, target lists, grouping of the derived skills and progress
//! towards the targets.

pub mod check;
pub mod targets;
pub mod classify;
pub mod progress;

pub use check::{CheckState, CheckStates};
pub use targets::{Target, TargetSkills};
pub use classify::{Bucket, Classification, Exclusivity, classify};
pub use progress::{TargetEntry, TargetProgress, compute_progress};
