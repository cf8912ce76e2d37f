//! Skill Planner - deck planning and skill tracking
//!
//! Pick a scenario, two factor sets and six support cards; the planner works
//! out which skills that deck can grant and where each one comes from, and
//! tracks which of them have been acquired.

pub mod catalog;
pub mod custom;
pub mod deck;
pub mod tracking;
pub mod save;
pub mod planner;

#[cfg(test)]
mod fixtures;

// Re-export commonly used types
pub use catalog::{Catalog, Lookup};
pub use planner::Planner;
pub use save::UserData;
