//! Stats and modifier pipelines
//!
//! A `Stat` is a base value folded through an ordered list of `Modifier`s.
//! Entities keep their stats in a `StatTable` keyed by compile-time tags.

mod error;
mod modifier;
mod stat;
mod table;

#[cfg(test)]
mod table_tests;

pub use error::StatError;
pub use modifier::{Modifier, ModifierId, ModifierPipeline};
pub use stat::{SharedStat, Stat};
pub use table::{HasStats, StatTable, StatTag};
