//! Post-pattern processing: conflict resolution and the rule engine.
//!
//! A thin facade module re-exporting the two concerns, mirroring
//! `astorion::engine`'s own "doc module + re-exports" shape.

pub mod conflict;
pub mod rules;

pub use conflict::{conflict_prefer_longer, default_conflict_solver};
pub use rules::{Consequence, Rule, RuleSet};
