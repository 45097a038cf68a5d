//! Declarative, bulk string matching.
//!
//! Register heterogeneous patterns — literal needles, regular expressions,
//! or plain functions — against a single input string with [`Rebulk`], and
//! get back a reconciled [`Matches`] collection: overlapping hits resolved
//! in favor of the longer match, named/tagged/indexed for O(1) lookup, and
//! optionally reshaped by a two-phase rule engine before private
//! (internal-only) matches are stripped.
//!
//! ```
//! use rebulk::{Context, PatternOptions, Rebulk};
//!
//! let rebulk = Rebulk::builder()
//!     .regex(r"\d{4}-\d{2}-\d{2}", PatternOptions::new().name("date"))
//!     .build();
//!
//! let matches = rebulk.matches("seen on 2020-01-02 again", &Context::new());
//! assert_eq!(matches.named("date").len(), 1);
//! assert_eq!(matches.named("date")[0].raw(), "2020-01-02");
//! ```

#[macro_use]
mod macros;

pub mod container;
pub mod core;
pub mod engine;
pub mod markers;
pub mod pattern;
pub mod rebulk;

pub use container::{group_neighbors, Dict, DictValue, Matches};
pub use core::{
    ConflictSolver, ConflictVerdict, Context, ContextValue, Formatter, Match, Span, Validator,
};
pub use engine::{conflict_prefer_longer, default_conflict_solver, Consequence, Rule, RuleSet};
pub use markers::Markers;
pub use pattern::functional::{FunctionalMatch, FunctionalOutcome, FunctionalPattern};
pub use pattern::regex::RePattern;
pub use pattern::string::StringPattern;
pub use pattern::{Pattern, PatternOptions, YieldMode};
pub use rebulk::{remove_private, Rebulk, RebulkBuilder};
