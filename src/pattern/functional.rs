//! User-supplied matching functions.
//!
//! Grounded on `original_source/rebulk/pattern.py::FunctionalPattern._match`,
//! which accepted `None`, a `(start, end)` tuple, a dict with extra keys, or
//! an iterable of any of those. Per spec §9's "runtime duck-typing → sum
//! type" redesign note, [`FunctionalOutcome`] closes that over a fixed set
//! of shapes instead.

use std::rc::Rc;

use crate::core::{Context, Match};
use crate::pattern::{Pattern, PatternOptions};

/// One located hit as returned by a functional matcher, with an optional
/// explicit value overriding the raw slice.
#[derive(Debug, Clone)]
pub struct FunctionalMatch {
    pub start: usize,
    pub end: usize,
    pub value: Option<String>,
}

impl FunctionalMatch {
    pub fn span(start: usize, end: usize) -> Self {
        FunctionalMatch { start, end, value: None }
    }

    pub fn with_value(start: usize, end: usize, value: impl Into<String>) -> Self {
        FunctionalMatch { start, end, value: Some(value.into()) }
    }
}

/// The closed set of shapes a functional matcher may return, replacing the
/// upstream's dynamic `None | tuple | dict | iterable` return contract.
#[derive(Debug, Clone)]
pub enum FunctionalOutcome {
    /// No match found in this input.
    None,
    /// Exactly one match.
    One(FunctionalMatch),
    /// Zero or more matches, found in a single pass over the input.
    Many(Vec<FunctionalMatch>),
}

pub type MatchFn = dyn Fn(&str, &Context) -> FunctionalOutcome;

pub struct FunctionalPattern {
    func: Rc<MatchFn>,
    options: PatternOptions,
}

impl FunctionalPattern {
    pub fn new(func: impl Fn(&str, &Context) -> FunctionalOutcome + 'static, options: PatternOptions) -> Self {
        FunctionalPattern { func: Rc::new(func), options }
    }
}

impl Pattern for FunctionalPattern {
    fn raw_matches(&self, input: Rc<str>, context: &Context) -> Vec<Match> {
        let outcome = (self.func)(&input, context);
        let hits = match outcome {
            FunctionalOutcome::None => Vec::new(),
            FunctionalOutcome::One(m) => vec![m],
            FunctionalOutcome::Many(ms) => ms,
        };
        hits.into_iter()
            .map(|hit| {
                let m = Match::new(input.clone(), hit.start, hit.end);
                if let Some(value) = hit.value {
                    m.set_value(value);
                }
                m
            })
            .collect()
    }

    fn options(&self) -> &PatternOptions {
        &self.options
    }

    fn pattern_name(&self) -> &'static str {
        "functional"
    }
}
