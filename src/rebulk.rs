//! The `Rebulk` facade: register patterns, processors, post-processors and
//! rules, then run the whole pipeline against an input string.
//!
//! Grounded on `original_source/rebulk/rebulk.py::rebulk` for the pipeline
//! order (patterns → processors → rules → post-processors) and on
//! `astorion::api::{parse, parse_with}` for the builder-then-run split and
//! doc-comment density.

use std::rc::Rc;

use regex::Regex;

use crate::container::Matches;
use crate::core::{Context, Match};
use crate::core::rebulk_trace;
use crate::engine::{conflict_prefer_longer, RuleSet};
use crate::markers::Markers;
use crate::pattern::functional::FunctionalOutcome;
use crate::pattern::regex::RePattern;
use crate::pattern::string::StringPattern;
use crate::pattern::{Pattern, PatternOptions};

type Processor = Box<dyn Fn(&mut Matches)>;

/// Drop every match marked private.
///
/// Grounded directly on `original_source/rebulk/processors.py::remove_private`,
/// which checks `match.private` on the match itself with no walk up to its
/// initiator — a private child is removed because it is private, not because
/// its parent is. Rule up: a private parent with non-private children only
/// hides itself, not its subtree.
pub fn remove_private(matches: &mut Matches) {
    let to_remove: Vec<Match> = matches.iter().filter(|m| m.private()).cloned().collect();
    matches.remove_all(&to_remove);
}

/// Registers patterns/processors/rules; `.build()` freezes them into a
/// runnable [`Rebulk`].
pub struct RebulkBuilder {
    patterns: Vec<Box<dyn Pattern>>,
    processors: Vec<Processor>,
    post_processors: Vec<Processor>,
    rules: RuleSet,
    default_processors: bool,
    default_post_processors: bool,
}

impl Default for RebulkBuilder {
    fn default() -> Self {
        RebulkBuilder {
            patterns: Vec::new(),
            processors: Vec::new(),
            post_processors: Vec::new(),
            rules: RuleSet::new(),
            default_processors: true,
            default_post_processors: true,
        }
    }
}

impl RebulkBuilder {
    pub fn new() -> Self {
        RebulkBuilder::default()
    }

    pub fn string(mut self, needles: impl IntoIterator<Item = impl Into<String>>, options: PatternOptions) -> Self {
        self.patterns.push(Box::new(StringPattern::new(needles, options)));
        self
    }

    pub fn regex(mut self, pattern: &str, options: PatternOptions) -> Self {
        self.patterns.push(Box::new(RePattern::compile(pattern, options)));
        self
    }

    pub fn compiled_regex(mut self, regex: Regex, options: PatternOptions) -> Self {
        self.patterns.push(Box::new(RePattern::new(regex, options)));
        self
    }

    pub fn functional(
        mut self,
        f: impl Fn(&str, &Context) -> FunctionalOutcome + 'static,
        options: PatternOptions,
    ) -> Self {
        self.patterns.push(Box::new(crate::pattern::functional::FunctionalPattern::new(f, options)));
        self
    }

    pub fn processor(mut self, f: impl Fn(&mut Matches) + 'static) -> Self {
        self.processors.push(Box::new(f));
        self
    }

    pub fn post_processor(mut self, f: impl Fn(&mut Matches) + 'static) -> Self {
        self.post_processors.push(Box::new(f));
        self
    }

    pub fn rule(mut self, rule: Box<dyn crate::engine::Rule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Opt out of the default `conflict_prefer_longer` processor.
    pub fn no_default_processors(mut self) -> Self {
        self.default_processors = false;
        self
    }

    /// Opt out of the default `remove_private` post-processor.
    pub fn no_default_post_processors(mut self) -> Self {
        self.default_post_processors = false;
        self
    }

    /// Merge another builder's patterns, processors, and rules into this
    /// one — the Rust equivalent of chaining `rebulk.rebulk(other)`.
    pub fn rebulk(mut self, other: RebulkBuilder) -> Self {
        self.patterns.extend(other.patterns);
        self.processors.extend(other.processors);
        self.post_processors.extend(other.post_processors);
        for rule in other.rules.into_vec() {
            self.rules.push(rule);
        }
        self
    }

    pub fn build(self) -> Rebulk {
        let mut processors = self.processors;
        if self.default_processors {
            processors.insert(0, Box::new(conflict_prefer_longer));
        }
        let mut post_processors = self.post_processors;
        if self.default_post_processors {
            post_processors.push(Box::new(remove_private));
        }
        Rebulk {
            patterns: self.patterns,
            processors,
            post_processors,
            rules: self.rules,
        }
    }
}

/// A frozen, runnable pattern/processor/rule pipeline.
pub struct Rebulk {
    patterns: Vec<Box<dyn Pattern>>,
    processors: Vec<Processor>,
    post_processors: Vec<Processor>,
    rules: RuleSet,
}

impl Rebulk {
    pub fn builder() -> RebulkBuilder {
        RebulkBuilder::new()
    }

    /// Run every pattern against `input`, resolve conflicts, apply rules,
    /// then post-process — returning the final match set. Patterns flagged
    /// as markers (spec §4.2) are routed into a side `Markers` container:
    /// they qualify other matches by spatial coverage but are never part of
    /// the returned result themselves.
    pub fn matches(&self, input: &str, context: &Context) -> Matches {
        let shared_input: Rc<str> = Rc::from(input);
        let mut matches = Matches::with_input(shared_input.clone());
        let mut markers = Markers::new();

        for pattern in &self.patterns {
            let found = pattern.matches(shared_input.clone(), context);
            rebulk_trace!("pattern '{}': {} match(es)", pattern.pattern_name(), found.len());
            if pattern.options().marker {
                for m in found {
                    markers.push(m);
                }
            } else {
                matches.extend(found);
            }
        }

        for processor in &self.processors {
            processor(&mut matches);
        }
        rebulk_trace!("after processors: {} match(es)", matches.len());

        self.rules.execute_all(&mut matches, &markers, context);
        rebulk_trace!("after rules: {} match(es)", matches.len());

        for post_processor in &self.post_processors {
            post_processor(&mut matches);
        }
        rebulk_trace!("after post-processors: {} match(es)", matches.len());

        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_matches_are_dropped() {
        let rebulk = RebulkBuilder::new()
            .string(["hello"], PatternOptions::new().private(true))
            .build();
        let matches = rebulk.matches("hello world", &Context::new());
        assert!(matches.is_empty());
    }

    #[test]
    fn a_private_parent_does_not_take_its_non_private_children_with_it() {
        let rebulk = RebulkBuilder::new()
            .regex(
                r"(?P<year>\d{4})-(?P<month>\d{2})",
                PatternOptions::new().every().private_parent(true),
            )
            .no_default_processors()
            .build();
        let matches = rebulk.matches("2020-01", &Context::new());
        assert_eq!(matches.len(), 2);
        assert!(matches.as_slice().iter().all(|m| !m.private()));
    }

    #[test]
    fn default_conflict_resolution_prefers_longer_match() {
        let rebulk = RebulkBuilder::new()
            .string(["2020"], PatternOptions::new().name("year"))
            .regex(r"2020-01", PatternOptions::new().name("date"))
            .build();
        let matches = rebulk.matches("2020-01-02", &Context::new());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches.as_slice()[0].name().as_deref(), Some("date"));
    }

    #[test]
    fn merging_two_builders_combines_patterns() {
        let a = RebulkBuilder::new().string(["foo"], PatternOptions::new().name("a"));
        let b = RebulkBuilder::new().string(["bar"], PatternOptions::new().name("b"));
        let rebulk = a.rebulk(b).build();
        let matches = rebulk.matches("foo bar", &Context::new());
        assert_eq!(matches.len(), 2);
    }
}
