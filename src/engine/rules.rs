//! The rule engine: priority-grouped, two-phase (decide-then-apply) rule
//! execution.
//!
//! Grounded on `original_source/rebulk/rules.py::{Rule, Rules,
//! execute_all_rules}` for the priority-grouping and two-phase semantics —
//! within a priority group, every rule's `when` runs (read-only) before any
//! rule's `then` runs (mutating), so rules in the same group never observe
//! each other's side effects — and on `astorion::engine::compiled_rules`/
//! `trigger` for the Rust idiom of a precompiled rule set driven by an
//! engine loop. `Consequence` is a closed enum per spec §9's "sum type for
//! when/then return" redesign note, replacing duck-typed return values.

use std::collections::BTreeMap;

use crate::container::Matches;
use crate::core::{Context, Match};
use crate::core::rebulk_trace;
use crate::markers::Markers;

/// What a rule's `then` phase wants done to the match set. Applied after
/// every rule in the same priority group has been asked to decide.
pub enum Consequence {
    Append(Match),
    Remove(Match),
    Rename(Match, String),
}

impl Consequence {
    fn apply(self, matches: &mut Matches) {
        match self {
            Consequence::Append(m) => matches.push(m),
            Consequence::Remove(m) => matches.remove(&m),
            Consequence::Rename(m, name) => m.set_name(Some(name)),
        }
    }
}

/// A single rule: `when` inspects the current match set and decides whether
/// (and on what) it should act; `then` turns that decision into
/// consequences. Mutation only ever happens through the returned
/// `Consequence`s, never inside `when`.
pub trait Rule {
    fn name(&self) -> &str;

    /// Higher runs first; rules sharing a priority run in one decide phase
    /// together, isolated from each other's mutations for that round.
    fn priority(&self) -> i32 {
        0
    }

    fn enabled(&self, _context: &Context) -> bool {
        true
    }

    /// Inspect `matches` (and, if needed, `markers`) and return the matches
    /// this rule wants to act on, or `None` if this rule has nothing to do
    /// this round.
    fn when(&self, matches: &Matches, markers: &Markers, context: &Context) -> Option<Vec<Match>>;

    /// Turn a non-empty `when` result into consequences.
    fn then(&self, found: Vec<Match>, context: &Context) -> Vec<Consequence>;
}

/// Append every match in `found` (the common "always add what `when` found"
/// shape, mirroring `AppendMatchRule`).
pub fn append_all(found: Vec<Match>) -> Vec<Consequence> {
    found.into_iter().map(Consequence::Append).collect()
}

/// Remove every match in `found` (mirroring `RemoveMatchRule`).
pub fn remove_all(found: Vec<Match>) -> Vec<Consequence> {
    found.into_iter().map(Consequence::Remove).collect()
}

/// A precompiled, ordered collection of rules, executed priority group by
/// priority group.
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        RuleSet::default()
    }

    pub fn push(&mut self, rule: Box<dyn Rule>) -> &mut Self {
        self.rules.push(rule);
        self
    }

    pub fn with(mut self, rule: Box<dyn Rule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn into_vec(self) -> Vec<Box<dyn Rule>> {
        self.rules
    }

    /// Run every enabled rule, grouped by descending priority, each group
    /// fully decided (`when`) before any of that group's consequences
    /// (`then` + apply) land on `matches`.
    pub fn execute_all(&self, matches: &mut Matches, markers: &Markers, context: &Context) {
        let mut groups: BTreeMap<std::cmp::Reverse<i32>, Vec<&Box<dyn Rule>>> = BTreeMap::new();
        for rule in &self.rules {
            if rule.enabled(context) {
                groups.entry(std::cmp::Reverse(rule.priority())).or_default().push(rule);
            }
        }

        for (priority, group) in groups {
            rebulk_trace!("rule engine: priority {} group, {} rule(s)", priority.0, group.len());
            let decisions: Vec<(&Box<dyn Rule>, Vec<Match>)> = group
                .into_iter()
                .filter_map(|rule| rule.when(matches, markers, context).map(|found| (rule, found)))
                .collect();

            for (rule, found) in decisions {
                if found.is_empty() {
                    continue;
                }
                rebulk_trace!("rule engine: '{}' firing on {} match(es)", rule.name(), found.len());
                for consequence in rule.then(found, context) {
                    consequence.apply(matches);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    struct DropShortMatches {
        min_len: usize,
    }

    impl Rule for DropShortMatches {
        fn name(&self) -> &str {
            "drop-short"
        }

        fn when(&self, matches: &Matches, _markers: &Markers, _context: &Context) -> Option<Vec<Match>> {
            let found: Vec<Match> = matches.iter().filter(|m| m.length() < self.min_len).cloned().collect();
            if found.is_empty() {
                None
            } else {
                Some(found)
            }
        }

        fn then(&self, found: Vec<Match>, _context: &Context) -> Vec<Consequence> {
            remove_all(found)
        }
    }

    struct RenameAll {
        priority: i32,
        name: &'static str,
    }

    impl Rule for RenameAll {
        fn name(&self) -> &str {
            "rename-all"
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn when(&self, matches: &Matches, _markers: &Markers, _context: &Context) -> Option<Vec<Match>> {
            Some(matches.iter().cloned().collect())
        }

        fn then(&self, found: Vec<Match>, _context: &Context) -> Vec<Consequence> {
            found.into_iter().map(|m| Consequence::Rename(m, self.name.to_string())).collect()
        }
    }

    #[test]
    fn drops_matches_below_threshold() {
        let input: Rc<str> = Rc::from("ab cde f");
        let mut matches = Matches::with_input(input.clone());
        matches.push(Match::new(input.clone(), 0, 2));
        matches.push(Match::new(input.clone(), 3, 6));
        matches.push(Match::new(input.clone(), 7, 8));

        let mut rules = RuleSet::new();
        rules.push(Box::new(DropShortMatches { min_len: 2 }));
        rules.execute_all(&mut matches, &Markers::new(), &Context::new());

        assert_eq!(matches.len(), 1);
        assert_eq!((matches.as_slice()[0].start(), matches.as_slice()[0].end()), (3, 6));
    }

    #[test]
    fn higher_priority_group_runs_first() {
        let input: Rc<str> = Rc::from("abc");
        let mut matches = Matches::with_input(input.clone());
        matches.push(Match::new(input.clone(), 0, 3));

        let rules = RuleSet::new()
            .with(Box::new(RenameAll { priority: 0, name: "low" }))
            .with(Box::new(RenameAll { priority: 10, name: "high" }));
        rules.execute_all(&mut matches, &Markers::new(), &Context::new());

        assert_eq!(matches.as_slice()[0].name().as_deref(), Some("low"));
    }
}
