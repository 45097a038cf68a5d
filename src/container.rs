//! `Matches`: the indexed, insertion-ordered collection of [`Match`] values
//! produced and consumed by a [`crate::rebulk::Rebulk`] run.
//!
//! Every mutation keeps four indices consistent with the backing `Vec`:
//! by name, by tag, by start offset, and by end offset — so lookups used
//! heavily by rules (`named`, `tagged`, `starting`, `ending`) stay O(1)
//! amortized instead of rescanning the whole collection.

use std::collections::HashMap;
use std::rc::Rc;

use crate::core::{Match, Span};

/// The indexed container of matches produced by a pattern run and consumed
/// by processors and rules.
///
/// Grounded on `original_source/rebulk/match.py::Matches` for the index-
/// maintenance contract, and on `astorion::Stash` for the "indexed mutable
/// collection of located nodes, queried from rules" shape.
#[derive(Default)]
pub struct Matches {
    input_string: Option<Rc<str>>,
    items: Vec<Match>,
    by_name: HashMap<String, Vec<usize>>,
    by_tag: HashMap<String, Vec<usize>>,
    by_start: HashMap<usize, Vec<usize>>,
    by_end: HashMap<usize, Vec<usize>>,
    max_end: usize,
}

impl Matches {
    pub fn new() -> Self {
        Matches::default()
    }

    pub fn with_input(input_string: Rc<str>) -> Self {
        Matches {
            input_string: Some(input_string),
            ..Matches::default()
        }
    }

    pub fn input_string(&self) -> Option<Rc<str>> {
        self.input_string.clone()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Match> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Match] {
        &self.items
    }

    /// The furthest offset covered by any match so far.
    pub fn max_end(&self) -> usize {
        self.max_end
    }

    fn reindex_push(&mut self, idx: usize, m: &Match) {
        if let Some(name) = m.name() {
            self.by_name.entry(name).or_default().push(idx);
        }
        for tag in m.tags() {
            self.by_tag.entry(tag).or_default().push(idx);
        }
        self.by_start.entry(m.start()).or_default().push(idx);
        self.by_end.entry(m.end()).or_default().push(idx);
        self.max_end = self.max_end.max(m.end());
    }

    /// Append a match at the end, updating all indices (`_add_match`).
    pub fn push(&mut self, m: Match) {
        let idx = self.items.len();
        self.reindex_push(idx, &m);
        self.items.push(m);
    }

    /// Insert a match at `position`, updating all indices (`insert`).
    pub fn insert(&mut self, position: usize, m: Match) {
        self.items.insert(position, m);
        self.rebuild_indices();
    }

    pub fn extend(&mut self, matches: impl IntoIterator<Item = Match>) {
        for m in matches {
            self.push(m);
        }
    }

    /// Remove every item whose identity matches one in `to_remove`
    /// (`_remove_match`, used by conflict resolution and `RemoveMatch`).
    pub fn remove_all(&mut self, to_remove: &[Match]) {
        if to_remove.is_empty() {
            return;
        }
        self.items.retain(|m| !to_remove.iter().any(|r| r.ptr_eq(m)));
        self.rebuild_indices();
    }

    pub fn remove(&mut self, m: &Match) {
        self.remove_all(std::slice::from_ref(m));
    }

    fn rebuild_indices(&mut self) {
        self.by_name.clear();
        self.by_tag.clear();
        self.by_start.clear();
        self.by_end.clear();
        self.max_end = 0;
        for idx in 0..self.items.len() {
            let m = self.items[idx].clone();
            self.reindex_push(idx, &m);
        }
    }

    /// Matches with the given name, in insertion order.
    pub fn named(&self, name: &str) -> Vec<Match> {
        self.by_name
            .get(name)
            .into_iter()
            .flatten()
            .map(|&i| self.items[i].clone())
            .collect()
    }

    /// Matches with the given name, further restricted to those for which
    /// `predicate` holds.
    pub fn named_filtered(&self, name: &str, predicate: impl Fn(&Match) -> bool) -> Vec<Match> {
        self.named(name).into_iter().filter(predicate).collect()
    }

    /// Matches carrying the given tag, in insertion order.
    pub fn tagged(&self, tag: &str) -> Vec<Match> {
        self.by_tag
            .get(tag)
            .into_iter()
            .flatten()
            .map(|&i| self.items[i].clone())
            .collect()
    }

    /// Matches carrying the given tag, further restricted to those for
    /// which `predicate` holds.
    pub fn tagged_filtered(&self, tag: &str, predicate: impl Fn(&Match) -> bool) -> Vec<Match> {
        self.tagged(tag).into_iter().filter(predicate).collect()
    }

    /// Matches starting exactly at `pos`.
    pub fn starting(&self, pos: usize) -> Vec<Match> {
        self.by_start
            .get(&pos)
            .into_iter()
            .flatten()
            .map(|&i| self.items[i].clone())
            .collect()
    }

    /// Matches starting exactly at `pos`, further restricted to those for
    /// which `predicate` holds.
    pub fn starting_filtered(&self, pos: usize, predicate: impl Fn(&Match) -> bool) -> Vec<Match> {
        self.starting(pos).into_iter().filter(predicate).collect()
    }

    /// Matches ending exactly at `pos`.
    pub fn ending(&self, pos: usize) -> Vec<Match> {
        self.by_end
            .get(&pos)
            .into_iter()
            .flatten()
            .map(|&i| self.items[i].clone())
            .collect()
    }

    /// Matches ending exactly at `pos`, further restricted to those for
    /// which `predicate` holds.
    pub fn ending_filtered(&self, pos: usize, predicate: impl Fn(&Match) -> bool) -> Vec<Match> {
        self.ending(pos).into_iter().filter(predicate).collect()
    }

    /// All matches overlapping `span` — `m.start() < span.end && m.end() >
    /// span.start`, per spec §4.1. Note this is an overlap test, not
    /// containment: a match that merely touches `span` at one end qualifies.
    pub fn range(&self, span: Span) -> Vec<Match> {
        let mut out: Vec<Match> = self.items.iter().filter(|m| span.overlaps(m.span())).cloned().collect();
        out.sort();
        out
    }

    /// `range`, further restricted to those for which `predicate` holds.
    pub fn range_filtered(&self, span: Span, predicate: impl Fn(&Match) -> bool) -> Vec<Match> {
        self.range(span).into_iter().filter(predicate).collect()
    }

    /// All matches whose span overlaps `span` at all. Same overlap test as
    /// `range`; kept as a separate name because rules read more naturally
    /// spelling "overlapping" at a match's own span than "range".
    pub fn overlapping(&self, span: Span) -> Vec<Match> {
        self.range(span)
    }

    /// The nearest match ending at or before `m`'s start, ignoring matches
    /// that overlap `m` itself, optionally filtered by predicate.
    pub fn previous(&self, m: &Match, predicate: impl Fn(&Match) -> bool) -> Option<Match> {
        self.items
            .iter()
            .filter(|other| other.end() <= m.start() && predicate(other))
            .max_by_key(|other| other.end())
            .cloned()
    }

    /// The nearest match starting at or after `m`'s end, optionally filtered
    /// by predicate.
    pub fn next(&self, m: &Match, predicate: impl Fn(&Match) -> bool) -> Option<Match> {
        self.items
            .iter()
            .filter(|other| other.start() >= m.end() && predicate(other))
            .min_by_key(|other| other.start())
            .cloned()
    }

    /// Matches (other than `m`) whose span overlaps `m`'s span.
    pub fn conflicting(&self, m: &Match) -> Vec<Match> {
        self.items
            .iter()
            .filter(|other| !other.ptr_eq(m) && other.span().overlaps(m.span()))
            .cloned()
            .collect()
    }

    /// `conflicting`, further restricted to those for which `predicate`
    /// holds.
    pub fn conflicting_filtered(&self, m: &Match, predicate: impl Fn(&Match) -> bool) -> Vec<Match> {
        self.conflicting(m).into_iter().filter(predicate).collect()
    }

    /// Uncovered sub-spans of `within` not touched by any current match,
    /// each wrapped as a detached synthetic `Match` of the hole's text.
    ///
    /// Grounded on spec §4.1's "holes" operation: useful for rules that want
    /// to inspect the text between recognized matches (e.g. separators).
    pub fn holes(&self, within: Span, formatter: Option<&crate::core::Formatter>) -> Vec<Match> {
        let Some(input) = &self.input_string else {
            return Vec::new();
        };
        let mut covered: Vec<Span> = self
            .items
            .iter()
            .map(|m| m.span())
            .filter(|s| s.overlaps(within))
            .collect();
        covered.sort();

        let mut holes = Vec::new();
        let mut cursor = within.start;
        for span in covered {
            let start = span.start.max(within.start);
            let end = span.end.min(within.end);
            if start > cursor {
                holes.push((cursor, start));
            }
            cursor = cursor.max(end);
        }
        if cursor < within.end {
            holes.push((cursor, within.end));
        }

        holes
            .into_iter()
            .filter(|(start, end)| start < end)
            .map(|(start, end)| {
                let m = Match::new(input.clone(), start, end);
                if let Some(f) = formatter {
                    m.set_formatter(f.clone());
                }
                m
            })
            .collect()
    }

    /// `holes`, further restricted to those for which `predicate` holds —
    /// e.g. dropping holes that are pure whitespace.
    pub fn holes_filtered(
        &self,
        within: Span,
        formatter: Option<&crate::core::Formatter>,
        predicate: impl Fn(&Match) -> bool,
    ) -> Vec<Match> {
        self.holes(within, formatter).into_iter().filter(predicate).collect()
    }

    /// Name-keyed read surface, mirroring spec §4.1's `to_dict`: one value
    /// per name (or every value when a name occurs on more than one match),
    /// plus a hidden auxiliary mapping from name to the full list of
    /// matches that produced it.
    pub fn to_dict(&self) -> Dict {
        let mut grouped: HashMap<String, Vec<Match>> = HashMap::new();
        for m in &self.items {
            if let Some(name) = m.name() {
                grouped.entry(name).or_default().push(m.clone());
            }
        }

        let mut values = HashMap::new();
        let mut matches = HashMap::new();
        for (name, group) in grouped {
            let value = if group.len() == 1 {
                DictValue::Single(group[0].value())
            } else {
                DictValue::Multiple(group.iter().map(Match::value).collect())
            };
            values.insert(name.clone(), value);
            matches.insert(name, group);
        }
        Dict { values, matches }
    }
}

/// One name's worth of resolved value(s) in a [`Matches::to_dict`] snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictValue {
    Single(String),
    Multiple(Vec<String>),
}

/// Snapshot returned by [`Matches::to_dict`]: a flat `name -> value`
/// mapping for display, plus the `name -> [Match]` mapping it was built
/// from for callers that need the underlying matches back.
#[derive(Default)]
pub struct Dict {
    values: HashMap<String, DictValue>,
    matches: HashMap<String, Vec<Match>>,
}

impl Dict {
    pub fn get(&self, name: &str) -> Option<&DictValue> {
        self.values.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The matches (plural) underlying `name`'s value, in insertion order.
    pub fn matches_for(&self, name: &str) -> &[Match] {
        self.matches.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Group consecutive matches (sorted by span) together whenever the input
/// text between one match's end and the next match's start consists
/// entirely of characters from `separators`. A non-separator character
/// anywhere in the gap starts a new group.
///
/// Grounded on `original_source/rebulk/match.py::group_neighbors`.
pub fn group_neighbors(input: &str, matches: &[Match], separators: &str) -> Vec<Vec<Match>> {
    let mut sorted: Vec<Match> = matches.to_vec();
    sorted.sort();

    let mut groups: Vec<Vec<Match>> = Vec::new();
    for m in sorted {
        let starts_new_group = match groups.last().and_then(|g| g.last()) {
            Some(prev) => {
                let gap = input.get(prev.end()..m.start()).unwrap_or("");
                !gap.chars().all(|c| separators.contains(c))
            }
            None => true,
        };
        if starts_new_group {
            groups.push(vec![m]);
        } else {
            groups.last_mut().unwrap().push(m);
        }
    }
    groups
}

impl<'a> IntoIterator for &'a Matches {
    type Item = &'a Match;
    type IntoIter = std::slice::Iter<'a, Match>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
