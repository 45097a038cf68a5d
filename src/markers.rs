//! `Markers`: a `Matches`-like container for spatial-only matches (markers
//! carry no name/value semantics of interest beyond "this span is special"),
//! additionally indexed by every integer position they cover.
//!
//! Grounded directly on spec §4.2 — the teacher has no equivalent concept,
//! so the per-position index is modeled the way
//! `astorion::engine::compiled_rules::RuleIndex` indexes rules by a coarse
//! key: a `HashMap` keyed by discrete buckets, here byte offsets.

use std::collections::HashMap;

use crate::container::Matches;
use crate::core::{Match, Span};

#[derive(Default)]
pub struct Markers {
    matches: Matches,
    by_position: HashMap<usize, Vec<usize>>,
}

impl Markers {
    pub fn new() -> Self {
        Markers::default()
    }

    pub fn push(&mut self, m: Match) {
        m.set_marker(true);
        let idx = self.matches.len();
        for pos in m.start()..m.end() {
            self.by_position.entry(pos).or_default().push(idx);
        }
        if m.start() == m.end() {
            self.by_position.entry(m.start()).or_default().push(idx);
        }
        self.matches.push(m);
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Match> {
        self.matches.iter()
    }

    /// Every marker covering the integer position `index`.
    pub fn at_index(&self, index: usize) -> Vec<Match> {
        self.by_position
            .get(&index)
            .into_iter()
            .flatten()
            .map(|&i| self.matches.as_slice()[i].clone())
            .collect()
    }

    /// Every marker overlapping `span`, found by merging `by_index[a]` and
    /// `by_index[b]` — the two endpoints of `span` — rather than rescanning
    /// every marker, per spec §4.2.
    pub fn at_span(&self, span: Span) -> Vec<Match> {
        let a = span.start;
        let b = if span.end > span.start { span.end - 1 } else { span.start };

        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for pos in [a, b] {
            for m in self.at_index(pos) {
                if seen.insert(m.identity()) {
                    out.push(m);
                }
            }
        }
        out.sort();
        out
    }

    /// Every marker overlapping `m`'s span — a convenience used by rules
    /// that check "is this candidate match adjacent to/inside a marker".
    pub fn at_match(&self, m: &Match) -> Vec<Match> {
        self.at_span(m.span())
    }
}
