//! Core value types: `Match`, its span, and the `Context` threaded through
//! patterns, solvers, and rules.
//!
//! `Match` is the one place in this crate that reaches for shared mutable
//! state (`Rc<RefCell<_>>`): a child match needs to walk back up to its
//! `initiator` through its parent, and a parent owns its children, so the
//! two directions of the edge have to be represented differently (owning
//! down, weak up) to avoid a reference cycle. See `DESIGN.md` for the
//! tradeoffs.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

use indexmap::IndexSet;

/// A half-open `[start, end)` byte range into the scanned input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {start} must be <= end {end}");
        Span { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `self` and `other` overlap (share at least one covered offset).
    pub fn overlaps(&self, other: Span) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Whether `self` fully contains `other` (allows equal spans).
    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && self.end >= other.end
    }
}

/// A formatter capability: turns a raw slice of the input into a match's
/// final value.
pub type Formatter = Rc<dyn Fn(&str) -> String>;

/// A validator capability: returns `false` to drop the match (and its whole
/// tree, per spec §4.3).
pub type Validator = Rc<dyn Fn(&Match) -> bool>;

/// Outcome of a conflict solver: which, if either, of the two matches it
/// examined should be removed. See `engine::conflict`.
#[derive(Clone)]
pub enum ConflictVerdict {
    /// Remove this specific match (must be one of the two the solver saw).
    Remove(Match),
    /// Neither match is removed.
    Keep,
    /// Defer to the next solver in priority order (or the built-in default).
    Defer,
}

/// A conflict-solver capability attached to a single match; see spec §4.4.
pub type ConflictSolver = Rc<dyn Fn(&Match, &Match) -> ConflictVerdict>;

pub(crate) struct MatchData {
    pub start: usize,
    pub end: usize,
    pub name: Option<String>,
    pub tags: IndexSet<String>,
    pub value: Option<String>,
    pub raw_start: Option<usize>,
    pub raw_end: Option<usize>,
    pub parent: Option<Weak<RefCell<MatchData>>>,
    pub children: Vec<Match>,
    pub pattern_name: Option<&'static str>,
    pub marker: bool,
    pub private: bool,
    pub conflict_solver: Option<ConflictSolver>,
    pub formatter: Option<Formatter>,
    pub input_string: Rc<str>,
}

/// A single located fragment of the input, with metadata.
///
/// Cheap to clone (an `Rc` bump) — every copy refers to the same underlying
/// record, which is what lets a `Match` live simultaneously in a container's
/// indices and inside its parent's `children`.
#[derive(Clone)]
pub struct Match(Rc<RefCell<MatchData>>);

impl Match {
    /// Build a new top-level match (no parent, no children yet).
    pub fn new(input_string: Rc<str>, start: usize, end: usize) -> Self {
        assert!(start <= end, "match start {start} must be <= end {end}");
        assert!(end <= input_string.len(), "match end {end} exceeds input length {}", input_string.len());
        Match(Rc::new(RefCell::new(MatchData {
            start,
            end,
            name: None,
            tags: IndexSet::new(),
            value: None,
            raw_start: None,
            raw_end: None,
            parent: None,
            children: Vec::new(),
            pattern_name: None,
            marker: false,
            private: false,
            conflict_solver: None,
            formatter: None,
            input_string,
        })))
    }

    pub(crate) fn data(&self) -> Ref<'_, MatchData> {
        self.0.borrow()
    }

    pub fn start(&self) -> usize {
        self.0.borrow().start
    }

    pub fn end(&self) -> usize {
        self.0.borrow().end
    }

    pub fn set_span(&self, start: usize, end: usize) {
        let mut data = self.0.borrow_mut();
        data.start = start;
        data.end = end;
    }

    pub fn span(&self) -> Span {
        let data = self.0.borrow();
        Span::new(data.start, data.end)
    }

    pub fn length(&self) -> usize {
        self.span().len()
    }

    pub fn name(&self) -> Option<String> {
        self.0.borrow().name.clone()
    }

    pub fn set_name(&self, name: Option<String>) {
        self.0.borrow_mut().name = name;
    }

    pub fn tags(&self) -> Vec<String> {
        self.0.borrow().tags.iter().cloned().collect()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.0.borrow().tags.contains(tag)
    }

    pub fn add_tag(&self, tag: impl Into<String>) {
        self.0.borrow_mut().tags.insert(tag.into());
    }

    pub fn set_tags(&self, tags: impl IntoIterator<Item = String>) {
        self.0.borrow_mut().tags = tags.into_iter().collect();
    }

    pub fn marker(&self) -> bool {
        self.0.borrow().marker
    }

    pub fn set_marker(&self, marker: bool) {
        self.0.borrow_mut().marker = marker;
    }

    pub fn private(&self) -> bool {
        self.0.borrow().private
    }

    pub fn set_private(&self, private: bool) {
        self.0.borrow_mut().private = private;
    }

    pub fn pattern_name(&self) -> Option<&'static str> {
        self.0.borrow().pattern_name
    }

    pub fn set_pattern_name(&self, name: &'static str) {
        self.0.borrow_mut().pattern_name = Some(name);
    }

    pub fn conflict_solver(&self) -> Option<ConflictSolver> {
        self.0.borrow().conflict_solver.clone()
    }

    pub fn set_conflict_solver(&self, solver: ConflictSolver) {
        self.0.borrow_mut().conflict_solver = Some(solver);
    }

    pub fn set_formatter(&self, formatter: Formatter) {
        self.0.borrow_mut().formatter = Some(formatter);
    }

    /// Restrict the slice used to compute `raw`/`value` to a sub-range of
    /// the match's own span (used by holes and a few pattern variants).
    pub fn set_raw_span(&self, start: usize, end: usize) {
        let mut data = self.0.borrow_mut();
        data.raw_start = Some(start);
        data.raw_end = Some(end);
    }

    /// The slice of the input this match covers, honoring `raw_start`/`raw_end`
    /// overrides when present.
    pub fn raw(&self) -> String {
        let data = self.0.borrow();
        let start = data.raw_start.unwrap_or(data.start);
        let end = data.raw_end.unwrap_or(data.end);
        data.input_string.get(start..end).unwrap_or_default().to_string()
    }

    /// Explicit value if set, else `formatter(raw)` if a formatter is
    /// attached, else the raw slice itself.
    pub fn value(&self) -> String {
        let explicit = self.0.borrow().value.clone();
        if let Some(v) = explicit {
            return v;
        }
        let raw = self.raw();
        let formatter = self.0.borrow().formatter.clone();
        match formatter {
            Some(f) => f(&raw),
            None => raw,
        }
    }

    pub fn set_value(&self, value: impl Into<String>) {
        self.0.borrow_mut().value = Some(value.into());
    }

    pub fn input_string(&self) -> Rc<str> {
        self.0.borrow().input_string.clone()
    }

    /// This match's parent, if any (upgraded from the weak back-reference).
    pub fn parent(&self) -> Option<Match> {
        self.0.borrow().parent.as_ref().and_then(|w| w.upgrade()).map(Match)
    }

    /// Children of this match, in insertion order.
    pub fn children(&self) -> Vec<Match> {
        self.0.borrow().children.clone()
    }

    /// Attach `child` under `self`, setting the child's parent back-reference.
    ///
    /// Invariant (spec §3): the child's span must lie within the parent's.
    pub fn add_child(&self, child: Match) {
        {
            let parent_span = self.span();
            let child_span = child.span();
            assert!(
                parent_span.contains(child_span),
                "child span {child_span:?} must lie within parent span {parent_span:?}"
            );
        }
        child.0.borrow_mut().parent = Some(Rc::downgrade(&self.0));
        self.0.borrow_mut().children.push(child);
    }

    /// The furthest ancestor reached by repeatedly walking `parent`.
    pub fn initiator(&self) -> Match {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Identity of the underlying record, for identity-based sets
    /// (conflict resolution's "avoid duplicate removal" set).
    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    pub fn ptr_eq(&self, other: &Match) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Deep-ish clone: a new, independent match with the same span/value/
    /// tags/name but no parent and no children. Used by holes and a few
    /// container operations that need a detached synthetic match.
    pub fn detached_clone(&self) -> Match {
        let data = self.0.borrow();
        let m = Match::new(data.input_string.clone(), data.start, data.end);
        {
            let mut new_data = m.0.borrow_mut();
            new_data.name = data.name.clone();
            new_data.tags = data.tags.clone();
            new_data.value = data.value.clone();
            new_data.raw_start = data.raw_start;
            new_data.raw_end = data.raw_end;
            new_data.marker = data.marker;
            new_data.private = data.private;
            new_data.pattern_name = data.pattern_name;
            new_data.conflict_solver = data.conflict_solver.clone();
            new_data.formatter = data.formatter.clone();
        }
        m
    }
}

impl fmt::Debug for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("Match")
            .field("span", &(data.start, data.end))
            .field("name", &data.name)
            .field("value", &self.value())
            .field("tags", &data.tags)
            .field("marker", &data.marker)
            .field("private", &data.private)
            .finish()
    }
}

/// Equality and hashing are based on `(span, value)` only, per spec §3: two
/// matches with the same span and value are interchangeable for set
/// membership even if they differ in producing pattern or tags.
impl PartialEq for Match {
    fn eq(&self, other: &Self) -> bool {
        self.span() == other.span() && self.value() == other.value()
    }
}

impl Eq for Match {}

impl Hash for Match {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.span().hash(state);
        self.value().hash(state);
    }
}

/// Matches order lexicographically on `span` (spec §3).
impl PartialOrd for Match {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Match {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.span().cmp(&other.span())
    }
}

/// A small typed key/value record threaded through pattern, solver, and rule
/// evaluation — the explicit replacement (spec §9) for dynamic kwargs/dicts.
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: std::collections::HashMap<String, ContextValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContextValue {
    Bool(bool),
    Text(String),
    Number(i64),
}

impl Context {
    pub fn new() -> Self {
        Context::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.values.get(key)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.values.get(key) {
            Some(ContextValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn get_text(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(ContextValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<bool> for ContextValue {
    fn from(b: bool) -> Self {
        ContextValue::Bool(b)
    }
}

impl From<&str> for ContextValue {
    fn from(s: &str) -> Self {
        ContextValue::Text(s.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(s: String) -> Self {
        ContextValue::Text(s)
    }
}

impl From<i64> for ContextValue {
    fn from(n: i64) -> Self {
        ContextValue::Number(n)
    }
}

/// Print a terse trace line to stderr when `REBULK_DEBUG` is set.
///
/// Grounded on the teacher's `RUSTLING_DEBUG_RULES`-gated `eprintln!` calls:
/// no logging framework, just an opt-in trace for pipeline debugging.
pub(crate) fn debug_enabled() -> bool {
    std::env::var_os("REBULK_DEBUG").is_some()
}

macro_rules! rebulk_trace {
    ($($arg:tt)*) => {
        if $crate::core::debug_enabled() {
            eprintln!($($arg)*);
        }
    };
}

pub(crate) use rebulk_trace;

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> Rc<str> {
        Rc::from("hello world")
    }

    #[test]
    fn span_overlaps_and_contains() {
        let a = Span::new(0, 5);
        let b = Span::new(4, 8);
        let c = Span::new(5, 8);
        assert!(a.overlaps(b));
        assert!(!a.overlaps(c));
        assert!(Span::new(0, 10).contains(a));
        assert!(!a.contains(Span::new(0, 10)));
    }

    #[test]
    fn value_falls_back_to_raw_then_formatter() {
        let m = Match::new(input(), 0, 5);
        assert_eq!(m.raw(), "hello");
        assert_eq!(m.value(), "hello");

        m.set_formatter(Rc::new(|s: &str| s.to_uppercase()));
        assert_eq!(m.value(), "HELLO");

        m.set_value("explicit");
        assert_eq!(m.value(), "explicit");
    }

    #[test]
    fn equality_is_span_and_value_only() {
        let a = Match::new(input(), 0, 5);
        let b = Match::new(input(), 0, 5);
        b.add_tag("different-tag");
        assert_eq!(a, b);

        let c = Match::new(input(), 0, 5);
        c.set_value("other");
        assert_ne!(a, c);
    }

    #[test]
    fn parent_child_and_initiator() {
        let parent = Match::new(input(), 0, 11);
        let child = Match::new(input(), 0, 5);
        parent.add_child(child.clone());

        assert!(child.parent().unwrap().ptr_eq(&parent));
        assert!(child.initiator().ptr_eq(&parent));
        assert!(parent.initiator().ptr_eq(&parent));
        assert_eq!(parent.children().len(), 1);
    }

    #[test]
    #[should_panic(expected = "must lie within parent span")]
    fn child_outside_parent_span_panics() {
        let parent = Match::new(input(), 0, 5);
        let child = Match::new(input(), 3, 11);
        parent.add_child(child);
    }
}
