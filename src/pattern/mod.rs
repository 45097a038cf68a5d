//! The pattern hierarchy: [`StringPattern`](string::StringPattern),
//! [`RePattern`](regex::RePattern), and
//! [`FunctionalPattern`](functional::FunctionalPattern), unified behind the
//! [`Pattern`] trait and a shared format-then-validate driver.
//!
//! Grounded on `original_source/rebulk/pattern.py::Pattern.matches` for the
//! two-phase protocol (format the raw match, then validate it; a validator
//! rejecting any node in the tree drops the whole tree) and on
//! `astorion::engine::parser::Parser::produce_node` for the Rust idiom of
//! turning a raw hit into a fully dressed tree node.

pub mod functional;
pub mod regex;
pub mod string;

use std::rc::Rc;

use crate::core::{Context, Formatter, Match, Validator};

/// What `Pattern::matches` returns for each raw parent/children tree —
/// spec §4.3's `children`/`every` options (default: parent only).
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub enum YieldMode {
    #[default]
    Parent,
    Children,
    Every,
}

/// A predicate over `Context` deciding whether a pattern is skipped
/// entirely this run — spec §4.3's `disabled` option.
pub type DisabledPredicate = Rc<dyn Fn(&Context) -> bool>;

/// Shared, explicit configuration for any pattern variant — the typed
/// replacement (spec §9) for Python's dynamic kwargs.
#[derive(Clone, Default)]
pub struct PatternOptions {
    pub name: Option<String>,
    pub tags: Vec<String>,
    pub formatter: Option<Formatter>,
    pub validator: Option<Validator>,
    pub marker: bool,
    pub private: bool,
    /// Force the parent's private flag independent of `private`.
    pub private_parent: bool,
    /// Force every child's private flag independent of `private`.
    pub private_children: bool,
    pub yield_mode: YieldMode,
    /// Accepted for parity with the documented option table; always true in
    /// effect — see the note on `format_all`/`validate_all` below.
    pub format_all: bool,
    /// Accepted for parity with the documented option table; always true in
    /// effect — see the note on `format_all`/`validate_all` below.
    pub validate_all: bool,
    pub disabled: Option<DisabledPredicate>,
    /// `(needle, replacement)` pairs applied to a regex source string
    /// before compilation (`RePattern` only).
    pub abbreviations: Vec<(String, String)>,
    /// `StringPattern` only: advance by one position after a hit instead of
    /// by the needle's length, allowing overlapping occurrences.
    pub overlapping: bool,
    /// `RePattern` only: bound how many non-overlapping matches are
    /// produced (`None` = unbounded), mirroring the upstream `limit`.
    pub limit: Option<usize>,
}

impl PatternOptions {
    pub fn new() -> Self {
        PatternOptions::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn formatter(mut self, f: impl Fn(&str) -> String + 'static) -> Self {
        self.formatter = Some(Rc::new(f));
        self
    }

    pub fn validator(mut self, f: impl Fn(&Match) -> bool + 'static) -> Self {
        self.validator = Some(Rc::new(f));
        self
    }

    pub fn marker(mut self, marker: bool) -> Self {
        self.marker = marker;
        self
    }

    pub fn private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    pub fn private_parent(mut self, private_parent: bool) -> Self {
        self.private_parent = private_parent;
        self
    }

    pub fn private_children(mut self, private_children: bool) -> Self {
        self.private_children = private_children;
        self
    }

    /// Yield only the parent's children, not the parent itself.
    pub fn children(mut self) -> Self {
        self.yield_mode = YieldMode::Children;
        self
    }

    /// Yield both the parent and all of its children.
    pub fn every(mut self) -> Self {
        self.yield_mode = YieldMode::Every;
        self
    }

    /// Accepted for API parity with the option table documented in spec
    /// §4.3. This driver already formats and validates the whole
    /// parent+children tree unconditionally (the "Validation protocol"
    /// paragraph of the same section), regardless of `yield_mode` — so
    /// there is no narrower default behavior left for `format_all` to
    /// widen. Calling this is a no-op kept for callers translating
    /// configuration from the documented table.
    pub fn format_all(mut self, format_all: bool) -> Self {
        self.format_all = format_all;
        self
    }

    /// See [`PatternOptions::format_all`] — same resolution applies to
    /// validation.
    pub fn validate_all(mut self, validate_all: bool) -> Self {
        self.validate_all = validate_all;
        self
    }

    /// Unconditionally skip (`true`) or run (`false`) this pattern.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = Some(Rc::new(move |_: &Context| disabled));
        self
    }

    /// Skip this pattern whenever `predicate(context)` returns `true`.
    pub fn disabled_if(mut self, predicate: impl Fn(&Context) -> bool + 'static) -> Self {
        self.disabled = Some(Rc::new(predicate));
        self
    }

    pub fn abbreviation(mut self, needle: impl Into<String>, replacement: impl Into<String>) -> Self {
        self.abbreviations.push((needle.into(), replacement.into()));
        self
    }

    pub fn overlapping(mut self, overlapping: bool) -> Self {
        self.overlapping = overlapping;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Apply `abbreviations` substitutions to a regex source string, in
    /// registration order, before compilation.
    pub fn apply_abbreviations(&self, pattern: &str) -> String {
        let mut out = pattern.to_string();
        for (needle, replacement) in &self.abbreviations {
            out = out.replace(needle.as_str(), replacement.as_str());
        }
        out
    }

    fn dress(&self, m: &Match, pattern_name: &'static str, private_override: bool) {
        if let Some(name) = &self.name {
            if m.name().is_none() {
                m.set_name(Some(name.clone()));
            }
        }
        for tag in &self.tags {
            m.add_tag(tag.clone());
        }
        if let Some(f) = &self.formatter {
            m.set_formatter(f.clone());
        }
        m.set_marker(self.marker);
        m.set_private(self.private || private_override);
        m.set_pattern_name(pattern_name);
    }
}

/// A registered matcher run once per input string.
///
/// `matches` returns every match this pattern finds, fully dressed (name,
/// tags, formatter applied at read-time) and filtered through the
/// validator, per spec §4.3.
pub trait Pattern {
    /// Raw candidate matches, before formatting/validation. Implementors
    /// only need to locate spans (and, for `RePattern`, their child groups);
    /// `matches` (the default-provided driver) does the rest.
    fn raw_matches(&self, input: Rc<str>, context: &Context) -> Vec<Match>;

    fn options(&self) -> &PatternOptions;

    fn pattern_name(&self) -> &'static str;

    /// Run this pattern against `input`, producing fully dressed, validated
    /// matches.
    ///
    /// Validation protocol (spec §4.3): format then validate the parent; if
    /// it fails, discard the whole tree. Format then validate every child;
    /// if any fails, discard the whole tree too — a badly formed capture
    /// group invalidates its enclosing match, not just itself. What's
    /// finally returned (parent only / children only / both) is controlled
    /// by `yield_mode`, independent of this validation pass.
    fn matches(&self, input: Rc<str>, context: &Context) -> Vec<Match> {
        let options = self.options();
        if let Some(disabled) = &options.disabled {
            if disabled(context) {
                return Vec::new();
            }
        }

        let raw = self.raw_matches(input, context);
        let mut out = Vec::new();

        'trees: for m in raw {
            options.dress(&m, self.pattern_name(), options.private_parent);
            let children = m.children();
            for child in &children {
                options.dress(child, self.pattern_name(), options.private_children);
            }

            if let Some(validator) = &options.validator {
                if !validator(&m) {
                    continue 'trees;
                }
                for child in &children {
                    if !validator(child) {
                        continue 'trees;
                    }
                }
            }

            match options.yield_mode {
                YieldMode::Parent => out.push(m),
                YieldMode::Children => out.extend(children),
                YieldMode::Every => {
                    out.push(m.clone());
                    out.extend(children);
                }
            }
        }
        out
    }
}
