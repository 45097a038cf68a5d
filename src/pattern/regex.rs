//! Regular-expression matching via the `regex` crate.
//!
//! Grounded on `original_source/rebulk/pattern.py::RePattern._match`: the
//! whole match becomes the parent `Match`, and each capturing group (named
//! or numbered) becomes a child spanning that group. The `regex` crate only
//! retains the last span of a repeated group, so "no repeated-capture
//! support" (spec §6's documented fallback) is simply the only behavior
//! available here — not a feature gap.

use std::rc::Rc;

use regex::Regex;

use crate::core::{Context, Match};
use crate::pattern::{Pattern, PatternOptions};

pub struct RePattern {
    regex: Regex,
    options: PatternOptions,
}

impl RePattern {
    pub fn new(regex: Regex, options: PatternOptions) -> Self {
        RePattern { regex, options }
    }

    /// Construct from a pattern string, panicking on invalid syntax — a
    /// configuration error per spec §7, not a runtime `Result`. Any
    /// `options.abbreviations` substitutions are applied to `pattern` before
    /// compilation, so `\d{4}` can be registered once under a short alias
    /// and reused across patterns.
    pub fn compile(pattern: &str, options: PatternOptions) -> Self {
        let expanded = options.apply_abbreviations(pattern);
        let regex = Regex::new(&expanded).unwrap_or_else(|e| panic!("invalid regex {expanded:?}: {e}"));
        RePattern::new(regex, options)
    }
}

impl Pattern for RePattern {
    fn raw_matches(&self, input: Rc<str>, _context: &Context) -> Vec<Match> {
        let mut out = Vec::new();
        let limit = self.options.limit.unwrap_or(usize::MAX);
        for caps in self.regex.captures_iter(&input).take(limit) {
            let whole = caps.get(0).expect("group 0 always matches");
            let parent = Match::new(input.clone(), whole.start(), whole.end());

            for (idx, name) in self.regex.capture_names().enumerate() {
                if idx == 0 {
                    continue;
                }
                if let Some(group) = caps.get(idx) {
                    let child = Match::new(input.clone(), group.start(), group.end());
                    if let Some(name) = name {
                        child.set_name(Some(name.to_string()));
                    }
                    parent.add_child(child);
                }
            }
            out.push(parent);
        }
        out
    }

    fn options(&self) -> &PatternOptions {
        &self.options
    }

    fn pattern_name(&self) -> &'static str {
        "regex"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_match_is_parent_groups_are_children() {
        let pattern = RePattern::compile(r"(?P<year>\d{4})-(?P<month>\d{2})", PatternOptions::new());
        let matches = pattern.matches(Rc::from("2020-01 filler"), &Context::new());
        assert_eq!(matches.len(), 1);
        let parent = &matches[0];
        assert_eq!(parent.raw(), "2020-01");
        assert_eq!(parent.children().len(), 2);
        assert_eq!(parent.children()[0].name().as_deref(), Some("year"));
        assert_eq!(parent.children()[1].name().as_deref(), Some("month"));
    }

    #[test]
    #[should_panic(expected = "invalid regex")]
    fn invalid_regex_panics_at_construction() {
        RePattern::compile("(unterminated", PatternOptions::new());
    }

    #[test]
    fn abbreviations_are_substituted_before_compilation() {
        let pattern = RePattern::compile(
            r"%year%-%month%",
            PatternOptions::new().abbreviation("%year%", r"\d{4}").abbreviation("%month%", r"\d{2}"),
        );
        let matches = pattern.matches(Rc::from("2020-01"), &Context::new());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].raw(), "2020-01");
    }
}
