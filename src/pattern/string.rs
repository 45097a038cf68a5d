//! Literal substring matching.
//!
//! Grounded on `original_source/rebulk/utils.py::find_all`: scan for
//! non-overlapping occurrences of a needle, advancing by the needle's
//! length after each hit. `PatternOptions::overlapping` switches to
//! advancing by one instead, per the spec's resolved Open Question on
//! `StringPattern` advancement.

use std::rc::Rc;

use crate::core::{Context, Match};
use crate::pattern::{Pattern, PatternOptions};

pub struct StringPattern {
    needles: Vec<String>,
    options: PatternOptions,
    case_sensitive: bool,
}

impl StringPattern {
    pub fn new(needles: impl IntoIterator<Item = impl Into<String>>, options: PatternOptions) -> Self {
        StringPattern {
            needles: needles.into_iter().map(Into::into).collect(),
            options,
            case_sensitive: true,
        }
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self
    }

    fn find_all(&self, haystack: &str, needle: &str) -> Vec<(usize, usize)> {
        if needle.is_empty() {
            return Vec::new();
        }
        // ASCII-only case folding: byte offsets computed here are sliced
        // straight out of the original haystack, so the folded string must
        // stay byte-length-identical to it (full Unicode lowercasing can
        // change a character's byte length and desync the offsets).
        let (hay, pat) = if self.case_sensitive {
            (haystack.to_string(), needle.to_string())
        } else {
            (haystack.to_ascii_lowercase(), needle.to_ascii_lowercase())
        };
        let mut out = Vec::new();
        let mut start = 0usize;
        let step = if self.options.overlapping { 1 } else { pat.len() };
        while start <= hay.len() {
            match hay[start..].find(pat.as_str()) {
                Some(rel) => {
                    let begin = start + rel;
                    let end = begin + pat.len();
                    out.push((begin, end));
                    start = begin + step.max(1);
                }
                None => break,
            }
        }
        out
    }
}

impl Pattern for StringPattern {
    fn raw_matches(&self, input: Rc<str>, _context: &Context) -> Vec<Match> {
        let mut out = Vec::new();
        for needle in &self.needles {
            for (start, end) in self.find_all(&input, needle) {
                out.push(Match::new(input.clone(), start, end));
            }
        }
        out.sort();
        out
    }

    fn options(&self) -> &PatternOptions {
        &self.options
    }

    fn pattern_name(&self) -> &'static str {
        "string"
    }
}
