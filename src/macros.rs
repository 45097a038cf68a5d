//! Small ergonomic macros. `static_regex!` is the teacher's own `regex!`
//! helper, renamed and kept verbatim in spirit: compile a literal pattern
//! once, lazily, on first use.

#[macro_export]
macro_rules! static_regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn static_regex_compiles_once_and_matches() {
        let re = static_regex!(r"^\d+$");
        assert!(re.is_match("1234"));
        assert!(!re.is_match("12a4"));
    }
}
