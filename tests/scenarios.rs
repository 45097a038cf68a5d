//! End-to-end seed scenarios exercising the whole pipeline: patterns,
//! default conflict resolution, rules, and markers together.

use rebulk::{Consequence, Context, FunctionalOutcome, Markers, Match, Matches, PatternOptions, Rebulk, Rule};

fn values(matches: &Matches) -> Vec<String> {
    matches.iter().map(|m| m.value()).collect()
}

#[test]
fn scenario_mixed_pattern_kinds() {
    let rebulk = Rebulk::builder()
        .string(["quick"], PatternOptions::new())
        .regex(r"f.x", PatternOptions::new())
        .functional(
            |s, _| match s.find("over") {
                Some(idx) => FunctionalOutcome::One(rebulk::FunctionalMatch::span(idx, idx + 4)),
                None => FunctionalOutcome::None,
            },
            PatternOptions::new(),
        )
        .build();

    let matches = rebulk.matches("The quick brown fox jumps over the lazy dog", &Context::new());
    let mut found = values(&matches);
    found.sort();
    let mut expected = vec!["quick".to_string(), "fox".to_string(), "over".to_string()];
    expected.sort();
    assert_eq!(found, expected);
}

#[test]
fn scenario_longer_match_wins_inside_shorter_needle() {
    let rebulk = Rebulk::builder()
        .string(["lakers"], PatternOptions::new())
        .string(["la"], PatternOptions::new())
        .build();

    let matches = rebulk.matches("the lakers are from la", &Context::new());
    let found = values(&matches);
    assert_eq!(found, vec!["lakers".to_string(), "la".to_string()]);
}

#[test]
fn scenario_conflict_resolution_over_many_overlaps() {
    let rebulk = Rebulk::builder()
        .string(["ijklmn", "kl", "abcdef", "ab", "ef", "yz"], PatternOptions::new())
        .build();

    let matches = rebulk.matches("abcdefghijklmnopqrstuvwxyz", &Context::new());
    let found = values(&matches);
    assert_eq!(found, vec!["abcdef".to_string(), "ijklmn".to_string(), "yz".to_string()]);
}

#[test]
fn scenario_group_neighbors_over_separators() {
    let text = "abc.def._._.ghi.klm.nop.qrs.tuv.wyx.z";
    let rebulk = Rebulk::builder()
        .string(["abc", "def", "ghi", "nop", "qrs.tuv", "z"], PatternOptions::new())
        .build();

    let matches = rebulk.matches(text, &Context::new());
    let found: Vec<Match> = matches.iter().cloned().collect();
    let groups = rebulk::group_neighbors(text, &found, "._");
    let grouped_values: Vec<Vec<String>> = groups.iter().map(|g| g.iter().map(|m| m.raw()).collect()).collect();
    assert_eq!(
        grouped_values,
        vec![
            vec!["abc".to_string(), "def".to_string(), "ghi".to_string()],
            vec!["nop".to_string(), "qrs.tuv".to_string()],
            vec!["z".to_string()],
        ]
    );
}

struct RemoveAllButLastYear;

impl Rule for RemoveAllButLastYear {
    fn name(&self) -> &str {
        "RemoveAllButLastYear"
    }

    fn when(&self, matches: &Matches, _markers: &Markers, _context: &Context) -> Option<Vec<Match>> {
        let mut years = matches.named("year");
        years.sort();
        if years.len() > 1 {
            years.pop();
            Some(years)
        } else {
            None
        }
    }

    fn then(&self, found: Vec<Match>, _context: &Context) -> Vec<Consequence> {
        found.into_iter().map(Consequence::Remove).collect()
    }
}

#[test]
fn scenario_rule_keeps_only_last_year() {
    let rebulk = Rebulk::builder()
        .regex(r"\d{4}", PatternOptions::new().name("year"))
        .rule(Box::new(RemoveAllButLastYear))
        .build();

    let matches = rebulk.matches("1984 keep only last 1968 entry 1982 case", &Context::new());
    assert_eq!(values(&matches), vec!["1982".to_string()]);
}

struct WordOnlyInParens;

impl Rule for WordOnlyInParens {
    fn name(&self) -> &str {
        "WordOnlyInParens"
    }

    fn when(&self, matches: &Matches, markers: &Markers, _context: &Context) -> Option<Vec<Match>> {
        let to_remove: Vec<Match> = matches
            .named("word")
            .into_iter()
            .filter(|word| markers.at_match(word).is_empty())
            .collect();
        if to_remove.is_empty() {
            None
        } else {
            Some(to_remove)
        }
    }

    fn then(&self, found: Vec<Match>, _context: &Context) -> Vec<Consequence> {
        found.into_iter().map(Consequence::Remove).collect()
    }
}

fn parenthesis_rebulk() -> Rebulk {
    Rebulk::builder()
        .regex(r"\(.*?\)", PatternOptions::new().name("mark1").marker(true))
        .string(["word"], PatternOptions::new().name("word"))
        .rule(Box::new(WordOnlyInParens))
        .build()
}

#[test]
fn scenario_marker_gated_rule_keeps_match_inside_parens() {
    let rebulk = parenthesis_rebulk();
    let matches = rebulk.matches("grab (word) only if it's in parenthesis", &Context::new());
    assert_eq!(values(&matches), vec!["word".to_string()]);
}

#[test]
fn scenario_marker_gated_rule_drops_match_outside_parens() {
    let rebulk = parenthesis_rebulk();
    let matches = rebulk.matches("don't grab word at all", &Context::new());
    assert!(matches.is_empty());
}
