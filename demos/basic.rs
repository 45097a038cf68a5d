//! Build a small `Rebulk`, run it against a line of text, and print the
//! reconciled matches — the non-CLI replacement for the teacher's
//! `main.rs`/`debug_report.rs` pretty-printer (run with `cargo run --example basic`).

use rebulk::{Context, PatternOptions, Rebulk};

fn main() {
    let rebulk = Rebulk::builder()
        .regex(r"\d{4}-\d{2}-\d{2}", PatternOptions::new().name("date").tag("numeric"))
        .string(["tomorrow", "today", "yesterday"], PatternOptions::new().name("relative-day"))
        .regex(r"(?i)\b(morning|afternoon|evening|night)\b", PatternOptions::new().name("part-of-day"))
        .build();

    let input = "See you tomorrow morning, or maybe on 2020-01-02 instead.";
    let matches = rebulk.matches(input, &Context::new());

    println!("input: {input:?}");
    println!("{} match(es):", matches.len());
    for m in matches.iter() {
        println!(
            "  [{:>3}, {:<3}) {:<14} {:?}  tags={:?}",
            m.start(),
            m.end(),
            m.name().unwrap_or_default(),
            m.value(),
            m.tags(),
        );
    }
}
