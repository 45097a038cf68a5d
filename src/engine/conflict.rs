//! Conflict resolution: prefer the longer of two overlapping matches.
//!
//! Grounded line for line on
//! `original_source/rebulk/processors.py::{default_conflict_solver,
//! conflict_prefer_longer}`: an identity-based "already decided" set avoids
//! re-litigating a pair once one side has been dropped, solver priority is
//! `match.conflict_solver` then `conflicting_match.conflict_solver` then the
//! built-in default, and the whole pass is idempotent because it always
//! recomputes `initiator` length at removal time rather than caching it.

use std::collections::HashSet;

use crate::container::Matches;
use crate::core::{ConflictVerdict, Match};
use crate::core::rebulk_trace;

/// The built-in solver: compare the length of each match's `initiator`
/// (its root ancestor), keep the longer one, and make no decision on a tie.
pub fn default_conflict_solver(a: &Match, b: &Match) -> ConflictVerdict {
    let a_len = a.initiator().length();
    let b_len = b.initiator().length();
    if a_len > b_len {
        ConflictVerdict::Remove(b.clone())
    } else if b_len > a_len {
        ConflictVerdict::Remove(a.clone())
    } else {
        ConflictVerdict::Keep
    }
}

fn resolve_pair(a: &Match, b: &Match) -> Option<Match> {
    let solvers = [a.conflict_solver(), b.conflict_solver()];
    for solver in solvers.into_iter().flatten() {
        match solver(a, b) {
            ConflictVerdict::Remove(m) => return Some(m),
            ConflictVerdict::Keep => return None,
            ConflictVerdict::Defer => continue,
        }
    }
    match default_conflict_solver(a, b) {
        ConflictVerdict::Remove(m) => Some(m),
        _ => None,
    }
}

/// Resolve every overlapping pair in `matches`, removing the shorter match
/// (by its initiator's length) of each conflicting pair. Private matches
/// never take part, on either side of a comparison — they are invisible to
/// conflict resolution, per spec §4.4's "for every non-private match" on
/// both the outer and inner loops. Matches already marked for removal are
/// skipped rather than re-evaluated, so the result does not depend on
/// iteration order beyond the original insertion order.
pub fn conflict_prefer_longer(matches: &mut Matches) {
    let items: Vec<Match> = matches.iter().cloned().collect();
    let mut removed_ids: HashSet<usize> = HashSet::new();
    let mut to_remove: Vec<Match> = Vec::new();

    for (i, m) in items.iter().enumerate().rev() {
        if removed_ids.contains(&m.identity()) {
            continue;
        }
        if m.private() {
            continue;
        }
        for other in items[..i].iter().rev() {
            if removed_ids.contains(&other.identity()) {
                continue;
            }
            if other.private() {
                continue;
            }
            if !m.span().overlaps(other.span()) {
                continue;
            }
            if let Some(loser) = resolve_pair(m, other) {
                rebulk_trace!(
                    "conflict: dropping {:?} in favor of overlapping match",
                    (loser.start(), loser.end())
                );
                removed_ids.insert(loser.identity());
                to_remove.push(loser);
            }
        }
    }

    matches.remove_all(&to_remove);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn drops_shorter_of_two_overlapping_matches() {
        let input: Rc<str> = Rc::from("abcdef");
        let mut matches = Matches::with_input(input.clone());
        matches.push(Match::new(input.clone(), 0, 4));
        matches.push(Match::new(input.clone(), 2, 3));

        conflict_prefer_longer(&mut matches);
        assert_eq!(matches.len(), 1);
        assert_eq!((matches.as_slice()[0].start(), matches.as_slice()[0].end()), (0, 4));
    }

    #[test]
    fn non_overlapping_matches_survive() {
        let input: Rc<str> = Rc::from("abcdef");
        let mut matches = Matches::with_input(input.clone());
        matches.push(Match::new(input.clone(), 0, 2));
        matches.push(Match::new(input.clone(), 3, 5));

        conflict_prefer_longer(&mut matches);
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn private_matches_never_enter_the_comparison() {
        let input: Rc<str> = Rc::from("abcdefgh");
        let mut matches = Matches::with_input(input.clone());
        let seed = Match::new(input.clone(), 0, 8);
        seed.set_private(true);
        let real = Match::new(input.clone(), 2, 4);
        matches.push(seed);
        matches.push(real);

        conflict_prefer_longer(&mut matches);
        assert_eq!(matches.len(), 2);
        assert!(matches.as_slice().iter().any(|m| (m.start(), m.end()) == (2, 4)));
    }

    #[test]
    fn idempotent_on_a_clean_set() {
        let input: Rc<str> = Rc::from("abcdef");
        let mut matches = Matches::with_input(input.clone());
        matches.push(Match::new(input.clone(), 0, 4));
        matches.push(Match::new(input.clone(), 2, 3));

        conflict_prefer_longer(&mut matches);
        let before = matches.len();
        conflict_prefer_longer(&mut matches);
        assert_eq!(matches.len(), before);
    }
}
