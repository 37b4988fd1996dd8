//! Threshold matching of predicted groups against ground-truth groups.

use serde::{Deserialize, Serialize};

use crate::agent::{AgentId, Group};
use crate::{Error, Result};

/// Correctness counts of one scene at one overlap threshold.
///
/// Counts are signed: a predicted group may be counted against several true
/// groups, so `false_positives` and `false_negatives` can go negative and
/// precision or recall can exceed 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdResult {
    pub true_positives: i64,
    pub false_negatives: i64,
    pub false_positives: i64,
    pub precision: f64,
    pub recall: f64,
}

impl ThresholdResult {
    fn degenerate(false_negatives: i64, false_positives: i64, precision: f64, recall: f64) -> Self {
        Self {
            true_positives: 0,
            false_negatives,
            false_positives,
            precision,
            recall,
        }
    }
}

/// Overlap ratio between two groups: shared members over the larger size.
pub fn overlap_ratio<A: AgentId>(truth: &Group<A>, guess: &Group<A>) -> f64 {
    let found = guess.overlap(truth);
    found as f64 / truth.len().max(guess.len()) as f64
}

/// Count true positives, false negatives and false positives of `guesses`
/// against `truth` at overlap threshold `threshold`.
///
/// Every countable (size > 1) pair of a true group and a guess is compared;
/// each pair whose [`overlap_ratio`] reaches the threshold adds one true
/// positive. There is no one-to-one assignment. With `non_reusable`, a guess
/// is removed from `guesses` as soon as it matches, so later true groups can
/// no longer match it.
///
/// Empty inputs short-circuit before any counting:
///
/// | truth | guesses | TP | FN | FP | precision | recall |
/// |-------|---------|----|----|----|-----------|--------|
/// | empty | empty   | 0  | 0  | 0  | 1         | 1      |
/// | empty | n       | 0  | 0  | n  | 0         | 1      |
/// | n     | empty   | 0  | n  | 0  | 1         | 0      |
///
/// Otherwise singleton groups are dropped from both denominators. If that
/// leaves either side with nothing to count, precision or recall divides by
/// zero and [`Error::DivisionByZero`] is returned.
pub fn evaluate_groups<A: AgentId>(
    guesses: &mut Vec<Group<A>>,
    truth: &[Group<A>],
    threshold: f64,
    non_reusable: bool,
) -> Result<ThresholdResult> {
    let n_true = truth.len() as i64;
    let n_guess = guesses.len() as i64;

    match (n_true, n_guess) {
        (0, 0) => return Ok(ThresholdResult::degenerate(0, 0, 1.0, 1.0)),
        (0, _) => return Ok(ThresholdResult::degenerate(0, n_guess, 0.0, 1.0)),
        (_, 0) => return Ok(ThresholdResult::degenerate(n_true, 0, 1.0, 0.0)),
        _ => {}
    }

    let n_true = truth.iter().filter(|g| g.is_countable()).count() as i64;
    let n_guess = guesses.iter().filter(|g| g.is_countable()).count() as i64;

    let mut true_positives: i64 = 0;
    for true_group in truth.iter().filter(|g| g.is_countable()) {
        let mut j = 0;
        while j < guesses.len() {
            let guess = &guesses[j];
            if !guess.is_countable() {
                j += 1;
                continue;
            }

            let ratio = overlap_ratio(true_group, guess);
            if ratio >= threshold {
                log::trace!("matched {:?} with {:?} (ratio {:.3})", true_group, guess, ratio);
                true_positives += 1;
                if non_reusable {
                    guesses.remove(j);
                    continue;
                }
            }
            j += 1;
        }
    }

    let false_positives = n_guess - true_positives;
    let false_negatives = n_true - true_positives;

    let precision_den = true_positives + false_positives;
    let recall_den = true_positives + false_negatives;
    if precision_den == 0 || recall_den == 0 {
        return Err(Error::DivisionByZero {
            true_groups: n_true,
            guess_groups: n_guess,
        });
    }

    Ok(ThresholdResult {
        true_positives,
        false_negatives,
        false_positives,
        precision: true_positives as f64 / precision_den as f64,
        recall: true_positives as f64 / recall_den as f64,
    })
}

/// Matcher bound to one threshold and consumption policy.
///
/// Unlike [`evaluate_groups`] it never touches the caller's guesses: each
/// call works on a scene-local copy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupMatcher {
    pub threshold: f64,
    pub non_reusable: bool,
}

impl GroupMatcher {
    pub fn new(threshold: f64, non_reusable: bool) -> Self {
        Self {
            threshold,
            non_reusable,
        }
    }

    pub fn evaluate<A: AgentId>(
        &self,
        guesses: &[Group<A>],
        truth: &[Group<A>],
    ) -> Result<ThresholdResult> {
        let mut working = guesses.to_vec();
        evaluate_groups(&mut working, truth, self.threshold, self.non_reusable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn groups(raw: &[&[i64]]) -> Vec<Group<i64>> {
        raw.iter().map(|g| Group::new(g.iter().copied())).collect()
    }

    fn counts(r: &ThresholdResult) -> (i64, i64, i64) {
        (r.true_positives, r.false_negatives, r.false_positives)
    }

    // ===== Degenerate cases =====

    #[test]
    fn test_both_empty() {
        for t in [0.0, 0.5, 2.0 / 3.0, 1.0] {
            let r = evaluate_groups(&mut groups(&[]), &groups(&[]), t, false).unwrap();
            assert_eq!(counts(&r), (0, 0, 0));
            assert_eq!((r.precision, r.recall), (1.0, 1.0));
        }
    }

    #[test]
    fn test_truth_empty() {
        let r = evaluate_groups(&mut groups(&[&[1, 2]]), &groups(&[]), 0.5, false).unwrap();
        assert_eq!(counts(&r), (0, 0, 1));
        assert_eq!((r.precision, r.recall), (0.0, 1.0));
    }

    #[test]
    fn test_guesses_empty() {
        let r = evaluate_groups(&mut groups(&[]), &groups(&[&[1, 2]]), 0.5, false).unwrap();
        assert_eq!(counts(&r), (0, 1, 0));
        assert_eq!((r.precision, r.recall), (1.0, 0.0));
    }

    #[test]
    fn test_degenerate_counts_include_singletons() {
        let r = evaluate_groups(&mut groups(&[&[1], &[2], &[3, 4]]), &groups(&[]), 0.5, false)
            .unwrap();
        assert_eq!(r.false_positives, 3);
    }

    // ===== General case =====

    #[test]
    fn test_perfect_match() {
        let truth = groups(&[&[1, 2], &[3, 4, 5]]);
        let r = evaluate_groups(&mut truth.clone(), &truth, 1.0, false).unwrap();
        assert_eq!(counts(&r), (2, 0, 0));
        assert_eq!((r.precision, r.recall), (1.0, 1.0));
    }

    #[test]
    fn test_ratio_uses_larger_group() {
        // 2 shared of max(2, 4) = 0.5
        let truth = groups(&[&[1, 2]]);
        let mut guesses = groups(&[&[1, 2, 3, 4]]);
        assert_relative_eq!(overlap_ratio(&truth[0], &guesses[0]), 0.5);

        let hit = evaluate_groups(&mut guesses.clone(), &truth, 0.5, false).unwrap();
        assert_eq!(hit.true_positives, 1);

        let miss = evaluate_groups(&mut guesses, &truth, 0.51, false).unwrap();
        assert_eq!(counts(&miss), (0, 1, 1));
        assert_eq!((miss.precision, miss.recall), (0.0, 0.0));
    }

    #[test]
    fn test_two_thirds_threshold() {
        let truth = groups(&[&[1, 2, 3]]);
        let r = evaluate_groups(&mut groups(&[&[1, 2]]), &truth, 2.0 / 3.0, false).unwrap();
        assert_eq!(r.true_positives, 1);
    }

    #[test]
    fn test_singletons_excluded_from_denominators() {
        let truth = groups(&[&[1, 2], &[3], &[4]]);
        let mut guesses = groups(&[&[1, 2], &[5], &[6, 7]]);
        let r = evaluate_groups(&mut guesses, &truth, 1.0, false).unwrap();

        // n_true = 1, n_guess = 2
        assert_eq!(counts(&r), (1, 0, 1));
        assert_relative_eq!(r.precision, 0.5);
        assert_relative_eq!(r.recall, 1.0);
    }

    #[test]
    fn test_non_reusable_consumes_guess() {
        let truth = groups(&[&[1, 2], &[2, 3]]);
        let mut guesses = groups(&[&[1, 2, 3]]);

        let r = evaluate_groups(&mut guesses, &truth, 0.5, true).unwrap();

        assert_eq!(r.true_positives, 1);
        assert!(guesses.is_empty());
        assert_eq!(counts(&r), (1, 1, 0));
    }

    #[test]
    fn test_reusable_counts_every_pair() {
        let truth = groups(&[&[1, 2], &[2, 3]]);
        let mut guesses = groups(&[&[1, 2, 3]]);

        let r = evaluate_groups(&mut guesses, &truth, 0.5, false).unwrap();

        // One guess matched twice: FP goes negative and precision exceeds 1.
        assert_eq!(counts(&r), (2, 0, -1));
        assert_relative_eq!(r.precision, 2.0);
        assert_relative_eq!(r.recall, 1.0);
        assert_eq!(guesses.len(), 1);
    }

    #[test]
    fn test_reusable_negative_false_negatives() {
        // Two guesses both match the single true group.
        let truth = groups(&[&[1, 2, 3]]);
        let mut guesses = groups(&[&[1, 2], &[2, 3]]);

        let r = evaluate_groups(&mut guesses, &truth, 0.5, false).unwrap();

        assert_eq!(counts(&r), (2, -1, 0));
        assert_relative_eq!(r.precision, 1.0);
        assert_relative_eq!(r.recall, 2.0);
    }

    #[test]
    fn test_non_reusable_keeps_scanning_after_removal() {
        // Both guesses match the single true group; each is consumed.
        let truth = groups(&[&[1, 2, 3]]);
        let mut guesses = groups(&[&[1, 2], &[2, 3]]);

        let r = evaluate_groups(&mut guesses, &truth, 0.5, true).unwrap();

        assert_eq!(r.true_positives, 2);
        assert!(guesses.is_empty());
    }

    #[test]
    fn test_non_reusable_leaves_singletons() {
        let truth = groups(&[&[1, 2]]);
        let mut guesses = groups(&[&[9], &[1, 2]]);

        evaluate_groups(&mut guesses, &truth, 1.0, true).unwrap();

        assert_eq!(guesses, groups(&[&[9]]));
    }

    #[test]
    fn test_all_singletons_divides_by_zero() {
        let err = evaluate_groups(&mut groups(&[&[1], &[2]]), &groups(&[&[1], &[3]]), 0.5, false)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::DivisionByZero {
                true_groups: 0,
                guess_groups: 0
            }
        ));
    }

    #[test]
    fn test_singleton_guesses_only_divides_by_zero() {
        let err = evaluate_groups(&mut groups(&[&[1]]), &groups(&[&[1, 2]]), 0.5, false)
            .unwrap_err();
        assert!(matches!(err, Error::DivisionByZero { guess_groups: 0, .. }));
    }

    #[test]
    fn test_string_agents() {
        let truth = vec![Group::new(vec!["ID_001".to_string(), "ID_002".to_string()])];
        let mut guesses = truth.clone();
        let r = evaluate_groups(&mut guesses, &truth, 1.0, false).unwrap();
        assert_eq!(r.true_positives, 1);
    }

    // ===== GroupMatcher =====

    #[test]
    fn test_matcher_does_not_consume_caller_guesses() {
        let truth = groups(&[&[1, 2], &[2, 3]]);
        let guesses = groups(&[&[1, 2, 3]]);
        let matcher = GroupMatcher::new(0.5, true);

        let first = matcher.evaluate(&guesses, &truth).unwrap();
        let second = matcher.evaluate(&guesses, &truth).unwrap();

        assert_eq!(first, second);
        assert_eq!(guesses.len(), 1);
    }
}
