//! Sequence comparison: strict and commutative equality.
//!
//! The commutative comparator decides whether `candidate` can be obtained from
//! `reference` by swapping operations that touch disjoint resources. It runs
//! online: a single forward pass over the candidate, pulling from the
//! reference only on demand. Reference operations that were pulled but not
//! yet matched wait in a FIFO backlog.
//!
//! For each candidate operation `op`:
//! 1. The backlog is scanned front to back for the first entry that conflicts
//!    with `op`. That entry must equal `op`; it is removed on success.
//! 2. Otherwise the reference is pulled until an entry conflicts with `op`.
//!    That entry must equal `op`. Disjoint entries pulled on the way join the
//!    backlog. Running out of reference is a mismatch.
//!
//! Two operations conflict when they share a resource. Operations with no
//! resources at all conflict only with each other, so they keep their
//! relative order and are still compared.
//!
//! Cost is `O(n * b)` for `n` candidate operations and a backlog of at most `b`.
//!
//! # Trailing reference operations
//! Once the candidate is exhausted, leftover reference operations are accepted
//! under [`TrailingPolicy::Ignore`] (the default) and rejected under
//! [`TrailingPolicy::RequireExhausted`].

use crate::config::{CompareConfig, TrailingPolicy};
use crate::core::AtomicOperation;
use std::collections::VecDeque;
use std::fmt;

/// Returns `true` iff both sequences have the same length and are pointwise equal.
pub fn strict_equal<A, R, C>(reference: R, candidate: C) -> bool
where
    A: PartialEq,
    R: IntoIterator<Item = A>,
    C: IntoIterator<Item = A>,
{
    reference.into_iter().eq(candidate)
}

/// Returns `true` iff `candidate` equals `reference` up to reordering of
/// operations on disjoint resources, with the default [`CompareConfig`].
pub fn commutative_equal<A, R, C>(reference: R, candidate: C) -> bool
where
    A: AtomicOperation,
    R: IntoIterator<Item = A>,
    C: IntoIterator<Item = A>,
{
    compare_commutative(reference, candidate, &CompareConfig::default()).is_ok()
}

/// Why a commutative comparison failed.
#[derive(Debug, Clone, PartialEq)]
pub enum MismatchReason<A> {
    /// The first reference operation sharing resources with the candidate
    /// operation is a different operation.
    Conflict { expected: A, found: A },
    /// The reference ran out before anything conflicting with the candidate
    /// operation turned up.
    ReferenceExhausted { found: A },
    /// The candidate ended while reference operations were left over.
    Unconsumed { next: A },
}

/// A failed commutative comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch<A> {
    /// Index into the candidate of the operation that failed to match
    /// (the candidate length for [`MismatchReason::Unconsumed`]).
    pub position: usize,
    pub reason: MismatchReason<A>,
}

impl<A: fmt::Debug> fmt::Display for Mismatch<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            MismatchReason::Conflict { expected, found } => write!(
                f,
                "candidate[{}] = {:?} conflicts with reference operation {:?}",
                self.position, found, expected
            ),
            MismatchReason::ReferenceExhausted { found } => write!(
                f,
                "candidate[{}] = {:?} has no counterpart in the reference",
                self.position, found
            ),
            MismatchReason::Unconsumed { next } => write!(
                f,
                "candidate ended after {} operations with reference operation {:?} unmatched",
                self.position, next
            ),
        }
    }
}

/// Counters from a successful comparison.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CompareStats {
    /// Candidate operations matched.
    pub matched: usize,
    /// Reference operations pulled.
    pub pulled: usize,
    /// Largest backlog seen.
    pub max_backlog: usize,
    /// Backlog entries left when the candidate ended.
    pub leftover: usize,
}

fn conflicts<A: AtomicOperation>(a: &A, b: &A) -> bool {
    if a.resources().is_empty() || b.resources().is_empty() {
        return a.resources().is_empty() && b.resources().is_empty();
    }
    a.interferes_with(b)
}

/// Commutative comparison with diagnostics.
#[tracing::instrument(skip_all, fields(trailing = config.trailing.as_str()))]
pub fn compare_commutative<A, R, C>(
    reference: R,
    candidate: C,
    config: &CompareConfig,
) -> Result<CompareStats, Mismatch<A>>
where
    A: AtomicOperation,
    R: IntoIterator<Item = A>,
    C: IntoIterator<Item = A>,
{
    let mut gen = reference.into_iter();
    let mut backlog: VecDeque<A> = VecDeque::new();
    let mut stats = CompareStats::default();

    let fail = |position: usize, reason: MismatchReason<A>| {
        let mismatch = Mismatch { position, reason };
        tracing::debug!(position, %mismatch, "commutative comparison failed");
        mismatch
    };

    for (position, op) in candidate.into_iter().enumerate() {
        if let Some(idx) = backlog.iter().position(|pending| conflicts(pending, &op)) {
            if backlog[idx] != op {
                let expected = backlog[idx].clone();
                return Err(fail(position, MismatchReason::Conflict { expected, found: op }));
            }
            backlog.remove(idx);
            stats.matched += 1;
            continue;
        }

        loop {
            let Some(pulled) = gen.next() else {
                return Err(fail(position, MismatchReason::ReferenceExhausted { found: op }));
            };
            stats.pulled += 1;
            if !conflicts(&pulled, &op) {
                backlog.push_back(pulled);
                stats.max_backlog = stats.max_backlog.max(backlog.len());
                continue;
            }
            if pulled != op {
                return Err(fail(
                    position,
                    MismatchReason::Conflict {
                        expected: pulled,
                        found: op,
                    },
                ));
            }
            stats.matched += 1;
            break;
        }
    }

    stats.leftover = backlog.len();
    if config.trailing == TrailingPolicy::RequireExhausted {
        if let Some(next) = backlog.pop_front().or_else(|| gen.next()) {
            return Err(fail(stats.matched, MismatchReason::Unconsumed { next }));
        }
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{cnot, cz, global_phase, h, x, Gate};

    #[test]
    fn identical_sequences() {
        let seq = vec![h(0), cnot(0, 1), x(1)];
        assert!(strict_equal(seq.clone(), seq.clone()));
        assert!(commutative_equal(seq.clone(), seq));
    }

    #[test]
    fn strict_rejects_any_reordering() {
        assert!(!strict_equal(vec![h(0), h(1)], vec![h(1), h(0)]));
        assert!(!strict_equal(vec![h(0)], vec![h(0), h(0)]));
        assert!(strict_equal(Vec::<Gate>::new(), Vec::new()));
    }

    #[test]
    fn disjoint_operations_commute() {
        let reference = vec![h(1), cz(1, 0), h(2), cz(2, 0)];
        let candidate = vec![h(1), h(2), cz(1, 0), cz(2, 0)];
        assert!(commutative_equal(reference, candidate));
    }

    #[test]
    fn overlapping_reorder_is_rejected() {
        let reference = vec![h(1), cz(1, 0)];
        let candidate = vec![cz(1, 0), h(1)];
        let err = compare_commutative(reference, candidate, &CompareConfig::default()).unwrap_err();
        assert_eq!(err.position, 0);
        assert_eq!(
            err.reason,
            MismatchReason::Conflict {
                expected: h(1),
                found: cz(1, 0)
            }
        );
    }

    #[test]
    fn conflict_in_backlog_fails_fast() {
        // x(0) waits in the backlog while h(1) is matched; then h(0) hits it.
        let reference = vec![x(0), h(1)];
        let candidate = vec![h(1), h(0)];
        let err = compare_commutative(reference, candidate, &CompareConfig::default()).unwrap_err();
        assert_eq!(err.position, 1);
        assert_eq!(
            err.reason,
            MismatchReason::Conflict {
                expected: x(0),
                found: h(0)
            }
        );
    }

    #[test]
    fn exhausted_reference_is_a_mismatch() {
        let err = compare_commutative(vec![h(0)], vec![h(0), x(3)], &CompareConfig::default())
            .unwrap_err();
        assert_eq!(err.reason, MismatchReason::ReferenceExhausted { found: x(3) });
    }

    #[test]
    fn trailing_policy() {
        let reference = vec![h(0), h(1), h(2)];
        let candidate = vec![h(1)];
        let stats = compare_commutative(reference.clone(), candidate.clone(), &CompareConfig::default())
            .unwrap();
        assert_eq!(stats.matched, 1);
        assert_eq!(stats.leftover, 1);

        let err = compare_commutative(reference, candidate, &CompareConfig::strict_tail()).unwrap_err();
        assert_eq!(err.reason, MismatchReason::Unconsumed { next: h(0) });
        assert_eq!(err.position, 1);
    }

    #[test]
    fn strict_tail_accepts_full_permutation() {
        let reference = vec![h(0), h(1), cnot(0, 1)];
        let candidate = vec![h(1), h(0), cnot(0, 1)];
        let stats = compare_commutative(reference, candidate, &CompareConfig::strict_tail()).unwrap();
        assert_eq!(stats.matched, 3);
        assert_eq!(stats.pulled, 3);
        assert_eq!(stats.max_backlog, 1);
    }

    #[test]
    fn resource_free_operations_keep_their_order() {
        let reference = vec![global_phase(1), h(0), global_phase(2)];
        assert!(commutative_equal(
            reference.clone(),
            vec![h(0), global_phase(1), global_phase(2)]
        ));
        assert!(!commutative_equal(
            reference,
            vec![global_phase(2), h(0), global_phase(1)]
        ));
    }

    #[test]
    fn mismatch_display() {
        let err = compare_commutative(vec![h(0)], vec![x(0)], &CompareConfig::default()).unwrap_err();
        assert!(err.to_string().starts_with("candidate[0]"));
    }
}
