//! Test-case batching: grouping the ordered case list into batches the
//! solution executable can consume in one invocation.
//!
//! A batch never mixes actions, never exceeds the configured cardinality
//! cap, and (when produced by the initial batcher) closes as soon as the
//! aggregate expected runtime reaches the fixed 60-second cap. Bisection
//! later halves batches; halving preserves the action and cap invariants.

use crate::config::TestCase;
use crate::constants::AGGREGATE_ALLOWANCE_CAP_SECS;

/// An ordered, non-empty group of test cases sharing one action.
#[derive(Debug, Clone)]
pub struct Batch {
    cases: Vec<TestCase>,
}

impl Batch {
    /// Wraps an ordered case list. The caller guarantees the list is
    /// non-empty and action-homogeneous; the batcher and `split` are the
    /// only producers inside the crate.
    #[must_use]
    pub fn new(cases: Vec<TestCase>) -> Self {
        debug_assert!(!cases.is_empty());
        Self { cases }
    }

    #[must_use]
    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// The shared action tag of every member.
    #[must_use]
    pub fn action(&self) -> &str {
        self.cases[0].action()
    }

    /// Member case names, in batch order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.cases.iter().map(|case| case.name.clone()).collect()
    }

    /// Sum of the members' runtime allowances.
    #[must_use]
    pub fn expected_runtime_secs(&self) -> f64 {
        self.cases
            .iter()
            .map(|case| case.runtime_allowance_secs)
            .sum()
    }

    /// The budget a fresh attempt of this batch would be given: the members'
    /// aggregate allowance plus the configured per-batch floor.
    #[must_use]
    pub fn nominal_allowance_secs(&self, floor_secs: f64) -> f64 {
        self.expected_runtime_secs() + floor_secs
    }

    /// Halves the batch at `len / 2`. The caller guarantees `len >= 2`, so
    /// both halves are non-empty.
    #[must_use]
    pub fn split(self) -> (Self, Self) {
        debug_assert!(self.cases.len() >= 2);
        let mut left = self.cases;
        let right = left.split_off(left.len() / 2);
        (Self::new(left), Self::new(right))
    }
}

/// Lazily groups the ordered case list into initial batches.
///
/// Rules, applied per candidate case:
/// 1. A candidate whose action differs from the open batch's action closes
///    the batch first (so a batch can be emitted below the cardinality cap
///    purely on an action boundary).
/// 2. The candidate is appended.
/// 3. Reaching the cardinality cap or the 60-second aggregate-allowance cap
///    closes the batch.
///
/// Every input case appears in exactly one emitted batch, in input order.
pub struct BatchIter {
    cases: std::iter::Peekable<std::vec::IntoIter<TestCase>>,
    max_size: usize,
}

impl BatchIter {
    /// `max_size` is the configured `max_testbatch_size`; config validation
    /// guarantees it is at least 1.
    #[must_use]
    pub fn new(cases: Vec<TestCase>, max_size: usize) -> Self {
        Self {
            cases: cases.into_iter().peekable(),
            max_size,
        }
    }
}

impl Iterator for BatchIter {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        let mut members: Vec<TestCase> = Vec::new();
        let mut expected_runtime_secs = 0.0_f64;

        while let Some(candidate) = self.cases.peek() {
            if let Some(first) = members.first() {
                if candidate.action() != first.action() {
                    break;
                }
            }
            let Some(case) = self.cases.next() else { break };
            expected_runtime_secs += case.runtime_allowance_secs;
            members.push(case);
            if members.len() >= self.max_size
                || expected_runtime_secs >= AGGREGATE_ALLOWANCE_CAP_SECS
            {
                break;
            }
        }

        if members.is_empty() {
            None
        } else {
            Some(Batch::new(members))
        }
    }
}
