// src/calls.rs
// The called set: ordered, distinct numbers announced during a live game.
// Call order matters for display only; pattern logic cares about membership.

use crate::defs::{FIRSTNUMBER, LASTNUMBER, Number};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalledSet {
    numbers: Vec<Number>,
}

impl CalledSet {
    pub fn new() -> Self {
        CalledSet { numbers: Vec::new() }
    }

    /// Record a call. Duplicates and out-of-range numbers are ignored;
    /// returns whether the number was actually recorded.
    pub fn push(&mut self, number: Number) -> bool {
        if !(FIRSTNUMBER..=LASTNUMBER).contains(&number) || self.contains(number) {
            return false;
        }
        self.numbers.push(number);
        true
    }

    pub fn contains(&self, number: Number) -> bool {
        self.numbers.contains(&number)
    }

    pub fn as_slice(&self) -> &[Number] {
        &self.numbers
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    pub fn last(&self) -> Option<Number> {
        self.numbers.last().copied()
    }

    /// Up to `n` calls preceding the latest one, most recent first.
    pub fn recent(&self, n: usize) -> Vec<Number> {
        if self.numbers.len() <= 1 {
            return Vec::new();
        }

        let available_previous = self.numbers.len() - 1;
        let numbers_to_show = std::cmp::min(n, available_previous);
        let start_index = self.numbers.len() - numbers_to_show - 1;
        let end_index = self.numbers.len() - 1;

        let mut result: Vec<Number> = self.numbers[start_index..end_index].to_vec();
        result.reverse();
        result
    }

    /// Explicit reset; the only way the set ever shrinks.
    pub fn reset(&mut self) {
        self.numbers.clear();
    }
}
