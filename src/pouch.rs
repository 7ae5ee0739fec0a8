// src/pouch.rs
// Random draw bag for the game simulation: numbers 1..=90, extracted one at
// a time without replacement.

use crate::defs::{FIRSTNUMBER, LASTNUMBER, Number};

pub struct Pouch {
    numbers: Vec<Number>,
}

impl Pouch {
    pub fn new() -> Self {
        Pouch {
            numbers: (FIRSTNUMBER..=LASTNUMBER).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    pub fn extract(&mut self) -> Option<Number> {
        if self.is_empty() {
            None
        } else {
            let random_index = rand::random_range(0..self.len());
            Some(self.numbers.remove(random_index))
        }
    }
}

impl Default for Pouch {
    fn default() -> Self {
        Self::new()
    }
}
