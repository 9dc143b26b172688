// src/lexer/tables/mod.rs
pub mod build;
pub mod io;

pub use build::build_tables;
pub use io::{load_tables_bin_bytes, load_tables_json_bytes, save_tables_bin, save_tables_json};

use super::scanner::Automaton;
use crate::nfa::charclass::MAX_CHAR;

/// No transition.
pub const DEAD: u32 = u32::MAX;
/// Non-accepting state.
pub const INVALID_TOKEN: u32 = u32::MAX;

/// Dense table form of a master DFA, for shipping and for table-driven scanning.
///
/// Code points are mapped to classes (class 0 = "no state has a move on this");
/// `next` is row-major `[state][class]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DfaTables {
    pub latin1_class: [u32; 256],
    /// `(lo, hi, class)` for code points above 0xFF, sorted, disjoint.
    pub class_ranges: Vec<(u32, u32, u32)>,
    pub n_classes: u32,
    pub next: Vec<u32>,
    pub token_of: Vec<u32>, // state -> token index or INVALID_TOKEN
    pub token_names: Vec<String>,
    pub start: u32,
}

impl DfaTables {
    pub fn n_states(&self) -> usize {
        self.token_of.len()
    }

    pub fn class_of(&self, c: char) -> u32 {
        let cp = c as u32;
        if cp < 256 {
            return self.latin1_class[cp as usize];
        }
        self.class_ranges
            .binary_search_by(|&(lo, hi, _)| {
                if cp < lo {
                    std::cmp::Ordering::Greater
                } else if cp > hi {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .map(|i| self.class_ranges[i].2)
            .unwrap_or(0)
    }

    /// Checks every index in the tables is in range.
    pub fn validate(&self) -> Result<(), String> {
        let n_states = self.n_states();
        let n_classes = self.n_classes as usize;
        if n_classes == 0 {
            return Err("n_classes must be at least 1".into());
        }
        if self.next.len() != n_states * n_classes {
            return Err(format!(
                "next has {} entries, expected {n_states} x {n_classes}",
                self.next.len()
            ));
        }
        if self.start as usize >= n_states {
            return Err(format!("start {} out of range ({n_states} states)", self.start));
        }
        if let Some(bad) = self
            .next
            .iter()
            .find(|&&s| s != DEAD && s as usize >= n_states)
        {
            return Err(format!("transition to missing state {bad}"));
        }
        if let Some(bad) = self
            .token_of
            .iter()
            .find(|&&t| t != INVALID_TOKEN && t as usize >= self.token_names.len())
        {
            return Err(format!("token index {bad} has no name"));
        }
        let classes = self
            .latin1_class
            .iter()
            .copied()
            .chain(self.class_ranges.iter().map(|r| r.2));
        for class in classes {
            if class as usize >= n_classes {
                return Err(format!("class {class} out of range ({n_classes} classes)"));
            }
        }
        for &(lo, hi, _) in &self.class_ranges {
            if lo < 256 || lo > hi || hi > MAX_CHAR {
                return Err(format!(
                    "class range {lo:#X}..={hi:#X} must satisfy 0x100 <= lo <= hi <= {MAX_CHAR:#X}"
                ));
            }
        }
        if self.class_ranges.windows(2).any(|w| w[0].1 >= w[1].0) {
            return Err("class_ranges must be sorted and disjoint".into());
        }
        Ok(())
    }
}

impl Automaton for DfaTables {
    fn start(&self) -> u32 {
        self.start
    }

    fn next(&self, state: u32, c: char) -> Option<u32> {
        let class = self.class_of(c) as usize;
        let idx = state as usize * self.n_classes as usize + class;
        match self.next.get(idx).copied() {
            Some(DEAD) | None => None,
            Some(s) => Some(s),
        }
    }

    fn token_of(&self, state: u32) -> Option<&str> {
        match self.token_of.get(state as usize).copied() {
            Some(INVALID_TOKEN) | None => None,
            Some(t) => self.token_names.get(t as usize).map(String::as_str),
        }
    }
}
