// src/lexer/tables/build.rs
use hashbrown::HashMap;
use log::info;
use rayon::prelude::*;
use std::time::Instant;

use super::{DEAD, DfaTables, INVALID_TOKEN};
use crate::lexer::dfa::Dfa;

/// Splits the code points mentioned by any edge into disjoint atoms.
fn atoms(dfa: &Dfa) -> Vec<(u32, u32)> {
    let mut bounds: Vec<u64> = dfa
        .states()
        .iter()
        .flat_map(|s| s.edges())
        .flat_map(|e| [e.lo as u64, e.hi as u64 + 1])
        .collect();
    bounds.sort_unstable();
    bounds.dedup();
    bounds
        .windows(2)
        .map(|w| (w[0] as u32, (w[1] - 1) as u32))
        .collect()
}

pub fn build_tables(dfa: &Dfa) -> DfaTables {
    let t0 = Instant::now();
    let n_states = dfa.len();

    // Interner (column -> class id). Class 0 is the all-dead column.
    let dead = vec![DEAD; n_states];
    let mut columns: Vec<Vec<u32>> = vec![dead.clone()];
    let mut map: HashMap<Vec<u32>, u32> = HashMap::new();
    map.insert(dead, 0);

    let atoms = atoms(dfa);
    let mut atom_class: Vec<(u32, u32, u32)> = Vec::with_capacity(atoms.len());
    for (lo, hi) in atoms {
        let column: Vec<u32> = dfa
            .states()
            .iter()
            .map(|s| s.next(lo).map_or(DEAD, |t| t.0))
            .collect();
        let id = *map.entry(column.clone()).or_insert_with(|| {
            let id = columns.len() as u32;
            columns.push(column);
            id
        });
        atom_class.push((lo, hi, id));
    }

    let mut latin1_class = [0u32; 256];
    let mut class_ranges: Vec<(u32, u32, u32)> = Vec::new();
    for (lo, hi, class) in atom_class {
        if class == 0 {
            continue;
        }
        if lo < 256 {
            for cp in lo..=hi.min(255) {
                latin1_class[cp as usize] = class;
            }
        }
        if hi >= 256 {
            let lo = lo.max(256);
            match class_ranges.last_mut() {
                Some(prev) if prev.2 == class && prev.1 + 1 == lo => prev.1 = hi,
                _ => class_ranges.push((lo, hi, class)),
            }
        }
    }

    // Fill rows in parallel.
    let n_classes = columns.len();
    let mut next = vec![DEAD; n_states * n_classes];
    next.par_chunks_mut(n_classes)
        .enumerate()
        .for_each(|(s, row)| {
            for (class, column) in columns.iter().enumerate() {
                row[class] = column[s];
            }
        });

    let token_of = dfa
        .states()
        .iter()
        .map(|s| s.token().map_or(INVALID_TOKEN, |t| t as u32))
        .collect();

    info!(
        "[tables] {} states x {} classes ({} ranges above latin-1), took {} ms",
        n_states,
        n_classes,
        class_ranges.len(),
        t0.elapsed().as_millis()
    );

    DfaTables {
        latin1_class,
        class_ranges,
        n_classes: n_classes as u32,
        next,
        token_of,
        token_names: dfa.token_names().to_vec(),
        start: dfa.start().0,
    }
}
