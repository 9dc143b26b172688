// src/lexer/dfa.rs
use std::collections::VecDeque;

use hashbrown::{HashMap, HashSet};
use log::debug;

use crate::nfa::charclass::partition;
use crate::nfa::{CharClass, Label, StateGraph, StateId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DfaStateId(pub u32);

/// `lo..=hi` (code points) leads to `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub lo: u32,
    pub hi: u32,
    pub to: DfaStateId,
}

#[derive(Debug, Clone, Default)]
pub struct DfaState {
    /// NFA states this DFA state stands for, sorted.
    subset: Vec<StateId>,
    /// Sorted by `lo`, pairwise disjoint.
    edges: Vec<Edge>,
    /// Token indices accepting here, best (earliest declared) first.
    candidates: Vec<usize>,
}

impl DfaState {
    pub fn subset(&self) -> &[StateId] {
        &self.subset
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn candidates(&self) -> &[usize] {
        &self.candidates
    }

    /// The token this state reports when a match ends here.
    pub fn token(&self) -> Option<usize> {
        self.candidates.first().copied()
    }

    pub fn is_accepting(&self) -> bool {
        !self.candidates.is_empty()
    }

    pub fn next(&self, cp: u32) -> Option<DfaStateId> {
        self.edges
            .binary_search_by(|e| {
                if cp < e.lo {
                    std::cmp::Ordering::Greater
                } else if cp > e.hi {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .ok()
            .map(|i| self.edges[i].to)
    }
}

/// Deterministic automaton produced by subset construction. State 0 is the start.
#[derive(Debug, Clone)]
pub struct Dfa {
    states: Vec<DfaState>,
    token_names: Vec<String>,
}

fn epsilon_closure<I>(nfa: &StateGraph, seeds: I) -> Vec<usize>
where
    I: IntoIterator<Item = usize>,
{
    let mut seen: HashSet<usize> = HashSet::new();
    let mut stack: Vec<usize> = Vec::new();
    for s in seeds {
        if seen.insert(s) {
            stack.push(s);
        }
    }
    while let Some(s) = stack.pop() {
        for t in nfa.state(s).transitions() {
            if t.label == Label::Epsilon && seen.insert(t.to) {
                stack.push(t.to);
            }
        }
    }
    let mut closure: Vec<usize> = seen.into_iter().collect();
    closure.sort_unstable();
    closure
}

fn dfa_state_for(nfa: &StateGraph, subset: &[usize]) -> DfaState {
    let mut ids: Vec<StateId> = subset.iter().map(|&i| nfa.state(i).id()).collect();
    ids.sort_unstable();

    let mut candidates: Vec<usize> = subset
        .iter()
        .map(|&i| nfa.state(i))
        .filter(|s| s.is_accepting())
        .flat_map(|s| s.owners().iter().copied())
        .collect();
    candidates.sort_unstable();
    candidates.dedup();

    DfaState {
        subset: ids,
        edges: Vec::new(),
        candidates,
    }
}

impl Dfa {
    /// Subset construction from `nfa` (start = `nfa.first()`).
    ///
    /// `token_names[i]` names the token whose accepting NFA states carry owner `i`.
    pub fn from_nfa(nfa: &StateGraph, token_names: &[String]) -> Self {
        let token_names = token_names.to_vec();
        if nfa.is_empty() {
            return Self {
                states: vec![DfaState::default()],
                token_names,
            };
        }

        let mut states: Vec<DfaState> = Vec::new();
        let mut seen: HashMap<Vec<usize>, DfaStateId> = HashMap::new();
        // FIFO keeps numbering breadth-first, which reads better in dumps
        let mut worklist: VecDeque<(Vec<usize>, DfaStateId)> = VecDeque::new();

        let start = epsilon_closure(nfa, [nfa.first()]);
        states.push(dfa_state_for(nfa, &start));
        seen.insert(start.clone(), DfaStateId(0));
        worklist.push_back((start, DfaStateId(0)));

        while let Some((subset, from)) = worklist.pop_front() {
            let moves: Vec<(&CharClass, usize)> = subset
                .iter()
                .flat_map(|&s| nfa.state(s).transitions())
                .filter_map(|t| match &t.label {
                    Label::Class(class) => Some((class, t.to)),
                    Label::Epsilon => None,
                })
                .collect();
            if moves.is_empty() {
                continue;
            }

            let mut edges: Vec<Edge> = Vec::new();
            for (lo, hi) in partition(moves.iter().map(|(class, _)| *class)) {
                let targets: Vec<usize> = moves
                    .iter()
                    .filter(|(class, _)| class.contains_u32(lo))
                    .map(|&(_, to)| to)
                    .collect();
                if targets.is_empty() {
                    continue;
                }

                let closure = epsilon_closure(nfa, targets);
                let to = match seen.get(&closure) {
                    Some(&id) => id,
                    None => {
                        let id = DfaStateId(states.len() as u32);
                        states.push(dfa_state_for(nfa, &closure));
                        seen.insert(closure.clone(), id);
                        worklist.push_back((closure, id));
                        id
                    }
                };

                match edges.last_mut() {
                    Some(prev) if prev.to == to && prev.hi + 1 == lo => prev.hi = hi,
                    _ => edges.push(Edge { lo, hi, to }),
                }
            }
            states[from.0 as usize].edges = edges;
        }

        debug!(
            "[dfa] {} NFA states -> {} DFA states",
            nfa.len(),
            states.len()
        );
        Self {
            states,
            token_names,
        }
    }

    pub fn start(&self) -> DfaStateId {
        DfaStateId(0)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> &[DfaState] {
        &self.states
    }

    pub fn state(&self, id: DfaStateId) -> &DfaState {
        &self.states[id.0 as usize]
    }

    pub fn token_names(&self) -> &[String] {
        &self.token_names
    }

    pub fn step(&self, from: DfaStateId, c: char) -> Option<DfaStateId> {
        self.states.get(from.0 as usize)?.next(c as u32)
    }

    /// Name of the token a match ending in `state` reports.
    pub fn accepting(&self, state: DfaStateId) -> Option<&str> {
        let t = self.states.get(state.0 as usize)?.token()?;
        self.token_names.get(t).map(String::as_str)
    }

    /// Winning token if the whole of `input` is one match.
    pub fn accepts(&self, input: &str) -> Option<&str> {
        let mut state = self.start();
        for c in input.chars() {
            state = self.step(state, c)?;
        }
        self.accepting(state)
    }

    /// Human-readable listing of every state, its subset, and its edges.
    #[cfg(any(test, feature = "dfa-debug"))]
    pub fn dump(&self) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        for (i, s) in self.states.iter().enumerate() {
            let subset: Vec<String> = s.subset.iter().map(|id| id.to_string()).collect();
            let _ = write!(out, "d{i} {{{}}}", subset.join(","));
            if let Some(t) = s.token() {
                let _ = write!(out, " accept={}", self.token_names[t]);
            }
            let _ = writeln!(out);
            for e in &s.edges {
                let label = CharClass::from_ranges([(e.lo, e.hi)]);
                let _ = writeln!(out, "  {label} -> d{}", e.to.0);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nfa::BuildContext;
    use crate::regex::compile;
    use crate::regex::compile::tests::MapResolver;

    /// Builds a master-style NFA: fresh start with an epsilon branch per pattern.
    fn master(patterns: &[&str]) -> Dfa {
        let mut ctx = BuildContext::new();
        let mut nfa = StateGraph::new();
        let start = nfa.add(ctx.create_state());
        for (i, p) in patterns.iter().enumerate() {
            let mut frag = compile(p, &MapResolver::default(), &mut ctx).unwrap();
            let exit = frag.last();
            frag.state_mut(exit).set_accepting(true);
            frag.state_mut(exit).add_owner(i);
            let off = nfa.add_all(frag);
            nfa.epsilon(start, off);
        }
        let names: Vec<String> = (0..patterns.len()).map(|i| format!("t{i}")).collect();
        Dfa::from_nfa(&nfa, &names)
    }

    #[test]
    fn edges_are_disjoint_and_sorted() {
        let dfa = master(&["if", "[a-z]+", "[a-f0-9]+"]);
        for s in dfa.states() {
            for w in s.edges().windows(2) {
                assert!(w[0].hi < w[1].lo, "overlapping edges in {s:?}");
            }
        }
    }

    #[test]
    fn overlapping_classes_are_split() {
        let dfa = master(&["i", "[a-z]"]);
        let start = dfa.start();
        let on_i = dfa.step(start, 'i').unwrap();
        let on_j = dfa.step(start, 'j').unwrap();
        assert_ne!(on_i, on_j);
        assert_eq!(dfa.state(on_i).candidates(), &[0, 1]);
        assert_eq!(dfa.accepting(on_i), Some("t0"));
        assert_eq!(dfa.accepting(on_j), Some("t1"));
    }

    #[test]
    fn earlier_declaration_wins_ties() {
        let dfa = master(&["[a-z]+", "if"]);
        assert_eq!(dfa.accepts("if"), Some("t0"));
        let dfa = master(&["if", "[a-z]+"]);
        assert_eq!(dfa.accepts("if"), Some("t0"));
        assert_eq!(dfa.accepts("iff"), Some("t1"));
    }

    #[test]
    fn subsets_record_nfa_ids() {
        let dfa = master(&["ab"]);
        let s = dfa.state(dfa.start());
        assert!(s.subset().contains(&StateId(0)));
        assert!(s.subset().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn same_subset_is_one_state() {
        // reading 'a' after the loop lands on the same NFA subset every time
        let dfa = master(&["(a|b)*c"]);
        let s1 = dfa.step(dfa.start(), 'a').unwrap();
        let s2 = dfa.step(s1, 'b').unwrap();
        let s3 = dfa.step(s2, 'a').unwrap();
        assert_eq!(s1, s3);
        assert_ne!(s1, s2);
        assert_eq!(dfa.accepts("ababc"), Some("t0"));
    }

    #[test]
    fn empty_nfa_gives_dead_start() {
        let dfa = Dfa::from_nfa(&StateGraph::new(), &[]);
        assert_eq!(dfa.len(), 1);
        assert_eq!(dfa.accepts(""), None);
        assert_eq!(dfa.step(dfa.start(), 'a'), None);
    }

    #[test]
    fn dump_lists_states() {
        let dfa = master(&["a"]);
        let text = dfa.dump();
        assert!(text.contains("d0"));
        assert!(text.contains("accept=t0"));
        assert!(text.contains("a -> d1"));
    }
}
