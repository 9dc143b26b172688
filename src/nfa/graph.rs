// src/nfa/graph.rs
use std::fmt;

use super::charclass::CharClass;

/// Identity handed out by a [`BuildContext`]. Unique within one construction pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub u32);

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Owns the id counter for one construction pass.
///
/// Starting a fresh pass means making a new context; there is no way to rewind
/// one that still has live states.
#[derive(Debug, Default)]
pub struct BuildContext {
    next_id: u32,
}

impl BuildContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_state(&mut self) -> State {
        let id = StateId(self.next_id);
        self.next_id += 1;
        State {
            id,
            accepting: false,
            owners: Vec::new(),
            transitions: Vec::new(),
        }
    }

    /// Number of states created so far in this pass.
    pub fn issued(&self) -> u32 {
        self.next_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    Epsilon,
    Class(CharClass),
}

/// Edge to another state of the same graph; `to` is an index into that graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub label: Label,
    pub to: usize,
}

#[derive(Debug, Clone)]
pub struct State {
    id: StateId,
    accepting: bool,
    // token indices; lower index = declared earlier = higher priority
    owners: Vec<usize>,
    transitions: Vec<Transition>,
}

impl State {
    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    pub fn set_accepting(&mut self, accepting: bool) {
        self.accepting = accepting;
    }

    /// Drops acceptance and ownership, e.g. for an exit that is no longer the exit.
    pub fn demote(&mut self) {
        self.accepting = false;
        self.owners.clear();
    }

    pub fn owners(&self) -> &[usize] {
        &self.owners
    }

    pub fn add_owner(&mut self, token: usize) {
        if let Err(at) = self.owners.binary_search(&token) {
            self.owners.insert(at, token);
        }
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }
}

/// Ordered arena of states. Transitions point at indices inside the same arena,
/// so cyclic graphs need no shared ownership.
///
/// Fragments built by the regex compiler keep their start state at index 0 and
/// their exit state at the end, which is what [`StateGraph::first`] and
/// [`StateGraph::last`] report.
#[derive(Debug, Clone, Default)]
pub struct StateGraph {
    states: Vec<State>,
}

impl StateGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn state(&self, idx: usize) -> &State {
        &self.states[idx]
    }

    pub fn state_mut(&mut self, idx: usize) -> &mut State {
        &mut self.states[idx]
    }

    /// Index of the start state. The graph must not be empty.
    pub fn first(&self) -> usize {
        0
    }

    /// Index of the exit state. The graph must not be empty.
    pub fn last(&self) -> usize {
        self.states.len().saturating_sub(1)
    }

    pub fn add(&mut self, state: State) -> usize {
        self.states.push(state);
        self.states.len() - 1
    }

    /// Appends every state of `other`, rebasing its transitions.
    /// Returns the offset at which `other`'s index 0 now lives.
    pub fn add_all(&mut self, other: StateGraph) -> usize {
        let offset = self.states.len();
        self.states.extend(other.states.into_iter().map(|mut s| {
            for t in &mut s.transitions {
                t.to += offset;
            }
            s
        }));
        offset
    }

    pub fn connect(&mut self, from: usize, label: Label, to: usize) {
        self.states[from].transitions.push(Transition { label, to });
    }

    pub fn epsilon(&mut self, from: usize, to: usize) {
        self.connect(from, Label::Epsilon, to);
    }

    /// Isomorphic copy with fresh identities from `ctx`. Accepting flags and
    /// owners come across verbatim; nothing is shared with `self`.
    pub fn deep_copy(&self, ctx: &mut BuildContext) -> StateGraph {
        let states = self
            .states
            .iter()
            .map(|s| {
                let mut copy = ctx.create_state();
                copy.accepting = s.accepting;
                copy.owners = s.owners.clone();
                copy.transitions = s.transitions.clone();
                copy
            })
            .collect();
        StateGraph { states }
    }

    pub fn clear_acceptance(&mut self) {
        for s in &mut self.states {
            s.demote();
        }
    }
}
