// src/definition/token.rs
use crate::error::CompileError;
use crate::lexer::dfa::Dfa;
use crate::nfa::{BuildContext, StateGraph};
use crate::regex::{Resolve, compile};

/// The NFA for one named token (or, with no name, the combined master NFA).
#[derive(Debug, Clone)]
pub struct TokenAutomaton {
    name: Option<String>,
    /// Declaration order among all tokens; doubles as the match priority.
    index: usize,
    internal: bool,
    graph: StateGraph,
}

impl TokenAutomaton {
    /// Compiles `pattern` and marks the exit accepting, owned by `index`.
    pub fn from_pattern<R>(
        name: &str,
        index: usize,
        pattern: &str,
        internal: bool,
        resolver: &R,
        ctx: &mut BuildContext,
    ) -> Result<Self, CompileError>
    where
        R: Resolve + ?Sized,
    {
        let mut graph = compile(pattern, resolver, ctx)?;
        mark_exit(&mut graph, &[index]);
        Ok(Self {
            name: Some(name.to_string()),
            index,
            internal,
            graph,
        })
    }

    /// Wraps a pre-built graph as is. Only the master is built this way.
    pub fn from_graph(name: Option<String>, graph: StateGraph) -> Self {
        Self {
            name,
            index: 0,
            internal: false,
            graph,
        }
    }

    /// Adds `other` as another way of matching this token.
    ///
    /// Both old exits are demoted; the new shared exit accepts for the union of
    /// their owners.
    pub fn alternate(&mut self, other: StateGraph, ctx: &mut BuildContext) {
        let old = std::mem::take(&mut self.graph);

        let mut owners: Vec<usize> = Vec::new();
        let mut accepting = false;
        for g in [&old, &other] {
            let exit = g.state(g.last());
            accepting |= exit.is_accepting();
            owners.extend_from_slice(exit.owners());
        }

        let mut graph = StateGraph::new();
        let start = graph.add(ctx.create_state());
        let mut exits = Vec::with_capacity(2);
        for mut part in [old, other] {
            let part_exit = part.last();
            part.state_mut(part_exit).demote();
            let offset = graph.add_all(part);
            graph.epsilon(start, offset);
            exits.push(offset + part_exit);
        }
        let exit = graph.add(ctx.create_state());
        for e in exits {
            graph.epsilon(e, exit);
        }
        if accepting {
            mark_exit(&mut graph, &owners);
        }
        self.graph = graph;
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_internal(&self) -> bool {
        self.internal
    }

    pub fn graph(&self) -> &StateGraph {
        &self.graph
    }

    pub fn into_graph(self) -> StateGraph {
        self.graph
    }

    /// A fresh, independent copy of this token's NFA.
    pub fn copy_graph(&self, ctx: &mut BuildContext) -> StateGraph {
        self.graph.deep_copy(ctx)
    }

    /// Determinizes this token on its own, ignoring every other declaration.
    pub fn to_dfa(&self) -> Dfa {
        let mut ctx = BuildContext::new();
        let mut copy = self.graph.deep_copy(&mut ctx);
        copy.clear_acceptance();
        mark_exit(&mut copy, &[0]);
        Dfa::from_nfa(&copy, &[self.name.clone().unwrap_or_default()])
    }
}

fn mark_exit(graph: &mut StateGraph, owners: &[usize]) {
    let exit = graph.last();
    let state = graph.state_mut(exit);
    state.set_accepting(true);
    for &o in owners {
        state.add_owner(o);
    }
}
