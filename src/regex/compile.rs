// src/regex/compile.rs
// Thompson construction: every fragment has one start (index 0) and one exit (last).

use super::ast::{Node, Repeat};
use super::parse::parse;
use crate::error::CompileError;
use crate::nfa::{BuildContext, CharClass, Label, StateGraph};

/// Looks up previously declared token fragments by name.
pub trait Resolve {
    fn resolve(&self, name: &str) -> Option<&StateGraph>;
}

/// Compiles `pattern` into a fragment whose exit is *not* yet accepting.
pub fn compile<R>(
    pattern: &str,
    resolver: &R,
    ctx: &mut BuildContext,
) -> Result<StateGraph, CompileError>
where
    R: Resolve + ?Sized,
{
    let ast = parse(pattern)?;
    // fail before any state ids are spent
    if let Some(missing) = ast
        .references()
        .into_iter()
        .find(|name| resolver.resolve(name).is_none())
    {
        return Err(CompileError::UnresolvedReference(missing.to_string()));
    }
    build(&ast, resolver, ctx)
}

fn build<R>(node: &Node, resolver: &R, ctx: &mut BuildContext) -> Result<StateGraph, CompileError>
where
    R: Resolve + ?Sized,
{
    match node {
        Node::Literal(c) => Ok(symbol(ctx, CharClass::single(*c))),
        Node::Class(class) => Ok(symbol(ctx, class.clone())),
        Node::Concat(items) => {
            let mut graph = StateGraph::new();
            for item in items {
                let next = build(item, resolver, ctx)?;
                if graph.is_empty() {
                    graph = next;
                } else {
                    let exit = graph.last();
                    let start = graph.add_all(next);
                    graph.epsilon(exit, start);
                }
            }
            Ok(graph)
        }
        Node::Alternate(branches) => {
            let mut graph = StateGraph::new();
            let start = graph.add(ctx.create_state());
            let mut exits = Vec::with_capacity(branches.len());
            for branch in branches {
                let frag = build(branch, resolver, ctx)?;
                let frag_exit = frag.last();
                let offset = graph.add_all(frag);
                graph.epsilon(start, offset);
                exits.push(offset + frag_exit);
            }
            let exit = graph.add(ctx.create_state());
            for e in exits {
                graph.epsilon(e, exit);
            }
            Ok(graph)
        }
        Node::Repeat { node, kind } => {
            let inner = build(node, resolver, ctx)?;
            Ok(match kind {
                Repeat::ZeroOrMore => wrap(ctx, inner, true, true),
                Repeat::OneOrMore => wrap(ctx, inner, true, false),
                Repeat::ZeroOrOne => wrap(ctx, inner, false, true),
            })
        }
        Node::Group(inner) => build(inner, resolver, ctx),
        Node::Reference(name) => {
            let found = resolver
                .resolve(name)
                .ok_or_else(|| CompileError::UnresolvedReference(name.clone()))?;
            // the declared fragment stays untouched; its acceptance must not leak
            // into the middle of the referencing pattern
            let mut copy = found.deep_copy(ctx);
            copy.clear_acceptance();
            Ok(copy)
        }
    }
}

fn symbol(ctx: &mut BuildContext, class: CharClass) -> StateGraph {
    let mut graph = StateGraph::new();
    let start = graph.add(ctx.create_state());
    let exit = graph.add(ctx.create_state());
    graph.connect(start, Label::Class(class), exit);
    graph
}

/// New start/exit around `inner`: `loop_back` repeats it, `bypass` allows skipping it.
fn wrap(ctx: &mut BuildContext, inner: StateGraph, loop_back: bool, bypass: bool) -> StateGraph {
    let inner_exit = inner.last();
    let mut graph = StateGraph::new();
    let start = graph.add(ctx.create_state());
    let offset = graph.add_all(inner);
    let exit = graph.add(ctx.create_state());

    graph.epsilon(start, offset);
    graph.epsilon(offset + inner_exit, exit);
    if loop_back {
        graph.epsilon(offset + inner_exit, offset);
    }
    if bypass {
        graph.epsilon(start, exit);
    }
    graph
}
