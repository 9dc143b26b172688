// src/regex/ast.rs
use crate::nfa::CharClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    ZeroOrMore,
    OneOrMore,
    ZeroOrOne,
}

/// Parsed pattern. One variant per construct; the compiler matches on the tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Literal(char),
    Class(CharClass),
    Concat(Vec<Node>),
    Alternate(Vec<Node>),
    Repeat { node: Box<Node>, kind: Repeat },
    Group(Box<Node>),
    Reference(String),
}

impl Node {
    /// Names referenced anywhere below this node, in pattern order.
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Node::Literal(_) | Node::Class(_) => {}
            Node::Concat(items) | Node::Alternate(items) => {
                for item in items {
                    item.collect_references(out);
                }
            }
            Node::Repeat { node, .. } | Node::Group(node) => node.collect_references(out),
            Node::Reference(name) => out.push(name),
        }
    }
}
