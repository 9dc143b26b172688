// src/nfa/mod.rs
pub mod charclass;
pub mod graph;

pub use charclass::CharClass;
pub use graph::{BuildContext, Label, State, StateGraph, StateId, Transition};
