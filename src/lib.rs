// src/lib.rs
//! Lexer generator: regular-expression token definitions compiled into one
//! deterministic automaton, plus a longest-match scanner that runs it.

pub mod definition;
pub mod error;
pub mod lexer;
pub mod nfa;
pub mod regex;

pub use definition::{TokenAutomaton, TokenizerDefinition};
pub use error::{CompileError, DefinitionError, RegexError, ScanError};
pub use lexer::{
    dfa::Dfa,
    scanner::{Automaton, Position, Scanner, Token, tokenize},
    tables::DfaTables,
};
