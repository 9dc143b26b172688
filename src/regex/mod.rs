// src/regex/mod.rs
pub mod ast;
pub mod compile;
pub mod parse;

pub use compile::{Resolve, compile};
pub use parse::{is_word, parse};
