// src/lexer/mod.rs
pub mod dfa;
pub mod scanner;
pub mod tables;
