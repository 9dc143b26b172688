// src/error.rs
use thiserror::Error;

use crate::lexer::scanner::Position;

/// Malformed pattern text. Offsets are character offsets into the pattern.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegexError {
    #[error("unmatched ')' at offset {at}")]
    UnmatchedParen { at: usize },
    #[error("group opened at offset {at} is never closed")]
    UnclosedGroup { at: usize },
    #[error("empty group at offset {at}")]
    EmptyGroup { at: usize },
    #[error("empty alternative at offset {at}")]
    EmptyAlternative { at: usize },
    #[error("'{op}' at offset {at} has nothing to repeat")]
    NothingToRepeat { op: char, at: usize },
    #[error("character class opened at offset {at} is never closed")]
    UnterminatedClass { at: usize },
    #[error("empty character class at offset {at}")]
    EmptyClass { at: usize },
    #[error("reversed range {lo:?}-{hi:?} at offset {at}")]
    ReversedRange { lo: char, hi: char, at: usize },
    #[error("shorthand class cannot bound a range at offset {at}")]
    InvalidRangeEndpoint { at: usize },
    #[error("reference opened at offset {at} is never closed")]
    UnterminatedReference { at: usize },
    #[error("invalid reference name \"{name}\" at offset {at}")]
    InvalidReference { name: String, at: usize },
    #[error("pattern ends with a bare '\\'")]
    TrailingEscape,
}

/// Failure to turn a pattern into an NFA fragment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error(transparent)]
    Syntax(#[from] RegexError),
    #[error("reference to undefined token \"{0}\"")]
    UnresolvedReference(String),
}

/// Why a tokenizer definition could not be built. `line` is 1-based.
#[derive(Error, Debug)]
pub enum DefinitionError {
    #[error("line {line}: invalid token definition, expected `[:]name:pattern`")]
    MissingSeparator { line: usize },
    #[error("line {line}: token name not defined")]
    EmptyName { line: usize },
    #[error("line {line}: invalid token name \"{name}\"")]
    InvalidName { line: usize, name: String },
    #[error("line {line}: regular expression not defined for token \"{name}\"")]
    EmptyPattern { line: usize, name: String },
    #[error("line {line}: {source}")]
    Regex {
        line: usize,
        #[source]
        source: RegexError,
    },
    #[error("line {line}: reference to undefined token \"{name}\"")]
    UnresolvedReference { line: usize, name: String },
    #[error("line {line}: failed to read definition: {source}")]
    Io {
        line: usize,
        #[source]
        source: std::io::Error,
    },
}

impl DefinitionError {
    pub fn line(&self) -> usize {
        match self {
            Self::MissingSeparator { line }
            | Self::EmptyName { line }
            | Self::InvalidName { line, .. }
            | Self::EmptyPattern { line, .. }
            | Self::Regex { line, .. }
            | Self::UnresolvedReference { line, .. }
            | Self::Io { line, .. } => *line,
        }
    }

    pub(crate) fn from_compile(line: usize, err: CompileError) -> Self {
        match err {
            CompileError::Syntax(source) => Self::Regex { line, source },
            CompileError::UnresolvedReference(name) => Self::UnresolvedReference { line, name },
        }
    }
}

/// Raised by the scanner; the automaton itself is untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error(
        "no token matches {found:?} at line {}, column {} (offset {})",
        .position.line,
        .position.column,
        .position.offset
    )]
    NoMatch { position: Position, found: char },
}

impl ScanError {
    pub fn position(&self) -> Position {
        match self {
            Self::NoMatch { position, .. } => *position,
        }
    }
}
