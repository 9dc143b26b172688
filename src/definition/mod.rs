// src/definition/mod.rs
//! Line-oriented token definitions:
//!
//! ```text
//! # comment
//! :digit  : [0-9]
//! number  : {digit}+
//! ```
//!
//! A leading `:` marks a token internal: it can be referenced as `{digit}` from
//! later patterns but is never emitted itself. Repeating a name adds another
//! alternative to that token.

pub mod token;

use std::io::BufRead;

use hashbrown::HashMap;
use log::{debug, info, warn};

pub use token::TokenAutomaton;

use crate::error::DefinitionError;
use crate::lexer::dfa::Dfa;
use crate::nfa::{BuildContext, StateGraph};
use crate::regex::{Resolve, is_word};

/// A fully built tokenizer: every declared token plus the master DFA.
#[derive(Debug)]
pub struct TokenizerDefinition {
    tokens: Vec<TokenAutomaton>,
    by_name: HashMap<String, usize>,
    master_nfa: TokenAutomaton,
    master: Dfa,
}

/// One `[:]name:pattern` line split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration<'a> {
    pub name: &'a str,
    pub pattern: &'a str,
    pub internal: bool,
}

/// Splits a definition line. `Ok(None)` for blank and `#` lines.
pub fn parse_line(line: &str, line_no: usize) -> Result<Option<Declaration<'_>>, DefinitionError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (internal, rest) = match line.strip_prefix(':') {
        Some(rest) => (true, rest),
        None => (false, line),
    };
    let Some((name, pattern)) = rest.split_once(':') else {
        return Err(DefinitionError::MissingSeparator { line: line_no });
    };

    let name = name.trim();
    if name.is_empty() {
        return Err(DefinitionError::EmptyName { line: line_no });
    }
    if !is_word(name) {
        return Err(DefinitionError::InvalidName {
            line: line_no,
            name: name.to_string(),
        });
    }
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return Err(DefinitionError::EmptyPattern {
            line: line_no,
            name: name.to_string(),
        });
    }

    Ok(Some(Declaration {
        name,
        pattern,
        internal,
    }))
}

/// Accumulates declarations in order; [`DefinitionBuilder::finish`] builds the master.
#[derive(Debug, Default)]
pub struct DefinitionBuilder {
    tokens: Vec<TokenAutomaton>,
    by_name: HashMap<String, usize>,
    ctx: BuildContext,
}

struct Declared<'a> {
    tokens: &'a [TokenAutomaton],
    by_name: &'a HashMap<String, usize>,
}

impl Resolve for Declared<'_> {
    fn resolve(&self, name: &str) -> Option<&StateGraph> {
        self.by_name.get(name).map(|&i| self.tokens[i].graph())
    }
}

impl DefinitionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one source line; `line_no` is 1-based and only used for errors.
    pub fn line(&mut self, text: &str, line_no: usize) -> Result<(), DefinitionError> {
        match parse_line(text, line_no)? {
            Some(decl) => self.declare(decl.name, decl.pattern, decl.internal, line_no),
            None => Ok(()),
        }
    }

    /// Compiles one declaration. A repeated name becomes another alternative of
    /// the existing token; its internal flag stays as first declared.
    pub fn declare(
        &mut self,
        name: &str,
        pattern: &str,
        internal: bool,
        line_no: usize,
    ) -> Result<(), DefinitionError> {
        let existing = self.by_name.get(name).copied();
        let index = existing.unwrap_or(self.tokens.len());

        let resolver = Declared {
            tokens: &self.tokens,
            by_name: &self.by_name,
        };
        let compiled =
            TokenAutomaton::from_pattern(name, index, pattern, internal, &resolver, &mut self.ctx)
                .map_err(|e| DefinitionError::from_compile(line_no, e))?;

        match existing {
            Some(i) => {
                debug!("[definition] line {line_no}: `{name}` += /{pattern}/");
                self.tokens[i].alternate(compiled.into_graph(), &mut self.ctx);
            }
            None => {
                debug!(
                    "[definition] line {line_no}: `{name}`{} = /{pattern}/",
                    if internal { " (internal)" } else { "" }
                );
                self.by_name.insert(name.to_string(), index);
                self.tokens.push(compiled);
            }
        }
        Ok(())
    }

    /// Joins every non-internal token under a fresh start state and determinizes.
    pub fn finish(self) -> TokenizerDefinition {
        // new pass, new numbering for the combined graph
        let mut ctx = BuildContext::new();
        let mut nfa = StateGraph::new();
        let start = nfa.add(ctx.create_state());

        for tok in self.tokens.iter().filter(|t| !t.is_internal()) {
            let mut copy = tok.copy_graph(&mut ctx);
            let exit = copy.last();
            let state = copy.state_mut(exit);
            state.set_accepting(true);
            state.add_owner(tok.index());

            let offset = nfa.add_all(copy);
            nfa.epsilon(start, offset);
        }

        let names: Vec<String> = self
            .tokens
            .iter()
            .map(|t| t.name().unwrap_or_default().to_string())
            .collect();
        let master_nfa = TokenAutomaton::from_graph(None, nfa);
        let master = Dfa::from_nfa(master_nfa.graph(), &names);

        let emitted = self.tokens.iter().filter(|t| !t.is_internal()).count();
        info!(
            "[definition] {} tokens ({} emitted, {} token NFA states), master NFA {} states -> DFA {} states",
            self.tokens.len(),
            emitted,
            self.ctx.issued(),
            master_nfa.graph().len(),
            master.len()
        );
        if emitted == 0 {
            warn!("[definition] no non-internal tokens; the master DFA matches nothing");
        }
        for &t in master.state(master.start()).candidates() {
            warn!(
                "[definition] token `{}` matches the empty string; the scanner never emits empty tokens",
                names[t]
            );
        }
        #[cfg(feature = "dfa-debug")]
        debug!("[definition] master DFA:\n{}", master.dump());

        TokenizerDefinition {
            tokens: self.tokens,
            by_name: self.by_name,
            master_nfa,
            master,
        }
    }
}

impl TokenizerDefinition {
    /// Builds from definition text. Fails on the first bad line.
    pub fn parse(text: &str) -> Result<Self, DefinitionError> {
        let mut builder = DefinitionBuilder::new();
        for (i, line) in text.lines().enumerate() {
            builder.line(line, i + 1)?;
        }
        Ok(builder.finish())
    }

    /// Same as [`TokenizerDefinition::parse`], reading line by line.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, DefinitionError> {
        let mut builder = DefinitionBuilder::new();
        for (i, line) in reader.lines().enumerate() {
            let line_no = i + 1;
            let line = line.map_err(|source| DefinitionError::Io {
                line: line_no,
                source,
            })?;
            builder.line(&line, line_no)?;
        }
        Ok(builder.finish())
    }

    pub fn token(&self, name: &str) -> Option<&TokenAutomaton> {
        self.by_name.get(name).map(|&i| &self.tokens[i])
    }

    /// All tokens in declaration order, internal ones included.
    pub fn tokens(&self) -> &[TokenAutomaton] {
        &self.tokens
    }

    pub fn master(&self) -> &Dfa {
        &self.master
    }

    /// The combined NFA the master DFA was determinized from.
    pub fn master_nfa(&self) -> &TokenAutomaton {
        &self.master_nfa
    }
}
