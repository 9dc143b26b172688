// src/lexer/scanner.rs
// Longest-match scanner over any automaton that can step one char at a time.

use hashbrown::HashSet;
use rayon::prelude::*;

use super::dfa::Dfa;
use crate::error::ScanError;

/// What the scanner needs from a compiled automaton. State handles are opaque.
pub trait Automaton {
    fn start(&self) -> u32;
    fn next(&self, state: u32, c: char) -> Option<u32>;
    fn token_of(&self, state: u32) -> Option<&str>;

    /// Longest non-empty prefix of `input[at..]` that ends in an accepting state.
    /// Returns its byte length and token name.
    fn longest_match(&self, input: &str, at: usize) -> Option<(usize, &str)> {
        let rest = input.get(at..)?;
        let mut state = self.start();
        let mut best = None;
        for (off, c) in rest.char_indices() {
            match self.next(state, c) {
                Some(s) => state = s,
                None => break,
            }
            if let Some(name) = self.token_of(state) {
                best = Some((off + c.len_utf8(), name));
            }
        }
        best
    }
}

impl Automaton for Dfa {
    fn start(&self) -> u32 {
        Dfa::start(self).0
    }

    fn next(&self, state: u32, c: char) -> Option<u32> {
        self.step(super::dfa::DfaStateId(state), c).map(|s| s.0)
    }

    fn token_of(&self, state: u32) -> Option<&str> {
        self.accepting(super::dfa::DfaStateId(state))
    }
}

/// Byte offset plus 1-based line and column (columns count chars).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

impl Position {
    fn advance(&mut self, c: char) {
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub name: &'a str,
    pub lexeme: &'a str,
    pub position: Position,
}

/// Lazy token stream.
///
/// On a position nothing matches it yields the error, steps over one char, and
/// carries on; collecting into `Result<Vec<_>, _>` therefore stops at the first one.
pub struct Scanner<'a, A: Automaton + ?Sized> {
    automaton: &'a A,
    input: &'a str,
    pos: Position,
    skip: HashSet<String>,
}

impl<'a, A: Automaton + ?Sized> Scanner<'a, A> {
    pub fn new(automaton: &'a A, input: &'a str) -> Self {
        Self {
            automaton,
            input,
            pos: Position::default(),
            skip: HashSet::new(),
        }
    }

    /// Drops tokens with these names from the output (whitespace, comments...).
    pub fn skip_tokens<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn position(&self) -> Position {
        self.pos
    }
}

impl<'a, A: Automaton + ?Sized> Iterator for Scanner<'a, A> {
    type Item = Result<Token<'a>, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        let automaton = self.automaton;
        let input = self.input;
        loop {
            let start = self.pos;
            let rest = input.get(start.offset..).filter(|r| !r.is_empty())?;

            match automaton.longest_match(input, start.offset) {
                Some((len, name)) => {
                    let lexeme = &rest[..len];
                    for c in lexeme.chars() {
                        self.pos.advance(c);
                    }
                    if self.skip.contains(name) {
                        continue;
                    }
                    return Some(Ok(Token {
                        name,
                        lexeme,
                        position: start,
                    }));
                }
                None => {
                    let found = rest.chars().next()?;
                    self.pos.advance(found);
                    return Some(Err(ScanError::NoMatch {
                        position: start,
                        found,
                    }));
                }
            }
        }
    }
}

/// Every token of `input`, or the first position nothing matches.
pub fn tokenize<'a, A>(automaton: &'a A, input: &'a str) -> Result<Vec<Token<'a>>, ScanError>
where
    A: Automaton + ?Sized,
{
    Scanner::new(automaton, input).collect()
}

/// Scans independent inputs in parallel against one shared automaton.
pub fn scan_batch<'a, A>(
    automaton: &'a A,
    inputs: &[&'a str],
) -> Vec<Result<Vec<Token<'a>>, ScanError>>
where
    A: Automaton + Sync + ?Sized,
{
    inputs
        .par_iter()
        .map(|input| tokenize(automaton, input))
        .collect()
}

/// A short single-line excerpt around `offset`, for diagnostics.
pub fn excerpt(src: &str, offset: usize) -> (usize, String) {
    let mut lo = offset.saturating_sub(16).min(src.len());
    while !src.is_char_boundary(lo) {
        lo -= 1;
    }
    let mut hi = (offset + 16).min(src.len());
    while !src.is_char_boundary(hi) {
        hi += 1;
    }
    let text = src[lo..hi]
        .chars()
        .map(|c| if c.is_control() { '·' } else { c })
        .collect();
    (lo, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::TokenizerDefinition;

    fn def(text: &str) -> TokenizerDefinition {
        TokenizerDefinition::parse(text).unwrap()
    }

    #[test]
    fn longest_match_wins() {
        let d = def("eq:=\neqeq:==\nid:[a-z]+");
        let toks = tokenize(d.master(), "==a=").unwrap();
        let got: Vec<(&str, &str)> = toks.iter().map(|t| (t.name, t.lexeme)).collect();
        assert_eq!(got, vec![("eqeq", "=="), ("id", "a"), ("eq", "=")]);
    }

    #[test]
    fn backs_off_to_last_accepting_state() {
        // "1." is a dead end for `real`, so scanning falls back to `int`
        let d = def("int:[0-9]+\nreal:[0-9]+\\.[0-9]+\ndot:\\.");
        let err = tokenize(d.master(), "1.x").unwrap_err();
        assert_eq!(err.position().offset, 2);

        let toks = tokenize(d.master(), "1.").unwrap();
        let got: Vec<&str> = toks.iter().map(|t| t.name).collect();
        assert_eq!(got, vec!["int", "dot"]);
    }

    #[test]
    fn positions_track_lines_and_columns() {
        let d = def("id:[a-z]+\nnl:\\n\nws:[ ]+");
        let toks: Vec<Token> = Scanner::new(d.master(), "ab\n  cd")
            .skip_tokens(["ws", "nl"])
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(toks.len(), 2);
        assert_eq!(
            toks[1].position,
            Position {
                offset: 5,
                line: 2,
                column: 3
            }
        );
    }

    #[test]
    fn errors_resynchronise() {
        let d = def("id:[a-z]+");
        let items: Vec<_> = Scanner::new(d.master(), "ab?cd").collect();
        assert_eq!(items.len(), 3);
        assert!(items[0].is_ok());
        assert_eq!(
            items[1],
            Err(ScanError::NoMatch {
                position: Position {
                    offset: 2,
                    line: 1,
                    column: 3
                },
                found: '?'
            })
        );
        assert_eq!(items[2].as_ref().unwrap().lexeme, "cd");
    }

    #[test]
    fn empty_matching_token_is_never_emitted() {
        let d = def("maybe:a*");
        assert!(tokenize(d.master(), "").unwrap().is_empty());
        assert!(tokenize(d.master(), "b").is_err());
        assert_eq!(tokenize(d.master(), "aa").unwrap()[0].lexeme, "aa");
    }

    #[test]
    fn batch_matches_sequential() {
        let d = def("num:[0-9]+\nws:[ ]+");
        let inputs = ["1 2", "33", "x"];
        let batch = scan_batch(d.master(), &inputs);
        for (input, got) in inputs.iter().zip(&batch) {
            assert_eq!(got, &tokenize(d.master(), input));
        }
        assert!(batch[2].is_err());
    }

    #[test]
    fn excerpt_respects_char_boundaries() {
        let src = "ééééééééééééééééééééx";
        let (lo, text) = excerpt(src, 30);
        assert!(src.is_char_boundary(lo));
        assert!(text.ends_with('x'));
    }
}
