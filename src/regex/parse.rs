// src/regex/parse.rs
//
// Recursive descent over the pattern grammar:
//
//   alternation := concat ('|' concat)*
//   concat      := repeat+
//   repeat      := atom ('*' | '+' | '?')*
//   atom        := char | '\' esc | '.' | '[' class ']' | '(' alternation ')' | '{' name '}'

use super::ast::{Node, Repeat};
use crate::error::RegexError;
use crate::nfa::CharClass;

pub fn parse(pattern: &str) -> Result<Node, RegexError> {
    let mut p = Parser {
        chars: pattern.chars().collect(),
        pos: 0,
    };
    let node = p.alternation()?;
    match p.peek() {
        None => Ok(node),
        // concat only stops early on ')' or '|', and alternation eats every '|'
        Some(_) => Err(RegexError::UnmatchedParen { at: p.pos }),
    }
}

/// `\w+` in ASCII terms; shared with the definition-line parser.
pub fn is_word(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

enum ClassItem {
    Char(char),
    Set(CharClass),
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn alternation(&mut self) -> Result<Node, RegexError> {
        let mut branches = vec![self.concat()?];
        while self.eat('|') {
            branches.push(self.concat()?);
        }
        Ok(if branches.len() == 1 {
            branches.swap_remove(0)
        } else {
            Node::Alternate(branches)
        })
    }

    fn concat(&mut self) -> Result<Node, RegexError> {
        let mut items = Vec::new();
        while let Some(c) = self.peek() {
            if c == '|' || c == ')' {
                break;
            }
            items.push(self.repeat()?);
        }
        match items.len() {
            0 => Err(RegexError::EmptyAlternative { at: self.pos }),
            1 => Ok(items.swap_remove(0)),
            _ => Ok(Node::Concat(items)),
        }
    }

    fn repeat(&mut self) -> Result<Node, RegexError> {
        let mut node = self.atom()?;
        loop {
            let kind = match self.peek() {
                Some('*') => Repeat::ZeroOrMore,
                Some('+') => Repeat::OneOrMore,
                Some('?') => Repeat::ZeroOrOne,
                _ => break,
            };
            self.pos += 1;
            node = Node::Repeat {
                node: Box::new(node),
                kind,
            };
        }
        Ok(node)
    }

    fn atom(&mut self) -> Result<Node, RegexError> {
        let at = self.pos;
        let Some(c) = self.bump() else {
            return Err(RegexError::EmptyAlternative { at });
        };
        match c {
            '(' => {
                if self.peek() == Some(')') {
                    return Err(RegexError::EmptyGroup { at });
                }
                let inner = self.alternation()?;
                if !self.eat(')') {
                    return Err(RegexError::UnclosedGroup { at });
                }
                Ok(Node::Group(Box::new(inner)))
            }
            '*' | '+' | '?' => Err(RegexError::NothingToRepeat { op: c, at }),
            '[' => self.class(at).map(Node::Class),
            '{' => self.reference(at),
            '.' => Ok(Node::Class(CharClass::any_but_newline())),
            '\\' => match self.escape()? {
                ClassItem::Char(c) => Ok(Node::Literal(c)),
                ClassItem::Set(set) => Ok(Node::Class(set)),
            },
            c => Ok(Node::Literal(c)),
        }
    }

    fn escape(&mut self) -> Result<ClassItem, RegexError> {
        let c = self.bump().ok_or(RegexError::TrailingEscape)?;
        Ok(match c {
            'n' => ClassItem::Char('\n'),
            't' => ClassItem::Char('\t'),
            'r' => ClassItem::Char('\r'),
            '0' => ClassItem::Char('\0'),
            'd' => ClassItem::Set(CharClass::digit()),
            'D' => ClassItem::Set(CharClass::digit().negate()),
            'w' => ClassItem::Set(CharClass::word()),
            'W' => ClassItem::Set(CharClass::word().negate()),
            's' => ClassItem::Set(CharClass::space()),
            'S' => ClassItem::Set(CharClass::space().negate()),
            other => ClassItem::Char(other),
        })
    }

    fn class(&mut self, open: usize) -> Result<CharClass, RegexError> {
        let negated = self.eat('^');
        let mut set = CharClass::empty();
        let mut first = true;

        loop {
            let at = self.pos;
            let item = match self.bump() {
                None => return Err(RegexError::UnterminatedClass { at: open }),
                Some(']') if first => return Err(RegexError::EmptyClass { at: open }),
                Some(']') => break,
                Some('\\') => self.escape()?,
                Some(c) => ClassItem::Char(c),
            };
            first = false;

            let is_range = self.peek() == Some('-')
                && !matches!(self.chars.get(self.pos + 1), None | Some(']'));

            match item {
                ClassItem::Set(_) if is_range => {
                    return Err(RegexError::InvalidRangeEndpoint { at });
                }
                ClassItem::Set(s) => set = set.union(&s),
                ClassItem::Char(lo) if is_range => {
                    self.pos += 1; // '-'
                    let hi_at = self.pos;
                    let hi = match self.bump() {
                        Some('\\') => match self.escape()? {
                            ClassItem::Char(c) => c,
                            ClassItem::Set(_) => {
                                return Err(RegexError::InvalidRangeEndpoint { at: hi_at });
                            }
                        },
                        Some(c) => c,
                        None => return Err(RegexError::UnterminatedClass { at: open }),
                    };
                    if lo > hi {
                        return Err(RegexError::ReversedRange { lo, hi, at });
                    }
                    set = set.union(&CharClass::range(lo, hi));
                }
                ClassItem::Char(c) => set = set.union(&CharClass::single(c)),
            }
        }

        let set = if negated { set.negate() } else { set };
        if set.is_empty() {
            // e.g. `[^\s\S]`: a transition nothing can take
            return Err(RegexError::EmptyClass { at: open });
        }
        Ok(set)
    }

    fn reference(&mut self, open: usize) -> Result<Node, RegexError> {
        let mut name = String::new();
        loop {
            match self.bump() {
                None => return Err(RegexError::UnterminatedReference { at: open }),
                Some('}') => break,
                Some(c) => name.push(c),
            }
        }
        if !is_word(&name) {
            return Err(RegexError::InvalidReference { name, at: open });
        }
        Ok(Node::Reference(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(c: char) -> Node {
        Node::Literal(c)
    }

    #[test]
    fn precedence_alternation_lowest() {
        let n = parse("ab|c*").unwrap();
        assert_eq!(
            n,
            Node::Alternate(vec![
                Node::Concat(vec![lit('a'), lit('b')]),
                Node::Repeat {
                    node: Box::new(lit('c')),
                    kind: Repeat::ZeroOrMore
                },
            ])
        );
    }

    #[test]
    fn classes_and_escapes() {
        let Node::Class(c) = parse("[a-c_\\]]").unwrap() else {
            panic!("expected class");
        };
        for ch in ['a', 'b', 'c', '_', ']'] {
            assert!(c.contains(ch), "{ch:?}");
        }
        assert!(!c.contains('d'));

        let Node::Class(neg) = parse("[^0-9]").unwrap() else {
            panic!("expected class");
        };
        assert!(!neg.contains('5'));
        assert!(neg.contains('x'));

        let Node::Class(dash) = parse("[-+]").unwrap() else {
            panic!("expected class");
        };
        assert!(dash.contains('-') && dash.contains('+'));

        assert_eq!(parse("\\.").unwrap(), lit('.'));
        assert_eq!(parse("\\n").unwrap(), lit('\n'));
    }

    fn class_of(pattern: &str) -> CharClass {
        match parse(pattern).unwrap() {
            Node::Class(c) => c,
            other => panic!("{pattern:?} parsed to {other:?}"),
        }
    }

    #[test]
    fn shorthand_escapes() {
        assert_eq!(parse("\\t").unwrap(), lit('\t'));
        assert_eq!(parse("\\r").unwrap(), lit('\r'));
        assert_eq!(parse("\\0").unwrap(), lit('\0'));
        assert_eq!(parse("\\*").unwrap(), lit('*'));

        let d = class_of("\\d");
        assert!(d.contains('0') && d.contains('9') && !d.contains('a'));
        let not_d = class_of("\\D");
        assert!(!not_d.contains('5'));
        assert!(not_d.contains('x') && not_d.contains('λ'));

        let w = class_of("\\w");
        for ch in ['a', 'Z', '0', '_'] {
            assert!(w.contains(ch), "{ch:?}");
        }
        assert!(!w.contains('-') && !w.contains('é'));
        let not_w = class_of("\\W");
        assert!(not_w.contains('-') && !not_w.contains('_'));

        let s = class_of("\\s");
        for ch in [' ', '\t', '\r', '\n', '\u{0B}', '\u{0C}'] {
            assert!(s.contains(ch), "{ch:?}");
        }
        assert!(!s.contains('a') && !s.contains('\u{A0}'));
        let not_s = class_of("\\S");
        assert!(not_s.contains('a') && !not_s.contains('\u{0C}'));
    }

    #[test]
    fn shorthands_inside_classes() {
        let c = class_of("[\\w-]");
        assert!(c.contains('q') && c.contains('_') && c.contains('-'));
        assert!(!c.contains(' '));

        let c = class_of("[^\\s\\d]");
        assert!(c.contains('x'));
        assert!(!c.contains('7') && !c.contains('\u{0B}'));

        assert_eq!(
            parse("[\\d-z]"),
            Err(RegexError::InvalidRangeEndpoint { at: 1 })
        );
        assert_eq!(
            parse("x[^\\s\\S]"),
            Err(RegexError::EmptyClass { at: 1 })
        );
    }

    #[test]
    fn references_are_collected() {
        let n = parse("{digit}+(\\.{digit}+)?").unwrap();
        assert_eq!(n.references(), vec!["digit", "digit"]);
    }

    #[test]
    fn syntax_errors_report_offsets() {
        assert_eq!(parse("(ab"), Err(RegexError::UnclosedGroup { at: 0 }));
        assert_eq!(parse("ab)"), Err(RegexError::UnmatchedParen { at: 2 }));
        assert_eq!(parse("a()"), Err(RegexError::EmptyGroup { at: 1 }));
        assert_eq!(parse("a|"), Err(RegexError::EmptyAlternative { at: 2 }));
        assert_eq!(parse("|a"), Err(RegexError::EmptyAlternative { at: 0 }));
        assert_eq!(
            parse("*a"),
            Err(RegexError::NothingToRepeat { op: '*', at: 0 })
        );
        assert_eq!(
            parse("a|+"),
            Err(RegexError::NothingToRepeat { op: '+', at: 2 })
        );
        assert_eq!(parse("x[ab"), Err(RegexError::UnterminatedClass { at: 1 }));
        assert_eq!(parse("[]"), Err(RegexError::EmptyClass { at: 0 }));
        assert_eq!(
            parse("[z-a]"),
            Err(RegexError::ReversedRange {
                lo: 'z',
                hi: 'a',
                at: 1
            })
        );
        assert_eq!(
            parse("[\\d-z]"),
            Err(RegexError::InvalidRangeEndpoint { at: 1 })
        );
        assert_eq!(
            parse("{abc"),
            Err(RegexError::UnterminatedReference { at: 0 })
        );
        assert!(matches!(
            parse("{a-b}"),
            Err(RegexError::InvalidReference { .. })
        ));
        assert_eq!(parse("ab\\"), Err(RegexError::TrailingEscape));
    }
}
