//! Quantifier-free formula language accepted by the grounding oracle.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! or    := and ('|' and)*
//! and   := unary ('&' unary)*
//! unary := '~' unary | '(' or ')' | atom
//! atom  := IDENT '(' IDENT (',' IDENT)* ')'
//! ```
//!
//! Every argument is a variable; all variables are universally quantified.

use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formula {
    Atom { predicate: String, args: Vec<String> },
    Not(Box<Formula>),
    And(Vec<Formula>),
    Or(Vec<Formula>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub position: usize,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at offset {}: {}", self.position, self.message)
    }
}

impl std::error::Error for ParseError {}

impl Formula {
    pub fn parse(source: &str) -> Result<Formula, ParseError> {
        let mut parser = Parser { chars: source.chars().collect(), pos: 0 };
        let formula = parser.parse_or()?;
        parser.skip_ws();
        if parser.pos < parser.chars.len() {
            return Err(parser.error(format!("unexpected '{}'", parser.chars[parser.pos])));
        }
        Ok(formula)
    }

    /// Predicate symbols with their arity, or the first symbol used with two
    /// different arities.
    pub fn predicates(&self) -> Result<BTreeMap<String, usize>, String> {
        let mut out = BTreeMap::new();
        self.collect_predicates(&mut out)?;
        Ok(out)
    }

    /// Distinct variables in order of first appearance
    pub fn variables(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_predicates(&self, out: &mut BTreeMap<String, usize>) -> Result<(), String> {
        match self {
            Formula::Atom { predicate, args } => {
                match out.get(predicate) {
                    Some(&arity) if arity != args.len() => {
                        return Err(
                            format!("{} used with arity {} and {}", predicate, arity, args.len())
                        );
                    }
                    _ => {
                        out.insert(predicate.clone(), args.len());
                    }
                }
                Ok(())
            }
            Formula::Not(inner) => inner.collect_predicates(out),
            Formula::And(parts) | Formula::Or(parts) => {
                parts.iter().try_for_each(|p| p.collect_predicates(out))
            }
        }
    }

    fn collect_variables(&self, out: &mut Vec<String>) {
        match self {
            Formula::Atom { args, .. } => {
                for arg in args {
                    if !out.contains(arg) {
                        out.push(arg.clone());
                    }
                }
            }
            Formula::Not(inner) => inner.collect_variables(out),
            Formula::And(parts) | Formula::Or(parts) => {
                parts.iter().for_each(|p| p.collect_variables(out));
            }
        }
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError { position: self.pos, message: message.into() }
    }

    fn skip_ws(&mut self) {
        while self.pos < self.chars.len() && self.chars[self.pos].is_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.chars.get(self.pos).copied()
    }

    fn expect(&mut self, c: char) -> Result<(), ParseError> {
        match self.peek() {
            Some(found) if found == c => {
                self.pos += 1;
                Ok(())
            }
            Some(found) => Err(self.error(format!("expected '{}', found '{}'", c, found))),
            None => Err(self.error(format!("expected '{}', found end of input", c))),
        }
    }

    fn parse_or(&mut self) -> Result<Formula, ParseError> {
        let mut parts = vec![self.parse_and()?];
        while self.peek() == Some('|') {
            self.pos += 1;
            parts.push(self.parse_and()?);
        }
        Ok(if parts.len() == 1 { parts.remove(0) } else { Formula::Or(parts) })
    }

    fn parse_and(&mut self) -> Result<Formula, ParseError> {
        let mut parts = vec![self.parse_unary()?];
        while self.peek() == Some('&') {
            self.pos += 1;
            parts.push(self.parse_unary()?);
        }
        Ok(if parts.len() == 1 { parts.remove(0) } else { Formula::And(parts) })
    }

    fn parse_unary(&mut self) -> Result<Formula, ParseError> {
        match self.peek() {
            Some('~') => {
                self.pos += 1;
                Ok(Formula::Not(Box::new(self.parse_unary()?)))
            }
            Some('(') => {
                self.pos += 1;
                let inner = self.parse_or()?;
                self.expect(')')?;
                Ok(inner)
            }
            Some(_) => self.parse_atom(),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_atom(&mut self) -> Result<Formula, ParseError> {
        let predicate = self.parse_ident()?;
        self.expect('(')?;
        let mut args = vec![self.parse_ident()?];
        while self.peek() == Some(',') {
            self.pos += 1;
            args.push(self.parse_ident()?);
        }
        self.expect(')')?;
        Ok(Formula::Atom { predicate, args })
    }

    fn parse_ident(&mut self) -> Result<String, ParseError> {
        self.skip_ws();
        let start = self.pos;
        while let Some(&c) = self.chars.get(self.pos) {
            let ok = if self.pos == start { c.is_ascii_alphabetic() || c == '_' } else { c.is_ascii_alphanumeric() || c == '_' };
            if !ok {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected identifier"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }
}
