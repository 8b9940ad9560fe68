// Copyright 2019 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use {
  crate::{
    grammar::{Grammar, GrammarError, Terminal},
    scanner::{CharScanner, ScanError, Scanner, Token},
    utils::Name,
  },
  std::sync::Arc,
};

pub mod earley;
pub mod tree;

pub use tree::{Actions, ParseTree, Reduction, Span, TreeBuilder};

/// The input could not be parsed.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SyntaxError {
  /// Index of the first token that could not be consumed. Equal to the token
  /// count if the input ended too early.
  pub position: usize,
  /// Byte offset of `position` in the input.
  pub offset: usize,
  /// The offending token, or None at the end of the input.
  pub token: Option<Token>,
  /// Terminals that would have been accepted at `position`.
  pub expected: Vec<Terminal>,
  pub state_count: usize,
}

impl std::fmt::Display for SyntaxError {
  fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
    match &self.token {
      Some(token) => write!(
        fmt,
        "Unexpected {:?} at offset {}",
        token.text, self.offset
      )?,
      None => write!(fmt, "Unexpected end of input at offset {}", self.offset)?,
    }
    if !self.expected.is_empty() {
      let expected: Vec<_> =
        self.expected.iter().map(Terminal::to_string).collect();
      write!(fmt, "; expected one of: {}", expected.join(", "))?;
    }
    Ok(())
  }
}

impl std::error::Error for SyntaxError {}

#[derive(Clone, PartialEq, Eq, Debug, thiserror::Error)]
pub enum ParseError {
  #[error(transparent)]
  Scan(#[from] ScanError),
  #[error(transparent)]
  Syntax(#[from] SyntaxError),
}

/// A successful parse.
#[derive(Clone, PartialEq, Debug)]
pub struct Parsed<V> {
  pub value: V,
  pub tokens: Vec<Token>,
  pub state_count: usize,
}

/// Parses text against a shared grammar.
///
/// ```rust
/// # use std::sync::Arc;
/// # use furrow::{compilers::plain, parsers::Parser, scanner::GrammarScanner};
/// let grammar = Arc::new(
///   plain::compile(r#"greeting: "hi" name  name: /[a-z]+/  ~ " ""#).unwrap(),
/// );
/// let scanner = GrammarScanner::new(&grammar);
/// let parser = Parser::new(grammar).with_scanner(scanner);
/// let parsed = parser.parse("hi bob").unwrap();
/// assert_eq!(parsed.value.text(), "hibob");
/// assert!(parser.parse("hi").is_err());
/// ```
#[derive(Derivative)]
#[derivative(Clone(bound = "S: Clone"), Debug(bound = ""))]
pub struct Parser<S = CharScanner> {
  grammar: Arc<Grammar>,
  start: usize,
  #[derivative(Debug = "ignore")]
  scanner: S,
}

impl Parser<CharScanner> {
  /// Creates a parser that starts at the grammar's first rule and scans one
  /// token per character.
  pub fn new(grammar: Arc<Grammar>) -> Self {
    Parser {
      grammar,
      start: 0,
      scanner: CharScanner,
    }
  }
}

impl<S: Scanner> Parser<S> {
  pub fn with_scanner<S2: Scanner>(self, scanner: S2) -> Parser<S2> {
    Parser {
      grammar: self.grammar,
      start: self.start,
      scanner,
    }
  }

  pub fn with_start(mut self, rule: &str) -> Result<Self, GrammarError> {
    self.start = self
      .grammar
      .rule_index(rule)
      .ok_or_else(|| GrammarError::UndefinedRule(Name::new(rule)))?;
    Ok(self)
  }

  pub fn grammar(&self) -> &Arc<Grammar> {
    &self.grammar
  }

  pub fn scanner(&self) -> &S {
    &self.scanner
  }

  pub fn start_rule(&self) -> usize {
    self.start
  }

  pub fn parse(&self, input: &str) -> Result<Parsed<ParseTree>, ParseError> {
    self.parse_with(input, &TreeBuilder)
  }

  /// Parses `input`, passing the chosen derivation through `actions`.
  pub fn parse_with<A: Actions>(
    &self,
    input: &str,
    actions: &A,
  ) -> Result<Parsed<A::Value>, ParseError> {
    let tokens = self.scanner.scan(input)?;
    let (value, state_count) = self.run(&tokens, input.len(), actions)?;
    Ok(Parsed {
      value,
      tokens,
      state_count,
    })
  }

  /// Parses an already scanned token sequence. `input_len` is the byte
  /// offset reported when the input ends too early.
  pub fn parse_tokens_with<A: Actions>(
    &self,
    tokens: &[Token],
    input_len: usize,
    actions: &A,
  ) -> Result<A::Value, SyntaxError> {
    self
      .run(tokens, input_len, actions)
      .map(|(value, _)| value)
  }

  fn run<A: Actions>(
    &self,
    tokens: &[Token],
    input_len: usize,
    actions: &A,
  ) -> Result<(A::Value, usize), SyntaxError> {
    let chart = earley::parse(&self.grammar, self.start, tokens);
    match tree::reconstruct(&chart, tokens, actions) {
      Some(value) => Ok((value, chart.state_count())),
      None => {
        let position = chart.furthest();
        let token = tokens.get(position).cloned();
        Err(SyntaxError {
          position,
          offset: token.as_ref().map_or(input_len, |t| t.offset),
          token,
          expected: chart
            .expected()
            .into_iter()
            .filter_map(|sym| self.grammar.terminal(sym).cloned())
            .collect(),
          state_count: chart.state_count(),
        })
      }
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::grammar::examples;

  fn arith_parser() -> Parser<crate::scanner::TableScanner> {
    Parser::new(Arc::new(examples::make_arith()))
      .with_scanner(examples::arith_scanner())
  }

  #[test]
  fn test_parse_returns_tokens_and_tree() {
    let parsed = arith_parser().parse("1 + 22").unwrap();
    assert_eq!(parsed.tokens.len(), 3);
    assert_eq!(parsed.tokens[2], Token::new("NUM", "22", 4));
    assert_eq!(parsed.value.text(), "1+22");
    assert!(parsed.state_count > 0);
  }

  #[test]
  fn test_incomplete_input_expects_num_at_end() {
    let err = arith_parser().parse("1+").unwrap_err();
    match err {
      ParseError::Syntax(err) => {
        assert_eq!(err.position, 2);
        assert_eq!(err.offset, 2);
        assert_eq!(err.token, None);
        assert!(err.expected.contains(&Terminal::external("NUM")));
      }
      other => panic!("unexpected error: {:?}", other),
    }
  }

  #[test]
  fn test_unexpected_token() {
    let err = arith_parser().parse("1 2").unwrap_err();
    match err {
      ParseError::Syntax(err) => {
        assert_eq!(err.position, 1);
        assert_eq!(err.offset, 2);
        assert_eq!(err.token, Some(Token::new("NUM", "2", 2)));
        assert_eq!(err.expected, vec![Terminal::literal("+")]);
        assert_eq!(
          err.to_string(),
          "Unexpected \"2\" at offset 2; expected one of: \"+\""
        );
      }
      other => panic!("unexpected error: {:?}", other),
    }
  }

  #[test]
  fn test_scan_errors_surface() {
    let err = arith_parser().parse("1 + x").unwrap_err();
    assert!(matches!(err, ParseError::Scan(ScanError { offset: 4, .. })));
  }

  #[test]
  fn test_start_rule_selection() {
    let parser = arith_parser().with_start("expr").unwrap();
    assert_eq!(parser.start_rule(), 1);
    let parsed = parser.parse("1+2").unwrap();
    assert_eq!(parsed.value.rule_name().unwrap().str(), "expr");

    let err = arith_parser().with_start("nope").unwrap_err();
    assert_eq!(err, GrammarError::UndefinedRule(Name::new("nope")));
  }

  #[test]
  fn test_empty_input() {
    let parser = Parser::new(Arc::new(examples::make_nullable()));
    assert!(parser.parse("").is_err());
    let parser = parser.with_start("opt").unwrap();
    let parsed = parser.parse("").unwrap();
    assert!(parsed.value.children().is_empty());
  }

  #[test]
  fn test_parsers_share_grammar_across_threads() {
    let parser = arith_parser();
    let handles: Vec<_> = (0..4)
      .map(|i| {
        let parser = parser.clone();
        std::thread::spawn(move || {
          parser.parse(&format!("{} + {}", i, i)).map(|p| p.value.text())
        })
      })
      .collect();
    for (i, handle) in handles.into_iter().enumerate() {
      assert_eq!(handle.join().unwrap(), Ok(format!("{}+{}", i, i)));
    }
  }
}
