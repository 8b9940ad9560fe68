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

//! A tokenizer derived from a character-level grammar.
//!
//! Each alternative of the start rule describes one token type. At every
//! position the start rule is recognized against the rest of the input, and
//! the longest prefix it accepts becomes the next token. When alternatives
//! accept the same prefix, the one declared first names the token.

use {
  super::{CharScanner, ScanError, Scanner, Token},
  crate::{
    grammar::{Grammar, GrammarError},
    parsers::earley,
    utils::{take_only, Name},
  },
  std::collections::BTreeSet,
};

#[derive(Clone, PartialEq, Eq, Debug, thiserror::Error)]
pub enum TokenizerError {
  #[error("Token rule {0} matches empty input.")]
  NullableStart(Name),
  #[error(transparent)]
  Grammar(#[from] GrammarError),
}

#[derive(Clone, Debug)]
pub struct GrammarTokenizer {
  grammar: Grammar,
  start: usize,
  kinds: Vec<Name>,
  ignored: BTreeSet<Name>,
}

impl GrammarTokenizer {
  /// Derives a tokenizer from the first rule of `grammar`.
  pub fn new(grammar: &Grammar) -> Result<Self, TokenizerError> {
    let start = grammar.rule_name(0).clone();
    Self::with_start_rule(grammar, start.str())
  }

  pub fn with_start_rule(
    grammar: &Grammar,
    start: &str,
  ) -> Result<Self, TokenizerError> {
    let start = grammar
      .rule_index(start)
      .ok_or_else(|| GrammarError::UndefinedRule(Name::new(start)))?;
    if grammar.is_nullable(start) {
      return Err(TokenizerError::NullableStart(
        grammar.rule_name(start).clone(),
      ));
    }

    let start_name = grammar.rule_name(start);
    let kinds = grammar
      .prods(start)
      .iter()
      .enumerate()
      .map(|(i, prod)| {
        match take_only(prod.symbols().iter())
          .filter(|&&sym| grammar.is_nonterm(sym))
        {
          Some(&sym) => grammar.rule_name(sym).clone(),
          None => Name::new(&format!("{}${}", start_name, i)),
        }
      })
      .collect();

    Ok(GrammarTokenizer {
      grammar: grammar.clone(),
      start,
      kinds,
      ignored: BTreeSet::new(),
    })
  }

  /// Drops tokens of the given kinds from the scanned output.
  pub fn with_ignored<'a>(
    mut self,
    kinds: impl IntoIterator<Item = &'a str>,
  ) -> Self {
    self.ignored.extend(kinds.into_iter().map(Name::new));
    self
  }

  /// The token kind of each start-rule alternative.
  pub fn kinds(&self) -> &[Name] {
    &self.kinds
  }

  /// Recognizes the longest token at the start of `chars`, returning the
  /// number of characters it spans and its kind. A failure's offset is an
  /// index into `chars`.
  fn next_token(&self, chars: &[Token]) -> Result<(usize, &Name), ScanError> {
    let chart = earley::parse(&self.grammar, self.start, chars);
    let longest = (1..=chart.token_count()).rev().find_map(|end| {
      chart
        .completions(end)
        .map(|state| state.production)
        .min()
        .map(|production| (end, &self.kinds[production]))
    });
    longest.ok_or_else(|| {
      let furthest = chart.furthest();
      ScanError {
        offset: furthest,
        expected: chart
          .expected()
          .into_iter()
          .filter_map(|sym| self.grammar.terminal(sym))
          .map(|t| t.to_string())
          .collect(),
      }
    })
  }
}

impl Scanner for GrammarTokenizer {
  fn scan(&self, input: &str) -> Result<Vec<Token>, ScanError> {
    let chars = CharScanner.scan(input)?;
    let mut tokens = Vec::new();
    let mut position = 0;
    while position < chars.len() {
      let rest = &chars[position..];
      let (len, kind) = self.next_token(rest).map_err(|mut err| {
        err.offset = rest.get(err.offset).map_or(input.len(), |c| c.offset);
        err
      })?;
      let token = Token {
        kind: kind.clone(),
        text: rest[..len].iter().map(|c| c.text.as_str()).collect(),
        offset: rest[0].offset,
      };
      log::trace!("Tokenized {:?}.", token);
      if !self.ignored.contains(&token.kind) {
        tokens.push(token);
      }
      position += len;
    }
    Ok(tokens)
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::grammar::{build, Terminal};

  fn make_token_grammar() -> Grammar {
    build(|gb| {
      gb.add_rule("tok", |rb| {
        rb.add_prod(|pb| {
          pb.add_nonterm("word");
        })
        .add_prod(|pb| {
          pb.add_nonterm("num");
        })
        .add_prod(|pb| {
          pb.add_literal("+");
        })
        .add_prod(|pb| {
          pb.add_nonterm("ws");
        });
      })
      .add_rule("word", |rb| {
        rb.add_prod(|pb| {
          pb.add_nonterm("word")
            .add_term(Terminal::pattern("[a-z]").unwrap());
        })
        .add_prod(|pb| {
          pb.add_term(Terminal::pattern("[a-z]").unwrap());
        });
      })
      .add_rule("num", |rb| {
        rb.add_prod(|pb| {
          pb.add_nonterm("num")
            .add_term(Terminal::pattern("[0-9]").unwrap());
        })
        .add_prod(|pb| {
          pb.add_term(Terminal::pattern("[0-9]").unwrap());
        });
      })
      .add_rule("ws", |rb| {
        rb.add_prod(|pb| {
          pb.add_literal(" ");
        });
      });
    })
    .unwrap()
  }

  #[test]
  fn test_kinds() {
    let tokenizer = GrammarTokenizer::new(&make_token_grammar()).unwrap();
    let kinds: Vec<_> = tokenizer.kinds().iter().map(Name::str).collect();
    assert_eq!(kinds, vec!["word", "num", "tok$2", "ws"]);
  }

  #[test]
  fn test_maximal_munch() {
    let tokenizer = GrammarTokenizer::new(&make_token_grammar()).unwrap();
    let tokens = tokenizer.scan("ab+cd 12").unwrap();
    assert_eq!(
      tokens,
      vec![
        Token::new("word", "ab", 0),
        Token::new("tok$2", "+", 2),
        Token::new("word", "cd", 3),
        Token::new("ws", " ", 5),
        Token::new("num", "12", 6),
      ]
    );
  }

  #[test]
  fn test_longest_alternative_wins_over_declared_first() {
    // kw: "in"; ident: [a-z]+
    let g = build(|gb| {
      gb.add_rule("tok", |rb| {
        rb.add_prod(|pb| {
          pb.add_nonterm("kw");
        })
        .add_prod(|pb| {
          pb.add_nonterm("word");
        })
        .add_prod(|pb| {
          pb.add_literal(" ");
        });
      })
      .add_rule("kw", |rb| {
        rb.add_prod(|pb| {
          pb.add_literal("i").add_literal("n");
        });
      })
      .add_rule("word", |rb| {
        rb.add_prod(|pb| {
          pb.add_nonterm("word")
            .add_term(Terminal::pattern("[a-z]").unwrap());
        })
        .add_prod(|pb| {
          pb.add_term(Terminal::pattern("[a-z]").unwrap());
        });
      });
    })
    .unwrap();
    let tokenizer = GrammarTokenizer::new(&g)
      .unwrap()
      .with_ignored(vec!["tok$2"]);
    let tokens = tokenizer.scan("in inner i").unwrap();
    assert_eq!(
      tokens,
      vec![
        Token::new("kw", "in", 0),
        Token::new("word", "inner", 3),
        Token::new("word", "i", 9),
      ]
    );
  }

  #[test]
  fn test_ignored_kinds_are_dropped() {
    let tokenizer = GrammarTokenizer::new(&make_token_grammar())
      .unwrap()
      .with_ignored(vec!["ws"]);
    let kinds: Vec<_> = tokenizer
      .scan("a 1")
      .unwrap()
      .into_iter()
      .map(|t| t.kind.to_string())
      .collect();
    assert_eq!(kinds, vec!["word", "num"]);
  }

  #[test]
  fn test_error_offset() {
    let tokenizer = GrammarTokenizer::new(&make_token_grammar()).unwrap();
    let err = tokenizer.scan("ab?").unwrap_err();
    assert_eq!(err.offset, 2);
    assert!(err.expected.contains(&"\"+\"".to_string()));
    assert!(tokenizer.scan("").unwrap().is_empty());
  }

  #[test]
  fn test_rejects_nullable_start() {
    let g = build(|gb| {
      gb.add_rule("tok", |rb| {
        rb.add_prod(|pb| {
          pb.add_literal("a");
        })
        .add_prod(|_pb| {});
      });
    })
    .unwrap();
    assert_eq!(
      GrammarTokenizer::new(&g).unwrap_err(),
      TokenizerError::NullableStart(Name::new("tok"))
    );
  }
}
