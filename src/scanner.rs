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

//! Scanners turn input text into the token sequence the parser consumes.
//!
//! The whole input is scanned before parsing starts.

mod grammar_scanner;
mod table;
mod tokenizer;

pub use {
  grammar_scanner::GrammarScanner,
  table::{TableScanner, TableScannerBuilder},
  tokenizer::{GrammarTokenizer, TokenizerError},
};

use crate::utils::Name;

/// A single token. `offset` is the byte offset of the token's text in the
/// scanned input.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Token {
  pub kind: Name,
  pub text: String,
  pub offset: usize,
}

impl Token {
  pub fn new(kind: &str, text: &str, offset: usize) -> Self {
    Token {
      kind: Name::new(kind),
      text: text.to_string(),
      offset,
    }
  }

  /// The byte offset just past the end of this token.
  pub fn end(&self) -> usize {
    self.offset + self.text.len()
  }
}

/// No candidate matched the input at `offset`.
#[derive(Clone, PartialEq, Eq, Debug, thiserror::Error)]
#[error("No token matches the input at offset {offset}.")]
pub struct ScanError {
  pub offset: usize,
  /// Display forms of every candidate that was tried.
  pub expected: Vec<String>,
}

pub trait Scanner {
  fn scan(&self, input: &str) -> Result<Vec<Token>, ScanError>;
}

impl<S: Scanner + ?Sized> Scanner for &S {
  fn scan(&self, input: &str) -> Result<Vec<Token>, ScanError> {
    (**self).scan(input)
  }
}

impl<S: Scanner + ?Sized> Scanner for std::sync::Arc<S> {
  fn scan(&self, input: &str) -> Result<Vec<Token>, ScanError> {
    (**self).scan(input)
  }
}

/// The default scanner: every character is a token of kind `char`.
#[derive(Copy, Clone, Default, Debug)]
pub struct CharScanner;

impl Scanner for CharScanner {
  fn scan(&self, input: &str) -> Result<Vec<Token>, ScanError> {
    let kind = Name::new("char");
    Ok(
      input
        .char_indices()
        .map(|(offset, c)| Token {
          kind: kind.clone(),
          text: c.to_string(),
          offset,
        })
        .collect(),
    )
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_char_scanner_offsets() {
    let tokens = CharScanner.scan("aé b").unwrap();
    assert_eq!(
      tokens,
      vec![
        Token::new("char", "a", 0),
        Token::new("char", "é", 1),
        Token::new("char", " ", 3),
        Token::new("char", "b", 4),
      ]
    );
    assert_eq!(tokens[1].end(), 3);
  }

  #[test]
  fn test_char_scanner_empty() {
    assert!(CharScanner.scan("").unwrap().is_empty());
  }
}
