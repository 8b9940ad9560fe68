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
  super::{ScanError, Scanner, Token},
  crate::{
    grammar::{CaseSensitivity, Terminal},
    utils::Name,
  },
};

#[derive(Clone, Debug)]
struct Entry {
  /// None for ignorable entries.
  kind: Option<Name>,
  matcher: Terminal,
}

/// A longest-match scanner over a table of token types.
///
/// Every entry, ignorable or not, competes at each position. The longest
/// match wins and the entry declared first wins ties. Text matched by an
/// ignorable entry produces no token.
#[derive(Clone, Debug)]
pub struct TableScanner {
  entries: Vec<Entry>,
}

pub struct TableScannerBuilder {
  entries: Vec<Entry>,
  errors: Vec<regex::Error>,
}

impl TableScannerBuilder {
  fn add_entry(
    &mut self,
    kind: Option<&str>,
    matcher: Result<Terminal, regex::Error>,
  ) -> &mut Self {
    match matcher {
      Ok(matcher) => self.entries.push(Entry {
        kind: kind.map(Name::new),
        matcher,
      }),
      Err(e) => self.errors.push(e),
    }
    self
  }

  pub fn add_literal(&mut self, kind: &str, text: &str) -> &mut Self {
    self.add_entry(Some(kind), Ok(Terminal::literal(text)))
  }

  pub fn add_pattern(&mut self, kind: &str, source: &str) -> &mut Self {
    self.add_entry(Some(kind), Terminal::pattern(source))
  }

  pub fn add_ignore_literal(&mut self, text: &str) -> &mut Self {
    self.add_entry(None, Ok(Terminal::literal(text)))
  }

  pub fn add_ignore_pattern(&mut self, source: &str) -> &mut Self {
    self.add_entry(None, Terminal::pattern(source))
  }
}

impl TableScanner {
  /// Builds a scanner from a builder function. Fails with the first invalid
  /// pattern.
  pub fn build(
    build_fn: impl FnOnce(&mut TableScannerBuilder),
  ) -> Result<Self, regex::Error> {
    let mut builder = TableScannerBuilder {
      entries: Vec::new(),
      errors: Vec::new(),
    };
    build_fn(&mut builder);
    match builder.errors.into_iter().next() {
      Some(e) => Err(e),
      None => Ok(TableScanner {
        entries: builder.entries,
      }),
    }
  }

  fn longest_match(&self, rest: &str) -> Option<(&Entry, usize)> {
    let mut best: Option<(&Entry, usize)> = None;
    for entry in &self.entries {
      let matched = entry.matcher.match_prefix(rest, CaseSensitivity::Sensitive);
      if let Some(len) = matched {
        if len > 0 && best.map_or(true, |(_, best_len)| len > best_len) {
          best = Some((entry, len));
        }
      }
    }
    best
  }
}

impl Scanner for TableScanner {
  fn scan(&self, input: &str) -> Result<Vec<Token>, ScanError> {
    let mut tokens = Vec::new();
    let mut offset = 0;
    while offset < input.len() {
      let rest = &input[offset..];
      let (entry, len) =
        self.longest_match(rest).ok_or_else(|| ScanError {
          offset,
          expected: self
            .entries
            .iter()
            .map(|entry| entry.matcher.to_string())
            .collect(),
        })?;

      if let Some(kind) = &entry.kind {
        tokens.push(Token {
          kind: kind.clone(),
          text: rest[..len].to_string(),
          offset,
        });
      }
      offset += len;
    }
    log::trace!("Scanned {} tokens.", tokens.len());
    Ok(tokens)
  }
}
