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
    grammar::{CaseSensitivity, Grammar, Terminal},
    utils::Name,
  },
};

/// A scanner derived from the literal and pattern terminals of a grammar.
///
/// Before each token, the longest match of the grammar's ignore patterns is
/// skipped repeatedly. The longest terminal match then becomes the token,
/// with the terminal's display form as its kind. Ties go to the terminal
/// with the lower symbol index. Literals follow the grammar's case
/// sensitivity.
#[derive(Clone, Debug)]
pub struct GrammarScanner {
  terminals: Vec<(Name, Terminal)>,
  ignore: Vec<Terminal>,
  case_sensitivity: CaseSensitivity,
}

fn longest<'a, T: 'a>(
  candidates: impl Iterator<Item = (&'a Terminal, T)>,
  input: &str,
  case: CaseSensitivity,
) -> Option<(T, usize)> {
  let mut best: Option<(T, usize)> = None;
  for (terminal, value) in candidates {
    if let Some(len) = terminal.match_prefix(input, case) {
      if len > 0 && best.as_ref().map_or(true, |(_, best_len)| len > *best_len)
      {
        best = Some((value, len));
      }
    }
  }
  best
}

impl GrammarScanner {
  pub fn new(grammar: &Grammar) -> Self {
    GrammarScanner {
      terminals: grammar
        .terminals()
        .filter(|(_, t)| !matches!(t, Terminal::External(_)))
        .map(|(_, t)| (Name::new(&t.to_string()), t.clone()))
        .collect(),
      ignore: grammar.ignore().to_vec(),
      case_sensitivity: grammar.case_sensitivity(),
    }
  }

  fn skip_ignored(&self, input: &str, mut offset: usize) -> usize {
    while let Some(((), len)) = longest(
      self.ignore.iter().map(|t| (t, ())),
      &input[offset..],
      self.case_sensitivity,
    ) {
      offset += len;
    }
    offset
  }
}

impl Scanner for GrammarScanner {
  fn scan(&self, input: &str) -> Result<Vec<Token>, ScanError> {
    let mut tokens = Vec::new();
    let mut offset = self.skip_ignored(input, 0);
    while offset < input.len() {
      let rest = &input[offset..];
      let (kind, len) = longest(
        self.terminals.iter().map(|(k, t)| (t, k)),
        rest,
        self.case_sensitivity,
      )
      .ok_or_else(|| ScanError {
        offset,
        expected: self.terminals.iter().map(|(k, _)| k.to_string()).collect(),
      })?;
      tokens.push(Token {
        kind: kind.clone(),
        text: rest[..len].to_string(),
        offset,
      });
      offset = self.skip_ignored(input, offset + len);
    }
    Ok(tokens)
  }
}
