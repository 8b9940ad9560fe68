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
  super::pattern::Pattern,
  crate::utils::{Name, ToDoc},
  serde::{Deserialize, Serialize},
};

/// Controls how literal terminals compare against token text.
#[derive(
  Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize,
)]
pub enum CaseSensitivity {
  Sensitive,
  Insensitive,
}

impl Default for CaseSensitivity {
  fn default() -> Self {
    CaseSensitivity::Sensitive
  }
}

/// A terminal element.
#[derive(
  Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize,
)]
pub enum Terminal {
  /// Matches a token whose text is exactly this string.
  Literal(String),
  /// Matches a token whose whole text matches this pattern.
  Pattern(Pattern),
  /// Matches a token whose kind is this name. Produced by an external
  /// scanner.
  External(Name),
}

impl Terminal {
  pub fn literal(s: &str) -> Self {
    Terminal::Literal(s.to_string())
  }

  pub fn pattern(source: &str) -> Result<Self, regex::Error> {
    Ok(Terminal::Pattern(Pattern::new(source)?))
  }

  pub fn external(name: &str) -> Self {
    Terminal::External(Name::new(name))
  }

  /// Tests a token against this terminal.
  pub fn matches(
    &self,
    kind: &str,
    text: &str,
    case: CaseSensitivity,
  ) -> bool {
    match self {
      Terminal::Literal(lit) => match case {
        CaseSensitivity::Sensitive => lit == text,
        CaseSensitivity::Insensitive => {
          lit.to_lowercase() == text.to_lowercase()
        }
      },
      Terminal::Pattern(pattern) => pattern.matches(text),
      Terminal::External(name) => name.str() == kind,
    }
  }

  /// Returns the byte length of the longest match of this terminal at the
  /// start of `input`. External terminals never match raw input.
  pub fn match_prefix(
    &self,
    input: &str,
    case: CaseSensitivity,
  ) -> Option<usize> {
    match self {
      Terminal::Literal(lit) => match case {
        CaseSensitivity::Sensitive => {
          input.starts_with(lit.as_str()).then(|| lit.len())
        }
        CaseSensitivity::Insensitive => {
          let mut rest = input.char_indices();
          let mut len = 0;
          for expected in lit.chars() {
            let (i, c) = rest.next()?;
            if !c.to_lowercase().eq(expected.to_lowercase()) {
              return None;
            }
            len = i + c.len_utf8();
          }
          Some(len)
        }
      },
      Terminal::Pattern(pattern) => pattern.match_prefix(input),
      Terminal::External(_) => None,
    }
  }
}

impl std::fmt::Display for Terminal {
  fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
    match self {
      Terminal::Literal(lit) => write!(fmt, "{:?}", lit),
      Terminal::Pattern(pattern) => write!(fmt, "/{}/", pattern.source()),
      Terminal::External(name) => write!(fmt, "{}", name),
    }
  }
}

impl ToDoc for Terminal {
  fn to_doc<'a, DA: pretty::DocAllocator<'a>>(
    &self,
    da: &'a DA,
  ) -> pretty::DocBuilder<'a, DA>
  where
    DA::Doc: Clone,
  {
    da.text(self.to_string())
  }
}

/// An entry of a grammar's symbol table.
#[derive(
  Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize,
)]
pub enum Symbol {
  NonTerm(Name),
  Term(Terminal),
}

impl Symbol {
  pub fn as_term(&self) -> Option<&Terminal> {
    match self {
      Symbol::Term(t) => Some(t),
      Symbol::NonTerm(_) => None,
    }
  }

  pub fn as_nonterm(&self) -> Option<&Name> {
    match self {
      Symbol::Term(_) => None,
      Symbol::NonTerm(nt) => Some(nt),
    }
  }
}

impl ToDoc for Symbol {
  fn to_doc<'a, DA: pretty::DocAllocator<'a>>(
    &self,
    da: &'a DA,
  ) -> pretty::DocBuilder<'a, DA>
  where
    DA::Doc: Clone,
  {
    match self {
      Symbol::NonTerm(nt) => {
        da.text("<").append(nt.to_doc(da)).append(da.text(">"))
      }
      Symbol::Term(t) => t.to_doc(da),
    }
  }
}

/// How the value at one production position is attached to the node built
/// for that production.
#[derive(
  Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize,
)]
pub enum Binding {
  /// The value is not named. Fields of unnamed node values are spliced into
  /// the parent.
  Unbound,
  /// `name=term`: the value overwrites the field.
  Set(Name),
  /// `name+=term`: the value is appended to a list field.
  Push(Name),
}

impl Binding {
  pub fn is_unbound(&self) -> bool {
    matches!(self, Binding::Unbound)
  }
}

impl Default for Binding {
  fn default() -> Self {
    Binding::Unbound
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_literal_case_sensitivity() {
    let t = Terminal::literal("Select");
    assert!(t.matches("", "Select", CaseSensitivity::Sensitive));
    assert!(!t.matches("", "SELECT", CaseSensitivity::Sensitive));
    assert!(t.matches("", "SELECT", CaseSensitivity::Insensitive));
  }

  #[test]
  fn test_literal_prefix_case_sensitivity() {
    let t = Terminal::literal("Select");
    assert_eq!(t.match_prefix("SELECT *", CaseSensitivity::Sensitive), None);
    assert_eq!(
      t.match_prefix("SELECT *", CaseSensitivity::Insensitive),
      Some(6)
    );
    assert_eq!(t.match_prefix("SEL", CaseSensitivity::Insensitive), None);
    assert_eq!(
      Terminal::literal("é").match_prefix("És", CaseSensitivity::Insensitive),
      Some(2)
    );
  }

  #[test]
  fn test_external_matches_kind() {
    let t = Terminal::external("NUM");
    assert!(t.matches("NUM", "12", CaseSensitivity::Sensitive));
    assert!(!t.matches("ID", "NUM", CaseSensitivity::Sensitive));
    assert_eq!(t.match_prefix("NUM", CaseSensitivity::Sensitive), None);
  }

  #[test]
  fn test_display() {
    assert_eq!(Terminal::literal("+").to_string(), "\"+\"");
    assert_eq!(Terminal::pattern("[0-9]").unwrap().to_string(), "/[0-9]/");
    assert_eq!(Terminal::external("NUM").to_string(), "NUM");
  }
}
