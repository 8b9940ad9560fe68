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

use regex::Regex;

/// A regular expression terminal.
///
/// A pattern is identified by its source text. Two anchored forms are
/// compiled from it: one that matches a prefix of the remaining input (used
/// by scanners) and one that must match a whole token's text (used by the
/// parser).
#[derive(Clone)]
pub struct Pattern {
  source: String,
  prefix: Regex,
  whole: Regex,
}

impl Pattern {
  pub fn new(source: &str) -> Result<Self, regex::Error> {
    Ok(Pattern {
      source: source.to_string(),
      prefix: Regex::new(&format!("^(?:{})", source))?,
      whole: Regex::new(&format!("^(?:{})$", source))?,
    })
  }

  /// A pattern that matches any single character, newlines included.
  pub fn any() -> Self {
    Pattern::new("(?s).").expect("any-char pattern is valid")
  }

  pub fn source(&self) -> &str {
    &self.source
  }

  /// Returns true if the entire text matches this pattern.
  pub fn matches(&self, text: &str) -> bool {
    self.whole.is_match(text)
  }

  /// Returns the byte length of the match at the start of `input`, if any.
  pub fn match_prefix(&self, input: &str) -> Option<usize> {
    self.prefix.find(input).map(|m| m.end())
  }
}

impl PartialEq for Pattern {
  fn eq(&self, other: &Self) -> bool {
    self.source == other.source
  }
}

impl Eq for Pattern {}

impl PartialOrd for Pattern {
  fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for Pattern {
  fn cmp(&self, other: &Self) -> std::cmp::Ordering {
    self.source.cmp(&other.source)
  }
}

impl std::hash::Hash for Pattern {
  fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
    self.source.hash(state)
  }
}

impl std::fmt::Debug for Pattern {
  fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(fmt, "/{}/", self.source)
  }
}

impl serde::Serialize for Pattern {
  fn serialize<S: serde::Serializer>(
    &self,
    serializer: S,
  ) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&self.source)
  }
}

impl<'de> serde::Deserialize<'de> for Pattern {
  fn deserialize<D: serde::Deserializer<'de>>(
    deserializer: D,
  ) -> Result<Self, D::Error> {
    let source = String::deserialize(deserializer)?;
    Pattern::new(&source).map_err(serde::de::Error::custom)
  }
}
