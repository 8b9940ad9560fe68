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

//! Lowering of string, character class and regex lexemes shared by both
//! dialects.

use {
  super::CompileError,
  crate::grammar::Pattern,
  std::{iter::Peekable, str::Chars},
};

pub(crate) fn pattern(source: &str) -> Result<Pattern, CompileError> {
  Pattern::new(source).map_err(|error| CompileError::Pattern {
    pattern: source.to_string(),
    error,
  })
}

/// Decodes a quoted string lexeme with JSON-style escapes.
pub(crate) fn string_literal(lexeme: &str) -> Result<String, CompileError> {
  let invalid = || CompileError::Escape(lexeme.to_string());
  let body = lexeme
    .strip_prefix('"')
    .and_then(|s| s.strip_suffix('"'))
    .ok_or_else(invalid)?;

  let mut out = String::with_capacity(body.len());
  let mut chars = body.chars();
  while let Some(c) = chars.next() {
    if c != '\\' {
      out.push(c);
      continue;
    }
    match chars.next().ok_or_else(invalid)? {
      '"' => out.push('"'),
      '\\' => out.push('\\'),
      '/' => out.push('/'),
      'n' => out.push('\n'),
      't' => out.push('\t'),
      'r' => out.push('\r'),
      'b' => out.push('\u{8}'),
      'f' => out.push('\u{c}'),
      'u' => {
        let hex: String = chars.by_ref().take(4).collect();
        let code = u32::from_str_radix(&hex, 16)
          .ok()
          .filter(|_| hex.len() == 4)
          .and_then(char::from_u32)
          .ok_or_else(invalid)?;
        out.push(code);
      }
      _ => return Err(invalid()),
    }
  }
  Ok(out)
}

/// Lowers a `[...]` lexeme. Character classes use regex syntax directly.
pub(crate) fn range_pattern(lexeme: &str) -> Result<Pattern, CompileError> {
  pattern(lexeme)
}

/// Lowers a `/body/flags` lexeme. `\/` in the body stands for `/`, and the
/// `i` flag makes the pattern case-insensitive. Other flags are accepted
/// and ignored.
pub(crate) fn regexp_pattern(lexeme: &str) -> Result<Pattern, CompileError> {
  let end = lexeme.rfind('/').filter(|&end| end > 0).ok_or_else(|| {
    CompileError::Pattern {
      pattern: lexeme.to_string(),
      error: regex::Error::Syntax("missing closing '/'".to_string()),
    }
  })?;
  let flags = &lexeme[end + 1..];

  let mut source = String::new();
  if flags.contains('i') {
    source.push_str("(?i)");
  }
  let mut chars = lexeme[1..end].chars();
  while let Some(c) = chars.next() {
    if c == '\\' {
      match chars.next() {
        Some('/') => source.push('/'),
        Some(next) => {
          source.push('\\');
          source.push(next);
        }
        None => source.push('\\'),
      }
    } else {
      source.push(c);
    }
  }
  pattern(&source)
}

/// Reads one class atom: a character, or an escape sequence. Returns
/// `Some(None)` for a nested class, which is never split.
fn class_atom(chars: &mut Peekable<Chars>) -> Option<Option<String>> {
  let c = chars.next()?;
  if c == '[' {
    return Some(None);
  }
  let mut atom = c.to_string();
  if c == '\\' {
    atom.push(chars.next()?);
    // \p{..}, \x{..} and \u{..} carry a braced argument.
    if chars.peek() == Some(&'{') {
      for c in chars.by_ref() {
        atom.push(c);
        if c == '}' {
          break;
        }
      }
    }
  }
  Some(Some(atom))
}

/// Splits a character class into the source of one class per item, e.g.
/// `[a-z_]` into `[a-z]` and `[_]`. Returns None for classes that are
/// negated, use nested classes or set operations, or have a single item.
pub(crate) fn split_class(lexeme: &str) -> Option<Vec<String>> {
  let inner = lexeme.strip_prefix('[')?.strip_suffix(']')?;
  if inner.starts_with('^')
    || ["&&", "--", "~~"].iter().any(|op| inner.contains(op))
  {
    return None;
  }

  let mut chars = inner.chars().peekable();
  let mut items = Vec::new();
  while let Some(atom) = class_atom(&mut chars) {
    let mut item = atom?;
    if chars.peek() == Some(&'-') {
      let mut ahead = chars.clone();
      ahead.next();
      if ahead.peek().is_some() {
        chars.next();
        item.push('-');
        item.push_str(&class_atom(&mut chars)??);
      }
    }
    items.push(format!("[{}]", item));
  }

  if items.len() > 1 {
    Some(items)
  } else {
    None
  }
}
