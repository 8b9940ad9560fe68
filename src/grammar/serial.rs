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

//! A loadable form of compiled grammars.
//!
//! The serialized form lists the symbol table (patterns as their source
//! text), the productions of every rule, nullable flags, ignore patterns,
//! binding metadata and case sensitivity. Loading a grammar does not run
//! either dialect compiler.

use crate::grammar::{Grammar, GrammarError};

#[derive(Debug, thiserror::Error)]
pub enum SerialError {
  #[error("Malformed grammar data: {0}")]
  Json(#[from] serde_json::Error),
  #[error("Invalid grammar: {0}")]
  Grammar(#[from] GrammarError),
}

impl Grammar {
  pub fn to_json(&self) -> String {
    serde_json::to_string(self).expect("grammars always serialize")
  }

  pub fn to_json_pretty(&self) -> String {
    serde_json::to_string_pretty(self).expect("grammars always serialize")
  }

  /// Loads a grammar written by `to_json`. Indices are validated and the
  /// nullable flags are recomputed.
  pub fn from_json(data: &str) -> Result<Grammar, SerialError> {
    let mut grammar: Grammar = serde_json::from_str(data)?;
    grammar.check_grammar()?;
    grammar.mark_nullables();
    Ok(grammar)
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    grammar::examples,
    parsers::Parser,
    utils::WasChanged,
  };
  use std::sync::Arc;

  #[test]
  fn test_round_trip_preserves_grammar() {
    let g = examples::make_arith();
    let loaded = Grammar::from_json(&g.to_json()).unwrap();
    assert_eq!(loaded, g);
  }

  #[test]
  fn test_round_trip_preserves_parse() {
    let g = Arc::new(examples::make_arith());
    let loaded = Arc::new(Grammar::from_json(&g.to_json_pretty()).unwrap());
    let input = "1 + 2 + 3";
    let original = Parser::new(g)
      .with_scanner(examples::arith_scanner())
      .parse(input)
      .unwrap();
    let reloaded = Parser::new(loaded)
      .with_scanner(examples::arith_scanner())
      .parse(input)
      .unwrap();
    assert_eq!(original.value, reloaded.value);
  }

  #[test]
  fn test_loaded_nullables_are_marked() {
    let g = examples::make_nullable();
    let mut loaded = Grammar::from_json(&g.to_json()).unwrap();
    assert_eq!(loaded.nullable(), g.nullable());
    assert_eq!(loaded.mark_nullables(), WasChanged::Unchanged);
  }

  #[test]
  fn test_rejects_out_of_range_symbol() {
    let data = r#"{
      "symbols": [{"NonTerm": "a"}],
      "rules": [[[5]]],
      "nullable": [false],
      "ignore": [],
      "ast_mappings": null
    }"#;
    match Grammar::from_json(data) {
      Err(SerialError::Grammar(GrammarError::UnknownSymbol { index, .. })) => {
        assert_eq!(index, 5)
      }
      other => panic!("unexpected result: {:?}", other),
    }
  }

  #[test]
  fn test_rejects_bad_pattern() {
    let data = r#"{
      "symbols": [{"NonTerm": "a"}, {"Term": {"Pattern": "("}}],
      "rules": [[[1]]],
      "nullable": [false],
      "ignore": [],
      "ast_mappings": null
    }"#;
    match Grammar::from_json(data) {
      Err(err @ SerialError::Json(_)) => {
        assert!(err.to_string().contains("regex parse error"))
      }
      other => panic!("unexpected result: {:?}", other),
    }
  }
}
