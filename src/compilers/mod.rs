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

//! Compilers from grammar source text to `Grammar` values.
//!
//! The plain dialect is parsed with a hand-built bootstrap grammar. The rich
//! dialect's own grammar is written in the plain dialect and compiled on
//! first use.

mod literal;
pub mod plain;
pub mod rich;

pub use rich::CompileOptions;

use crate::{
  grammar::GrammarError,
  parsers::{ParseError, ParseTree},
};

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
  #[error("Syntax error in grammar source: {0}")]
  Syntax(#[from] ParseError),
  #[error("Invalid escape sequence in literal {0}.")]
  Escape(String),
  #[error("Invalid pattern {pattern}: {error}")]
  Pattern {
    pattern: String,
    #[source]
    error: regex::Error,
  },
  #[error(transparent)]
  Grammar(#[from] GrammarError),
}

/// Flattens a left-recursive list such as `list: list sep item | item` into
/// its items. An empty base production contributes nothing.
fn left_list(mut tree: &ParseTree) -> Vec<&ParseTree> {
  let mut items = Vec::new();
  loop {
    let children = tree.children();
    if let Some(last) = children.last() {
      items.push(last);
    }
    match children.first() {
      Some(first)
        if children.len() > 1 && first.rule_name() == tree.rule_name() =>
      {
        tree = first
      }
      _ => break,
    }
  }
  items.reverse();
  items
}

/// The `i`th child of a node of the meta grammar.
fn child(tree: &ParseTree, i: usize) -> &ParseTree {
  tree.child(i).unwrap_or_else(|| {
    panic!("Meta grammar node {:?} has no child {}.", tree.rule_name(), i)
  })
}
