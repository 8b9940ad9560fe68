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

//! The plain grammar dialect: rules of alternatives over identifiers,
//! strings, character classes and regular expressions.
//!
//! ```text
//! sum: sum "+" NUM | NUM
//! ~ /\s+/
//! ```

mod bootstrap;

use {
  super::{child, left_list, literal, CompileError},
  crate::{
    grammar::{build, Grammar, Pattern, Terminal},
    parsers::ParseTree,
    utils::{Name, ToDoc},
  },
  std::collections::BTreeSet,
};

/// One element of a production before rule names are resolved.
enum Item {
  Id(String),
  Term(Terminal),
}

struct RuleSource {
  name: Name,
  prods: Vec<Vec<Item>>,
}

fn lexeme(tree: &ParseTree) -> String {
  tree.text()
}

/// Lowers a `term` or `ignore_term` alternative that is a single lexeme.
fn lower_lexeme(
  kind: &str,
  production: usize,
  text: &str,
) -> Result<Item, CompileError> {
  let term = match (kind, production) {
    ("term", 0) => return Ok(Item::Id(text.to_string())),
    ("term", 1) | ("ignore_term", 0) => {
      Terminal::Literal(literal::string_literal(text)?)
    }
    ("term", 2) | ("ignore_term", 1) => {
      Terminal::Pattern(literal::range_pattern(text)?)
    }
    ("term", 3) => Terminal::Pattern(Pattern::any()),
    ("term", 4) | ("ignore_term", 2) => {
      Terminal::Pattern(literal::regexp_pattern(text)?)
    }
    _ => panic!("Unexpected {} production {}.", kind, production),
  };
  Ok(Item::Term(term))
}

fn lower_item(tree: &ParseTree) -> Result<Item, CompileError> {
  let kind = tree.rule_name().map_or("", Name::str);
  let production = tree.production().unwrap_or_default();
  lower_lexeme(kind, production, &lexeme(child(tree, 0)))
}

fn lower_rule(tree: &ParseTree) -> Result<RuleSource, CompileError> {
  let name = Name::new(&lexeme(child(tree, 0)));
  let prods = left_list(child(tree, 2))
    .into_iter()
    .map(|sequence| {
      left_list(sequence)
        .into_iter()
        .filter(|term| term.rule_name().is_some())
        .map(lower_item)
        .collect::<Result<Vec<_>, _>>()
    })
    .collect::<Result<Vec<_>, _>>()?;
  Ok(RuleSource { name, prods })
}

fn lower_ignore(tree: &ParseTree) -> Result<Terminal, CompileError> {
  match lower_item(child(tree, 1))? {
    Item::Term(term) => Ok(term),
    Item::Id(_) => unreachable!("ignore terms are never identifiers"),
  }
}

fn generate(
  rules: &[RuleSource],
  ignore: &[Terminal],
) -> Result<Grammar, CompileError> {
  let names: BTreeSet<&str> = rules.iter().map(|r| r.name.str()).collect();
  let grammar = build(|gb| {
    for rule in rules {
      gb.add_rule(&rule.name, |rb| {
        for prod in &rule.prods {
          rb.add_prod(|pb| {
            for item in prod {
              match item {
                Item::Id(id) if names.contains(id.as_str()) => {
                  pb.add_nonterm(id.as_str());
                }
                Item::Id(id) => {
                  pb.add_external(id);
                }
                Item::Term(term) => {
                  pb.add_term(term);
                }
              }
            }
          });
        }
      });
    }
    for term in ignore {
      gb.add_ignore(term);
    }
  })?;
  Ok(grammar)
}

/// Compiles plain-dialect source text into a grammar whose start rule is the
/// first rule declared.
pub fn compile(source: &str) -> Result<Grammar, CompileError> {
  let tree = bootstrap::parser().parse(source)?.value;

  let rules = left_list(child(&tree, 0))
    .into_iter()
    .map(lower_rule)
    .collect::<Result<Vec<_>, _>>()?;
  let ignore = left_list(child(&tree, 1))
    .into_iter()
    .map(lower_ignore)
    .collect::<Result<Vec<_>, _>>()?;

  let grammar = generate(&rules, &ignore)?;
  log::debug!("Compiled plain grammar:\n{}", grammar.to_pretty());
  Ok(grammar)
}

/// The hand-built grammar of the plain dialect.
pub fn bootstrap_grammar() -> &'static Grammar {
  bootstrap::parser().grammar()
}
