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

//! The rich grammar dialect. On top of the plain dialect it has field
//! bindings (`name=term`, `name+=term`), multiplicities (`?`, `*`, `+`,
//! `++separator`) and parenthesized inline choices.
//!
//! ```text
//! expr: first=term ops+=(op=("+" | "-") arg=term)*
//! term: /[0-9]+/
//! ```
//!
//! Sources are parsed with a meta grammar that is itself written in the
//! plain dialect, then desugared into plain rules. Rules created along the
//! way are named `$N` and are not node types.

mod desugar;
mod syntax;

use {
  self::{
    desugar::Desugarer,
    syntax::{Choice, Multiplicity, Primary, RuleDef, Sequence, Term},
  },
  super::{child, left_list, literal, plain, CompileError},
  crate::{
    grammar::{
      build, Binding, CaseSensitivity, Grammar, Pattern, SymbolRef, Terminal,
    },
    parsers::{ParseTree, Parser},
    scanner::GrammarScanner,
    utils::{Name, ToDoc},
  },
  once_cell::sync::Lazy,
  std::{collections::BTreeSet, sync::Arc},
};

const META_SOURCE: &str = r#"
grammar: rule_list ignore_list
rule_list: rule_list rule | rule
rule: id ":" choice
choice: choice "|" sequence | sequence
sequence: sequence term | term | "%"
term: target primary multiplicity | target primary
    | primary multiplicity | primary
target: id assignment
assignment: "=" | "+="
primary: id | string | range | regexp | "." | "(" choice ")"
multiplicity: "?" | "*" | "+" | "++" primary
ignore_list: ignore_list ignore_def | %
ignore_def: "~" ignore_term
ignore_term: string | range | regexp

id: /[a-zA-Z0-9_]+/
string: /"([^"\\]|\\.)+"/
range: /\[([^\]\\]|\\.)+\]/
regexp: /\/([^\/\\]|\\.)+\/[a-z]*/

~ /\s+/
~ /\/\/[^\n]*/
"#;

static META_PARSER: Lazy<Parser<GrammarScanner>> = Lazy::new(|| {
  let grammar =
    Arc::new(plain::compile(META_SOURCE).expect("meta grammar compiles"));
  let scanner = GrammarScanner::new(&grammar);
  Parser::new(grammar).with_scanner(scanner)
});

/// The grammar of the rich dialect, compiled from plain-dialect source on
/// first use.
pub fn meta_grammar() -> &'static Grammar {
  META_PARSER.grammar()
}

/// Options for `compile`.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct CompileOptions {
  /// The grammar will be used with a token scanner, so multi-character
  /// literals stay whole instead of being split into characters.
  pub scanner: bool,
  pub case_sensitivity: CaseSensitivity,
}

impl CompileOptions {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn scanner(mut self, scanner: bool) -> Self {
    self.scanner = scanner;
    self
  }

  pub fn case_sensitivity(mut self, case_sensitivity: CaseSensitivity) -> Self {
    self.case_sensitivity = case_sensitivity;
    self
  }
}

// Lowering from the meta grammar's parse tree. Alternatives are matched by
// their production index in META_SOURCE.

fn lower_rule(tree: &ParseTree) -> Result<RuleDef, CompileError> {
  Ok(RuleDef {
    name: Name::new(&child(tree, 0).text()),
    choice: lower_choice(child(tree, 2))?,
  })
}

fn lower_choice(tree: &ParseTree) -> Result<Choice, CompileError> {
  let sequences = left_list(tree)
    .into_iter()
    .map(|sequence| {
      left_list(sequence)
        .into_iter()
        .filter(|term| term.rule_name().is_some())
        .map(lower_term)
        .collect::<Result<Vec<_>, _>>()
        .map(Sequence)
    })
    .collect::<Result<Vec<_>, _>>()?;
  Ok(Choice(sequences))
}

fn lower_term(tree: &ParseTree) -> Result<Term, CompileError> {
  let children = tree.children();
  let (binding, rest) = match tree.production() {
    Some(0) | Some(1) => (lower_target(&children[0]), &children[1..]),
    _ => (Binding::Unbound, children),
  };
  Ok(Term {
    binding,
    value: lower_primary(&rest[0])?,
    multiplicity: rest.get(1).map(lower_multiplicity).transpose()?,
  })
}

fn lower_target(tree: &ParseTree) -> Binding {
  let name = Name::new(&child(tree, 0).text());
  match child(tree, 1).production() {
    Some(0) => Binding::Set(name),
    _ => Binding::Push(name),
  }
}

fn lower_primary(tree: &ParseTree) -> Result<Primary, CompileError> {
  let text = child(tree, 0).text();
  Ok(match tree.production() {
    Some(0) => Primary::Id(Name::new(&text)),
    Some(1) => Primary::Literal(literal::string_literal(&text)?),
    Some(2) => Primary::Class(text),
    Some(3) => Primary::Pattern(literal::regexp_pattern(&text)?),
    Some(4) => Primary::Pattern(Pattern::any()),
    _ => Primary::Group(lower_choice(child(tree, 1))?),
  })
}

fn lower_multiplicity(tree: &ParseTree) -> Result<Multiplicity, CompileError> {
  Ok(match tree.production() {
    Some(0) => Multiplicity::Optional,
    Some(1) => Multiplicity::ZeroOrMore,
    Some(2) => Multiplicity::OneOrMore,
    _ => Multiplicity::Separated(Box::new(lower_primary(child(tree, 1))?)),
  })
}

fn lower_ignore(tree: &ParseTree) -> Result<Terminal, CompileError> {
  let term = child(tree, 1);
  let text = term.text();
  Ok(match term.production() {
    Some(0) => Terminal::Literal(literal::string_literal(&text)?),
    Some(1) => Terminal::Pattern(literal::range_pattern(&text)?),
    _ => Terminal::Pattern(literal::regexp_pattern(&text)?),
  })
}

// Generation.

fn symbol_ref(
  primary: &Primary,
  rule_names: &BTreeSet<Name>,
) -> Result<SymbolRef, CompileError> {
  Ok(match primary {
    Primary::Id(name) if rule_names.contains(name) => {
      SymbolRef::Rule(name.clone())
    }
    Primary::Id(name) => SymbolRef::Term(Terminal::External(name.clone())),
    Primary::Literal(text) => SymbolRef::Term(Terminal::literal(text)),
    Primary::Class(source) => {
      SymbolRef::Term(Terminal::Pattern(literal::range_pattern(source)?))
    }
    Primary::Pattern(pattern) => {
      SymbolRef::Term(Terminal::Pattern(pattern.clone()))
    }
    Primary::Group(_) => {
      panic!("Inline choices are extracted before generation.")
    }
  })
}

fn generate(
  rules: Vec<RuleDef>,
  ignore: Vec<Terminal>,
  options: &CompileOptions,
) -> Result<Grammar, CompileError> {
  let rule_names: BTreeSet<Name> =
    rules.iter().map(|rule| rule.name.clone()).collect();
  let mut resolved = Vec::with_capacity(rules.len());
  for rule in rules {
    let prods = rule
      .choice
      .0
      .into_iter()
      .map(|sequence| {
        sequence
          .0
          .into_iter()
          .map(|term| {
            Ok((term.binding, symbol_ref(&term.value, &rule_names)?))
          })
          .collect::<Result<Vec<_>, CompileError>>()
      })
      .collect::<Result<Vec<_>, _>>()?;
    resolved.push((rule.name, prods));
  }

  let grammar = build(|gb| {
    gb.enable_ast_mappings()
      .set_case_sensitivity(options.case_sensitivity);
    for (name, prods) in resolved {
      gb.add_rule(name, |rb| {
        for elems in prods {
          rb.add_prod_with_elems(elems);
        }
      });
    }
    for term in ignore {
      gb.add_ignore(term);
    }
  })?;
  Ok(grammar)
}

/// Compiles rich-dialect source into a grammar with binding metadata. The
/// first rule declared is the start rule.
pub fn compile(
  source: &str,
  options: &CompileOptions,
) -> Result<Grammar, CompileError> {
  let tree = META_PARSER.parse(source)?.value;

  let rules = left_list(child(&tree, 0))
    .into_iter()
    .map(lower_rule)
    .collect::<Result<Vec<_>, _>>()?;
  let ignore = left_list(child(&tree, 1))
    .into_iter()
    .map(lower_ignore)
    .collect::<Result<Vec<_>, _>>()?;

  let rules = Desugarer::new(rules).run(options);
  let grammar = generate(rules, ignore, options)?;
  log::debug!("Compiled rich grammar:\n{}", grammar.to_pretty());
  Ok(grammar)
}
