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

pub mod builder;
pub mod element_types;
pub mod pattern;

use {
  crate::utils::{Name, ToDoc},
  element_types::{Binding, CaseSensitivity, Symbol, Terminal},
  serde::{Deserialize, Serialize},
};

/// A production: an ordered sequence of indices into the grammar's symbol
/// table. May be empty.
#[derive(
  Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Prod {
  symbols: Vec<usize>,
}

impl Prod {
  pub fn new(symbols: Vec<usize>) -> Self {
    Prod { symbols }
  }

  pub fn symbols(&self) -> &[usize] {
    &self.symbols
  }

  pub fn len(&self) -> usize {
    self.symbols.len()
  }

  pub fn is_empty(&self) -> bool {
    self.symbols.is_empty()
  }

  pub fn get(&self, index: usize) -> Option<usize> {
    self.symbols.get(index).copied()
  }
}

/// Errors found while validating a grammar.
#[derive(Clone, PartialEq, Eq, Debug, thiserror::Error)]
pub enum GrammarError {
  #[error("Grammar has no rules.")]
  Empty,
  #[error("Rule {0} is not defined.")]
  UndefinedRule(Name),
  #[error("Rules without productions: {0:?}")]
  RulesWithoutProductions(Vec<Name>),
  #[error("Rule {rule} references symbol {index}, which is out of range.")]
  UnknownSymbol { rule: Name, index: usize },
  #[error("Symbol {0} is not laid out as rules followed by terminals.")]
  MisplacedSymbol(usize),
  #[error("Binding metadata of rule {0} does not match its productions.")]
  InconsistentMappings(Name),
}

/// A compiled context-free grammar.
///
/// The symbol table holds one non-terminal per rule, at the rule's index,
/// followed by every distinct terminal. Grammars are immutable once built,
/// and the nullable flags are always computed before a grammar is handed
/// out.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Grammar {
  pub(super) symbols: Vec<Symbol>,
  pub(super) rules: Vec<Vec<Prod>>,
  pub(super) nullable: Vec<bool>,
  pub(super) ignore: Vec<Terminal>,
  pub(super) ast_mappings: Option<Vec<Vec<Vec<Binding>>>>,
  #[serde(default)]
  pub(super) case_sensitivity: CaseSensitivity,
}

impl Grammar {
  pub(super) fn new(
    symbols: Vec<Symbol>,
    rules: Vec<Vec<Prod>>,
    ignore: Vec<Terminal>,
    ast_mappings: Option<Vec<Vec<Vec<Binding>>>>,
    case_sensitivity: CaseSensitivity,
  ) -> Result<Self, GrammarError> {
    let mut g = Grammar {
      symbols,
      rules,
      nullable: Vec::new(),
      ignore,
      ast_mappings,
      case_sensitivity,
    };
    g.check_grammar()?;
    g.mark_nullables();
    Ok(g)
  }

  pub(super) fn check_grammar(&self) -> Result<(), GrammarError> {
    if self.rules.is_empty() {
      return Err(GrammarError::Empty);
    }

    for (i, symbol) in self.symbols.iter().enumerate() {
      let in_place = match symbol {
        Symbol::NonTerm(_) => i < self.rules.len(),
        Symbol::Term(_) => i >= self.rules.len(),
      };
      if !in_place {
        return Err(GrammarError::MisplacedSymbol(i));
      }
    }
    if self.symbols.len() < self.rules.len() {
      return Err(GrammarError::MisplacedSymbol(self.symbols.len()));
    }

    for (rule, prods) in self.rules.iter().enumerate() {
      for prod in prods {
        if let Some(&index) =
          prod.symbols().iter().find(|&&s| s >= self.symbols.len())
        {
          return Err(GrammarError::UnknownSymbol {
            rule: self.rule_name(rule).clone(),
            index,
          });
        }
      }
    }

    let without_prods: Vec<_> = self
      .rules
      .iter()
      .enumerate()
      .filter(|(_, prods)| prods.is_empty())
      .map(|(rule, _)| self.rule_name(rule).clone())
      .collect();
    if !without_prods.is_empty() {
      return Err(GrammarError::RulesWithoutProductions(without_prods));
    }

    if let Some(mappings) = &self.ast_mappings {
      for rule in 0..self.rules.len() {
        let consistent = mappings.get(rule).map_or(false, |rule_maps| {
          rule_maps.len() == self.rules[rule].len()
            && rule_maps
              .iter()
              .zip(&self.rules[rule])
              .all(|(bindings, prod)| bindings.len() == prod.len())
        });
        if !consistent {
          return Err(GrammarError::InconsistentMappings(
            self.rule_name(rule).clone(),
          ));
        }
      }
    }

    Ok(())
  }

  pub fn symbols(&self) -> &[Symbol] {
    &self.symbols
  }

  pub fn symbol(&self, index: usize) -> &Symbol {
    &self.symbols[index]
  }

  pub fn rule_count(&self) -> usize {
    self.rules.len()
  }

  /// Returns true if the symbol at `index` is a non-terminal.
  pub fn is_nonterm(&self, index: usize) -> bool {
    index < self.rules.len()
  }

  pub fn terminal(&self, index: usize) -> Option<&Terminal> {
    self.symbols.get(index).and_then(Symbol::as_term)
  }

  /// Iterates over all terminal symbols with their symbol indices.
  pub fn terminals(&self) -> impl Iterator<Item = (usize, &Terminal)> {
    self
      .symbols
      .iter()
      .enumerate()
      .skip(self.rules.len())
      .filter_map(|(i, sym)| sym.as_term().map(|t| (i, t)))
  }

  pub fn rule_name(&self, rule: usize) -> &Name {
    self.symbols[rule]
      .as_nonterm()
      .expect("rule symbols are non-terminals")
  }

  pub fn rule_index(&self, name: &str) -> Option<usize> {
    self.symbols[..self.rules.len()]
      .iter()
      .position(|sym| sym.as_nonterm().map_or(false, |nt| nt.str() == name))
  }

  pub fn prods(&self, rule: usize) -> &[Prod] {
    &self.rules[rule]
  }

  pub fn prod(&self, rule: usize, prod: usize) -> &Prod {
    &self.rules[rule][prod]
  }

  pub fn is_nullable(&self, rule: usize) -> bool {
    self.nullable[rule]
  }

  pub fn nullable(&self) -> &[bool] {
    &self.nullable
  }

  /// Patterns a grammar-derived scanner skips between tokens.
  pub fn ignore(&self) -> &[Terminal] {
    &self.ignore
  }

  pub fn case_sensitivity(&self) -> CaseSensitivity {
    self.case_sensitivity
  }

  pub fn has_ast_mappings(&self) -> bool {
    self.ast_mappings.is_some()
  }

  /// Returns the binding metadata of a production, if this grammar carries
  /// any.
  pub fn bindings(&self, rule: usize, prod: usize) -> Option<&[Binding]> {
    self
      .ast_mappings
      .as_ref()
      .map(|mappings| mappings[rule][prod].as_slice())
  }

  /// Returns true if the rule was generated while desugaring. Synthetic rule
  /// names start with `$`, which user identifiers cannot contain.
  pub fn is_synthetic(&self, rule: usize) -> bool {
    self.rule_name(rule).str().starts_with('$')
  }

  /// Iterates over the rules that produce typed AST nodes.
  pub fn node_types(&self) -> impl Iterator<Item = (usize, &Name)> {
    (0..self.rules.len())
      .filter(move |&rule| !self.is_synthetic(rule))
      .map(move |rule| (rule, self.rule_name(rule)))
  }

  fn symbol_doc<'a, DA: pretty::DocAllocator<'a>>(
    &self,
    da: &'a DA,
    index: usize,
    binding: &Binding,
  ) -> pretty::DocBuilder<'a, DA>
  where
    DA::Doc: Clone,
  {
    let prefix = match binding {
      Binding::Unbound => da.nil(),
      Binding::Set(name) => name.to_doc(da).append(da.text("=")),
      Binding::Push(name) => name.to_doc(da).append(da.text("+=")),
    };
    prefix.append(self.symbols[index].to_doc(da))
  }

  fn prod_doc<'a, DA: pretty::DocAllocator<'a>>(
    &self,
    da: &'a DA,
    rule: usize,
    prod: usize,
  ) -> pretty::DocBuilder<'a, DA>
  where
    DA::Doc: Clone,
  {
    let symbols = self.rules[rule][prod].symbols();
    if symbols.is_empty() {
      return da.text("ε");
    }
    let bindings = self.bindings(rule, prod);
    da.intersperse(
      symbols.iter().enumerate().map(|(i, &sym)| {
        let binding = bindings.map_or(&Binding::Unbound, |b| &b[i]);
        self.symbol_doc(da, sym, binding)
      }),
      da.softline(),
    )
  }
}

impl ToDoc for Grammar {
  fn to_doc<'a, DA: pretty::DocAllocator<'a>>(
    &self,
    da: &'a DA,
  ) -> pretty::DocBuilder<'a, DA>
  where
    DA::Doc: Clone,
  {
    let rules_entry = da.text("Rules ").append(
      da.softline()
        .append(
          da.concat((0..self.rules.len()).map(|rule| {
            let nullable = if self.nullable[rule] { "?" } else { "" };
            self
              .rule_name(rule)
              .to_doc(da)
              .append(da.text(nullable))
              .append(da.text(" =>"))
              .append(da.softline())
              .append(da.intersperse(
                (0..self.rules[rule].len())
                  .map(|prod| self.prod_doc(da, rule, prod)),
                da.text(" |").append(da.softline()),
              ))
              .nest(2)
              .group()
              .append(da.text(";"))
              .append(da.softline())
          }))
          .nest(2),
        )
        .braces(),
    );

    let ignore_entry = da.text("Ignore ").append(
      da.intersperse(
        self.ignore.iter().map(|t| t.to_doc(da)),
        da.text(",").append(da.softline()),
      )
      .braces(),
    );

    da.concat(
      vec![rules_entry, ignore_entry]
        .into_iter()
        .map(|doc| doc.append(da.text(",")).append(da.softline())),
    )
  }
}
