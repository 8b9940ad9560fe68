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
  super::{
    element_types::{Binding, CaseSensitivity, Symbol, Terminal},
    Grammar, GrammarError, Prod,
  },
  crate::utils::Name,
  std::collections::BTreeMap,
};

/// A helper trait to allow builder methods to either take a type `T`, or a
/// reference to `T` if it is clonable.
pub trait BuilderInto<T> {
  /// Consumes self and produces a value of type `T`.
  fn builder_into(self) -> T;
}

impl<T> BuilderInto<T> for T {
  fn builder_into(self) -> T {
    self
  }
}

impl<'a, T> BuilderInto<T> for &'a T
where
  T: Clone,
{
  fn builder_into(self) -> T {
    self.clone()
  }
}

impl BuilderInto<Name> for &'_ str {
  fn builder_into(self) -> Name {
    Name::new(self)
  }
}

/// A production element before rule names are resolved to symbol indices.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SymbolRef {
  Rule(Name),
  Term(Terminal),
}

pub struct ProductionBuilder {
  elems: Vec<(Binding, SymbolRef)>,
}

impl ProductionBuilder {
  fn new() -> Self {
    ProductionBuilder { elems: Vec::new() }
  }

  pub fn add_elem(&mut self, binding: Binding, elem: SymbolRef) -> &mut Self {
    self.elems.push((binding, elem));
    self
  }

  pub fn add_term(&mut self, term: impl BuilderInto<Terminal>) -> &mut Self {
    self.add_elem(Binding::Unbound, SymbolRef::Term(term.builder_into()))
  }

  pub fn add_literal(&mut self, lit: &str) -> &mut Self {
    self.add_term(Terminal::literal(lit))
  }

  pub fn add_external(&mut self, kind: &str) -> &mut Self {
    self.add_term(Terminal::external(kind))
  }

  pub fn add_bound_term(
    &mut self,
    binding: Binding,
    term: impl BuilderInto<Terminal>,
  ) -> &mut Self {
    self.add_elem(binding, SymbolRef::Term(term.builder_into()))
  }

  pub fn add_nonterm(&mut self, nonterm: impl BuilderInto<Name>) -> &mut Self {
    self.add_elem(Binding::Unbound, SymbolRef::Rule(nonterm.builder_into()))
  }

  pub fn add_bound_nonterm(
    &mut self,
    binding: Binding,
    nonterm: impl BuilderInto<Name>,
  ) -> &mut Self {
    self.add_elem(binding, SymbolRef::Rule(nonterm.builder_into()))
  }
}

// ----------------

pub struct RuleBuilder {
  prods: Vec<Vec<(Binding, SymbolRef)>>,
}

impl RuleBuilder {
  fn new() -> Self {
    RuleBuilder { prods: Vec::new() }
  }

  pub fn add_prod(
    &mut self,
    build_fn: impl FnOnce(&mut ProductionBuilder),
  ) -> &mut Self {
    let mut builder = ProductionBuilder::new();
    build_fn(&mut builder);
    self.prods.push(builder.elems);
    self
  }

  pub fn add_prod_with_elems(
    &mut self,
    elems: impl BuilderInto<Vec<(Binding, SymbolRef)>>,
  ) -> &mut Self {
    self.prods.push(elems.builder_into());
    self
  }
}

// ----------------

pub struct GrammarBuilder {
  rules: Vec<(Name, Vec<Vec<(Binding, SymbolRef)>>)>,
  ignore: Vec<Terminal>,
  case_sensitivity: CaseSensitivity,
  ast_mappings: bool,
}

impl GrammarBuilder {
  fn new() -> Self {
    GrammarBuilder {
      rules: Vec::new(),
      ignore: Vec::new(),
      case_sensitivity: CaseSensitivity::Sensitive,
      ast_mappings: false,
    }
  }

  /// Adds a rule. Productions of a rule added twice are merged into the
  /// first declaration.
  pub fn add_rule<F>(
    &mut self,
    head: impl BuilderInto<Name>,
    build_fn: F,
  ) -> &mut Self
  where
    F: FnOnce(&mut RuleBuilder),
  {
    let head = head.builder_into();
    let mut rule_builder = RuleBuilder::new();
    build_fn(&mut rule_builder);
    match self.rules.iter_mut().find(|(name, _)| *name == head) {
      Some((_, prods)) => prods.extend(rule_builder.prods),
      None => self.rules.push((head, rule_builder.prods)),
    }
    self
  }

  pub fn add_ignore(&mut self, term: impl BuilderInto<Terminal>) -> &mut Self {
    let term = term.builder_into();
    if !self.ignore.contains(&term) {
      self.ignore.push(term);
    }
    self
  }

  pub fn set_case_sensitivity(&mut self, case: CaseSensitivity) -> &mut Self {
    self.case_sensitivity = case;
    self
  }

  /// Keeps binding metadata in the built grammar even if every position is
  /// unbound.
  pub fn enable_ast_mappings(&mut self) -> &mut Self {
    self.ast_mappings = true;
    self
  }

  fn build(self) -> Result<Grammar, GrammarError> {
    let GrammarBuilder {
      rules,
      ignore,
      case_sensitivity,
      ast_mappings,
    } = self;

    let rule_indices: BTreeMap<Name, usize> = rules
      .iter()
      .enumerate()
      .map(|(i, (name, _))| (name.clone(), i))
      .collect();
    let mut symbols: Vec<Symbol> = rules
      .iter()
      .map(|(name, _)| Symbol::NonTerm(name.clone()))
      .collect();
    let mut term_indices: BTreeMap<Terminal, usize> = BTreeMap::new();

    let mut has_bindings = ast_mappings;
    let mut all_prods = Vec::with_capacity(rules.len());
    let mut all_bindings = Vec::with_capacity(rules.len());
    for (_, prods) in rules {
      let mut rule_prods = Vec::with_capacity(prods.len());
      let mut rule_bindings = Vec::with_capacity(prods.len());
      for elems in prods {
        let mut prod_symbols = Vec::with_capacity(elems.len());
        let mut prod_bindings = Vec::with_capacity(elems.len());
        for (binding, elem) in elems {
          let index = match elem {
            SymbolRef::Rule(name) => *rule_indices
              .get(&name)
              .ok_or(GrammarError::UndefinedRule(name))?,
            SymbolRef::Term(term) => {
              *term_indices.entry(term.clone()).or_insert_with(|| {
                symbols.push(Symbol::Term(term));
                symbols.len() - 1
              })
            }
          };
          has_bindings |= !binding.is_unbound();
          prod_symbols.push(index);
          prod_bindings.push(binding);
        }
        rule_prods.push(Prod::new(prod_symbols));
        rule_bindings.push(prod_bindings);
      }
      all_prods.push(rule_prods);
      all_bindings.push(rule_bindings);
    }

    Grammar::new(
      symbols,
      all_prods,
      ignore,
      if has_bindings { Some(all_bindings) } else { None },
      case_sensitivity,
    )
  }
}

/// Builds a grammar using a builder function. The first rule added is the
/// default start rule.
///
/// Example:
///
/// ```rust
/// # use furrow::grammar::Grammar;
/// let g: Grammar = furrow::grammar::build(|gb| {
///   gb.add_rule("x", |rb| {
///     rb.add_prod(|pb| {
///       pb.add_literal("a").add_nonterm("x").add_literal("a");
///     })
///     .add_prod(|_pb| {});
///   });
/// })
/// .unwrap();
/// assert!(g.is_nullable(0));
/// ```
pub fn build(
  build_fn: impl FnOnce(&mut GrammarBuilder),
) -> Result<Grammar, GrammarError> {
  let mut builder = GrammarBuilder::new();
  build_fn(&mut builder);
  builder.build()
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_terminals_are_interned() {
    let g = build(|gb| {
      gb.add_rule("a", |rb| {
        rb.add_prod(|pb| {
          pb.add_literal("x").add_literal("y").add_literal("x");
        });
      });
    })
    .unwrap();
    assert_eq!(g.symbols().len(), 3);
    assert_eq!(g.prod(0, 0).symbols(), &[1, 2, 1]);
  }

  #[test]
  fn test_undefined_rule() {
    let result = build(|gb| {
      gb.add_rule("a", |rb| {
        rb.add_prod(|pb| {
          pb.add_nonterm("b");
        });
      });
    });
    assert_eq!(result, Err(GrammarError::UndefinedRule(Name::new("b"))));
  }

  #[test]
  fn test_duplicate_rules_merge() {
    let g = build(|gb| {
      gb.add_rule("a", |rb| {
        rb.add_prod(|pb| {
          pb.add_literal("x");
        });
      })
      .add_rule("b", |rb| {
        rb.add_prod(|pb| {
          pb.add_nonterm("a");
        });
      })
      .add_rule("a", |rb| {
        rb.add_prod(|pb| {
          pb.add_literal("y");
        });
      });
    })
    .unwrap();
    assert_eq!(g.rule_count(), 2);
    assert_eq!(g.prods(0).len(), 2);
  }

  #[test]
  fn test_bindings_enable_mappings() {
    let plain = build(|gb| {
      gb.add_rule("a", |rb| {
        rb.add_prod(|pb| {
          pb.add_literal("x");
        });
      });
    })
    .unwrap();
    assert!(!plain.has_ast_mappings());

    let bound = build(|gb| {
      gb.add_rule("a", |rb| {
        rb.add_prod(|pb| {
          pb.add_bound_term(Binding::Set(Name::new("v")), Terminal::literal("x"))
            .add_literal("y");
        });
      });
    })
    .unwrap();
    assert_eq!(
      bound.bindings(0, 0),
      Some(&[Binding::Set(Name::new("v")), Binding::Unbound][..])
    );
  }

  #[test]
  fn test_bound_nonterms() {
    let g = build(|gb| {
      gb.add_rule("list", |rb| {
        rb.add_prod(|pb| {
          pb.add_bound_nonterm(Binding::Push(Name::new("items")), "item")
            .add_bound_nonterm(Binding::Set(Name::new("last")), "item");
        });
      })
      .add_rule("item", |rb| {
        rb.add_prod(|pb| {
          pb.add_literal("x");
        });
      });
    })
    .unwrap();
    assert_eq!(g.prod(0, 0).len(), 2);
    assert!(g.is_nonterm(g.prod(0, 0).get(0).unwrap()));
    assert_eq!(
      g.bindings(0, 0),
      Some(
        &[
          Binding::Push(Name::new("items")),
          Binding::Set(Name::new("last"))
        ][..]
      )
    );
    assert_eq!(g.bindings(1, 0), Some(&[Binding::Unbound][..]));
  }
}
