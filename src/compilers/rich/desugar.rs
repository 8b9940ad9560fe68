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

//! Rewrites rich-dialect constructs into plain rules.
//!
//! Each pass walks every term of every rule, inner groups first. Rules
//! created by a pass are appended and visited by the same pass.

use {
  super::{
    syntax::{Choice, Multiplicity, Primary, RuleDef, Sequence, Term},
    CompileOptions,
  },
  crate::{compilers::literal::split_class, utils::Name},
  std::collections::BTreeMap,
};

type Pass = fn(&mut Desugarer, &mut Term);

pub(super) struct Desugarer {
  rules: Vec<RuleDef>,
  split_literals: BTreeMap<String, Name>,
}

impl Desugarer {
  pub fn new(rules: Vec<RuleDef>) -> Self {
    Desugarer {
      rules,
      split_literals: BTreeMap::new(),
    }
  }

  pub fn run(mut self, options: &CompileOptions) -> Vec<RuleDef> {
    if !options.scanner {
      self.each_term(Desugarer::split_literal);
    }
    self.each_term(Desugarer::remove_multiplicity);
    self.each_term(Desugarer::split_range);
    self.each_term(Desugarer::remove_inner_choice);
    self.rules
  }

  /// Appends a synthetic rule named after the current rule count. The
  /// definition may refer to the new rule by name.
  fn add_rule(&mut self, define: impl FnOnce(&Name) -> Choice) -> Name {
    let name = Name::new(&format!("${}", self.rules.len()));
    let choice = define(&name);
    log::debug!("Added synthetic rule {}: {:?}", name, choice);
    self.rules.push(RuleDef {
      name: name.clone(),
      choice,
    });
    name
  }

  fn each_term(&mut self, pass: Pass) {
    let mut i = 0;
    while i < self.rules.len() {
      let mut choice = std::mem::take(&mut self.rules[i].choice);
      self.visit_choice(&mut choice, pass);
      self.rules[i].choice = choice;
      i += 1;
    }
  }

  fn visit_choice(&mut self, choice: &mut Choice, pass: Pass) {
    for sequence in &mut choice.0 {
      for term in &mut sequence.0 {
        self.visit_term(term, pass);
      }
    }
  }

  fn visit_term(&mut self, term: &mut Term, pass: Pass) {
    if let Primary::Group(inner) = &mut term.value {
      self.visit_choice(inner, pass);
    }
    if let Some(Multiplicity::Separated(sep)) = &mut term.multiplicity {
      if let Primary::Group(inner) = &mut **sep {
        self.visit_choice(inner, pass);
      }
    }
    pass(self, term);
  }

  fn split_primary(&mut self, primary: &mut Primary) {
    let text = match primary {
      Primary::Literal(text) if text.chars().count() > 1 => text,
      _ => return,
    };
    let name = match self.split_literals.get(text.as_str()) {
      Some(name) => name.clone(),
      None => {
        let text = text.clone();
        let name = self.add_rule(|_| {
          Choice(vec![Sequence(
            text
              .chars()
              .map(|c| Term::plain(Primary::Literal(c.to_string())))
              .collect(),
          )])
        });
        self.split_literals.insert(text, name.clone());
        name
      }
    };
    *primary = Primary::Id(name);
  }

  /// `"abc"` becomes `$N` with `$N: "a" "b" "c"`.
  fn split_literal(&mut self, term: &mut Term) {
    self.split_primary(&mut term.value);
    if let Some(Multiplicity::Separated(sep)) = &mut term.multiplicity {
      self.split_primary(sep);
    }
  }

  /// Replaces `p?`, `p*`, `p+` and `p++s` with a reference to a new rule.
  /// The binding moves to the item inside the new rule, so the reference
  /// itself is unbound and its fields splice into the parent.
  fn remove_multiplicity(&mut self, term: &mut Term) {
    let multiplicity = match term.multiplicity.take() {
      Some(multiplicity) => multiplicity,
      None => return,
    };
    let item = Term {
      binding: term.binding.clone(),
      value: term.value.clone(),
      multiplicity: None,
    };
    let name = self.add_rule(|name| {
      let this = || Term::plain(Primary::Id(name.clone()));
      let sequences = match multiplicity {
        Multiplicity::Optional => vec![vec![item], vec![]],
        Multiplicity::ZeroOrMore => vec![vec![this(), item], vec![]],
        Multiplicity::OneOrMore => {
          vec![vec![this(), item.clone()], vec![item]]
        }
        Multiplicity::Separated(sep) => vec![
          vec![this(), Term::plain(*sep), item.clone()],
          vec![item],
        ],
      };
      Choice(sequences.into_iter().map(Sequence).collect())
    });
    *term = Term::plain(Primary::Id(name));
  }

  /// `[a-z_]` becomes `([a-z] | [_])`.
  fn split_range(&mut self, term: &mut Term) {
    let items = match &term.value {
      Primary::Class(source) => match split_class(source) {
        Some(items) => items,
        None => return,
      },
      _ => return,
    };
    term.value = Primary::Group(Choice(
      items
        .into_iter()
        .map(|item| Sequence(vec![Term::plain(Primary::Class(item))]))
        .collect(),
    ));
  }

  /// `v=(a | b)` becomes `v=$N` with `$N: a | b`.
  fn remove_inner_choice(&mut self, term: &mut Term) {
    if let Primary::Group(choice) = &mut term.value {
      let choice = std::mem::take(choice);
      let name = self.add_rule(|_| choice);
      term.value = Primary::Id(name);
    }
  }
}

#[cfg(test)]
mod test {
  use {super::*, crate::grammar::Binding};

  fn rule(name: &str, sequences: Vec<Vec<Term>>) -> RuleDef {
    RuleDef {
      name: Name::new(name),
      choice: Choice(sequences.into_iter().map(Sequence).collect()),
    }
  }

  fn literal(text: &str) -> Term {
    Term::plain(Primary::Literal(text.to_string()))
  }

  fn id_of(term: &Term) -> &str {
    match &term.value {
      Primary::Id(name) => name.str(),
      other => panic!("expected an identifier, got {:?}", other),
    }
  }

  fn shape(rule: &RuleDef) -> Vec<usize> {
    rule.choice.0.iter().map(|seq| seq.0.len()).collect()
  }

  #[test]
  fn test_literals_are_split_and_shared() {
    let rules = Desugarer::new(vec![rule(
      "a",
      vec![vec![literal("ab"), literal("c"), literal("ab")]],
    )])
    .run(&CompileOptions::default());
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[1].name.str(), "$1");
    assert_eq!(shape(&rules[1]), vec![2]);
    let terms = &rules[0].choice.0[0].0;
    assert_eq!(id_of(&terms[0]), "$1");
    assert_eq!(id_of(&terms[2]), "$1");
  }

  #[test]
  fn test_scanner_mode_keeps_literals() {
    let rules = Desugarer::new(vec![rule("a", vec![vec![literal("ab")]])])
      .run(&CompileOptions::default().scanner(true));
    assert_eq!(rules.len(), 1);
  }

  #[test]
  fn test_multiplicity_moves_binding() {
    let mut item = Term::plain(Primary::Id(Name::new("NUM")));
    item.binding = Binding::Push(Name::new("item"));
    item.multiplicity = Some(Multiplicity::ZeroOrMore);
    let rules = Desugarer::new(vec![rule("list", vec![vec![item]])])
      .run(&CompileOptions::default());

    assert_eq!(rules.len(), 2);
    let reference = &rules[0].choice.0[0].0[0];
    assert!(reference.binding.is_unbound());
    assert_eq!(id_of(reference), "$1");

    assert_eq!(shape(&rules[1]), vec![2, 0]);
    let repeat = &rules[1].choice.0[0].0;
    assert_eq!(id_of(&repeat[0]), "$1");
    assert_eq!(repeat[1].binding, Binding::Push(Name::new("item")));
  }

  #[test]
  fn test_separated_list() {
    let mut item = Term::plain(Primary::Id(Name::new("x")));
    item.multiplicity =
      Some(Multiplicity::Separated(Box::new(Primary::Literal(",".into()))));
    let rules = Desugarer::new(vec![rule("list", vec![vec![item]])])
      .run(&CompileOptions::default());
    assert_eq!(shape(&rules[1]), vec![3, 1]);
  }

  #[test]
  fn test_ranges_become_choices() {
    let mut class = Term::plain(Primary::Class("[a-z_]".to_string()));
    class.binding = Binding::Set(Name::new("c"));
    let rules = Desugarer::new(vec![rule("a", vec![vec![class]])])
      .run(&CompileOptions::default());
    assert_eq!(rules.len(), 2);
    assert_eq!(shape(&rules[1]), vec![1, 1]);
    let reference = &rules[0].choice.0[0].0[0];
    assert_eq!(reference.binding, Binding::Set(Name::new("c")));
    assert_eq!(id_of(reference), "$1");
  }

  #[test]
  fn test_nested_groups_are_extracted_inner_first() {
    let inner = Term::plain(Primary::Group(Choice(vec![
      Sequence(vec![literal("x")]),
      Sequence(vec![literal("y")]),
    ])));
    let outer = Term::plain(Primary::Group(Choice(vec![
      Sequence(vec![inner]),
      Sequence(vec![literal("z")]),
    ])));
    let rules = Desugarer::new(vec![rule("a", vec![vec![outer]])])
      .run(&CompileOptions::default());
    assert_eq!(rules.len(), 3);
    assert_eq!(id_of(&rules[0].choice.0[0].0[0]), "$2");
    assert_eq!(id_of(&rules[2].choice.0[0].0[0]), "$1");
    assert_eq!(shape(&rules[1]), vec![1, 1]);
  }
}
