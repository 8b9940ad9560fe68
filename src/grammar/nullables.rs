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

//! Nullability analysis.
//!
//! A rule is nullable if it can derive the empty token sequence: either one
//! of its productions is empty, or every symbol of one of its productions is
//! a nullable non-terminal.

use {
  crate::{
    grammar::{Grammar, Prod},
    utils::WasChanged,
  },
};

/// Computes the nullable flag of every rule. `rules[i]` holds the productions
/// of the rule whose non-terminal symbol index is `i`.
pub fn calculate_nullables(rules: &[Vec<Prod>]) -> Vec<bool> {
  let mut nullable: Vec<bool> = rules
    .iter()
    .map(|prods| prods.iter().any(Prod::is_empty))
    .collect();

  loop {
    let mut changed = false;
    for (rule, prods) in rules.iter().enumerate() {
      if nullable[rule] {
        continue;
      }

      let derives_empty = prods.iter().any(|prod| {
        prod
          .symbols()
          .iter()
          .all(|&sym| sym < rules.len() && nullable[sym])
      });

      if derives_empty {
        log::trace!("Rule {} is nullable.", rule);
        nullable[rule] = true;
        changed = true;
      }
    }

    if !changed {
      return nullable;
    }
  }
}

impl Grammar {
  /// Recomputes the nullable flags of this grammar. Marking an already
  /// marked grammar changes nothing.
  pub fn mark_nullables(&mut self) -> WasChanged {
    let nullable = calculate_nullables(&self.rules);
    let changed = WasChanged::from_changed(nullable != self.nullable);
    self.nullable = nullable;
    changed
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::grammar::{build, examples};

  #[test]
  fn test_simple_nullable_grammar() {
    let g = examples::make_nullable();
    // start -> opt "b"; opt -> "a" | ε
    assert_eq!(g.nullable(), &[false, true]);
  }

  #[test]
  fn test_transitive_nullable() {
    let g = build(|gb| {
      gb.add_rule("a", |rb| {
        rb.add_prod(|pb| {
          pb.add_nonterm("b").add_nonterm("c");
        });
      })
      .add_rule("b", |rb| {
        rb.add_prod(|pb| {
          pb.add_nonterm("c");
        });
      })
      .add_rule("c", |rb| {
        rb.add_prod(|pb| {
          pb.add_literal("x");
        })
        .add_prod(|_pb| {});
      })
      .add_rule("d", |rb| {
        rb.add_prod(|pb| {
          pb.add_nonterm("c").add_literal("y");
        });
      });
    })
    .unwrap();
    assert_eq!(g.nullable(), &[true, true, true, false]);
  }

  #[test]
  fn test_self_recursive_rule_is_not_nullable() {
    let g = build(|gb| {
      gb.add_rule("a", |rb| {
        rb.add_prod(|pb| {
          pb.add_nonterm("a");
        })
        .add_prod(|pb| {
          pb.add_literal("x");
        });
      });
    })
    .unwrap();
    assert_eq!(g.nullable(), &[false]);
  }

  #[test]
  fn test_marking_is_idempotent() {
    let mut g = examples::make_nullable();
    let before = g.nullable().to_vec();
    assert_eq!(g.mark_nullables(), WasChanged::Unchanged);
    assert_eq!(g.mark_nullables(), WasChanged::Unchanged);
    assert_eq!(g.nullable(), &before[..]);
  }
}
