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

//! An Earley recognizer for any grammar.
//!
//! Every position of the input gets a state set. States are processed in
//! insertion order, including the ones added while the set is processed, and
//! each is either completed, used for prediction, or scanned against the
//! next token. Nullable rules are stepped over during prediction
//! (Aycock-Horspool), so empty derivations need no special treatment later.

pub mod state;

use {
  crate::{grammar::Grammar, scanner::Token},
  state::{State, StateSet},
};

/// The state sets of one parse.
#[derive(Clone, Debug)]
pub struct Chart<'g> {
  grammar: &'g Grammar,
  start: usize,
  token_count: usize,
  /// Sets up to the first empty one. Later positions were never reached.
  sets: Vec<StateSet>,
}

impl<'g> Chart<'g> {
  pub fn grammar(&self) -> &'g Grammar {
    self.grammar
  }

  pub fn start_rule(&self) -> usize {
    self.start
  }

  pub fn sets(&self) -> &[StateSet] {
    &self.sets
  }

  pub fn set(&self, position: usize) -> &StateSet {
    &self.sets[position]
  }

  /// The number of tokens given to the parse.
  pub fn token_count(&self) -> usize {
    self.token_count
  }

  /// The total number of states across all sets.
  pub fn state_count(&self) -> usize {
    self.sets.iter().map(StateSet::len).sum()
  }

  /// The last position that has any states. Parsing stopped right after it.
  pub fn furthest(&self) -> usize {
    self
      .sets
      .iter()
      .rposition(|set| !set.is_empty())
      .expect("the first state set is never empty")
  }

  /// Returns the complete start-rule state spanning the whole input, if the
  /// parse succeeded. Among several, the production with fewer symbols wins,
  /// then the production declared first.
  pub fn finish(&self) -> Option<State> {
    self
      .completions(self.token_count)
      .min_by_key(|s| (s.dot, s.production))
  }

  /// The complete start-rule states that cover the tokens before
  /// `position`.
  pub fn completions(
    &self,
    position: usize,
  ) -> impl Iterator<Item = State> + '_ {
    self
      .sets
      .get(position)
      .into_iter()
      .flat_map(StateSet::iter)
      .filter(move |s| {
        s.rule == self.start && s.origin == 0 && s.is_complete(self.grammar)
      })
      .copied()
  }

  /// The terminal symbols expected by the incomplete states of the furthest
  /// position, in symbol order.
  pub fn expected(&self) -> Vec<usize> {
    let mut expected: Vec<usize> = self.sets[self.furthest()]
      .iter()
      .filter_map(|s| s.next_symbol(self.grammar))
      .filter(|&sym| !self.grammar.is_nonterm(sym))
      .collect();
    expected.sort_unstable();
    expected.dedup();
    expected
  }
}

/// Runs the recognizer over `tokens`, starting from rule `start`.
pub fn parse<'g>(
  grammar: &'g Grammar,
  start: usize,
  tokens: &[Token],
) -> Chart<'g> {
  let mut sets = vec![StateSet::new()];
  for prod in 0..grammar.prods(start).len() {
    sets[0].insert(State::new(start, prod, 0));
  }

  for position in 0..=tokens.len() {
    if sets[position].is_empty() {
      break;
    }
    if position < tokens.len() {
      sets.push(StateSet::new());
    }

    let mut i = 0;
    while let Some(state) = sets[position].get(i) {
      i += 1;
      match state.next_symbol(grammar) {
        None => complete(grammar, &mut sets, position, state),
        Some(sym) if grammar.is_nonterm(sym) => {
          predict(grammar, &mut sets[position], position, state, sym)
        }
        Some(sym) => {
          if let Some(token) = tokens.get(position) {
            scan(grammar, &mut sets, position, state, sym, token)
          }
        }
      }
    }
  }

  let chart = Chart {
    grammar,
    start,
    token_count: tokens.len(),
    sets,
  };
  log::debug!(
    "Earley parse of {} tokens: {} states, furthest position {}.",
    tokens.len(),
    chart.state_count(),
    chart.furthest()
  );
  chart
}

fn complete(
  grammar: &Grammar,
  sets: &mut [StateSet],
  position: usize,
  state: State,
) {
  log::trace!("Completing {:?} at {}.", state, position);
  let advanced: Vec<State> = sets[state.origin]
    .iter()
    .filter(|s| s.next_symbol(grammar) == Some(state.rule))
    .map(State::advance)
    .collect();
  for next in advanced {
    sets[position].insert(next);
  }
}

fn predict(
  grammar: &Grammar,
  set: &mut StateSet,
  position: usize,
  state: State,
  rule: usize,
) {
  log::trace!("Predicting rule {} from {:?} at {}.", rule, state, position);
  for prod in 0..grammar.prods(rule).len() {
    set.insert(State::new(rule, prod, position));
  }
  if grammar.is_nullable(rule) {
    set.insert(state.advance());
  }
}

fn scan(
  grammar: &Grammar,
  sets: &mut [StateSet],
  position: usize,
  state: State,
  sym: usize,
  token: &Token,
) {
  let terminal = grammar
    .terminal(sym)
    .expect("symbols past the rules are terminals");
  if terminal.matches(
    token.kind.str(),
    &token.text,
    grammar.case_sensitivity(),
  ) {
    log::trace!("Scanned {:?} with {:?}.", token.text, state);
    sets[position + 1].insert(state.advance());
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    grammar::{build, examples, Terminal},
    scanner::Scanner,
  };

  fn arith_chart<'g>(g: &'g Grammar, input: &str) -> Chart<'g> {
    let tokens = examples::arith_scanner().scan(input).unwrap();
    parse(g, 0, &tokens)
  }

  #[test]
  fn test_accepts_arith() {
    let g = examples::make_arith();
    let chart = arith_chart(&g, "1 + 2 + 3");
    assert_eq!(chart.token_count(), 5);
    assert_eq!(chart.furthest(), 5);
    let finish = chart.finish().unwrap();
    assert_eq!((finish.rule, finish.origin), (0, 0));
  }

  #[test]
  fn test_incomplete_input_reports_expected() {
    let g = examples::make_arith();
    let chart = arith_chart(&g, "1 +");
    assert!(chart.finish().is_none());
    assert_eq!(chart.furthest(), 2);
    let expected: Vec<_> = chart
      .expected()
      .into_iter()
      .map(|sym| g.terminal(sym).unwrap().clone())
      .collect();
    assert_eq!(expected, vec![Terminal::external("NUM")]);
  }

  #[test]
  fn test_stops_at_unexpected_token() {
    let g = examples::make_arith();
    let chart = arith_chart(&g, "1 2 + 3");
    assert!(chart.finish().is_none());
    assert_eq!(chart.furthest(), 1);
    assert!(chart.set(2).is_empty());
    assert_eq!(chart.sets().len(), 3);
    assert_eq!(chart.token_count(), 4);
  }

  #[test]
  fn test_completions_at_prefixes() {
    let g = examples::make_arith();
    let chart = arith_chart(&g, "1 + 2 +");
    let ends: Vec<_> = (0..=chart.token_count())
      .filter(|&p| chart.completions(p).next().is_some())
      .collect();
    assert_eq!(ends, vec![1, 3]);
    assert!(chart.finish().is_none());
  }

  #[test]
  fn test_nullable_bypass() {
    let g = examples::make_nullable();
    let accepted = parse(&g, 0, &examples::char_tokens("b"));
    assert!(accepted.finish().is_some());
    let with_opt = parse(&g, 0, &examples::char_tokens("ab"));
    assert!(with_opt.finish().is_some());
    let garbage = parse(&g, 0, &examples::char_tokens("abx"));
    assert!(garbage.finish().is_none());
    assert_eq!(garbage.furthest(), 2);
  }

  #[test]
  fn test_cyclic_nullable_terminates() {
    // a -> a a | b | ε; b -> a
    let g = build(|gb| {
      gb.add_rule("a", |rb| {
        rb.add_prod(|pb| {
          pb.add_nonterm("a").add_nonterm("a");
        })
        .add_prod(|pb| {
          pb.add_nonterm("b");
        })
        .add_prod(|_pb| {});
      })
      .add_rule("b", |rb| {
        rb.add_prod(|pb| {
          pb.add_nonterm("a");
        })
        .add_prod(|pb| {
          pb.add_literal("x");
        });
      });
    })
    .unwrap();
    let chart = parse(&g, 0, &examples::char_tokens("xx"));
    assert!(chart.finish().is_some());
    let empty = parse(&g, 0, &[]);
    assert!(empty.finish().is_some());
  }

  #[test]
  fn test_state_sets_have_no_duplicates() {
    let g = examples::make_arith();
    let chart = arith_chart(&g, "1 + 2 + 3 + 4");
    for set in chart.sets() {
      let unique: std::collections::BTreeSet<_> = set.iter().collect();
      assert_eq!(unique.len(), set.len());
    }
  }
}
