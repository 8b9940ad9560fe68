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

//! Provides base data structures to represent and work with Earley states.
//!
//! An Earley state is a production with a position marker (the dot) and the
//! token position where the production started.

use {
  crate::{grammar::Grammar, utils::WasChanged},
  std::collections::BTreeSet,
};

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct State {
  pub rule: usize,
  pub production: usize,
  pub dot: usize,
  pub origin: usize,
}

impl State {
  pub fn new(rule: usize, production: usize, origin: usize) -> Self {
    State {
      rule,
      production,
      dot: 0,
      origin,
    }
  }

  /// The state with the dot moved one symbol forward.
  pub fn advance(&self) -> Self {
    State {
      dot: self.dot + 1,
      ..*self
    }
  }

  /// The state with the dot moved one symbol back, if there is one.
  pub fn retreat(&self) -> Option<Self> {
    self.dot.checked_sub(1).map(|dot| State { dot, ..*self })
  }

  pub fn is_complete(&self, grammar: &Grammar) -> bool {
    self.dot >= grammar.prod(self.rule, self.production).len()
  }

  /// The symbol right after the dot, or None if the state is complete.
  pub fn next_symbol(&self, grammar: &Grammar) -> Option<usize> {
    grammar.prod(self.rule, self.production).get(self.dot)
  }

  /// The symbol right before the dot, or None if the dot is at the start.
  pub fn prev_symbol(&self, grammar: &Grammar) -> Option<usize> {
    self
      .dot
      .checked_sub(1)
      .and_then(|i| grammar.prod(self.rule, self.production).get(i))
  }
}

/// The states of one input position, in insertion order and without
/// duplicates.
#[derive(Clone, Default, Debug)]
pub struct StateSet {
  states: Vec<State>,
  index: BTreeSet<State>,
}

impl StateSet {
  pub fn new() -> Self {
    StateSet::default()
  }

  pub fn insert(&mut self, state: State) -> WasChanged {
    let changed = WasChanged::from_changed(self.index.insert(state));
    if changed.is_changed() {
      self.states.push(state);
    }
    changed
  }

  pub fn contains(&self, state: &State) -> bool {
    self.index.contains(state)
  }

  pub fn get(&self, i: usize) -> Option<State> {
    self.states.get(i).copied()
  }

  pub fn len(&self) -> usize {
    self.states.len()
  }

  pub fn is_empty(&self) -> bool {
    self.states.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &State> {
    self.states.iter()
  }
}
