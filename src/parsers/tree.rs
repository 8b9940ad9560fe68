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

//! Reconstruction of a single derivation from a finished chart.
//!
//! The walk starts at a finishing state and moves backward over its
//! symbols. For a non-terminal symbol, the child is one of the complete
//! states of that rule in the current set whose origin set holds the
//! predecessor of the current state. Candidates are tried with the largest
//! origin first, so the siblings to the left get the longest span. Ties go
//! to the production with fewer symbols, then to the earlier production.
//!
//! A candidate that is already being derived further up is skipped, and
//! when a node has no usable candidate left the search backs up to the
//! previous choice. Finishing states are tried in the same order. Both the
//! search and the value construction keep their own stacks, so deep trees
//! do not exhaust the call stack.

use {
  super::earley::{state::State, Chart},
  crate::{
    grammar::Grammar,
    scanner::Token,
    utils::{Name, ToDoc},
  },
  std::collections::{BTreeMap, BTreeSet},
};

/// A byte range of the input.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Span {
  pub start: usize,
  pub len: usize,
}

impl Span {
  pub fn end(&self) -> usize {
    self.start + self.len
  }

  /// The slice of `input` this span covers.
  pub fn slice<'a>(&self, input: &'a str) -> &'a str {
    &input[self.start..self.end()]
  }
}

/// Everything known about one reduction, passed to `Actions::reduce`.
pub struct Reduction<'a> {
  pub grammar: &'a Grammar,
  pub rule: usize,
  pub production: usize,
  /// Index of the first covered token.
  pub start: usize,
  /// Index one past the last covered token.
  pub end: usize,
  tokens: &'a [Token],
}

impl<'a> Reduction<'a> {
  pub fn rule_name(&self) -> &'a Name {
    self.grammar.rule_name(self.rule)
  }

  pub fn tokens(&self) -> &'a [Token] {
    &self.tokens[self.start..self.end]
  }

  /// The covered byte range. Text skipped by the scanner between covered
  /// tokens is included.
  pub fn span(&self) -> Span {
    let start = match self.tokens.get(self.start) {
      Some(token) => token.offset,
      None => self.tokens.last().map_or(0, Token::end),
    };
    let end = if self.end > self.start {
      self.tokens[self.end - 1].end()
    } else {
      start
    };
    Span {
      start,
      len: end - start,
    }
  }
}

/// The postprocessing hook. Every token and every finished
/// (rule, production, children) tuple of the chosen derivation passes
/// through it, children first.
pub trait Actions {
  type Value;

  fn token(&self, token: &Token) -> Self::Value;

  fn reduce(
    &self,
    reduction: &Reduction,
    children: Vec<Self::Value>,
  ) -> Self::Value;
}

impl<A: Actions + ?Sized> Actions for &A {
  type Value = A::Value;

  fn token(&self, token: &Token) -> Self::Value {
    (**self).token(token)
  }

  fn reduce(
    &self,
    reduction: &Reduction,
    children: Vec<Self::Value>,
  ) -> Self::Value {
    (**self).reduce(reduction, children)
  }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ParseTree {
  Leaf(Token),
  Node {
    rule: usize,
    name: Name,
    production: usize,
    children: Vec<ParseTree>,
  },
}

impl ParseTree {
  pub fn rule_name(&self) -> Option<&Name> {
    match self {
      ParseTree::Node { name, .. } => Some(name),
      ParseTree::Leaf(_) => None,
    }
  }

  pub fn production(&self) -> Option<usize> {
    match self {
      ParseTree::Node { production, .. } => Some(*production),
      ParseTree::Leaf(_) => None,
    }
  }

  pub fn children(&self) -> &[ParseTree] {
    match self {
      ParseTree::Node { children, .. } => children,
      ParseTree::Leaf(_) => &[],
    }
  }

  pub fn child(&self, i: usize) -> Option<&ParseTree> {
    self.children().get(i)
  }

  pub fn token(&self) -> Option<&Token> {
    match self {
      ParseTree::Leaf(token) => Some(token),
      ParseTree::Node { .. } => None,
    }
  }

  /// The concatenated text of all tokens below this tree.
  pub fn text(&self) -> String {
    let mut text = String::new();
    self.push_text(&mut text);
    text
  }

  fn push_text(&self, out: &mut String) {
    match self {
      ParseTree::Leaf(token) => out.push_str(&token.text),
      ParseTree::Node { children, .. } => {
        children.iter().for_each(|child| child.push_text(out))
      }
    }
  }
}

impl ToDoc for ParseTree {
  fn to_doc<'a, DA: pretty::DocAllocator<'a>>(
    &self,
    da: &'a DA,
  ) -> pretty::DocBuilder<'a, DA>
  where
    DA::Doc: Clone,
  {
    match self {
      ParseTree::Leaf(token) => da.text(format!("{:?}", token.text)),
      ParseTree::Node {
        name,
        production,
        children,
        ..
      } => name
        .to_doc(da)
        .append(da.text(format!("#{}", production)))
        .append(
          da.text("(")
            .append(
              da.intersperse(
                children.iter().map(|child| child.to_doc(da)),
                da.softline(),
              )
              .nest(2),
            )
            .append(da.text(")"))
            .group(),
        ),
    }
  }
}

/// Actions that build a `ParseTree`.
#[derive(Copy, Clone, Default, Debug)]
pub struct TreeBuilder;

impl Actions for TreeBuilder {
  type Value = ParseTree;

  fn token(&self, token: &Token) -> ParseTree {
    ParseTree::Leaf(token.clone())
  }

  fn reduce(
    &self,
    reduction: &Reduction,
    children: Vec<ParseTree>,
  ) -> ParseTree {
    ParseTree::Node {
      rule: reduction.rule,
      name: reduction.rule_name().clone(),
      production: reduction.production,
      children,
    }
  }
}

/// A complete state together with the position where it ends.
type Item = (State, usize);

#[derive(Copy, Clone, Debug)]
enum Child {
  Token(usize),
  Node(Item),
}

/// One symbol of a production, visited right to left.
struct Step {
  /// The walk cursor, with the dot right after this symbol.
  cursor: State,
  /// The position where this symbol ends.
  position: usize,
  /// For a non-terminal, the candidate children in preference order. Empty
  /// for a terminal.
  candidates: Vec<State>,
  taken: usize,
}

impl Step {
  fn is_choice(&self) -> bool {
    !self.candidates.is_empty()
  }

  fn child(&self) -> Child {
    match self.candidates.get(self.taken) {
      Some(&state) => Child::Node((state, self.position)),
      None => Child::Token(self.position - 1),
    }
  }
}

/// The search state of one item whose children are being chosen.
struct Frame {
  item: Item,
  steps: Vec<Step>,
}

impl Frame {
  fn new(item: Item) -> Self {
    Frame {
      item,
      steps: Vec::new(),
    }
  }

  /// The walk cursor and position after the last step.
  fn cursor(&self) -> (State, usize) {
    match self.steps.last() {
      None => self.item,
      Some(step) => {
        let prev = step
          .cursor
          .retreat()
          .expect("a visited symbol has a predecessor state");
        let position = match step.child() {
          Child::Node((child, _)) => child.origin,
          Child::Token(index) => index,
        };
        (prev, position)
      }
    }
  }

  /// Drops steps back to the last choice and moves that choice to its next
  /// candidate. Returns false if there is no choice left.
  fn back_up(&mut self) -> bool {
    match self.steps.iter().rposition(Step::is_choice) {
      Some(i) => {
        self.steps.truncate(i + 1);
        self.steps[i].taken += 1;
        true
      }
      None => false,
    }
  }

  fn children(&self) -> Vec<Child> {
    self.steps.iter().rev().map(Step::child).collect()
  }
}

enum Next {
  Walk,
  Descend(Item),
  Done,
  Fail,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Outcome {
  Started,
  Planned,
  Failed,
}

/// Chooses one derivation for each item of a chart. The search uses an
/// explicit stack, so its depth does not grow with the input. Candidates
/// already on the search path are skipped, and a frame that runs out of
/// candidates makes its parent try the next one.
struct Planner<'c, 'g> {
  chart: &'c Chart<'g>,
  plans: BTreeMap<Item, Vec<Child>>,
  active: BTreeSet<Item>,
}

impl<'c, 'g> Planner<'c, 'g> {
  fn new(chart: &'c Chart<'g>) -> Self {
    Planner {
      chart,
      plans: BTreeMap::new(),
      active: BTreeSet::new(),
    }
  }

  /// The complete states of `rule` ending at `position` that can follow
  /// `prev`, in preference order.
  fn candidates(
    &self,
    rule: usize,
    prev: State,
    position: usize,
  ) -> Vec<State> {
    let grammar = self.chart.grammar();
    let mut candidates: Vec<State> = self
      .chart
      .set(position)
      .iter()
      .filter(|s| s.rule == rule && s.is_complete(grammar))
      .filter(|s| self.chart.set(s.origin).contains(&prev))
      .copied()
      .collect();
    candidates.sort_by(|a, b| {
      b.origin
        .cmp(&a.origin)
        .then(a.dot.cmp(&b.dot))
        .then(a.production.cmp(&b.production))
    });
    candidates
  }

  /// Takes the current candidate of the last step, or the next usable one.
  fn choose(&self, frame: &mut Frame) -> Next {
    loop {
      let step = match frame.steps.last_mut() {
        Some(step) => step,
        None => return Next::Fail,
      };
      match step.candidates.get(step.taken) {
        Some(&child) => {
          let item = (child, step.position);
          if self.plans.contains_key(&item) {
            return Next::Walk;
          }
          if !self.active.contains(&item) {
            return Next::Descend(item);
          }
          log::trace!("Skipping cyclic candidate {:?} at {}.", child, item.1);
          step.taken += 1;
        }
        None => {
          frame.steps.pop();
          if !frame.back_up() {
            return Next::Fail;
          }
        }
      }
    }
  }

  /// Moves the cursor left until the frame is complete, needs a child
  /// planned, or has no way forward.
  fn walk(&self, frame: &mut Frame) -> Next {
    let grammar = self.chart.grammar();
    loop {
      let (cursor, position) = frame.cursor();
      let next = match cursor.prev_symbol(grammar) {
        None if position == cursor.origin => return Next::Done,
        Some(sym) if grammar.is_nonterm(sym) => {
          let prev = cursor
            .retreat()
            .expect("a state with a previous symbol can retreat");
          let candidates = self.candidates(sym, prev, position);
          frame.steps.push(Step {
            cursor,
            position,
            candidates,
            taken: 0,
          });
          self.choose(frame)
        }
        Some(_) if position > cursor.origin => {
          frame.steps.push(Step {
            cursor,
            position,
            candidates: Vec::new(),
            taken: 0,
          });
          Next::Walk
        }
        _ if frame.back_up() => self.choose(frame),
        _ => Next::Fail,
      };
      match next {
        Next::Walk => {}
        other => return other,
      }
    }
  }

  /// Finds a derivation of `root`. Returns false if every derivation
  /// would be cyclic.
  fn plan(&mut self, root: Item) -> bool {
    if self.plans.contains_key(&root) {
      return true;
    }
    let mut stack = vec![Frame::new(root)];
    self.active.insert(root);
    let mut outcome = Outcome::Started;
    while let Some(frame) = stack.last_mut() {
      let next = match outcome {
        Outcome::Started | Outcome::Planned => self.walk(frame),
        Outcome::Failed => {
          if let Some(step) = frame.steps.last_mut() {
            step.taken += 1;
          }
          match self.choose(frame) {
            Next::Walk => self.walk(frame),
            other => other,
          }
        }
      };
      match next {
        Next::Descend(item) => {
          self.active.insert(item);
          stack.push(Frame::new(item));
          outcome = Outcome::Started;
        }
        Next::Fail => {
          let frame = stack.pop().expect("the stack has a current frame");
          self.active.remove(&frame.item);
          outcome = Outcome::Failed;
        }
        Next::Done | Next::Walk => {
          let frame = stack.pop().expect("the stack has a current frame");
          self.active.remove(&frame.item);
          self.plans.insert(frame.item, frame.children());
          outcome = Outcome::Planned;
        }
      }
    }
    outcome == Outcome::Planned
  }

  /// Runs `actions` over the planned derivation of `root`, children first.
  fn build<A: Actions>(
    &self,
    root: Item,
    tokens: &[Token],
    actions: &A,
  ) -> A::Value {
    struct Pending<'p, V> {
      item: Item,
      children: &'p [Child],
      values: Vec<V>,
    }
    let grammar = self.chart.grammar();
    let pending = |item: Item| Pending {
      item,
      children: self.plans.get(&item).expect("children are planned first"),
      values: Vec::new(),
    };

    let mut stack = vec![pending(root)];
    loop {
      let top = stack.last_mut().expect("the stack has a current node");
      let children = top.children;
      match children.get(top.values.len()).copied() {
        Some(Child::Token(index)) => {
          top.values.push(actions.token(&tokens[index]))
        }
        Some(Child::Node(item)) => stack.push(pending(item)),
        None => {
          let done = stack.pop().expect("the stack has a current node");
          let (state, end) = done.item;
          let reduction = Reduction {
            grammar,
            rule: state.rule,
            production: state.production,
            start: state.origin,
            end,
            tokens,
          };
          let value = actions.reduce(&reduction, done.values);
          match stack.last_mut() {
            Some(parent) => parent.values.push(value),
            None => return value,
          }
        }
      }
    }
  }
}

/// Builds the value of the chosen derivation of a finished chart. Returns
/// None if the chart has no finishing state.
pub fn reconstruct<A: Actions>(
  chart: &Chart,
  tokens: &[Token],
  actions: &A,
) -> Option<A::Value> {
  let end = chart.token_count();
  let mut finishes: Vec<State> = chart.completions(end).collect();
  finishes.sort_by_key(|s| (s.dot, s.production));

  let mut planner = Planner::new(chart);
  let root = finishes
    .into_iter()
    .map(|state| (state, end))
    .find(|&item| planner.plan(item))?;
  Some(planner.build(root, tokens, actions))
}
