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

//! The lowered form of a rich-dialect grammar, before and during
//! desugaring.

use crate::{
  grammar::{Binding, Pattern},
  utils::Name,
};

#[derive(Clone, Debug)]
pub(super) struct RuleDef {
  pub name: Name,
  pub choice: Choice,
}

#[derive(Clone, Default, Debug)]
pub(super) struct Choice(pub Vec<Sequence>);

#[derive(Clone, Default, Debug)]
pub(super) struct Sequence(pub Vec<Term>);

#[derive(Clone, Debug)]
pub(super) struct Term {
  pub binding: Binding,
  pub value: Primary,
  pub multiplicity: Option<Multiplicity>,
}

impl Term {
  /// An unbound term with no multiplicity.
  pub fn plain(value: Primary) -> Self {
    Term {
      binding: Binding::Unbound,
      value,
      multiplicity: None,
    }
  }
}

#[derive(Clone, Debug)]
pub(super) enum Primary {
  Id(Name),
  Literal(String),
  /// A character class, kept as source text until generation.
  Class(String),
  Pattern(Pattern),
  Group(Choice),
}

#[derive(Clone, Debug)]
pub(super) enum Multiplicity {
  Optional,
  ZeroOrMore,
  OneOrMore,
  /// One or more, with the given separator between items.
  Separated(Box<Primary>),
}
