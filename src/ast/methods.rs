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

//! Method tables: behaviors attached to node types.

use {
  super::{AstNode, AstValue},
  crate::{grammar::Grammar, utils::Name},
  std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
  },
};

#[derive(Clone, PartialEq, Eq, Debug, thiserror::Error)]
pub enum AstError {
  #[error("Methods given for names that are not node types: {0:?}")]
  UnknownNodeTypes(Vec<Name>),
  #[error("No method for node type {0}.")]
  MissingMethod(Name),
  #[error("Cannot dispatch on a value that is not a typed node: {0:?}")]
  Untyped(String),
  #[error("Node {node:?} has no field {field}.")]
  MissingField { node: Option<Name>, field: Name },
}

type Method<V> =
  Arc<dyn Fn(&AstNode, &Methods<V>) -> anyhow::Result<V> + Send + Sync>;

pub struct MethodsBuilder<V> {
  table: BTreeMap<Name, Method<V>>,
}

impl<V> MethodsBuilder<V> {
  /// Sets the method for a node type. A later method for the same type
  /// replaces an earlier one.
  pub fn add<F>(&mut self, node_type: &str, method: F) -> &mut Self
  where
    F: Fn(&AstNode, &Methods<V>) -> anyhow::Result<V> + Send + Sync + 'static,
  {
    self.table.insert(Name::new(node_type), Arc::new(method));
    self
  }
}

/// A table of behaviors keyed by node type. The table is fixed once built
/// and can be shared between threads.
#[derive(Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""))]
pub struct Methods<V> {
  #[derivative(Debug = "ignore")]
  table: BTreeMap<Name, Method<V>>,
}

impl<V> Methods<V> {
  /// Builds a table for the node types of `grammar`.
  pub fn build(
    grammar: &Grammar,
    build_fn: impl FnOnce(&mut MethodsBuilder<V>),
  ) -> Result<Self, AstError> {
    let mut builder = MethodsBuilder {
      table: BTreeMap::new(),
    };
    build_fn(&mut builder);

    let node_types: BTreeSet<&Name> =
      grammar.node_types().map(|(_, name)| name).collect();
    let unknown: Vec<Name> = builder
      .table
      .keys()
      .filter(|name| !node_types.contains(name))
      .cloned()
      .collect();
    if !unknown.is_empty() {
      return Err(AstError::UnknownNodeTypes(unknown));
    }
    Ok(Methods {
      table: builder.table,
    })
  }

  pub fn has_method(&self, node_type: &str) -> bool {
    self.table.contains_key(node_type)
  }

  /// Runs the method of the node's type.
  pub fn call(&self, node: &AstNode) -> anyhow::Result<V> {
    let name = node
      .type_name()
      .ok_or_else(|| AstError::Untyped(node.text().to_string()))?;
    let method = self
      .table
      .get(name)
      .ok_or_else(|| AstError::MissingMethod(name.clone()))?;
    method(node, self)
  }

  /// Runs the method of a node value. Tokens and lists have no type to
  /// dispatch on.
  pub fn eval(&self, value: &AstValue) -> anyhow::Result<V> {
    match value {
      AstValue::Node(node) => self.call(node),
      other => Err(AstError::Untyped(other.text()).into()),
    }
  }
}
