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

//! Abstract syntax trees built from the binding metadata of rich-dialect
//! grammars.
//!
//! Each reduction becomes a node whose fields are filled from its bound
//! children. Reductions of synthetic rules that have a single unbound child
//! pass the child through, so wrapper rules leave no trace. Other synthetic
//! reductions become untyped fragments whose fields are spliced into the
//! enclosing node.

pub mod methods;

pub use methods::{AstError, Methods, MethodsBuilder};

use {
  crate::{
    grammar::{Binding, Grammar, GrammarError},
    parsers::{Actions, ParseError, Parsed, Parser, Reduction, Span},
    scanner::{CharScanner, Scanner, Token},
    utils::{Name, ToDoc},
  },
  im::{OrdMap, Vector},
  std::sync::Arc,
};

/// The rule a node was built from.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct NodeType {
  pub rule: usize,
  pub name: Name,
}

#[derive(Clone, PartialEq, Debug)]
pub enum AstValue {
  Token(Token),
  Node(AstNode),
  List(Vector<AstValue>),
}

impl AstValue {
  /// The concatenated text of the tokens below this value.
  pub fn text(&self) -> String {
    let mut text = String::new();
    self.push_text(&mut text);
    text
  }

  fn push_text(&self, out: &mut String) {
    match self {
      AstValue::Token(token) => out.push_str(&token.text),
      AstValue::Node(node) => out.push_str(&node.text),
      AstValue::List(items) => items.iter().for_each(|v| v.push_text(out)),
    }
  }

  pub fn as_token(&self) -> Option<&Token> {
    match self {
      AstValue::Token(token) => Some(token),
      _ => None,
    }
  }

  pub fn as_node(&self) -> Option<&AstNode> {
    match self {
      AstValue::Node(node) => Some(node),
      _ => None,
    }
  }

  /// The items of a list, or this value alone.
  pub fn items(&self) -> Vec<&AstValue> {
    match self {
      AstValue::List(items) => items.iter().collect(),
      other => vec![other],
    }
  }
}

#[derive(Clone, PartialEq, Debug)]
pub struct AstNode {
  node_type: Option<NodeType>,
  fields: OrdMap<Name, AstValue>,
  text: String,
  span: Span,
}

impl AstNode {
  /// The rule this node was built from. None for fragments of synthetic
  /// rules.
  pub fn node_type(&self) -> Option<&NodeType> {
    self.node_type.as_ref()
  }

  pub fn type_name(&self) -> Option<&Name> {
    self.node_type.as_ref().map(|t| &t.name)
  }

  pub fn fields(&self) -> &OrdMap<Name, AstValue> {
    &self.fields
  }

  pub fn get(&self, field: &str) -> Option<&AstValue> {
    self.fields.get(field)
  }

  /// Like `get`, but a missing field is an error.
  pub fn field(&self, field: &str) -> Result<&AstValue, AstError> {
    self.get(field).ok_or_else(|| AstError::MissingField {
      node: self.type_name().cloned(),
      field: Name::new(field),
    })
  }

  /// The values of a field as a list. A missing field is empty.
  pub fn list(&self, field: &str) -> Vec<&AstValue> {
    self.get(field).map_or_else(Vec::new, AstValue::items)
  }

  /// The text of the tokens covered by this node. Text skipped by the
  /// scanner is not included. See `source_text`.
  pub fn text(&self) -> &str {
    &self.text
  }

  pub fn span(&self) -> Span {
    self.span
  }

  /// The slice of the parsed input covered by this node.
  pub fn source_text<'a>(&self, input: &'a str) -> &'a str {
    self.span.slice(input)
  }

  fn push(&mut self, field: &Name, value: AstValue) {
    match self.fields.get_mut(field) {
      Some(AstValue::List(items)) => items.push_back(value),
      Some(existing) => {
        let first = existing.clone();
        *existing = AstValue::List(Vector::from(vec![first, value]));
      }
      None => {
        self.fields.insert(field.clone(), AstValue::List(Vector::unit(value)));
      }
    }
  }

  fn splice(&mut self, fragment: AstNode) {
    for (field, value) in fragment.fields {
      match (self.fields.get_mut(&field), value) {
        (Some(AstValue::List(items)), AstValue::List(more)) => {
          items.append(more)
        }
        (Some(AstValue::List(items)), value) => items.push_back(value),
        (_, value) => {
          self.fields.insert(field, value);
        }
      }
    }
  }
}

impl ToDoc for AstValue {
  fn to_doc<'a, DA: pretty::DocAllocator<'a>>(
    &self,
    da: &'a DA,
  ) -> pretty::DocBuilder<'a, DA>
  where
    DA::Doc: Clone,
  {
    match self {
      AstValue::Token(token) => da.text(format!("{:?}", token.text)),
      AstValue::List(items) => da
        .intersperse(
          items.iter().map(|item| item.to_doc(da)),
          da.text(",").append(da.softline()),
        )
        .nest(2)
        .brackets()
        .group(),
      AstValue::Node(node) => node.to_doc(da),
    }
  }
}

impl ToDoc for AstNode {
  fn to_doc<'a, DA: pretty::DocAllocator<'a>>(
    &self,
    da: &'a DA,
  ) -> pretty::DocBuilder<'a, DA>
  where
    DA::Doc: Clone,
  {
    let head = match self.type_name() {
      Some(name) => name.to_doc(da),
      None => da.text("$"),
    };
    head.append(
      da.intersperse(
        self.fields.iter().map(|(field, value)| {
          field.to_doc(da).append(da.text(": ")).append(value.to_doc(da))
        }),
        da.text(",").append(da.softline()),
      )
      .nest(2)
      .braces()
      .group(),
    )
  }
}

/// Actions that build `AstValue`s from a grammar's binding metadata.
#[derive(Copy, Clone, Default, Debug)]
pub struct AstBuilder;

impl Actions for AstBuilder {
  type Value = AstValue;

  fn token(&self, token: &Token) -> AstValue {
    AstValue::Token(token.clone())
  }

  fn reduce(
    &self,
    reduction: &Reduction,
    mut children: Vec<AstValue>,
  ) -> AstValue {
    let grammar = reduction.grammar;
    let bindings = grammar
      .bindings(reduction.rule, reduction.production)
      .unwrap_or(&[]);
    let synthetic = grammar.is_synthetic(reduction.rule);

    let unbound = bindings.iter().all(Binding::is_unbound);
    if synthetic && unbound && children.len() == 1 {
      return children.remove(0);
    }

    let mut node = AstNode {
      node_type: if synthetic {
        None
      } else {
        Some(NodeType {
          rule: reduction.rule,
          name: reduction.rule_name().clone(),
        })
      },
      fields: OrdMap::new(),
      text: String::new(),
      span: reduction.span(),
    };
    for (i, child) in children.into_iter().enumerate() {
      child.push_text(&mut node.text);
      match bindings.get(i) {
        Some(Binding::Set(field)) => {
          node.fields.insert(field.clone(), child);
        }
        Some(Binding::Push(field)) => node.push(field, child),
        _ => {
          if let AstValue::Node(fragment) = child {
            node.splice(fragment);
          }
        }
      }
    }
    AstValue::Node(node)
  }
}

/// A parser that produces syntax trees.
///
/// ```rust
/// # use std::sync::Arc;
/// # use furrow::{ast::AstParser, compilers::{rich, CompileOptions}};
/// let grammar = rich::compile(
///   r#"pair: key=[a-z] "=" value=[0-9]"#,
///   &CompileOptions::default(),
/// )
/// .unwrap();
/// let parser = AstParser::new(Arc::new(grammar));
/// let parsed = parser.parse("x=1").unwrap();
/// let node = parsed.value.as_node().unwrap();
/// assert_eq!(node.type_name().unwrap().str(), "pair");
/// assert_eq!(node.get("key").unwrap().text(), "x");
/// assert_eq!(node.get("value").unwrap().text(), "1");
/// ```
#[derive(Derivative)]
#[derivative(Clone(bound = "S: Clone"), Debug(bound = ""))]
pub struct AstParser<S = CharScanner> {
  parser: Parser<S>,
}

impl AstParser<CharScanner> {
  pub fn new(grammar: Arc<Grammar>) -> Self {
    AstParser {
      parser: Parser::new(grammar),
    }
  }
}

impl<S: Scanner> AstParser<S> {
  pub fn with_scanner<S2: Scanner>(self, scanner: S2) -> AstParser<S2> {
    AstParser {
      parser: self.parser.with_scanner(scanner),
    }
  }

  pub fn with_start(self, rule: &str) -> Result<Self, GrammarError> {
    Ok(AstParser {
      parser: self.parser.with_start(rule)?,
    })
  }

  pub fn parser(&self) -> &Parser<S> {
    &self.parser
  }

  pub fn parse(&self, input: &str) -> Result<Parsed<AstValue>, ParseError> {
    self.parser.parse_with(input, &AstBuilder)
  }

  /// Parses `input` and evaluates the resulting tree with `methods`.
  pub fn evaluate<V>(
    &self,
    input: &str,
    methods: &Methods<V>,
  ) -> anyhow::Result<V> {
    let parsed = self.parse(input)?;
    methods.eval(&parsed.value)
  }
}
