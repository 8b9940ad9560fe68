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

//! A calculator evaluated through method tables, with and without a token
//! scanner.

use {
  furrow::{
    ast::{AstNode, AstParser, Methods},
    compilers::{rich, CompileOptions},
    grammar::Grammar,
    scanner::GrammarScanner,
  },
  std::sync::Arc,
};

const CALC_WITH_SCANNER: &str = r#"
expr: first=term ops+=expr_op*
expr_op: op=("+" | "-") operand=term
term: first=factor ops+=term_op*
term_op: op=("*" | "/") operand=factor
factor: value=int | "(" value=expr ")"
int: /[0-9]+/
~ /\s+/
"#;

const CALC_SCANNERLESS: &str = r#"
expr: first=term ops+=expr_op*
expr_op: op=("+" | "-") operand=term
term: first=factor ops+=term_op*
term_op: op=("*" | "/") operand=factor
factor: value=int | "(" value=expr ")"
int: [0-9]+
"#;

fn fold(node: &AstNode, m: &Methods<i64>) -> anyhow::Result<i64> {
  let mut acc = m.eval(node.field("first")?)?;
  for op in node.list("ops") {
    let op = op.as_node().ok_or_else(|| anyhow::anyhow!("bad operation"))?;
    let operand = m.eval(op.field("operand")?)?;
    acc = match op.field("op")?.text().as_str() {
      "+" => acc + operand,
      "-" => acc - operand,
      "*" => acc * operand,
      "/" => acc
        .checked_div(operand)
        .ok_or_else(|| anyhow::anyhow!("division by zero"))?,
      other => anyhow::bail!("unknown operator {}", other),
    };
  }
  Ok(acc)
}

fn calc_methods(grammar: &Grammar) -> Methods<i64> {
  Methods::build(grammar, |mb| {
    mb.add("expr", fold)
      .add("term", fold)
      .add("factor", |node, m| m.eval(node.field("value")?))
      .add("int", |node, _| Ok(node.text().parse()?));
  })
  .unwrap()
}

#[test]
fn calculator_with_grammar_scanner() {
  let grammar = Arc::new(
    rich::compile(CALC_WITH_SCANNER, &CompileOptions::default().scanner(true))
      .unwrap(),
  );
  let methods = calc_methods(&grammar);
  let parser =
    AstParser::new(grammar.clone()).with_scanner(GrammarScanner::new(&grammar));

  assert_eq!(
    parser
      .evaluate("56 + 37*2 - (8/4 + 904)", &methods)
      .unwrap(),
    -776
  );
  assert_eq!(parser.evaluate("2 * (3 + 4) * 5", &methods).unwrap(), 70);
  assert!(parser.evaluate("2 * (3 + 4", &methods).is_err());

  let err = parser.evaluate("1 / 0", &methods).unwrap_err();
  assert_eq!(err.to_string(), "division by zero");
}

#[test]
fn calculator_without_scanner() {
  let grammar =
    Arc::new(rich::compile(CALC_SCANNERLESS, &CompileOptions::default()).unwrap());
  let methods = calc_methods(&grammar);
  let parser = AstParser::new(grammar);

  assert_eq!(parser.evaluate("56+37*2-(8/4+904)", &methods).unwrap(), -776);
  assert_eq!(parser.evaluate("10-4-3", &methods).unwrap(), 3);
  assert!(parser.evaluate("1 + 2", &methods).is_err());
}

#[test]
fn operands_keep_their_node_types() {
  let grammar =
    Arc::new(rich::compile(CALC_SCANNERLESS, &CompileOptions::default()).unwrap());
  let parser = AstParser::new(grammar);
  let value = parser.parse("(1)").unwrap().value;
  let expr = value.as_node().unwrap();
  assert_eq!(expr.type_name().unwrap().str(), "expr");
  let factor = expr
    .field("first")
    .unwrap()
    .as_node()
    .unwrap()
    .field("first")
    .unwrap()
    .as_node()
    .unwrap();
  assert_eq!(factor.type_name().unwrap().str(), "factor");
  assert_eq!(factor.text(), "(1)");
  assert_eq!(factor.span().len, 3);
}
