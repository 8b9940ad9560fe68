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

//! Example grammars shared by tests.

use crate::{
  grammar::{build, Grammar},
  scanner::{TableScanner, Token},
};

/// start -> expr
/// expr -> expr "+" expr | NUM
pub fn make_arith() -> Grammar {
  build(|gb| {
    gb.add_rule("start", |rb| {
      rb.add_prod(|pb| {
        pb.add_nonterm("expr");
      });
    })
    .add_rule("expr", |rb| {
      rb.add_prod(|pb| {
        pb.add_nonterm("expr").add_literal("+").add_nonterm("expr");
      })
      .add_prod(|pb| {
        pb.add_external("NUM");
      });
    });
  })
  .unwrap()
}

/// start -> opt "b"
/// opt -> "a" | ε
pub fn make_nullable() -> Grammar {
  build(|gb| {
    gb.add_rule("start", |rb| {
      rb.add_prod(|pb| {
        pb.add_nonterm("opt").add_literal("b");
      });
    })
    .add_rule("opt", |rb| {
      rb.add_prod(|pb| {
        pb.add_literal("a");
      })
      .add_prod(|_pb| {});
    });
  })
  .unwrap()
}

/// Scans digits as NUM and "+" as PLUS, skipping whitespace.
pub fn arith_scanner() -> TableScanner {
  TableScanner::build(|tb| {
    tb.add_pattern("NUM", "[0-9]+")
      .add_literal("PLUS", "+")
      .add_ignore_pattern(r"\s+");
  })
  .unwrap()
}

pub fn char_tokens(input: &str) -> Vec<Token> {
  input
    .char_indices()
    .map(|(offset, c)| Token::new("char", &c.to_string(), offset))
    .collect()
}
