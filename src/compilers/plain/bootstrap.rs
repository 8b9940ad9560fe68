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

//! The grammar of the plain dialect, written out by hand so that the plain
//! compiler can parse its input with the engine it compiles for.

use {
  crate::{
    grammar::{build, Grammar, Terminal},
    parsers::Parser,
    scanner::GrammarScanner,
  },
  once_cell::sync::Lazy,
  std::sync::Arc,
};

pub(super) const ID: &str = "[a-zA-Z0-9_]+";
pub(super) const STRING: &str = r#""([^"\\]|\\.)+""#;
pub(super) const RANGE: &str = r"\[([^\]\\]|\\.)+\]";
pub(super) const REGEXP: &str = r"/([^/\\]|\\.)+/[a-z]*";

fn pattern(source: &str) -> Terminal {
  Terminal::pattern(source).expect("bootstrap patterns are valid")
}

fn make_bootstrap_grammar() -> Grammar {
  let id = pattern(ID);
  let string = pattern(STRING);
  let range = pattern(RANGE);
  let regexp = pattern(REGEXP);

  build(|gb| {
    gb.add_rule("grammar", |rb| {
      rb.add_prod(|pb| {
        pb.add_nonterm("rule_list").add_nonterm("ignore_list");
      });
    })
    .add_rule("rule_list", |rb| {
      rb.add_prod(|pb| {
        pb.add_nonterm("rule_list").add_nonterm("rule");
      })
      .add_prod(|pb| {
        pb.add_nonterm("rule");
      });
    })
    .add_rule("rule", |rb| {
      rb.add_prod(|pb| {
        pb.add_term(&id).add_literal(":").add_nonterm("choice");
      });
    })
    .add_rule("choice", |rb| {
      rb.add_prod(|pb| {
        pb.add_nonterm("choice")
          .add_literal("|")
          .add_nonterm("sequence");
      })
      .add_prod(|pb| {
        pb.add_nonterm("sequence");
      });
    })
    .add_rule("sequence", |rb| {
      rb.add_prod(|pb| {
        pb.add_nonterm("sequence").add_nonterm("term");
      })
      .add_prod(|pb| {
        pb.add_nonterm("term");
      })
      .add_prod(|pb| {
        pb.add_literal("%");
      });
    })
    .add_rule("term", |rb| {
      rb.add_prod(|pb| {
        pb.add_term(&id);
      })
      .add_prod(|pb| {
        pb.add_term(&string);
      })
      .add_prod(|pb| {
        pb.add_term(&range);
      })
      .add_prod(|pb| {
        pb.add_literal(".");
      })
      .add_prod(|pb| {
        pb.add_term(&regexp);
      });
    })
    .add_rule("ignore_list", |rb| {
      rb.add_prod(|pb| {
        pb.add_nonterm("ignore_list").add_nonterm("ignore_def");
      })
      .add_prod(|_pb| {});
    })
    .add_rule("ignore_def", |rb| {
      rb.add_prod(|pb| {
        pb.add_literal("~").add_nonterm("ignore_term");
      });
    })
    .add_rule("ignore_term", |rb| {
      rb.add_prod(|pb| {
        pb.add_term(&string);
      })
      .add_prod(|pb| {
        pb.add_term(&range);
      })
      .add_prod(|pb| {
        pb.add_term(&regexp);
      });
    })
    .add_ignore(pattern(r"\s+"))
    .add_ignore(pattern(r"//[^\n]*"));
  })
  .expect("bootstrap grammar is well formed")
}

static PARSER: Lazy<Parser<GrammarScanner>> = Lazy::new(|| {
  let grammar = Arc::new(make_bootstrap_grammar());
  let scanner = GrammarScanner::new(&grammar);
  Parser::new(grammar).with_scanner(scanner)
});

/// The parser for plain-dialect source, built on first use.
pub(super) fn parser() -> &'static Parser<GrammarScanner> {
  &PARSER
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::scanner::Scanner;

  #[test]
  fn test_bootstrap_grammar_shape() {
    let g = parser().grammar();
    assert_eq!(g.rule_count(), 9);
    assert_eq!(g.rule_name(0).str(), "grammar");
    assert!(g.is_nullable(g.rule_index("ignore_list").unwrap()));
    assert!(!g.is_nullable(0));
    assert_eq!(g.ignore().len(), 2);
  }

  #[test]
  fn test_bootstrap_scanner_skips_comments() {
    let tokens = parser()
      .scanner()
      .scan("a: \"x\" // note\n  | /y/i [z]\n")
      .unwrap();
    let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["a", ":", "\"x\"", "|", "/y/i", "[z]"]);
  }
}
