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

//! An Earley parser generator.
//!
//! Grammars are written in one of two text dialects and compiled into
//! `grammar::Grammar` values:
//!
//! * the plain dialect (`compilers::plain`) has rules of alternatives over
//!   rule names, string literals, character classes and regexes;
//! * the rich dialect (`compilers::rich`) adds field bindings,
//!   multiplicities and inline choices, and its grammars carry the metadata
//!   `ast::AstBuilder` needs to build syntax trees.
//!
//! Input is turned into tokens by a `scanner::Scanner` and parsed by the
//! Earley engine in `parsers::earley`. A single derivation is then picked
//! deterministically and passed through an `parsers::Actions` hook, which
//! builds a `parsers::ParseTree` by default.
//!
//! ```rust
//! # use std::sync::Arc;
//! # use furrow::{compilers::plain, parsers::Parser};
//! let grammar = plain::compile(r#"sum: sum "+" [0-9] | [0-9]"#).unwrap();
//! let parser = Parser::new(Arc::new(grammar));
//! assert!(parser.parse("1+2+3").is_ok());
//! assert!(parser.parse("1+").is_err());
//! ```

#[macro_use]
extern crate derivative;

pub mod ast;
pub mod compilers;
pub mod grammar;
pub mod parsers;
pub mod scanner;
pub mod utils;

pub use crate::{
  compilers::{CompileError, CompileOptions},
  grammar::{Grammar, GrammarError},
  parsers::{ParseError, Parser},
  scanner::{Scanner, Token},
};
