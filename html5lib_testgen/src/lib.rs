//! html5lib_testgen: Rust test generator for the html5lib tokenizer suite
//!
//! Each fixture file of [html5lib-tests](https://github.com/html5lib/html5lib-tests)
//! (`tokenizer/test1.test`, ...) lists cases as `{description, input, errors?,
//! initialStates?}`. This crate turns one such file into one Rust source file
//! holding a `#[test]` per case:
//!
//! - [`sanitize`](mod@sanitize) derives a unique snake_case function name from the description,
//! - [`escape`] makes the input safe inside a raw string literal,
//! - [`emit`](mod@emit) filters, partitions and renders the document,
//! - [`driver`] runs fetch → emit → persist for every configured fixture, using
//!   the [`FixtureSource`] and [`DocumentSink`] seams for I/O.
//!
//! The generated files expect a sibling `test_utils` module exposing
//! `parser_test(&str)` and a dev-dependency on `insta`.

pub mod config;
pub mod driver;
pub mod emit;
pub mod escape;
pub mod record;
pub mod sanitize;
pub mod sink;
pub mod source;

pub use config::Config;
pub use driver::{GeneratedFile, render_fixture, run};
pub use emit::{EmitError, GeneratedTestCase, Template, TestCategory, emit, generate_cases, partition, render};
pub use escape::{escape_input, raw_literal};
pub use record::{RecordError, TestRecord, parse_suite};
pub use sanitize::{NameRegistry, SanitizeError, sanitize};
pub use sink::{CheckSink, DirSink, DocumentSink};
pub use source::{DirSource, FixtureSource, HttpSource};
