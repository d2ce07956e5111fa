//! Rendering a fixture's records into one generated test file.
//!
//! Records with `initialStates` are skipped, the rest are split into cases
//! without declared errors and cases with them (each keeping fixture order),
//! and every case becomes a `#[test]` that snapshots the tokenizer output for
//! its input.

use std::fmt::Write as _;

use log::debug;
use serde::Deserialize;
use thiserror::Error;

use crate::escape::{DEFAULT_HASHES, escape_input, raw_literal};
use crate::record::TestRecord;
use crate::sanitize::{NameRegistry, SanitizeError, sanitize};

/// Which section of the document a case lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestCategory {
    Valid,
    Error,
}

impl TestCategory {
    fn section_comment(self) -> &'static str {
        match self {
            TestCategory::Valid => "// Spec valid tests",
            TestCategory::Error => "// Spec error tests",
        }
    }
}

/// A record after naming and escaping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedTestCase {
    pub name: String,
    /// Input as it will appear inside the literal.
    pub input: String,
    pub category: TestCategory,
}

/// Names that vary between consumers of the generated files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Template {
    /// Sibling module the generated file declares and glob-imports.
    pub utils_module: String,
    /// Function in `utils_module` that runs the tokenizer on an input.
    pub harness_fn: String,
    /// Minimum number of `#` around raw literals.
    pub min_hashes: usize,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            utils_module: "test_utils".to_string(),
            harness_fn: "parser_test".to_string(),
            min_hashes: DEFAULT_HASHES,
        }
    }
}

/// Errors raised while turning records into a document.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("cannot name test #{index}")]
    Name {
        /// Position of the record in the fixture.
        index: usize,
        #[source]
        source: SanitizeError,
    },
}

/// Split records into the valid and error partitions, dropping multi-state cases.
///
/// Each entry keeps its index in the original fixture.
pub fn partition(records: &[TestRecord]) -> (Vec<(usize, &TestRecord)>, Vec<(usize, &TestRecord)>) {
    let (errors, valid): (Vec<_>, Vec<_>) = records
        .iter()
        .enumerate()
        .filter(|(index, record)| {
            if record.has_initial_states() {
                debug!("skipping test #{index} ({:?}): initialStates are not supported", record.description);
                return false;
            }
            true
        })
        .partition(|(_, record)| record.has_errors());
    (valid, errors)
}

/// Name and escape every generated case, valid partition first.
///
/// # Errors
/// Fails on the first record whose description cannot be turned into a name.
pub fn generate_cases(records: &[TestRecord], registry: &mut NameRegistry) -> Result<Vec<GeneratedTestCase>, EmitError> {
    let (valid, errors) = partition(records);
    let sections = [(TestCategory::Valid, valid), (TestCategory::Error, errors)];

    let mut cases = Vec::with_capacity(sections.iter().map(|(_, s)| s.len()).sum());
    for (category, section) in sections {
        for (index, record) in section {
            let name = sanitize(&record.description, registry).map_err(|source| EmitError::Name { index, source })?;
            debug!("test #{index} {:?} -> {name}", record.description);
            cases.push(GeneratedTestCase {
                name,
                input: escape_input(&record.input),
                category,
            });
        }
    }
    Ok(cases)
}

/// Render the whole document for one fixture.
///
/// `registry` should be fresh for every document.
///
/// # Errors
/// See [`generate_cases`].
pub fn emit(records: &[TestRecord], registry: &mut NameRegistry, template: &Template) -> Result<String, EmitError> {
    let cases = generate_cases(records, registry)?;
    Ok(render(&cases, template))
}

/// Lay out already generated cases: preamble, valid section, error section, closing brace.
pub fn render(cases: &[GeneratedTestCase], template: &Template) -> String {
    let mut doc = String::new();
    doc.push_str("// AUTOGENERATED FILE\n");
    let _ = writeln!(doc, "mod {};", template.utils_module);
    doc.push('\n');
    doc.push_str("mod tests {\n");
    doc.push_str("    use insta::{assert_debug_snapshot, with_settings};\n");
    let _ = writeln!(doc, "    use crate::{}::*;", template.utils_module);
    doc.push('\n');

    for category in [TestCategory::Valid, TestCategory::Error] {
        let _ = write!(doc, "\n{}\n", category.section_comment());
        for case in cases.iter().filter(|c| c.category == category) {
            render_case(&mut doc, case, template);
        }
    }

    doc.push_str("}\n");
    doc
}

fn render_case(doc: &mut String, case: &GeneratedTestCase, template: &Template) {
    // `case.input` is already escaped; escaping is idempotent so the literal matches it.
    let literal = raw_literal(&case.input, template.min_hashes);
    let _ = write!(
        doc,
        "
    #[test]
    fn {name}() {{
        with_settings!({{sort_maps =>true}}, {{
            assert_debug_snapshot!({harness}({literal}));
        }});
    }}
",
        name = case.name,
        harness = template.harness_fn,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Vec<TestRecord> {
        vec![
            TestRecord::new("Bad start", "<").with_errors(json!([{"code": "eof-before-tag-name"}])),
            TestRecord::new("Single start tag", "<h>"),
            TestRecord::new("PLAINTEXT", "<p>").with_initial_states(json!(["PLAINTEXT state"])),
            TestRecord::new("Empty end tag", "</>").with_errors(json!([])),
            TestRecord::new("Start tag w/ attribute", "<h a='b'>"),
            TestRecord::new("Errors and states", "x")
                .with_errors(json!([]))
                .with_initial_states(json!(["RCDATA state"])),
        ]
    }

    #[test]
    fn partitions_keep_order_and_drop_initial_states() {
        let records = sample();
        let (valid, errors) = partition(&records);
        let valid: Vec<usize> = valid.iter().map(|(i, _)| *i).collect();
        let errors: Vec<usize> = errors.iter().map(|(i, _)| *i).collect();
        assert_eq!(valid, vec![1, 4]);
        assert_eq!(errors, vec![0, 3]);
    }

    #[test]
    fn cases_list_valid_section_first() {
        let mut registry = NameRegistry::new();
        let cases = generate_cases(&sample(), &mut registry).expect("generate ok");
        let summary: Vec<(&str, TestCategory)> = cases.iter().map(|c| (c.name.as_str(), c.category)).collect();
        assert_eq!(
            summary,
            vec![
                ("single_start_tag", TestCategory::Valid),
                ("start_tag_w_attribute", TestCategory::Valid),
                ("bad_start", TestCategory::Error),
                ("empty_end_tag", TestCategory::Error),
            ]
        );
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn names_are_unique_across_sections() {
        let records = vec![
            TestRecord::new("Same", "a").with_errors(json!([])),
            TestRecord::new("same", "b"),
            TestRecord::new("SAME", "c").with_errors(json!([])),
        ];
        let mut registry = NameRegistry::new();
        let names: Vec<String> = generate_cases(&records, &mut registry)
            .expect("generate ok")
            .into_iter()
            .map(|c| c.name)
            .collect();
        // the valid section is named first, so it gets the bare name
        assert_eq!(names, vec!["same", "same_gen_1", "same_gen_2"]);
    }

    #[test]
    fn renders_stub_with_raw_literal() {
        let records = vec![TestRecord::new("Single start tag", "<h>")];
        let doc = emit(&records, &mut NameRegistry::new(), &Template::default()).expect("emit ok");
        assert!(doc.starts_with("// AUTOGENERATED FILE\nmod test_utils;\n\nmod tests {\n"));
        assert!(doc.contains(
            "    #[test]
    fn single_start_tag() {
        with_settings!({sort_maps =>true}, {
            assert_debug_snapshot!(parser_test(r####\"<h>\"####));
        });
    }
"
        ));
        assert!(doc.ends_with("}\n"));
    }

    #[test]
    fn sections_appear_even_when_empty() {
        let doc = emit(&[], &mut NameRegistry::new(), &Template::default()).expect("emit ok");
        let valid = doc.find("// Spec valid tests").expect("valid marker");
        let error = doc.find("// Spec error tests").expect("error marker");
        assert!(valid < error);
        assert!(!doc.contains("#[test]"));
    }

    #[test]
    fn error_stubs_follow_valid_stubs() {
        let doc = emit(&sample(), &mut NameRegistry::new(), &Template::default()).expect("emit ok");
        let positions: Vec<usize> = ["fn single_start_tag", "fn start_tag_w_attribute", "// Spec error tests", "fn bad_start", "fn empty_end_tag"]
            .iter()
            .map(|needle| doc.find(needle).unwrap_or_else(|| panic!("{needle} missing")))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "out of order: {positions:?}");
        assert!(!doc.contains("plaintext"));
        assert!(!doc.contains("errors_and_states"));
    }

    #[test]
    fn carriage_return_is_widened_in_output() {
        let records = vec![TestRecord::new("CR", "a\rb")];
        let doc = emit(&records, &mut NameRegistry::new(), &Template::default()).expect("emit ok");
        assert!(doc.contains("r####\"a\r\nb\"####"));
        assert!(!doc.contains("a\rb"));
    }

    #[test]
    fn template_names_are_used() {
        let template = Template {
            utils_module: "harness".to_string(),
            harness_fn: "tokenize_all".to_string(),
            min_hashes: 2,
        };
        let records = vec![TestRecord::new("x", "y")];
        let doc = emit(&records, &mut NameRegistry::new(), &template).expect("emit ok");
        assert!(doc.contains("mod harness;\n"));
        assert!(doc.contains("use crate::harness::*;\n"));
        assert!(doc.contains("tokenize_all(r##\"y\"##)"));
    }

    #[test]
    fn unnameable_record_fails_the_document() {
        let records = vec![TestRecord::new("ok", "a"), TestRecord::new("!!", "b")];
        // `!` becomes `_excl_mark_`, so this one is fine
        assert!(emit(&records, &mut NameRegistry::new(), &Template::default()).is_ok());

        let records = vec![TestRecord::new("ok", "a"), TestRecord::new("(/)", "b")];
        match emit(&records, &mut NameRegistry::new(), &Template::default()) {
            Err(EmitError::Name { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected naming error, got {other:?}"),
        }
    }

    #[test]
    fn naming_error_chain_mentions_the_cause_once() {
        let records = vec![TestRecord::new("ok", "a"), TestRecord::new("(/)", "b")];
        let err = anyhow::Error::from(generate_cases(&records, &mut NameRegistry::new()).unwrap_err());
        assert_eq!(
            format!("{err:#}"),
            "cannot name test #1: description \"(/)\" does not contain any identifier characters"
        );
    }
}
