//! Sequential fetch → parse → emit → persist loop over the configured fixtures.

use anyhow::{Context, Result};
use log::info;

use crate::config::Config;
use crate::emit::{Template, generate_cases, render};
use crate::record::parse_suite;
use crate::sanitize::NameRegistry;
use crate::sink::DocumentSink;
use crate::source::FixtureSource;

/// Outcome of generating one fixture file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub fixture: String,
    pub file_name: String,
    /// Records in the fixture, before filtering.
    pub records: usize,
    /// Test stubs written.
    pub tests: usize,
}

/// Parse `json` and render its document with a fresh registry.
///
/// Returns the rendered text, the number of records in the fixture and the
/// number of test stubs rendered.
///
/// # Errors
/// Fails if the fixture does not parse or a record cannot be named.
pub fn render_fixture(json: &str, template: &Template) -> Result<(String, usize, usize)> {
    let records = parse_suite(json)?;
    let mut registry = NameRegistry::new();
    let cases = generate_cases(&records, &mut registry)?;
    Ok((render(&cases, template), records.len(), cases.len()))
}

/// Generate every fixture in `config.fixtures`, one after another.
///
/// The first failure stops the run; files already persisted stay as they are.
///
/// # Errors
/// Fetch, parse, naming and persistence failures, with the fixture name attached.
pub fn run<S, K>(config: &Config, source: &S, sink: &mut K) -> Result<Vec<GeneratedFile>>
where
    S: FixtureSource + ?Sized,
    K: DocumentSink + ?Sized,
{
    let mut generated = Vec::with_capacity(config.fixtures.len());
    for fixture in &config.fixtures {
        info!("Generating {fixture}");
        let json = source.fetch(fixture).with_context(|| format!("while fetching {fixture}"))?;
        let (document, records, tests) =
            render_fixture(&json, &config.template).with_context(|| format!("while generating {fixture}"))?;
        let file_name = config.output_file_name(fixture);
        sink.persist(&file_name, &document)
            .with_context(|| format!("while persisting {file_name}"))?;
        info!("{fixture}: {tests} tests from {records} records");
        generated.push(GeneratedFile {
            fixture: fixture.clone(),
            file_name,
            records,
            tests,
        });
    }
    Ok(generated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::collections::HashMap;

    struct MapSource(HashMap<&'static str, &'static str>);

    impl FixtureSource for MapSource {
        fn fetch(&self, fixture: &str) -> Result<String> {
            match self.0.get(fixture) {
                Some(json) => Ok((*json).to_string()),
                None => bail!("no such fixture: {fixture}"),
            }
        }
    }

    #[derive(Default)]
    struct MemorySink(Vec<(String, String)>);

    impl DocumentSink for MemorySink {
        fn persist(&mut self, file_name: &str, contents: &str) -> Result<()> {
            self.0.push((file_name.to_string(), contents.to_string()));
            Ok(())
        }
    }

    fn config(fixtures: &[&str]) -> Config {
        Config {
            fixtures: fixtures.iter().map(|f| (*f).to_string()).collect(),
            ..Config::default()
        }
    }

    const SAME_NAMES: &str = r#"{"tests": [
        {"description": "Dup", "input": "a"},
        {"description": "dup", "input": "b"}
    ]}"#;

    #[test]
    fn each_file_gets_a_fresh_registry() -> Result<()> {
        let source = MapSource(HashMap::from([("a.test", SAME_NAMES), ("b.test", SAME_NAMES)]));
        let mut sink = MemorySink::default();
        let generated = run(&config(&["a.test", "b.test"]), &source, &mut sink)?;

        assert_eq!(generated.len(), 2);
        assert_eq!(sink.0[0].0, "html5lib_a_test.rs");
        assert_eq!(sink.0[1].0, "html5lib_b_test.rs");
        // identical fixtures render identically: names restart per document
        assert_eq!(sink.0[0].1, sink.0[1].1);
        assert!(sink.0[1].1.contains("fn dup()"));
        assert!(sink.0[1].1.contains("fn dup_gen_1()"));
        Ok(())
    }

    #[test]
    fn counts_skip_filtered_records() -> Result<()> {
        let json = r#"{"tests": [
            {"description": "one", "input": "1"},
            {"description": "two", "input": "2", "initialStates": ["RCDATA state"]},
            {"description": "three", "input": "3", "errors": []}
        ]}"#;
        let source = MapSource(HashMap::from([("x.test", json)]));
        let mut sink = MemorySink::default();
        let generated = run(&config(&["x.test"]), &source, &mut sink)?;
        assert_eq!(
            generated,
            vec![GeneratedFile {
                fixture: "x.test".to_string(),
                file_name: "html5lib_x_test.rs".to_string(),
                records: 3,
                tests: 2,
            }]
        );
        Ok(())
    }

    #[test]
    fn first_failure_aborts_the_run() {
        let source = MapSource(HashMap::from([("ok.test", SAME_NAMES), ("later.test", SAME_NAMES)]));
        let mut sink = MemorySink::default();
        let err = run(&config(&["ok.test", "missing.test", "later.test"]), &source, &mut sink).unwrap_err();
        assert!(format!("{err}").contains("missing.test"));
        assert_eq!(sink.0.len(), 1);
        assert_eq!(sink.0[0].0, "html5lib_ok_test.rs");
    }

    #[test]
    fn malformed_json_aborts_before_persisting() {
        let source = MapSource(HashMap::from([("bad.test", "{\"tests\": [{\"input\": \"x\"}]}")]));
        let mut sink = MemorySink::default();
        let err = run(&config(&["bad.test"]), &source, &mut sink).unwrap_err();
        assert!(format!("{err:#}").contains("test #0 is malformed"));
        assert!(sink.0.is_empty());
    }
}
