//! Run configuration.
//!
//! Everything has a built-in default, so a plain run needs no file at all. A
//! `testgen.toml` in the working directory (or an explicit `--config` path)
//! can override any field:
//!
//! ```toml
//! base_url = "https://raw.githubusercontent.com/html5lib/html5lib-tests/master/tokenizer/"
//! fixtures = ["test1.test", "test2.test"]
//! out_dir = "crates/rs_html_parser/tests"
//!
//! [template]
//! harness_fn = "parser_test"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use serde::Deserialize;

use crate::emit::Template;

/// File picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "testgen.toml";

pub const DEFAULT_BASE_URL: &str = "https://raw.githubusercontent.com/html5lib/html5lib-tests/master/tokenizer/";

/// Fixture files generated by a default run, in order.
pub const DEFAULT_FIXTURES: &[&str] = &["test1.test", "test2.test", "test3.test", "test4.test"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Location the fixture names are appended to.
    pub base_url: String,
    pub fixtures: Vec<String>,
    /// Directory generated files are written to.
    pub out_dir: PathBuf,
    /// Prepended to every generated file name.
    pub file_prefix: String,
    /// HTTP request timeout.
    pub timeout_secs: u64,
    pub template: Template,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            fixtures: DEFAULT_FIXTURES.iter().map(|f| (*f).to_string()).collect(),
            out_dir: PathBuf::from("tests"),
            file_prefix: "html5lib_".to_string(),
            timeout_secs: 30,
            template: Template::default(),
        }
    }
}

impl Config {
    /// Parse a TOML document; missing keys keep their defaults.
    ///
    /// # Errors
    /// Returns an error if `text` is not valid TOML or has ill-typed keys.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text).context("parsing generator config")?;
        if config.fixtures.is_empty() {
            warn!("configuration lists no fixtures; nothing will be generated");
        }
        Ok(config)
    }

    /// Load the configuration for a run.
    ///
    /// An explicit `path` must exist and parse. Without one, [`DEFAULT_CONFIG_FILE`]
    /// is used if it exists in the working directory, defaults otherwise.
    ///
    /// # Errors
    /// Returns an error if the chosen file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !candidate.is_file() {
                    info!("no {DEFAULT_CONFIG_FILE} found; using built-in defaults");
                    return Ok(Self::default());
                }
                candidate
            },
        };

        let text = fs::read_to_string(&path).with_context(|| format!("reading config from '{}'", path.display()))?;
        let config = Self::from_toml(&text).with_context(|| format!("loading config from '{}'", path.display()))?;
        info!("configuration loaded from '{}'", path.display());
        Ok(config)
    }

    /// URL of one fixture file.
    pub fn fixture_url(&self, fixture: &str) -> String {
        if self.base_url.ends_with('/') {
            format!("{}{fixture}", self.base_url)
        } else {
            format!("{}/{fixture}", self.base_url)
        }
    }

    /// Name of the generated file for `fixture`: the first `.` becomes `_`.
    ///
    /// `test1.test` becomes `html5lib_test1_test.rs` with the default prefix.
    pub fn output_file_name(&self, fixture: &str) -> String {
        format!("{}{}.rs", self.file_prefix, fixture.replacen('.', "_", 1))
    }
}
