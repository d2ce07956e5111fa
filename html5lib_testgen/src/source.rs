//! Where fixture documents come from.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use log::debug;
use reqwest::blocking::Client;

use crate::config::Config;

/// Supplies the raw JSON text of a fixture file by name.
pub trait FixtureSource {
    /// # Errors
    /// Any failure to obtain the document.
    fn fetch(&self, fixture: &str) -> Result<String>;
}

/// Downloads fixtures from the html5lib-tests repository (or any mirror).
pub struct HttpSource {
    client: Client,
    config: Config,
}

impl HttpSource {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("html5lib-testgen/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }
}

impl FixtureSource for HttpSource {
    fn fetch(&self, fixture: &str) -> Result<String> {
        let url = self.config.fixture_url(fixture);
        debug!("GET {url}");
        let response = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("requesting {url}"))?
            .error_for_status()
            .with_context(|| format!("fetching {url}"))?;
        response.text().with_context(|| format!("reading body of {url}"))
    }
}

/// Reads fixtures from a local directory, e.g. `html5lib-tests/tokenizer`.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FixtureSource for DirSource {
    fn fetch(&self, fixture: &str) -> Result<String> {
        let path = self.root.join(fixture);
        fs::read_to_string(&path).with_context(|| format!("reading fixture '{}'", path.display()))
    }
}
