//! CLI entry point for html5lib_testgen.
//! Usage: cargo run -p html5lib_testgen -- [--out-dir <dir>] [--fixture <name>]... [--check]

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

use html5lib_testgen::{CheckSink, Config, DirSink, DirSource, FixtureSource, HttpSource, run};

#[derive(Parser)]
#[command(author, version, about = "Generate Rust snapshot tests from html5lib tokenizer fixtures.")]
struct Cli {
    /// TOML configuration file (defaults to ./testgen.toml when present).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Directory the generated test files are written to.
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,
    /// Fixture file to generate; repeat to list several (replaces the configured list).
    #[arg(long = "fixture", value_name = "NAME")]
    fixtures: Vec<String>,
    /// Base URL the fixture names are appended to.
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,
    /// Read fixtures from a local html5lib-tests `tokenizer` directory instead of downloading.
    #[arg(long, value_name = "DIR")]
    source_dir: Option<PathBuf>,
    /// Verify the generated files on disk are current instead of writing them.
    #[arg(long)]
    check: bool,
}

impl Cli {
    fn resolve_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(out_dir) = &self.out_dir {
            config.out_dir = out_dir.clone();
        }
        if !self.fixtures.is_empty() {
            config.fixtures = self.fixtures.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        Ok(config)
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    info!("Starting!");
    if let Err(e) = generate(&cli) {
        error!("Loading ERROR! {e:#}");
        process::exit(1);
    }
    info!("Loading finished!");
}

fn generate(cli: &Cli) -> Result<()> {
    let config = cli.resolve_config().context("while resolving configuration")?;

    let source: Box<dyn FixtureSource> = match &cli.source_dir {
        Some(dir) => {
            info!("reading fixtures from {}", dir.display());
            Box::new(DirSource::new(dir))
        },
        None => Box::new(HttpSource::new(&config)?),
    };

    if cli.check {
        let mut sink = CheckSink::new(&config.out_dir);
        run(&config, source.as_ref(), &mut sink)?;
        sink.finish()
    } else {
        let mut sink = DirSink::new(&config.out_dir);
        let generated = run(&config, source.as_ref(), &mut sink)?;
        let total: usize = generated.iter().map(|g| g.tests).sum();
        info!(
            "{} files, {total} tests written to {}",
            generated.len(),
            sink.out_dir().display()
        );
        Ok(())
    }
}
