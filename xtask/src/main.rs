//! Project automation entry point.
//!
//! Implements the `xtask` helpers for refreshing and verifying the generated
//! html5lib tokenizer tests.

use std::{
    collections::HashSet,
    env,
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::{Context, Result, bail};
use cargo_metadata::MetadataCommand;
use clap::{Args, Parser, Subcommand};
use html5lib_testgen::Config;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(author, version, about = "Project automation tasks for html5lib_testgen.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generated test file helpers (refresh, check).
    Fixtures {
        #[command(subcommand)]
        command: FixtureCommands,
    },
}

#[derive(Subcommand)]
enum FixtureCommands {
    /// Prune stale generated files, then regenerate every configured fixture.
    Refresh(FixtureArgs),
    /// Fail if the generated files differ from a fresh generation.
    Check(FixtureArgs),
}

#[derive(Args)]
struct FixtureArgs {
    /// Generator config, relative to the workspace root.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Read fixtures from a local html5lib-tests `tokenizer` directory (relative to the current directory).
    #[arg(long, value_name = "DIR")]
    source_dir: Option<PathBuf>,
    /// Build the generator in release mode.
    #[arg(long)]
    release: bool,
}

struct Workspace {
    root: PathBuf,
    /// Directory xtask was invoked from.
    invocation_dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let workspace = Workspace::detect()?;

    match cli.command {
        Commands::Fixtures { command } => match command {
            FixtureCommands::Refresh(args) => refresh_fixtures(&workspace, &args),
            FixtureCommands::Check(args) => check_fixtures(&workspace, &args),
        },
    }
}

fn refresh_fixtures(workspace: &Workspace, args: &FixtureArgs) -> Result<()> {
    let config = load_config(workspace, args)?;
    let out_dir = workspace.root.join(&config.out_dir);

    println!("==> Pruning stale generated files in {}", out_dir.display());
    let removed = prune_stale(&out_dir, &config)?;
    println!("    removed {removed} file(s)");

    println!("==> Generating {} fixture(s)", config.fixtures.len());
    let mut command = generator_cmd(workspace, args);
    run_command(&mut command, "html5lib-testgen")
}

fn check_fixtures(workspace: &Workspace, args: &FixtureArgs) -> Result<()> {
    let config = load_config(workspace, args)?;
    let out_dir = workspace.root.join(&config.out_dir);

    let stale = stale_files(&out_dir, &config)?;
    if !stale.is_empty() {
        let names: Vec<String> = stale.iter().map(|p| p.display().to_string()).collect();
        bail!(
            "generated files without a configured fixture: {}; run `cargo run -p xtask -- fixtures refresh`",
            names.join(", ")
        );
    }

    println!("==> Checking generated files are current");
    let mut command = generator_cmd(workspace, args);
    command.arg("--check");
    run_command(&mut command, "html5lib-testgen --check")
}

fn load_config(workspace: &Workspace, args: &FixtureArgs) -> Result<Config> {
    let path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(html5lib_testgen::config::DEFAULT_CONFIG_FILE));
    let path = workspace.root.join(path);
    if args.config.is_none() && !path.is_file() {
        return Ok(Config::default());
    }
    Config::load(Some(&path))
}

/// Files in `out_dir` that look generated but no longer match a configured fixture.
fn stale_files(out_dir: &Path, config: &Config) -> Result<Vec<PathBuf>> {
    if !out_dir.is_dir() {
        return Ok(Vec::new());
    }
    let expected: HashSet<String> = config.fixtures.iter().map(|f| config.output_file_name(f)).collect();

    let mut stale = Vec::new();
    for entry in WalkDir::new(out_dir).max_depth(1) {
        let entry = entry.with_context(|| format!("walking {}", out_dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if is_generated_name(name, &config.file_prefix) && !expected.contains(name) {
            stale.push(entry.path().to_path_buf());
        }
    }
    stale.sort();
    Ok(stale)
}

fn is_generated_name(name: &str, prefix: &str) -> bool {
    name.starts_with(prefix) && Path::new(name).extension() == Some(OsStr::new("rs"))
}

fn prune_stale(out_dir: &Path, config: &Config) -> Result<usize> {
    let stale = stale_files(out_dir, config)?;
    for path in &stale {
        fs::remove_file(path).with_context(|| format!("removing {}", path.display()))?;
    }
    Ok(stale.len())
}

fn generator_cmd(workspace: &Workspace, args: &FixtureArgs) -> Command {
    let mut cmd = cargo_cmd("run", workspace);
    cmd.arg("-p").arg("html5lib_testgen").arg("--bin").arg("html5lib-testgen");
    if args.release {
        cmd.arg("--release");
    }
    cmd.arg("--");
    if let Some(config) = &args.config {
        cmd.arg("--config").arg(workspace.root.join(config));
    }
    if let Some(dir) = &args.source_dir {
        cmd.arg("--source-dir").arg(absolute_from(&workspace.invocation_dir, dir));
    }
    cmd
}

/// `path` unchanged if absolute, otherwise joined onto `base`.
fn absolute_from(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn cargo_cmd(subcommand: &str, workspace: &Workspace) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.arg(subcommand);
    cmd.current_dir(&workspace.root);
    cmd
}

fn run_command(command: &mut Command, label: &str) -> Result<()> {
    let status = command.status().with_context(|| format!("{label} failed to start"))?;
    if !status.success() {
        bail!("{label} exited with {}", status);
    }
    Ok(())
}

impl Workspace {
    fn detect() -> Result<Self> {
        let metadata = MetadataCommand::new()
            .no_deps()
            .exec()
            .context("gathering cargo metadata for workspace")?;

        if !metadata.packages.iter().any(|p| p.name == "html5lib_testgen") {
            bail!("unable to find html5lib_testgen package metadata");
        }

        Ok(Self {
            root: metadata.workspace_root.into_std_path_buf(),
            invocation_dir: env::current_dir().context("reading current directory")?,
        })
    }
}
