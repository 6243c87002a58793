use std::path::{Component, Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use skillpack::config::Config;
use skillpack::skillpacks::{list_entries, package_skill};
use skillpack::SkillError;

/// Validate and package a skill into a .skill zip artifact.
#[derive(Debug, Parser)]
#[command(name = "skillpack", version, about)]
struct Cli {
    /// Path to the skill folder (must contain SKILL.md)
    skill_dir: PathBuf,

    /// Output directory for the .skill artifact (default: current directory)
    out_dir: Option<PathBuf>,

    /// Validate and list archive entries without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Read configuration from this file instead of the default locations
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(err) = e.downcast_ref::<SkillError>() {
                if !err.is_user_error() {
                    debug!("{:?}", err);
                }
            }
            eprintln!("{}", error_line(&e));
            ExitCode::FAILURE
        }
    }
}

/// Top-level message only; variants already embed their source text
fn error_line(e: &anyhow::Error) -> String {
    format!("Error: {}", e)
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("skillpack=debug")
        } else {
            EnvFilter::new("skillpack=warn")
        }
    });

    // stdout carries the archive path only
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let opts = config.package_options();

    let cwd = std::env::current_dir()?;
    let skill_dir = resolve(&cwd, &cli.skill_dir);
    let out_dir = cli
        .out_dir
        .as_deref()
        .or(config.package.out_dir.as_deref())
        .map(|p| absolute(&cwd, p))
        .unwrap_or_else(|| cwd.clone());
    debug!(
        "skill_dir={} out_dir={}",
        skill_dir.display(),
        out_dir.display()
    );

    if cli.dry_run {
        for entry in list_entries(&skill_dir, &opts)? {
            println!("{}", entry);
        }
        return Ok(());
    }

    let out_path = package_skill(&skill_dir, &out_dir, &opts)?;
    println!("{}", out_path.display());
    Ok(())
}

/// Absolute path with `.` and `..` folded away lexically
fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Absolute, symlink-free path when it exists, so `.` yields a real folder name
fn resolve(cwd: &Path, path: &Path) -> PathBuf {
    let path = absolute(cwd, path);
    path.canonicalize().unwrap_or(path)
}
