//! Reproducible `.skill` archive construction.
//!
//! Every entry gets the same timestamp and compression method, and entries
//! are written in walk order, so an unchanged directory always produces a
//! byte-identical archive. The archive is assembled in a temp file next to
//! the destination and renamed into place only once it is complete.

use super::files::{SkillFile, SkillFiles};
use super::manifest::{validate_skill_dir, SkillManifest};
use crate::error::{Result, SkillError};
use std::fs::{File, Metadata};
use std::io::{self, Seek, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

pub const ARCHIVE_EXTENSION: &str = "skill";

/// Mode applied to the finished archive
pub const DEFAULT_OUTPUT_MODE: u32 = 0o644;

/// Knobs for [`package_skill`]; the default reproduces the standard layout
#[derive(Debug, Clone)]
pub struct PackageOptions {
    /// Path components excluded in addition to the built-in metadata artifacts
    pub extra_excludes: Vec<String>,
    pub output_mode: u32,
}

impl Default for PackageOptions {
    fn default() -> Self {
        Self {
            extra_excludes: Vec::new(),
            output_mode: DEFAULT_OUTPUT_MODE,
        }
    }
}

/// Validate `skill_dir` and write `<out_dir>/<name>.skill`, returning its path
pub fn package_skill(skill_dir: &Path, out_dir: &Path, opts: &PackageOptions) -> Result<PathBuf> {
    let (manifest, files) = plan(skill_dir, opts)?;

    std::fs::create_dir_all(out_dir)?;
    let out_path = out_dir.join(format!("{}.{}", manifest.name, ARCHIVE_EXTENSION));

    // Dropping the handle on any error path below deletes the temp file
    let mut tmp = tempfile::Builder::new()
        .prefix(&format!("{}-", manifest.name))
        .suffix(".skill.tmp")
        .tempfile_in(out_dir)?;
    debug!("staging archive at {}", tmp.path().display());

    let count = write_archive(tmp.as_file_mut(), &manifest.name, &files)?;
    tmp.as_file().sync_all()?;

    tmp.persist(&out_path).map_err(|e| SkillError::Io(e.error))?;

    if let Err(e) = set_mode(&out_path, opts.output_mode) {
        debug!("ignoring chmod failure on {}: {}", out_path.display(), e);
    }

    info!(
        skill = %manifest.name,
        entries = count,
        "packaged {}",
        out_path.display()
    );
    Ok(out_path)
}

/// Validate and enumerate without writing anything. Returns the archive
/// paths in the order they would be stored.
pub fn list_entries(skill_dir: &Path, opts: &PackageOptions) -> Result<Vec<String>> {
    let (manifest, files) = plan(skill_dir, opts)?;
    Ok(files.iter().map(|f| f.archive_path(&manifest.name)).collect())
}

fn plan(skill_dir: &Path, opts: &PackageOptions) -> Result<(SkillManifest, Vec<SkillFile>)> {
    if !skill_dir.is_dir() {
        return Err(SkillError::SkillDirNotFound(skill_dir.to_path_buf()));
    }

    let manifest = validate_skill_dir(skill_dir)?;
    let files = SkillFiles::new(skill_dir)
        .with_excludes(opts.extra_excludes.iter().cloned())
        .collect()?;
    Ok((manifest, files))
}

/// Write every file under `<prefix>/` into a zip on `writer`
pub fn write_archive<W: Write + Seek>(writer: W, prefix: &str, files: &[SkillFile]) -> Result<usize> {
    let mut zip = ZipWriter::new(writer);

    for file in files {
        let name = file.archive_path(prefix);
        let meta = std::fs::metadata(&file.source)?;
        let mode = source_mode(&meta);
        debug!("adding {} (mode {:o}, {} bytes)", name, mode, meta.len());

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default())
            .unix_permissions(mode)
            .large_file(needs_zip64(meta.len()));

        zip.start_file(name, options)?;
        let mut src = File::open(&file.source)?;
        io::copy(&mut src, &mut zip)?;
    }

    zip.finish()?;
    Ok(files.len())
}

/// Entries this large need zip64 headers
fn needs_zip64(len: u64) -> bool {
    len >= u64::from(u32::MAX)
}

#[cfg(unix)]
fn source_mode(meta: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn source_mode(_meta: &Metadata) -> u32 {
    DEFAULT_OUTPUT_MODE
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}
