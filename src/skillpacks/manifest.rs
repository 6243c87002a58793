//! SKILL.md validation against the directory that holds it.

use super::parser::split_manifest;
use crate::error::{Result, SkillError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::debug;

pub const MANIFEST_FILE: &str = "SKILL.md";

/// Validation constants
const MAX_NAME_LEN: usize = 64;

static SKILL_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9](-?[a-z0-9])*$").expect("valid skill name pattern"));

/// Validated identity of a skill directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillManifest {
    pub name: String,
    pub description: String,
}

/// Check that `skill_dir` holds a well-formed SKILL.md whose name matches
/// the directory.
pub fn validate_skill_dir(skill_dir: &Path) -> Result<SkillManifest> {
    let manifest_path = skill_dir.join(MANIFEST_FILE);
    if !manifest_path.exists() {
        return Err(SkillError::MissingManifest(manifest_path));
    }

    let bytes = std::fs::read(&manifest_path)?;
    let content = String::from_utf8(bytes)
        .map_err(|e| SkillError::format(format!("{} is not valid UTF-8: {}", MANIFEST_FILE, e)))?;
    let (frontmatter, body) = split_manifest(&content)?;
    debug!(
        keys = frontmatter.len(),
        body_chars = body.chars().count(),
        "parsed {}",
        manifest_path.display()
    );

    let name = frontmatter.get("name").unwrap_or_default().trim();
    let description = frontmatter.get("description").unwrap_or_default().trim();

    if name.is_empty() {
        return Err(SkillError::validation(
            "SKILL.md frontmatter must include a non-empty 'name'.",
        ));
    }
    if description.is_empty() {
        return Err(SkillError::validation(
            "SKILL.md frontmatter must include a non-empty 'description'.",
        ));
    }
    validate_name(name)?;

    let dir_name = skill_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if dir_name != name {
        return Err(SkillError::validation(format!(
            "Skill folder name must match SKILL.md 'name' ({:?} != {:?}).",
            dir_name, name
        )));
    }

    Ok(SkillManifest {
        name: name.to_string(),
        description: description.to_string(),
    })
}

/// Lowercase letters, digits and single hyphens; starts and ends alphanumeric
pub fn is_valid_name(name: &str) -> bool {
    name.len() <= MAX_NAME_LEN && SKILL_NAME_RE.is_match(name)
}

fn validate_name(name: &str) -> Result<()> {
    if !is_valid_name(name) {
        return Err(SkillError::validation(format!(
            "SKILL.md 'name' must use lowercase letters, digits, and hyphens only (max {} chars).",
            MAX_NAME_LEN
        )));
    }
    Ok(())
}
