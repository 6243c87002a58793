//! Skill Packs: validation and packaging of skill directories.
//!
//! A skill pack is a directory holding a SKILL.md file with a small YAML
//! frontmatter header plus any supporting assets. Packaging turns it into a
//! single reproducible `.skill` zip archive.

pub mod archive;
pub mod files;
pub mod manifest;
pub mod parser;

pub use archive::{list_entries, package_skill, PackageOptions};
pub use files::{SkillFile, SkillFiles};
pub use manifest::{validate_skill_dir, SkillManifest};
pub use parser::{parse_frontmatter, Frontmatter};
