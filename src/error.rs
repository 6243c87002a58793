use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SkillError>;

#[derive(Debug, Error)]
pub enum SkillError {
    /// SKILL.md header is malformed or not valid UTF-8
    #[error("{0}")]
    Format(String),

    #[error("Missing required file: {}", .0.display())]
    MissingManifest(PathBuf),

    /// A naming or content rule was violated
    #[error("{0}")]
    Validation(String),

    #[error("Skill dir not found: {}", .0.display())]
    SkillDirNotFound(PathBuf),

    #[error("Config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Walk(#[from] walkdir::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl SkillError {
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Errors caused by the skill itself rather than the environment
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Format(_)
                | Self::MissingManifest(_)
                | Self::Validation(_)
                | Self::SkillDirNotFound(_)
        )
    }
}
