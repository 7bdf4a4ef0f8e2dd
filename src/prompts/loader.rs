use std::fs;
use std::path::{Path, PathBuf};

use super::templates::{
    CHARACTER_SYSTEM_DEFAULT, PALETTE_SYSTEM_DEFAULT, RELATIONSHIP_SYSTEM_DEFAULT,
};
use crate::error::Result;

/// System prompts for the three generation calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemPrompts {
    pub palette: String,
    pub character: String,
    pub relationship: String,
}

impl Default for SystemPrompts {
    fn default() -> Self {
        Self {
            palette: PALETTE_SYSTEM_DEFAULT.to_string(),
            character: CHARACTER_SYSTEM_DEFAULT.to_string(),
            relationship: RELATIONSHIP_SYSTEM_DEFAULT.to_string(),
        }
    }
}

/// Loads system prompts from a directory with fallback to the built-in defaults
pub struct PromptLoader {
    prompts_dir: Option<PathBuf>,
}

impl PromptLoader {
    pub fn new(prompts_dir: Option<impl AsRef<Path>>) -> Self {
        Self {
            prompts_dir: prompts_dir.map(|p| p.as_ref().to_path_buf()),
        }
    }

    /// Reads `{palette,character,relationship}_system.md`, keeping the default
    /// for any file that is absent
    pub fn load(&self) -> Result<SystemPrompts> {
        let defaults = SystemPrompts::default();
        Ok(SystemPrompts {
            palette: self.load_or("palette_system", defaults.palette)?,
            character: self.load_or("character_system", defaults.character)?,
            relationship: self.load_or("relationship_system", defaults.relationship)?,
        })
    }

    fn load_or(&self, name: &str, default: String) -> Result<String> {
        let Some(dir) = &self.prompts_dir else {
            return Ok(default);
        };

        let path = dir.join(format!("{}.md", name));
        if path.exists() {
            log::debug!("Loading {} prompt from: {:?}", name, path);
            let text = fs::read_to_string(&path)?;
            return Ok(text.trim().to_string());
        }

        log::debug!("Using default {} prompt", name);
        Ok(default)
    }
}
