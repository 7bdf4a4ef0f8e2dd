pub mod builder;
pub mod loader;
pub mod templates;

pub use builder::{CharacterSeed, PromptBuilder};
pub use loader::{PromptLoader, SystemPrompts};
