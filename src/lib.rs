//! # NPC Forge
//!
//! Generates game NPCs by orchestrating a structured-output LLM.
//!
//! ## Features
//!
//! - **World Palette**: one call derives the personas, occupations and motivating entities of a world
//! - **NPC Factory**: each NPC is fleshed out from a randomly sampled triple of the palette
//! - **Relationship Graph**: every new NPC is linked to every earlier one, in both directions,
//!   with the second direction informed by the first
//! - **Strict Schemas**: responses are validated against closed vocabularies before use
//! - **Incremental Export**: records are written as the session advances
//! - **LLM Integration**: OpenAI-compatible function calling with retries and timeouts
//!
//! ## Example
//!
//! ```rust,no_run
//! use npc_forge::{GeneratorConfig, NpcEngine, NoopObserver, SessionRequest, WorldBrief};
//! use npc_forge::llm::OpenAiClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = GeneratorConfig::default();
//! let api_key = npc_forge::credentials::load_api_key(&config)?;
//! let llm = OpenAiClient::new(api_key, &config.model)?;
//! let mut engine = NpcEngine::new(config, llm)?;
//!
//! let brief = WorldBrief {
//!     setting: "A drowned city of canals".into(),
//!     mood: "melancholic".into(),
//!     feelings: "wonder, dread".into(),
//!     storyboard: "The tide is rising every year".into(),
//! };
//! let request = SessionRequest::new(brief, 4).with_diversity(0.5, 1.0, 0.5);
//! let session = engine.run(&request, &mut NoopObserver).await?;
//! assert_eq!(session.len(), 4);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod credentials;
pub mod engine;
pub mod error;
pub mod export;
pub mod factory;
pub mod llm;
pub mod palette;
pub mod prompts;
pub mod relations;
pub mod schema;
pub mod session;
pub mod traits;
pub mod types;

// Re-export main types for convenience
pub use config::{GeneratorConfig, NameCollisionPolicy};
pub use engine::NpcEngine;
pub use error::{NpcError, Result};
pub use export::{sanitize_name, JsonDirectoryStore};
pub use factory::NpcFactory;
pub use palette::WorldPaletteGenerator;
pub use relations::RelationshipGraphBuilder;
pub use session::{Session, SessionManifest};
pub use traits::{NoopObserver, NpcStore, SessionObserver};
pub use types::{
    CharacterSheet, MotivatingEntity, Npc, PaletteTargets, RelationshipEdge, SessionRequest,
    WorldBrief, WorldPalette,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
