use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

use crate::error::{NpcError, Result};
use crate::llm::{CompletionRequest, LlmClient};
use crate::prompts::{CharacterSeed, PromptBuilder};
use crate::schema;
use crate::types::{CharacterSheet, Npc, WorldBrief, WorldPalette};

/// Turns one sampled (persona, occupation, motivating entity) triple into an NPC
pub struct NpcFactory {
    llm_client: Arc<dyn LlmClient>,
    prompts: Arc<PromptBuilder>,
    temperature: f64,
}

impl NpcFactory {
    pub fn new(llm_client: Arc<dyn LlmClient>, prompts: Arc<PromptBuilder>, temperature: f64) -> Self {
        Self {
            llm_client,
            prompts,
            temperature,
        }
    }

    /// Generates a new NPC with no relations.
    ///
    /// `known_names` are the NPCs created earlier in the session, oldest first.
    /// The first letter of the name is nudged at random to spread names out;
    /// this does not guarantee uniqueness.
    pub async fn create<R: Rng + ?Sized>(
        &self,
        brief: &WorldBrief,
        palette: &WorldPalette,
        known_names: &[String],
        rng: &mut R,
    ) -> Result<Npc> {
        let persona = palette
            .personas
            .choose(rng)
            .ok_or(NpcError::EmptyPalette("personas"))?;
        let occupation = palette
            .occupations
            .choose(rng)
            .ok_or(NpcError::EmptyPalette("occupations"))?;
        let motivating_entity = palette
            .motivating_entities
            .choose(rng)
            .ok_or(NpcError::EmptyPalette("motivating entities"))?;
        let first_letter = random_letter(rng);

        log::debug!(
            "Sampled persona '{}', occupation '{}', motivation '{}', letter '{}'",
            persona,
            occupation,
            motivating_entity.name,
            first_letter
        );

        let seed = CharacterSeed {
            persona,
            occupation,
            motivating_entity,
            first_letter,
        };
        let request = CompletionRequest::new(
            self.prompts.character_messages(brief, seed, known_names),
            schema::character_sheet(),
            self.temperature,
        );

        let response = self.llm_client.generate(&request).await?;
        let details = schema::parse_character_sheet(response)?;

        Ok(Npc::new(
            details.name.trim(),
            details.tldr,
            details.speech_pattern,
            details.character_motivation,
            CharacterSheet {
                intellect: details.intellect,
                charisma: details.charisma,
                integrity: details.integrity,
                resilience: details.resilience,
                kindness: details.kindness,
            },
        ))
    }
}

/// A lowercase ASCII letter, uniformly
pub fn random_letter<R: Rng + ?Sized>(rng: &mut R) -> char {
    rng.gen_range(b'a'..=b'z') as char
}
