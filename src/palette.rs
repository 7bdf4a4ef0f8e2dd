use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

use crate::error::Result;
use crate::llm::{CompletionRequest, LlmClient};
use crate::prompts::PromptBuilder;
use crate::schema;
use crate::types::{PaletteTargets, WorldBrief, WorldPalette};

/// Produces the shared persona, occupation and motivating-entity pools of a session
pub struct WorldPaletteGenerator {
    llm_client: Arc<dyn LlmClient>,
    prompts: Arc<PromptBuilder>,
    temperature: f64,
}

impl WorldPaletteGenerator {
    pub fn new(llm_client: Arc<dyn LlmClient>, prompts: Arc<PromptBuilder>, temperature: f64) -> Self {
        Self {
            llm_client,
            prompts,
            temperature,
        }
    }

    /// Issues one world-builder call and trims every over-long list to its target
    pub async fn generate<R: Rng + ?Sized>(
        &self,
        brief: &WorldBrief,
        targets: PaletteTargets,
        rng: &mut R,
    ) -> Result<WorldPalette> {
        let request = CompletionRequest::new(
            self.prompts.palette_messages(brief),
            schema::world_builder(
                targets.personas,
                targets.occupations,
                targets.motivating_entities,
            ),
            self.temperature,
        );

        log::info!("🎨 Generating world palette");
        let response = self.llm_client.generate(&request).await?;
        let raw = schema::parse_world_palette(response)?;

        log::debug!(
            "Raw palette: {} personas, {} occupations, {} motivating entities",
            raw.personas.len(),
            raw.occupations.len(),
            raw.motivating_entities.len()
        );

        let palette = WorldPalette {
            personas: downsample(raw.personas, targets.personas, rng),
            occupations: downsample(raw.occupations, targets.occupations, rng),
            motivating_entities: downsample(
                raw.motivating_entities,
                targets.motivating_entities,
                rng,
            ),
        };

        log::info!(
            "🎨 Palette ready: {} personas, {} occupations, {} motivating entities",
            palette.personas.len(),
            palette.occupations.len(),
            palette.motivating_entities.len()
        );

        Ok(palette)
    }
}

/// Keeps `items` when it fits within `target`, otherwise draws exactly `target`
/// of them uniformly without replacement. The result order is random.
pub fn downsample<T: Clone, R: Rng + ?Sized>(items: Vec<T>, target: usize, rng: &mut R) -> Vec<T> {
    if items.len() <= target {
        return items;
    }
    items.choose_multiple(rng, target).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn short_lists_are_kept_in_order() {
        let mut rng = StdRng::seed_from_u64(7);
        let items = vec!["a", "b"];
        assert_eq!(downsample(items.clone(), 5, &mut rng), items);
        assert_eq!(downsample(items.clone(), 2, &mut rng), items);
    }

    #[test]
    fn long_lists_become_a_subset_without_replacement() {
        let mut rng = StdRng::seed_from_u64(42);
        let items: Vec<u32> = (0..30).collect();

        for target in [0, 1, 5, 29] {
            let picked = downsample(items.clone(), target, &mut rng);
            assert_eq!(picked.len(), target);
            let unique: HashSet<_> = picked.iter().collect();
            assert_eq!(unique.len(), target);
            assert!(picked.iter().all(|item| items.contains(item)));
        }
    }

    #[test]
    fn duplicates_in_source_are_not_multiplied() {
        let mut rng = StdRng::seed_from_u64(3);
        let items = vec!["x", "x", "y", "z", "w"];
        let picked = downsample(items, 4, &mut rng);
        assert!(picked.iter().filter(|s| **s == "x").count() <= 2);
    }
}
