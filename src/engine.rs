use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

use crate::config::{GeneratorConfig, NameCollisionPolicy};
use crate::error::{NpcError, Result};
use crate::export::JsonDirectoryStore;
use crate::factory::NpcFactory;
use crate::llm::{LlmClient, RetryingClient};
use crate::palette::WorldPaletteGenerator;
use crate::prompts::{PromptBuilder, PromptLoader};
use crate::relations::RelationshipGraphBuilder;
use crate::session::Session;
use crate::traits::{NpcStore, SessionObserver};
use crate::types::{Npc, SessionRequest};

/// Drives a session: palette, then one NPC at a time, each linked to every
/// earlier NPC and persisted before the next one starts
pub struct NpcEngine {
    config: GeneratorConfig,
    palette_generator: WorldPaletteGenerator,
    factory: NpcFactory,
    relations: RelationshipGraphBuilder,
    store: Box<dyn NpcStore>,
    rng: StdRng,
}

impl NpcEngine {
    /// Create an engine that retries the given client per the configured
    /// policy and writes records to `config.output_dir`
    pub fn new(config: GeneratorConfig, llm_client: impl LlmClient + 'static) -> Result<Self> {
        let client = RetryingClient::new(llm_client, config.retry_policy());
        let store = JsonDirectoryStore::new(&config.output_dir);
        Self::from_parts(config, Arc::new(client), Box::new(store))
    }

    /// Create an engine from an already wrapped client and any store
    pub fn from_parts(
        config: GeneratorConfig,
        llm_client: Arc<dyn LlmClient>,
        store: Box<dyn NpcStore>,
    ) -> Result<Self> {
        config.validate()?;
        let prompts = Arc::new(PromptBuilder::new(
            PromptLoader::new(config.prompts_dir.as_ref()).load()?,
        ));

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            palette_generator: WorldPaletteGenerator::new(
                Arc::clone(&llm_client),
                Arc::clone(&prompts),
                config.palette_temperature,
            ),
            factory: NpcFactory::new(
                Arc::clone(&llm_client),
                Arc::clone(&prompts),
                config.npc_temperature,
            ),
            relations: RelationshipGraphBuilder::new(llm_client, prompts, config.relationship_temperature)
                .with_concurrency(config.relationship_concurrency),
            store,
            rng,
            config,
        })
    }

    /// Generate the palette and open a session around it
    pub async fn start_session(&mut self, request: &SessionRequest) -> Result<Session> {
        let targets = request.targets(self.config.downscale_factor)?;
        log::debug!(
            "Palette targets: {} personas, {} occupations, {} motivating entities",
            targets.personas,
            targets.occupations,
            targets.motivating_entities
        );

        let palette = self
            .palette_generator
            .generate(&request.brief, targets, &mut self.rng)
            .await?;

        Ok(Session::new(request.brief.clone(), targets, palette))
    }

    /// Create the next NPC, link it to every earlier NPC and persist the
    /// records that changed.
    ///
    /// The session is only modified once every call of this step succeeded.
    pub async fn add_npc<'s>(&mut self, session: &'s mut Session) -> Result<&'s Npc> {
        let mut npc = self.create_unique(session).await?;
        log::info!("🧑 Created {}: {}", npc.name, npc.tldr);

        let linked = self.relations.link(session.npcs_mut(), &mut npc).await?;
        log::debug!("Linked {} to {} earlier NPCs", npc.name, linked);

        self.warn_on_record_collision(session, &npc);

        let index = session.len();
        session.push(npc);
        self.persist_step(session)?;

        Ok(&session.npcs()[index])
    }

    /// Run a whole session and write its manifest
    pub async fn run(
        &mut self,
        request: &SessionRequest,
        observer: &mut dyn SessionObserver,
    ) -> Result<Session> {
        let mut session = self.start_session(request).await?;
        observer.palette_ready(session.palette());

        let total = request.total_npcs;
        for index in 0..total {
            let npc = self.add_npc(&mut session).await?;
            log::info!("✅ NPC {}/{} ready: {}", index + 1, total, npc.name);
            observer.npc_completed(index, total, npc);
        }

        let record_ids = session
            .npcs()
            .iter()
            .map(|npc| self.store.record_id(npc))
            .collect();
        let path = self.store.save_manifest(&session.manifest(record_ids))?;
        log::info!("📜 Session manifest written to {:?}", path);

        Ok(session)
    }

    async fn create_unique(&mut self, session: &Session) -> Result<Npc> {
        let known_names = session.names();
        let mut attempts = 0;

        loop {
            attempts += 1;
            let npc = self
                .factory
                .create(session.brief(), session.palette(), &known_names, &mut self.rng)
                .await?;

            if !session.contains_name(&npc.name) {
                return Ok(npc);
            }

            match self.config.name_collision {
                NameCollisionPolicy::Warn => {
                    log::warn!(
                        "Name '{}' is already taken; keeping it, its edges will share a key",
                        npc.name
                    );
                    return Ok(npc);
                }
                NameCollisionPolicy::Regenerate if attempts < self.config.max_name_attempts => {
                    log::warn!(
                        "Name '{}' is already taken, regenerating ({}/{})",
                        npc.name,
                        attempts,
                        self.config.max_name_attempts
                    );
                }
                NameCollisionPolicy::Regenerate => {
                    return Err(NpcError::DuplicateName {
                        name: npc.name,
                        attempts,
                    });
                }
            }
        }
    }

    fn warn_on_record_collision(&self, session: &Session, npc: &Npc) {
        let id = self.store.record_id(npc);
        for other in session.npcs() {
            if other.name != npc.name && self.store.record_id(other) == id {
                log::warn!(
                    "'{}' and '{}' share record id '{}'; the later record overwrites",
                    other.name,
                    npc.name,
                    id
                );
            }
        }
    }

    /// Writes the newest NPC and every earlier NPC, each of which just gained
    /// an edge to it
    fn persist_step(&self, session: &Session) -> Result<()> {
        for npc in session.npcs() {
            self.store.save_npc(npc)?;
        }
        if let Some(newest) = session.npcs().last() {
            log::info!("💾 Saved {} ({} records)", newest.name, session.len());
        }
        Ok(())
    }
}
