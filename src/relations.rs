//! Relationship graph construction.
//!
//! Every time an NPC joins the session it is linked to each earlier NPC with
//! two directional calls. The newcomer's view is generated first, from the
//! two character sheets alone. The earlier NPC's view is generated second,
//! with the newcomer's view supplied as context, so the two directions agree
//! on a shared basis while still being free to differ (unrequited feelings,
//! power imbalance).

use futures::stream::{self, StreamExt, TryStreamExt};
use indexmap::IndexMap;
use std::sync::Arc;

use crate::error::Result;
use crate::llm::{CompletionRequest, LlmClient};
use crate::prompts::PromptBuilder;
use crate::schema;
use crate::types::{Npc, RelationshipEdge};

/// Both directions of one (newcomer, prior) pair
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedPair {
    /// Position of the prior NPC in creation order
    pub prior_index: usize,
    /// The newcomer's view of the prior NPC
    pub forward: RelationshipEdge,
    /// The prior NPC's view of the newcomer
    pub backward: RelationshipEdge,
}

pub struct RelationshipGraphBuilder {
    llm_client: Arc<dyn LlmClient>,
    prompts: Arc<PromptBuilder>,
    temperature: f64,
    concurrency: usize,
}

impl RelationshipGraphBuilder {
    pub fn new(llm_client: Arc<dyn LlmClient>, prompts: Arc<PromptBuilder>, temperature: f64) -> Self {
        Self {
            llm_client,
            prompts,
            temperature,
            concurrency: 1,
        }
    }

    /// How many pairs may be in flight at once. 1 keeps every call sequential.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Links `newcomer` to every NPC in `priors` (creation order) in both
    /// directions and returns the number of pairs linked.
    ///
    /// Issues exactly two calls per prior. Edges are written only once every
    /// pair has succeeded, in creation order, so a failure leaves both sides
    /// untouched.
    pub async fn link(&self, priors: &mut [Npc], newcomer: &mut Npc) -> Result<usize> {
        if priors.is_empty() {
            return Ok(0);
        }

        let pairs: Vec<LinkedPair> = {
            let newcomer: &Npc = newcomer;
            stream::iter(priors.iter().enumerate())
                .map(|(prior_index, prior)| self.link_pair(prior_index, newcomer, prior))
                .buffered(self.concurrency)
                .try_collect()
                .await?
        };

        for pair in &pairs {
            let prior = &mut priors[pair.prior_index];
            if newcomer
                .set_relation(prior.name.clone(), pair.forward.clone())
                .is_some()
            {
                log::warn!(
                    "{} already had a relation keyed '{}'; duplicate names overwrite edges",
                    newcomer.name,
                    prior.name
                );
            }
            if prior
                .set_relation(newcomer.name.clone(), pair.backward.clone())
                .is_some()
            {
                log::warn!(
                    "{} already had a relation keyed '{}'; duplicate names overwrite edges",
                    prior.name,
                    newcomer.name
                );
            }
        }

        Ok(pairs.len())
    }

    /// The two ordered calls for one pair
    async fn link_pair(&self, prior_index: usize, newcomer: &Npc, prior: &Npc) -> Result<LinkedPair> {
        let forward = self.request_edge(newcomer, prior, None).await?;

        let context = perspective_context(prior, &forward)?;
        let backward = self.request_edge(prior, newcomer, Some(&context)).await?;

        log::info!(
            "🔗 {} → {}: {} ({}), {} → {}: {} ({})",
            newcomer.name,
            prior.name,
            forward.kind,
            forward.tldr,
            prior.name,
            newcomer.name,
            backward.kind,
            backward.tldr
        );

        Ok(LinkedPair {
            prior_index,
            forward,
            backward,
        })
    }

    async fn request_edge(
        &self,
        subject: &Npc,
        other: &Npc,
        context: Option<&str>,
    ) -> Result<RelationshipEdge> {
        let request = CompletionRequest::new(
            self.prompts.relationship_messages(subject, other, context)?,
            schema::relationship_sheet(),
            self.temperature,
        );
        let response = self.llm_client.generate(&request).await?;
        schema::parse_relationship_sheet(response)
    }
}

/// Serializes the newcomer's view of `prior` as a one-entry relations map,
/// the context handed to the reverse call
pub fn perspective_context(prior: &Npc, forward: &RelationshipEdge) -> Result<String> {
    let mut view = IndexMap::new();
    view.insert(prior.name.as_str(), forward);
    Ok(serde_json::to_string(&view)?)
}
