//! Scripted generation capability shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use npc_forge::llm::{CompletionRequest, LlmClient};
use npc_forge::schema;
use npc_forge::{GeneratorConfig, NpcError, WorldBrief};

pub const NAMES: &[&str] = &[
    "Ada Quill", "Bram Oster", "Cass Wren", "Dov Harrow", "Esme Lark", "Fenn Mossby",
    "Greta Vale", "Hollis Reed", "Ines Thorne", "Jory Flint", "Kit Saltmarsh", "Lune Adair",
];

/// Answers each schema with canned, valid data and records every request
pub struct ScriptedClient {
    requests: Mutex<Vec<CompletionRequest>>,
    names: Vec<String>,
    character_calls: AtomicUsize,
    relationship_calls: AtomicUsize,
    fail_relationship_call: Option<usize>,
    palette: Value,
}

impl ScriptedClient {
    pub fn new() -> Arc<Self> {
        Self::build(NAMES.iter().map(|s| s.to_string()).collect(), None)
    }

    pub fn with_names(names: &[&str]) -> Arc<Self> {
        Self::build(names.iter().map(|s| s.to_string()).collect(), None)
    }

    /// The relationship call with this zero-based index fails with a
    /// non-retryable API error
    pub fn failing_relationship(call: usize) -> Arc<Self> {
        Self::build(NAMES.iter().map(|s| s.to_string()).collect(), Some(call))
    }

    fn build(names: Vec<String>, fail_relationship_call: Option<usize>) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            names,
            character_calls: AtomicUsize::new(0),
            relationship_calls: AtomicUsize::new(0),
            fail_relationship_call,
            palette: json!({
                "personas": ["brooding", "giddy", "paranoid", "stoic", "chatty"],
                "occupations": ["ferryman", "archivist", "smuggler", "lamplighter", "surgeon"],
                "motivating_entities": [
                    { "name": "The Tide Court", "description": "Sea spirits bargaining for drowned souls" },
                    { "name": "Lantern Guild", "description": "Keepers of the city's last lights" },
                    { "name": "Order of Silt", "description": "Monks who read the river's moods" },
                    { "name": "Free Oars", "description": "Rowers' union with revolutionary ideas" }
                ]
            }),
        })
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Schema name of every request, in the order they were issued
    pub fn schema_log(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|r| r.schema.name)
            .collect()
    }

    fn character(&self) -> Value {
        let call = self.character_calls.fetch_add(1, Ordering::SeqCst);
        let name = &self.names[call % self.names.len()];
        json!({
            "name": name,
            "TLDR": format!("{} keeps secrets", name),
            "speech_pattern": "Measured and quiet",
            "character_motivation": "Survive the rising tide",
            "intellect": "smart",
            "charisma": "pleasant",
            "integrity": "ethical",
            "resilience": "steadfast",
            "kindness": "caring"
        })
    }

    fn relationship(&self) -> npc_forge::Result<Value> {
        let call = self.relationship_calls.fetch_add(1, Ordering::SeqCst);
        if Some(call) == self.fail_relationship_call {
            return Err(NpcError::Api { status: 400, body: "rejected".into() });
        }
        Ok(json!({
            "relationship_type": "professional",
            "relationship_dynamic": "equal",
            "relationship_strength": "moderate",
            "relationship_keywords": ["trade", "respect"],
            "tldr": format!("view {}", call)
        }))
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn generate(&self, request: &CompletionRequest) -> npc_forge::Result<Value> {
        self.requests.lock().unwrap().push(request.clone());
        match request.schema.name.as_str() {
            schema::WORLD_BUILDER => Ok(self.palette.clone()),
            schema::CHARACTER_SHEET => Ok(self.character()),
            schema::RELATIONSHIP_SHEET => self.relationship(),
            other => Err(NpcError::MalformedResponse(format!("unexpected schema {}", other))),
        }
    }
}

pub fn brief() -> WorldBrief {
    WorldBrief {
        setting: "A drowned city of canals".into(),
        mood: "melancholic".into(),
        feelings: "wonder, dread".into(),
        storyboard: "The tide rises a little every year".into(),
    }
}

pub fn config(output_dir: &std::path::Path) -> GeneratorConfig {
    GeneratorConfig {
        output_dir: output_dir.to_path_buf(),
        seed: Some(42),
        initial_backoff_ms: 1,
        ..GeneratorConfig::default()
    }
}
