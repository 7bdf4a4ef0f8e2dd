use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Npc, PaletteTargets, WorldBrief, WorldPalette};

/// Explicit context of one generation run.
///
/// The palette is fixed at construction. NPCs are only ever appended, in
/// creation order, and their identity fields are never touched afterwards.
#[derive(Debug, Clone)]
pub struct Session {
    started_at: DateTime<Utc>,
    brief: WorldBrief,
    targets: PaletteTargets,
    palette: WorldPalette,
    npcs: Vec<Npc>,
}

impl Session {
    pub fn new(brief: WorldBrief, targets: PaletteTargets, palette: WorldPalette) -> Self {
        Self {
            started_at: Utc::now(),
            brief,
            targets,
            palette,
            npcs: Vec::new(),
        }
    }

    pub fn brief(&self) -> &WorldBrief {
        &self.brief
    }

    pub fn targets(&self) -> PaletteTargets {
        self.targets
    }

    pub fn palette(&self) -> &WorldPalette {
        &self.palette
    }

    /// NPCs in creation order
    pub fn npcs(&self) -> &[Npc] {
        &self.npcs
    }

    pub fn len(&self) -> usize {
        self.npcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.npcs.is_empty()
    }

    /// Names of every NPC so far, oldest first
    pub fn names(&self) -> Vec<String> {
        self.npcs.iter().map(|npc| npc.name.clone()).collect()
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.npcs.iter().any(|npc| npc.name == name)
    }

    pub(crate) fn push(&mut self, npc: Npc) {
        self.npcs.push(npc);
    }

    /// Only relations may be changed through this
    pub(crate) fn npcs_mut(&mut self) -> &mut [Npc] {
        &mut self.npcs
    }


    /// Summary written next to the NPC records
    pub fn manifest(&self, record_ids: Vec<String>) -> SessionManifest {
        SessionManifest {
            started_at: self.started_at,
            finished_at: Utc::now(),
            brief: self.brief.clone(),
            targets: self.targets,
            palette: self.palette.clone(),
            npcs: self
                .npcs
                .iter()
                .zip(record_ids)
                .map(|(npc, record)| ManifestEntry {
                    name: npc.name.clone(),
                    record,
                    relations: npc.relations.len(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    pub record: String,
    pub relations: usize,
}

/// Description of a finished session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionManifest {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub brief: WorldBrief,
    pub targets: PaletteTargets,
    pub palette: WorldPalette,
    pub npcs: Vec<ManifestEntry>,
}
