use std::path::PathBuf;

use crate::error::Result;
use crate::session::SessionManifest;
use crate::types::{Npc, WorldPalette};

/// Trait for persisting generated NPCs
pub trait NpcStore: Send + Sync {
    /// Writes (or overwrites) the record of one NPC and returns where it went
    fn save_npc(&self, npc: &Npc) -> Result<PathBuf>;

    /// Writes the description of a finished session
    fn save_manifest(&self, manifest: &SessionManifest) -> Result<PathBuf>;

    /// Identifier the record of `npc` is stored under
    fn record_id(&self, npc: &Npc) -> String;
}

/// Receives progress as a session advances. Every method defaults to a no-op.
pub trait SessionObserver: Send {
    /// The palette has been generated and downsampled
    fn palette_ready(&mut self, _palette: &WorldPalette) {}

    /// NPC number `index` (zero-based) of `total` now exists and is linked to
    /// every earlier NPC
    fn npc_completed(&mut self, _index: usize, _total: usize, _npc: &Npc) {}
}

/// Observer that ignores everything
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}
