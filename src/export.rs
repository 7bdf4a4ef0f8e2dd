use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::session::SessionManifest;
use crate::traits::NpcStore;
use crate::types::Npc;

pub const MANIFEST_FILE: &str = "session.manifest.json";

/// Record identifier for an NPC name: every character outside `[A-Za-z]`
/// becomes `_`
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphabetic() { c } else { '_' })
        .collect()
}

/// Pretty JSON with a four-space indent and a trailing newline
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Stores one `<sanitized name>.json` record per NPC in a directory
pub struct JsonDirectoryStore {
    dir: PathBuf,
}

impl JsonDirectoryStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn record_path(&self, npc: &Npc) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_name(&npc.name)))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(path, contents)?;
        Ok(())
    }
}

impl NpcStore for JsonDirectoryStore {
    fn save_npc(&self, npc: &Npc) -> Result<PathBuf> {
        let path = self.record_path(npc);
        self.write(&path, &to_pretty_json(npc)?)?;
        log::debug!("💾 Exported {} to {:?}", npc.name, path);
        Ok(path)
    }

    fn save_manifest(&self, manifest: &SessionManifest) -> Result<PathBuf> {
        let path = self.dir.join(MANIFEST_FILE);
        self.write(&path, &to_pretty_json(manifest)?)?;
        Ok(path)
    }

    fn record_id(&self, npc: &Npc) -> String {
        sanitize_name(&npc.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        CharacterSheet, Charisma, Integrity, Intellect, Kindness, RelationshipDynamic,
        RelationshipEdge, RelationshipStrength, RelationshipType, Resilience,
    };

    fn npc(name: &str) -> Npc {
        let mut npc = Npc::new(
            name,
            "Smuggler with a conscience",
            "Whispers, never finishes sentences",
            "Pay off the harbor master",
            CharacterSheet {
                intellect: Intellect::Cunning,
                charisma: Charisma::Charming,
                integrity: Integrity::Misleading,
                resilience: Resilience::Steadfast,
                kindness: Kindness::Caring,
            },
        );
        npc.set_relation(
            "Harbor Master Vey",
            RelationshipEdge {
                kind: RelationshipType::Adversarial,
                dynamic: RelationshipDynamic::Exploitative,
                strength: RelationshipStrength::Strong,
                keywords: vec!["debt".into(), "fear".into()],
                tldr: "owns my debt".into(),
            },
        );
        npc
    }

    #[test]
    fn sanitizes_every_non_letter() {
        assert_eq!(sanitize_name("Mira-Jang 2"), "Mira_Jang__");
        assert_eq!(sanitize_name("O'Brien"), "O_Brien");
        assert_eq!(sanitize_name("Zoë"), "Zo_");
        assert_eq!(sanitize_name("Plain"), "Plain");
    }

    #[test]
    fn creates_missing_directory() {
        let root = tempfile::tempdir().unwrap();
        let store = JsonDirectoryStore::new(root.path().join("nested").join("characters"));

        let path = store.save_npc(&npc("Kestrel Dunn")).unwrap();
        assert_eq!(path.file_name().unwrap(), "Kestrel_Dunn.json");
        assert!(path.exists());

        store.save_npc(&npc("Kestrel Dunn")).unwrap();
    }

    #[test]
    fn export_is_byte_identical_when_repeated() {
        let root = tempfile::tempdir().unwrap();
        let store = JsonDirectoryStore::new(root.path());
        let npc = npc("Kestrel Dunn");

        let path = store.save_npc(&npc).unwrap();
        let first = fs::read(&path).unwrap();
        store.save_npc(&npc).unwrap();
        let second = fs::read(&path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn record_layout_matches_export_format() {
        let root = tempfile::tempdir().unwrap();
        let store = JsonDirectoryStore::new(root.path());
        let path = store.save_npc(&npc("Kestrel Dunn")).unwrap();
        let text = fs::read_to_string(path).unwrap();

        assert!(text.starts_with("{\n    \"name\": \"Kestrel Dunn\",\n    \"tldr\""));
        assert!(text.contains("\"relationship_dynamic\": \"exploitative\""));

        let parsed: Npc = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, npc("Kestrel Dunn"));
    }

    #[test]
    fn colliding_identifiers_overwrite() {
        let root = tempfile::tempdir().unwrap();
        let store = JsonDirectoryStore::new(root.path());

        let first = store.save_npc(&npc("Ana Bel")).unwrap();
        let second = store.save_npc(&npc("Ana-Bel")).unwrap();
        assert_eq!(first, second);

        let text = fs::read_to_string(second).unwrap();
        assert!(text.contains("\"Ana-Bel\""));
    }
}
