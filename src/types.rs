use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{NpcError, Result};

/// Defines a closed, ranked vocabulary used by the structured-output schemas.
/// Variants are listed from the highest to the lowest rank.
macro_rules! vocabulary {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Every accepted wire value, highest rank first
            pub const VALUES: &'static [&'static str] = &[$($text),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

vocabulary!(
    /// How intelligently the character behaves
    Intellect {
        Genius => "genius",
        Cunning => "cunning",
        Smart => "smart",
        Common => "common",
        Stupid => "stupid",
        Dumb => "dumb",
    }
);

vocabulary!(
    /// Ability to attract and influence others through conversation
    Charisma {
        Magnetic => "magnetic",
        Charming => "charming",
        Pleasant => "pleasant",
        Neutral => "neutral",
        Awkward => "awkward",
        Repellent => "repellent",
    }
);

vocabulary!(
    /// Moral alignment and honesty
    Integrity {
        Honorable => "honorable",
        Ethical => "ethical",
        Neutral => "neutral",
        Misleading => "misleading",
        Deceptive => "deceptive",
        Corrupt => "corrupt",
    }
);

vocabulary!(
    /// Composure under stress or criticism
    Resilience {
        Unshakeable => "unshakeable",
        Steadfast => "steadfast",
        Flexible => "flexible",
        Sensitive => "sensitive",
        Defensive => "defensive",
        Volatile => "volatile",
    }
);

vocabulary!(
    /// Propensity to be caring and empathetic
    Kindness {
        Compassionate => "compassionate",
        Caring => "caring",
        Neutral => "neutral",
        Indifferent => "indifferent",
        Cold => "cold",
        Cruel => "cruel",
    }
);

vocabulary!(
    /// Nature of a relationship
    RelationshipType {
        Familial => "familial",
        Romantic => "romantic",
        Platonic => "platonic",
        Professional => "professional",
        Adversarial => "adversarial",
        Indifferent => "indifferent",
    }
);

vocabulary!(
    /// Power dynamic or balance in a relationship
    RelationshipDynamic {
        Equal => "equal",
        LeaderFollower => "leader-follower",
        MentorMentee => "mentor-mentee",
        Rivals => "rivals",
        DependentSupporter => "dependent-supporter",
        Exploitative => "exploitative",
    }
);

vocabulary!(
    /// Intensity or depth of a relationship
    RelationshipStrength {
        Strong => "strong",
        Moderate => "moderate",
        Weak => "weak",
        Volatile => "volatile",
        Distant => "distant",
        Unknown => "unknown",
    }
);

/// The five-trait stat block of an NPC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSheet {
    pub intellect: Intellect,
    pub charisma: Charisma,
    pub integrity: Integrity,
    pub resilience: Resilience,
    pub kindness: Kindness,
}

/// One NPC's directional view of its relationship to another NPC
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipEdge {
    #[serde(rename = "relationship_type")]
    pub kind: RelationshipType,
    #[serde(rename = "relationship_dynamic")]
    pub dynamic: RelationshipDynamic,
    #[serde(rename = "relationship_strength")]
    pub strength: RelationshipStrength,
    #[serde(rename = "relationship_keywords")]
    pub keywords: Vec<String>,
    pub tldr: String,
}

/// A generated Non-Player Character.
///
/// Serializes to the exported record layout: name, tldr, speech_pattern,
/// motivation, character_sheet, relations. Relations keep the order in which
/// the other NPCs were linked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Npc {
    pub name: String,
    pub tldr: String,
    pub speech_pattern: String,
    pub motivation: String,
    pub character_sheet: CharacterSheet,
    #[serde(default)]
    pub relations: IndexMap<String, RelationshipEdge>,
}

impl Npc {
    /// Creates an NPC with no relations yet
    pub fn new(
        name: impl Into<String>,
        tldr: impl Into<String>,
        speech_pattern: impl Into<String>,
        motivation: impl Into<String>,
        character_sheet: CharacterSheet,
    ) -> Self {
        Self {
            name: name.into(),
            tldr: tldr.into(),
            speech_pattern: speech_pattern.into(),
            motivation: motivation.into(),
            character_sheet,
            relations: IndexMap::new(),
        }
    }

    /// This NPC's view of the named NPC, if one has been established
    pub fn relation_to(&self, name: &str) -> Option<&RelationshipEdge> {
        self.relations.get(name)
    }

    /// Records this NPC's view of `other`. Returns the edge it replaced, which
    /// only happens when two NPCs share a name.
    pub fn set_relation(
        &mut self,
        other: impl Into<String>,
        edge: RelationshipEdge,
    ) -> Option<RelationshipEdge> {
        self.relations.insert(other.into(), edge)
    }
}

/// Free-text description of the game world shared by every prompt of a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldBrief {
    pub setting: String,
    pub mood: String,
    pub feelings: String,
    pub storyboard: String,
}

/// A faction, deity, ideology or similar force that can drive an NPC
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotivatingEntity {
    #[serde(alias = "motivating_name")]
    pub name: String,
    #[serde(alias = "motivating_description")]
    pub description: String,
}

/// Requested sizes for each palette list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteTargets {
    pub personas: usize,
    pub occupations: usize,
    pub motivating_entities: usize,
}

/// Shared pools every NPC of a session is sampled from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPalette {
    pub personas: Vec<String>,
    pub occupations: Vec<String>,
    pub motivating_entities: Vec<MotivatingEntity>,
}

/// Everything a caller supplies to start a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRequest {
    pub brief: WorldBrief,
    pub total_npcs: usize,
    pub occupation_diversity: f64,
    pub persona_diversity: f64,
    pub motivation_diversity: f64,
}

impl SessionRequest {
    pub const MAX_NPCS: usize = 20;

    pub fn new(brief: WorldBrief, total_npcs: usize) -> Self {
        Self {
            brief,
            total_npcs,
            occupation_diversity: 0.5,
            persona_diversity: 0.5,
            motivation_diversity: 0.5,
        }
    }

    pub fn with_diversity(mut self, occupation: f64, persona: f64, motivation: f64) -> Self {
        self.occupation_diversity = occupation;
        self.persona_diversity = persona;
        self.motivation_diversity = motivation;
        self
    }

    /// Checks the caller's ranges: 1..=20 NPCs, every ratio within [0, 1]
    pub fn validate(&self) -> Result<()> {
        if self.total_npcs == 0 || self.total_npcs > Self::MAX_NPCS {
            return Err(NpcError::InvalidInput(format!(
                "NPC count must be between 1 and {}, got {}",
                Self::MAX_NPCS,
                self.total_npcs
            )));
        }
        for (label, ratio) in [
            ("occupation diversity", self.occupation_diversity),
            ("persona diversity", self.persona_diversity),
            ("motivation diversity", self.motivation_diversity),
        ] {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(NpcError::InvalidInput(format!(
                    "{} must be within [0, 1], got {}",
                    label, ratio
                )));
            }
        }
        Ok(())
    }

    /// Derives palette sizes as `round(total × ratio / downscale_factor)`.
    ///
    /// A list that would round to zero leaves nothing to sample, so it is
    /// rejected before any generation call is made.
    pub fn targets(&self, downscale_factor: f64) -> Result<PaletteTargets> {
        self.validate()?;
        if !(downscale_factor > 0.0) {
            return Err(NpcError::InvalidInput(format!(
                "downscale factor must be positive, got {}",
                downscale_factor
            )));
        }
        let scale = |ratio: f64| (self.total_npcs as f64 * ratio / downscale_factor).round() as usize;
        let targets = PaletteTargets {
            personas: scale(self.persona_diversity),
            occupations: scale(self.occupation_diversity),
            motivating_entities: scale(self.motivation_diversity),
        };
        for (label, target) in [
            ("personas", targets.personas),
            ("occupations", targets.occupations),
            ("motivating entities", targets.motivating_entities),
        ] {
            if target == 0 {
                return Err(NpcError::InvalidInput(format!(
                    "{} would be empty: {} NPCs at this diversity and downscale factor {} round to 0",
                    label, self.total_npcs, downscale_factor
                )));
            }
        }
        Ok(targets)
    }
}
