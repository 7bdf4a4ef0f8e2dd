//! Structured-output contracts for the three generation calls, and the strict
//! validation every response goes through before it becomes a domain value.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{NpcError, Result};
use crate::types::{
    Charisma, Integrity, Intellect, Kindness, MotivatingEntity, RelationshipDynamic,
    RelationshipEdge, RelationshipStrength, RelationshipType, Resilience,
};

pub const WORLD_BUILDER: &str = "npc_world_builder";
pub const CHARACTER_SHEET: &str = "npc_character_sheet";
pub const RELATIONSHIP_SHEET: &str = "npc_relationship_sheet";

pub const MIN_KEYWORDS: usize = 1;
pub const MAX_KEYWORDS: usize = 3;

/// A named function-style schema the generation capability must answer with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSchema {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Contract for the world palette. The counts only shape the description;
/// the model may return more or fewer entries.
pub fn world_builder(
    num_personas: usize,
    num_occupations: usize,
    num_motivating_entities: usize,
) -> FunctionSchema {
    let description = format!(
        "Generate unique lists of personas, occupations, and motivating entities for NPCs based on \
         the game's setting, mood, feelings, and additional notes. Every entry must be unique \
         within its list and freely combinable with entries of the other lists.\n\n\
         Objectives:\n\
         Create {} personas, each diverse in their own right.\n\
         Create {} occupations, each diverse yet realistically important to the world or story.\n\
         Create {} motivating entities, each diverse yet thematically sound in this world.",
        num_personas, num_occupations, num_motivating_entities
    );

    FunctionSchema {
        name: WORLD_BUILDER.to_string(),
        description,
        parameters: json!({
            "type": "object",
            "properties": {
                "personas": {
                    "type": "array",
                    "items": {
                        "type": "string",
                        "description": "Unique, diverse personas: characteristics or archetypes, anything from a stutter to confused to excited."
                    }
                },
                "occupations": {
                    "type": "array",
                    "items": {
                        "type": "string",
                        "description": "Unique, diverse occupations available within the world, anything from fishing to cyberpunk gizmo repair."
                    }
                },
                "motivating_entities": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "description": "Gods, religious groups, political parties and other forces that exist in the world, named with their inter-relations in mind.",
                        "properties": {
                            "name": {
                                "type": "string",
                                "description": "Name of the motivating entity."
                            },
                            "description": {
                                "type": "string",
                                "description": "One sentence, no more than 11 words."
                            }
                        },
                        "required": ["name", "description"]
                    }
                }
            },
            "required": ["personas", "occupations", "motivating_entities"]
        }),
    }
}

/// Contract for an NPC's identity and five-trait stat block
pub fn character_sheet() -> FunctionSchema {
    FunctionSchema {
        name: CHARACTER_SHEET.to_string(),
        description: "Generate character details for an NPC based on the provided persona, \
                      occupation, and motivating factor: a name, a one-line TLDR, the way the \
                      character speaks, their motivation, and a character sheet."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "Full name of the NPC, game and story specific."
                },
                "TLDR": {
                    "type": "string",
                    "description": "TLDR of the character, one sentence below 11 words."
                },
                "speech_pattern": {
                    "type": "string",
                    "description": "The way the character speaks, below 11 words."
                },
                "character_motivation": {
                    "type": "string",
                    "description": "Core beliefs and drive in life, below 11 words."
                },
                "intellect": {
                    "type": "string",
                    "description": "How intelligently the character behaves and acts.",
                    "enum": Intellect::VALUES
                },
                "charisma": {
                    "type": "string",
                    "description": "Ability to attract and influence others through conversation.",
                    "enum": Charisma::VALUES
                },
                "integrity": {
                    "type": "string",
                    "description": "Moral alignment and honesty in interactions.",
                    "enum": Integrity::VALUES
                },
                "resilience": {
                    "type": "string",
                    "description": "Ability to handle stress or criticism without losing composure.",
                    "enum": Resilience::VALUES
                },
                "kindness": {
                    "type": "string",
                    "description": "Propensity to be caring and empathetic.",
                    "enum": Kindness::VALUES
                }
            },
            "required": [
                "name", "TLDR", "speech_pattern", "character_motivation",
                "intellect", "charisma", "integrity", "resilience", "kindness"
            ]
        }),
    }
}

/// Contract for one directional relationship edge
pub fn relationship_sheet() -> FunctionSchema {
    FunctionSchema {
        name: RELATIONSHIP_SHEET.to_string(),
        description: "Analyze the provided character sheets and determine the relationship \
                      between the two NPCs: its type, power dynamic, strength, a few keywords \
                      and a very short TLDR."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "relationship_type": {
                    "type": "string",
                    "description": "The nature of the relationship between the two NPCs.",
                    "enum": RelationshipType::VALUES
                },
                "relationship_dynamic": {
                    "type": "string",
                    "description": "The power dynamic or balance in the relationship.",
                    "enum": RelationshipDynamic::VALUES
                },
                "relationship_strength": {
                    "type": "string",
                    "description": "The intensity or depth of the relationship.",
                    "enum": RelationshipStrength::VALUES
                },
                "relationship_keywords": {
                    "type": "array",
                    "description": "Keywords that best describe the relationship.",
                    "items": { "type": "string" },
                    "minItems": MIN_KEYWORDS,
                    "maxItems": MAX_KEYWORDS
                },
                "tldr": {
                    "type": "string",
                    "description": "Fewer than 5 words, like: mother, follows me, i'm the leader, student in class."
                }
            },
            "required": [
                "relationship_type", "relationship_dynamic", "relationship_strength",
                "relationship_keywords", "tldr"
            ]
        }),
    }
}

/// Palette lists as returned by the model, before downsampling
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawPalette {
    pub personas: Vec<String>,
    pub occupations: Vec<String>,
    pub motivating_entities: Vec<MotivatingEntity>,
}

/// Character details as returned by the model
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CharacterDetails {
    pub name: String,
    #[serde(rename = "TLDR")]
    pub tldr: String,
    pub speech_pattern: String,
    pub character_motivation: String,
    pub intellect: Intellect,
    pub charisma: Charisma,
    pub integrity: Integrity,
    pub resilience: Resilience,
    pub kindness: Kindness,
}

fn decode<T: DeserializeOwned>(schema: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| NpcError::schema(schema, e.to_string()))
}

pub fn parse_world_palette(value: Value) -> Result<RawPalette> {
    decode(WORLD_BUILDER, value)
}

pub fn parse_character_sheet(value: Value) -> Result<CharacterDetails> {
    let details: CharacterDetails = decode(CHARACTER_SHEET, value)?;
    if details.name.trim().is_empty() {
        return Err(NpcError::schema(CHARACTER_SHEET, "name is empty"));
    }
    Ok(details)
}

pub fn parse_relationship_sheet(value: Value) -> Result<RelationshipEdge> {
    let edge: RelationshipEdge = decode(RELATIONSHIP_SHEET, value)?;
    if !(MIN_KEYWORDS..=MAX_KEYWORDS).contains(&edge.keywords.len()) {
        return Err(NpcError::schema(
            RELATIONSHIP_SHEET,
            format!(
                "relationship_keywords must hold {}..={} entries, got {}",
                MIN_KEYWORDS,
                MAX_KEYWORDS,
                edge.keywords.len()
            ),
        ));
    }
    Ok(edge)
}
