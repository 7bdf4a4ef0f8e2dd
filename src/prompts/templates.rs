/// Default system prompt for the world palette call
pub const PALETTE_SYSTEM_DEFAULT: &str =
    "Generate lists of unique personas, occupations, and motivating entities for a game.";

/// Default system prompt for the character sheet call
pub const CHARACTER_SYSTEM_DEFAULT: &str = "Generate character details for an NPC based on the \
provided persona, occupation, and motivating factor.";

/// Default system prompt for the relationship sheet call
pub const RELATIONSHIP_SYSTEM_DEFAULT: &str = "Analyze the provided character sheets and \
determine the relationship between the two NPCs.";

/// Appended to character requests once other NPCs exist
pub const KNOWN_NAMES_GUIDANCE: &str = "Either find a unique name, or, only if it is \
occupationally or characteristically interesting, make this NPC related to one of them in some \
way. Most of the time do not do this and instead create an independent new character.";

pub const PALETTE_INSTRUCTION: &str = "Please provide diverse and unique lists for personas, \
occupations, and motivating entities based on these inputs.";
