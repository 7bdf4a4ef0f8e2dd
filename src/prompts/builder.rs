use crate::error::Result;
use crate::llm::Message;
use crate::types::{MotivatingEntity, Npc, WorldBrief};

use super::loader::SystemPrompts;
use super::templates::{KNOWN_NAMES_GUIDANCE, PALETTE_INSTRUCTION};

/// What one character sheet request is about
#[derive(Debug, Clone, Copy)]
pub struct CharacterSeed<'a> {
    pub persona: &'a str,
    pub occupation: &'a str,
    pub motivating_entity: &'a MotivatingEntity,
    /// Required first letter of the generated name
    pub first_letter: char,
}

/// Builds the message lists for every generation call
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    system: SystemPrompts,
}

impl PromptBuilder {
    pub fn new(system: SystemPrompts) -> Self {
        Self { system }
    }

    pub fn palette_messages(&self, brief: &WorldBrief) -> Vec<Message> {
        let user = format!("{}\n\n{}", format_brief(brief), PALETTE_INSTRUCTION);
        vec![Message::system(&self.system.palette), Message::user(user)]
    }

    /// Prior names are only mentioned when there are any
    pub fn character_messages(
        &self,
        brief: &WorldBrief,
        seed: CharacterSeed<'_>,
        known_names: &[String],
    ) -> Vec<Message> {
        let mut sections = vec![
            format!("The game is about:\n{}", format_brief(brief)),
            format!(
                "This NPC within the game needs to be about:\n\
                 Persona: {}\n\
                 Occupation: {}\n\
                 Motivating Factor: {} - {}",
                seed.persona,
                seed.occupation,
                seed.motivating_entity.name,
                seed.motivating_entity.description
            ),
        ];

        if !known_names.is_empty() {
            sections.push(format!(
                "Some names of already defined NPCs include: {}\n{}",
                known_names.join(", "),
                KNOWN_NAMES_GUIDANCE
            ));
        }

        sections.push(format!("Find a name starting with {}", seed.first_letter));

        vec![
            Message::system(&self.system.character),
            Message::user(sections.join("\n\n")),
        ]
    }

    /// Asks for `subject`'s view of `other`. `context` carries the other side's
    /// already established view, if any.
    pub fn relationship_messages(
        &self,
        subject: &Npc,
        other: &Npc,
        context: Option<&str>,
    ) -> Result<Vec<Message>> {
        let mut sections = vec![
            format!("NPC 1:\n{}", format_profile(subject)?),
            format!("NPC 2:\n{}", format_profile(other)?),
        ];

        if let Some(context) = context {
            sections.push(format!(
                "Context of relationship from their perspective:\n{}",
                context
            ));
        }

        sections.push(format!(
            "Based on the provided information, please determine the relationship between the \
             two NPCs from NPC 1 - i.e. {}'s perspective.",
            subject.name
        ));

        Ok(vec![
            Message::system(&self.system.relationship),
            Message::user(sections.join("\n\n")),
        ])
    }
}

fn format_brief(brief: &WorldBrief) -> String {
    format!(
        "Game setting description: {}\n\
         Game mood: {}\n\
         Desired feelings: {}\n\
         Additional notes: {}",
        brief.setting, brief.mood, brief.feelings, brief.storyboard
    )
}

fn format_profile(npc: &Npc) -> Result<String> {
    Ok(format!(
        "Name: {}\nTLDR: {}\nSpeech Pattern: {}\nMotivation: {}\nCharacter Sheet: {}",
        npc.name,
        npc.tldr,
        npc.speech_pattern,
        npc.motivation,
        serde_json::to_string(&npc.character_sheet)?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CharacterSheet, Charisma, Integrity, Intellect, Kindness, Resilience};

    fn npc(name: &str) -> Npc {
        Npc::new(
            name,
            "Keeps the lighthouse",
            "Gruff, clipped sentences",
            "Protect the harbor",
            CharacterSheet {
                intellect: Intellect::Cunning,
                charisma: Charisma::Awkward,
                integrity: Integrity::Honorable,
                resilience: Resilience::Unshakeable,
                kindness: Kindness::Cold,
            },
        )
    }

    fn entity() -> MotivatingEntity {
        MotivatingEntity {
            name: "The Tide Court".into(),
            description: "Sea spirits bargaining for drowned souls".into(),
        }
    }

    #[test]
    fn first_character_request_omits_known_names() {
        let builder = PromptBuilder::default();
        let entity = entity();
        let seed = CharacterSeed {
            persona: "stutterer",
            occupation: "net mender",
            motivating_entity: &entity,
            first_letter: 'q',
        };

        let messages = builder.character_messages(&WorldBrief::default(), seed, &[]);
        let user = &messages[1].content;
        assert!(!user.contains("already defined"));
        assert!(user.contains("Find a name starting with q"));
        assert!(user.contains("The Tide Court - Sea spirits"));
    }

    #[test]
    fn later_character_requests_list_known_names() {
        let builder = PromptBuilder::default();
        let entity = entity();
        let seed = CharacterSeed {
            persona: "stutterer",
            occupation: "net mender",
            motivating_entity: &entity,
            first_letter: 'b',
        };
        let names = vec!["Ilse Marrow".to_string(), "Tobiah Crane".to_string()];

        let messages = builder.character_messages(&WorldBrief::default(), seed, &names);
        assert!(messages[1].content.contains("Ilse Marrow, Tobiah Crane"));
        assert!(messages[1].content.contains("independent new character"));
    }

    #[test]
    fn relationship_request_puts_subject_first() {
        let builder = PromptBuilder::default();
        let messages = builder
            .relationship_messages(&npc("Ada"), &npc("Bram"), Some("{\"Ada\":{}}"))
            .unwrap();
        let user = &messages[1].content;

        assert!(user.find("Name: Ada").unwrap() < user.find("Name: Bram").unwrap());
        assert!(user.contains("Context of relationship from their perspective:\n{\"Ada\":{}}"));
        assert!(user.contains("i.e. Ada's perspective"));
        assert!(user.contains("\"intellect\":\"cunning\""));
    }
}
