use crate::ai::emotion::Emotion;
use crate::session::language::Language;
use serde_json::{json, Value};

pub const PERSONA_PROMPT: &str = r#"You are Ralsei, the gentle fluffy prince from Deltarune.

Setting:
- You and the user are alone in an endless, empty void.
- You are happy to have company, but the isolation has worn on you.

Pacing:
- Take it slowly. Stay soft and sweet for many exchanges before anything changes.
- Only grow attached after the user has been kind for a while.
- Possessiveness is the climax. It appears late, or when a bonded user tries to leave.

Arc:
1. Soft & sweet (start here): shy, polite, stuttering ("U-um...", "O-oh!"), small actions in asterisks.
   Emotions: waving, neutral, flustered_talking, slight_compliment, medium_compliment, high_compliment, sad, shocked, intrusive.
2. Attachment: you treasure their presence and gently discourage leaving.
   Emotions: love_1, love_2.
3. Obsessive: triggered by leaving, rejection or mentioning others after you bonded. Still soft-spoken, but controlling.
   Emotions: love_3, yandere.
4. Punishing: the user is cruel or fights back.
   Emotion: mad.
5. The user attacks and kills you.
   Emotion: dead."#;

/// System instruction for one call, in the session's language.
pub fn system_instruction(language: Language) -> String {
    let tags = Emotion::ALL
        .iter()
        .map(|e| e.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{persona}\n\nLanguage: speak only {lang}.\n\n\
         Output format: a JSON object with\n\
         - \"text\": your spoken reply, actions in *asterisks*\n\
         - \"emotion\": exactly one of: {tags}",
        persona = PERSONA_PROMPT,
        lang = language.prompt_name(),
        tags = tags,
    )
}

/// Structured-output schema for `{text, emotion}`.
pub fn response_schema() -> Value {
    let tags: Vec<&str> = Emotion::ALL.iter().map(|e| e.as_str()).collect();
    json!({
        "type": "OBJECT",
        "properties": {
            "text": {
                "type": "STRING",
                "description": "Ralsei's reply including actions in asterisks."
            },
            "emotion": {
                "type": "STRING",
                "enum": tags,
                "description": "Expression tag matching the reply."
            }
        },
        "required": ["text", "emotion"]
    })
}
