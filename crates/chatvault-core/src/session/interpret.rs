//! Interpreter trait: the boundary to the language front end.

use chatvault_types::session::{Interpretation, UpdateRequest};

/// Turns one line of user text into an intent, entities and a reply.
///
/// The tokenizer / classifier / recognizer / generator pipeline sits behind
/// this trait; the session layer only consumes its output.
pub trait Interpreter: Send + Sync {
    fn interpret(&self, text: &str) -> Interpretation;
}

/// Build the update for one interpreted turn.
///
/// The first recognized entity becomes both the last entity and the topic.
pub fn update_for_turn(text: &str, interpretation: &Interpretation) -> UpdateRequest {
    let first = interpretation.entities.first();
    UpdateRequest {
        intent: interpretation.intent.clone(),
        entity: first.map(|e| e.value.clone()),
        topic: first.map(|e| e.kind.clone()),
        input: Some(text.to_string()),
        response: Some(interpretation.response.clone()),
    }
}
