//! Keyword-based interpreter.
//!
//! Stands in for a full NLP pipeline: text is lowercased and split into
//! word tokens, intents are matched against fixed keyword lists (first list
//! wins), and a handful of entity words are recognized.

use chatvault_core::session::interpret::Interpreter;
use chatvault_types::session::{Entity, Interpretation};

/// Intents in match priority order. Multi-word keywords match consecutive
/// tokens.
const INTENTS: &[(&str, &[&str])] = &[
    ("greet", &["hi", "hello", "hey", "howdy"]),
    ("bye", &["bye", "goodbye", "see you"]),
    ("ask_for_help", &["help", "assist", "support"]),
];

/// Recognized entity words and their kinds.
const ENTITIES: &[(&str, &str)] = &[("developer", "profession")];

const UNKNOWN: &str = "unknown";
const SELF_INTRO: &str = "self_intro";

#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordInterpreter;

impl KeywordInterpreter {
    pub fn new() -> Self {
        Self
    }
}

impl Interpreter for KeywordInterpreter {
    fn interpret(&self, text: &str) -> Interpretation {
        let tokens = tokenize(text);

        let entities: Vec<Entity> = tokens
            .iter()
            .filter_map(|token| {
                ENTITIES
                    .iter()
                    .find(|(word, _)| *word == token.as_str())
                    .map(|(word, kind)| Entity {
                        kind: (*kind).to_string(),
                        value: (*word).to_string(),
                    })
            })
            .collect();

        let intent = INTENTS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| contains_phrase(&tokens, k)))
            .map(|(intent, _)| *intent)
            // Someone telling us what they do, without asking for anything.
            .unwrap_or(if entities.is_empty() { UNKNOWN } else { SELF_INTRO });

        Interpretation {
            intent: Some(intent.to_string()),
            response: respond(intent).to_string(),
            entities,
        }
    }
}

fn respond(intent: &str) -> &'static str {
    match intent {
        "greet" => "Hello! How can I assist you today?",
        "bye" => "Goodbye! Have a great day!",
        "ask_for_help" => "How can I help you?",
        SELF_INTRO => "Nice to meet you! I'm a bot designed to assist with coding tasks.",
        _ => "I'm not sure how to respond to that.",
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn contains_phrase(tokens: &[String], phrase: &str) -> bool {
    let words: Vec<&str> = phrase.split(' ').collect();
    tokens
        .windows(words.len())
        .any(|window| window.iter().zip(&words).all(|(t, w)| t.as_str() == *w))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent_of(text: &str) -> String {
        KeywordInterpreter::new().interpret(text).intent.unwrap()
    }

    #[test]
    fn test_greet() {
        assert_eq!(intent_of("hi"), "greet");
        assert_eq!(intent_of("Hello there!"), "greet");
        let result = KeywordInterpreter::new().interpret("hey");
        assert_eq!(result.response, "Hello! How can I assist you today?");
    }

    #[test]
    fn test_bye_including_phrase() {
        assert_eq!(intent_of("goodbye"), "bye");
        assert_eq!(intent_of("OK, see you later"), "bye");
        // Words in the wrong order are not the phrase.
        assert_eq!(intent_of("you see"), "unknown");
    }

    #[test]
    fn test_ask_for_help() {
        assert_eq!(intent_of("can you help me?"), "ask_for_help");
        assert_eq!(intent_of("I need support"), "ask_for_help");
    }

    #[test]
    fn test_first_matching_intent_wins() {
        assert_eq!(intent_of("hi, can you help"), "greet");
    }

    #[test]
    fn test_keywords_match_whole_tokens_only() {
        assert_eq!(intent_of("this is high quality"), "unknown");
        assert_eq!(intent_of("helpful"), "unknown");
    }

    #[test]
    fn test_unknown_response() {
        let result = KeywordInterpreter::new().interpret("what is a monad");
        assert_eq!(result.intent.as_deref(), Some("unknown"));
        assert!(result.entities.is_empty());
        assert_eq!(result.response, "I'm not sure how to respond to that.");
    }

    #[test]
    fn test_developer_entity() {
        let result = KeywordInterpreter::new().interpret("I am a Developer");
        assert_eq!(result.intent.as_deref(), Some("self_intro"));
        assert_eq!(
            result.entities,
            vec![Entity {
                kind: "profession".to_string(),
                value: "developer".to_string(),
            }]
        );

        let result = KeywordInterpreter::new().interpret("hello, I'm a developer");
        assert_eq!(result.intent.as_deref(), Some("greet"));
        assert_eq!(result.entities.len(), 1);
    }
}
