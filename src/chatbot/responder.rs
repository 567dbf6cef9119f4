//! Keyword rule matching and reply generation.
//!
//! Replies are produced by a fixed, ordered rule table: the input is
//! lowercased, each rule checks for a literal substring, and the first match
//! wins. A catch-all reply guarantees an answer for any input.

use std::sync::Arc;

use serde::Deserialize;

use crate::chatbot::picker::Picker;

/// Facts the bot knows about itself, interpolated into templated replies.
#[derive(Debug, Clone, Deserialize)]
pub struct Persona {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_major")]
    pub major: String,
    #[serde(default = "default_university")]
    pub university: String,
    #[serde(default = "default_hobbies")]
    pub hobbies: Vec<String>,
    #[serde(default = "default_purpose")]
    pub purpose: String,
}

fn default_name() -> String {
    "Quip".to_string()
}

fn default_major() -> String {
    "financial technologies".to_string()
}

fn default_university() -> String {
    "TSUE".to_string()
}

fn default_hobbies() -> Vec<String> {
    vec![
        "coding".to_string(),
        "reading".to_string(),
        "playing chess".to_string(),
    ]
}

fn default_purpose() -> String {
    "I love chatting with people and sharing a daily dose of motivation.".to_string()
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            name: default_name(),
            major: default_major(),
            university: default_university(),
            hobbies: default_hobbies(),
            purpose: default_purpose(),
        }
    }
}

const GREETING_VARIANTS: &[&str] = &[
    "Hey there!",
    "Hello! How's your day?",
    "Hi! What's up?",
];

const STATUS_VARIANTS: &[&str] = &[
    "I am good!",
    "Doing great, thanks for asking!",
    "Can't complain. How about you?",
];

const FALLBACK_VARIANTS: &[&str] = &[
    "I do not understand what you wrote...",
    "Hmm, that one went over my head.",
    "Not sure I follow. Try asking me something else?",
];

/// A reply is either fixed at construction time or drawn per invocation.
enum Reply {
    Fixed(String),
    OneOf(&'static [&'static str]),
}

struct Rule {
    triggers: &'static [&'static str],
    reply: Reply,
}

impl Rule {
    fn matches(&self, normalized: &str) -> bool {
        self.triggers.iter().any(|t| normalized.contains(t))
    }
}

/// Stateless message classifier. Safe to share across handler invocations.
pub struct Responder {
    rules: Vec<Rule>,
    fallback: Reply,
    picker: Arc<Picker>,
}

impl Responder {
    pub fn new(persona: Persona, picker: Arc<Picker>) -> Self {
        // Order matters: substrings overlap ("hello, who are you" greets),
        // so the table is walked top to bottom and the first match wins.
        let rules = vec![
            Rule {
                triggers: &["hello", "hi"],
                reply: Reply::OneOf(GREETING_VARIANTS),
            },
            Rule {
                triggers: &["how are you"],
                reply: Reply::OneOf(STATUS_VARIANTS),
            },
            Rule {
                triggers: &["who are you"],
                reply: Reply::Fixed(format!("My name is {}", persona.name)),
            },
            Rule {
                triggers: &["what is your major"],
                reply: Reply::Fixed(format!(
                    "I am currently studying at {} for {}",
                    persona.university, persona.major
                )),
            },
            Rule {
                triggers: &["what are your hobbies"],
                reply: Reply::Fixed(format!(
                    "I enjoy {}. What about you?",
                    persona.hobbies.join(", ")
                )),
            },
            Rule {
                triggers: &["tell me about yourself"],
                reply: Reply::Fixed(format!(
                    "I'm {}! I study {} at {}. {}",
                    persona.name, persona.major, persona.university, persona.purpose
                )),
            },
        ];

        Self {
            rules,
            fallback: Reply::OneOf(FALLBACK_VARIANTS),
            picker,
        }
    }

    /// Classify `text` and produce a reply. Never fails and never returns an
    /// empty string: unmatched input falls through to the catch-all reply.
    pub fn respond(&self, text: &str) -> String {
        let normalized = text.to_lowercase();
        let reply = self
            .rules
            .iter()
            .find(|rule| rule.matches(&normalized))
            .map(|rule| &rule.reply)
            .unwrap_or(&self.fallback);
        self.render(reply)
    }

    fn render(&self, reply: &Reply) -> String {
        match reply {
            Reply::Fixed(text) => text.clone(),
            Reply::OneOf(variants) => (*self.picker.choose(variants)).to_string(),
        }
    }
}
