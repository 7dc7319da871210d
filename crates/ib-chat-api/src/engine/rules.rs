//! Rule layer: fixed-priority handlers that run before the classifier.
//!
//! Checks run in order and the first match wins:
//! 1. exact greeting / goodbye / thanks phrases,
//! 2. arithmetic expressions,
//! 3. name introductions ("my name is X").

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use ib_protocol::chat::ResolutionSource;
use ib_protocol::intent::Catalog;

use super::arithmetic;
use crate::session::Session;

/// A digit next to an operator or parenthesis, whitespace allowed in between.
static RE_ARITHMETIC_TRIGGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d\s*[-+*/()]|[-+*/()]\s*\d").unwrap());

/// Runs of characters that may appear in an expression.
static RE_EXPRESSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9.+\-*/() ]+").unwrap());

static RE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:my name is|i am|call me)\s+([^\r\n]+)").unwrap()
});

const GREETING_PHRASES: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "hiya",
    "howdy",
    "greetings",
    "good morning",
    "good afternoon",
    "good evening",
];

const GOODBYE_PHRASES: &[&str] = &[
    "bye",
    "goodbye",
    "bye bye",
    "see you",
    "see you later",
    "farewell",
    "good night",
    "take care",
];

const THANKS_PHRASES: &[&str] = &[
    "thanks",
    "thank you",
    "thanks a lot",
    "thank you so much",
    "thx",
    "much appreciated",
];

/// Which rule fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Greeting,
    Goodbye,
    Thanks,
    Arithmetic,
    NameCapture,
}

impl RuleKind {
    /// Catalog tag whose first response an exact-phrase rule returns.
    pub fn tag(self) -> Option<&'static str> {
        match self {
            Self::Greeting => Some("greeting"),
            Self::Goodbye => Some("goodbye"),
            Self::Thanks => Some("thanks"),
            Self::Arithmetic | Self::NameCapture => None,
        }
    }

    pub fn source(self) -> ResolutionSource {
        match self {
            Self::Greeting => ResolutionSource::RuleGreeting,
            Self::Goodbye => ResolutionSource::RuleGoodbye,
            Self::Thanks => ResolutionSource::RuleThanks,
            Self::Arithmetic => ResolutionSource::Arithmetic,
            Self::NameCapture => ResolutionSource::NameCapture,
        }
    }
}

/// A rule's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    pub kind: RuleKind,
    pub response: String,
}

/// Ordered rule checks, with exact-phrase responses taken from the catalog.
pub struct RuleLayer {
    /// Normalized phrase → (rule, catalog response).
    phrases: HashMap<&'static str, (RuleKind, String)>,
}

impl RuleLayer {
    /// Build the rule layer. Exact-phrase rules whose tag is missing from the
    /// catalog (or has no responses) are left out.
    pub fn new(catalog: &Catalog) -> Self {
        let mut phrases = HashMap::new();
        for (kind, list) in [
            (RuleKind::Greeting, GREETING_PHRASES),
            (RuleKind::Goodbye, GOODBYE_PHRASES),
            (RuleKind::Thanks, THANKS_PHRASES),
        ] {
            let Some(tag) = kind.tag() else { continue };
            match catalog.first_response(tag) {
                Some(response) => {
                    for phrase in list {
                        phrases.insert(*phrase, (kind, response.to_string()));
                    }
                }
                None => tracing::warn!(tag, "catalog has no response for exact-phrase rule"),
            }
        }
        Self { phrases }
    }

    /// Try each rule in order. Name capture updates `session`.
    pub fn try_resolve(&self, raw_input: &str, session: &mut Session) -> Option<RuleMatch> {
        if let Some(m) = self.exact_phrase(raw_input) {
            return Some(m);
        }
        if let Some(m) = try_arithmetic(raw_input) {
            return Some(m);
        }
        try_name_capture(raw_input, session)
    }

    fn exact_phrase(&self, raw_input: &str) -> Option<RuleMatch> {
        let normalized = raw_input.trim().to_lowercase();
        self.phrases
            .get(normalized.as_str())
            .map(|(kind, response)| RuleMatch {
                kind: *kind,
                response: response.clone(),
            })
    }
}

/// Longest expression-like run in `text` with a digit next to an operator, trimmed.
pub fn extract_expression(text: &str) -> Option<&str> {
    RE_EXPRESSION
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .filter(|s| RE_ARITHMETIC_TRIGGER.is_match(s))
        .fold(None, |best: Option<&str>, s| match best {
            Some(b) if b.len() >= s.len() => Some(b),
            _ => Some(s),
        })
}

fn try_arithmetic(raw_input: &str) -> Option<RuleMatch> {
    if !RE_ARITHMETIC_TRIGGER.is_match(raw_input) {
        return None;
    }
    let expression = extract_expression(raw_input)?;
    match arithmetic::evaluate(expression) {
        Ok(value) => Some(RuleMatch {
            kind: RuleKind::Arithmetic,
            response: format!(
                "The result of {expression} is {}.",
                arithmetic::format_number(value)
            ),
        }),
        Err(e) => {
            tracing::debug!(expression, error = %e, "arithmetic rule declined");
            None
        }
    }
}

/// Extract the name from an introduction, if `text` is one.
pub fn extract_name(text: &str) -> Option<String> {
    let caps = RE_NAME.captures(text)?;
    let name = caps[1]
        .trim()
        .trim_end_matches(['.', '!', '?'])
        .trim_end();
    (!name.is_empty()).then(|| name.to_string())
}

fn try_name_capture(raw_input: &str, session: &mut Session) -> Option<RuleMatch> {
    let name = extract_name(raw_input)?;
    let response = format!("Nice to meet you, {name}! I'll remember that.");
    session.set_name(name);
    Some(RuleMatch {
        kind: RuleKind::NameCapture,
        response,
    })
}
