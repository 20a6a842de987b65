use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::models::{Continent, GroundingSource, Scripture, Story};

// Greedy: first '[' through the last ']' in the text
static ARRAY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[[\s\S]*\]").expect("Failed to compile array pattern")
});

const STORY_FIELDS: [&str; 6] = [
    "title",
    "summary",
    "ideology",
    "scripture_ref",
    "scripture_text",
    "application",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("no JSON array found in model output")]
    NoArray,

    #[error("model output is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("{} story record(s) do not match the expected schema", .0.len())]
    InvalidRecords(Vec<RecordViolation>),
}

/// What is wrong with one decoded record.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RecordViolation {
    pub index: usize,
    pub missing: Vec<&'static str>,
    pub malformed: Vec<&'static str>,
}

/// One story as the model describes it, before it is attached to a continent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStory {
    pub title: String,
    pub summary: String,
    pub ideology: String,
    pub scripture_ref: String,
    pub scripture_text: String,
    pub application: String,
}

impl RawStory {
    pub fn into_story(self, continent: Continent, index: usize) -> Story {
        Story {
            id: format!("{}-{}", continent, index),
            title: self.title,
            summary: self.summary,
            continent,
            ideology: self.ideology,
            scripture: Scripture {
                reference: self.scripture_ref,
                text: self.scripture_text,
                application: self.application,
            },
            source_url: None,
        }
    }
}

pub fn build_prompt(continent: Continent) -> String {
    let mut result = String::with_capacity(512);
    result.push_str("Find the top 10 trending news stories from the continent of ");
    result.push_str(continent.name());
    result.push_str(" today.\n");
    result.push_str("For each story:\n");
    result.push_str("1) Summarize in 2-3 sentences.\n");
    result.push_str("2) Identify the underlying ideology or moral theme.\n");
    result.push_str("3) Provide a specific Bible scripture (reference and text) that speaks to it.\n");
    result.push_str("4) Briefly explain why it applies.\n\n");
    result.push_str("Return ONLY valid JSON array of objects with:\n");
    result.push_str("\"title\",\"summary\",\"ideology\",\"scripture_ref\",\"scripture_text\",\"application\".\n");
    result
}

pub fn extract_array(text: &str) -> Result<&str, ParseError> {
    ARRAY_PATTERN
        .find(text)
        .map(|m| m.as_str())
        .ok_or(ParseError::NoArray)
}

/// Pulls the story array out of free-form model output and checks every record.
///
/// One bad record rejects the whole answer: ids are positional, so dropping a
/// record would renumber the rest. All violations are reported together.
pub fn parse_stories(text: &str) -> Result<Vec<RawStory>, ParseError> {
    let candidate = extract_array(text)?;

    let value: Value =
        serde_json::from_str(candidate).map_err(|e| ParseError::InvalidJson(e.to_string()))?;

    let Value::Array(records) = value else {
        return Err(ParseError::InvalidJson("expected a JSON array".to_string()));
    };

    let mut stories = Vec::with_capacity(records.len());
    let mut violations = Vec::new();

    for (index, record) in records.iter().enumerate() {
        match decode_record(record) {
            Ok(story) => stories.push(story),
            Err((missing, malformed)) => violations.push(RecordViolation {
                index,
                missing,
                malformed,
            }),
        }
    }

    if !violations.is_empty() {
        return Err(ParseError::InvalidRecords(violations));
    }

    Ok(stories)
}

type FieldErrors = (Vec<&'static str>, Vec<&'static str>);

fn decode_record(record: &Value) -> Result<RawStory, FieldErrors> {
    let Some(object) = record.as_object() else {
        return Err((Vec::new(), STORY_FIELDS.to_vec()));
    };

    let mut missing = Vec::new();
    let mut malformed = Vec::new();
    let mut values: Vec<String> = Vec::with_capacity(STORY_FIELDS.len());

    for field in STORY_FIELDS {
        match object.get(field) {
            None | Some(Value::Null) => missing.push(field),
            Some(Value::String(s)) => values.push(s.clone()),
            Some(_) => malformed.push(field),
        }
    }

    if !missing.is_empty() || !malformed.is_empty() {
        return Err((missing, malformed));
    }

    let mut values = values.into_iter();
    let mut next = || values.next().unwrap_or_default();

    Ok(RawStory {
        title: next(),
        summary: next(),
        ideology: next(),
        scripture_ref: next(),
        scripture_text: next(),
        application: next(),
    })
}

/// Turns decoded records into stories for `continent`.
///
/// With `sources` empty every `source_url` stays unset. Otherwise each story
/// takes the source at its own position, falling back to the first one.
pub fn shape_stories(
    continent: Continent,
    raw: Vec<RawStory>,
    sources: &[GroundingSource],
) -> Vec<Story> {
    raw.into_iter()
        .enumerate()
        .map(|(index, record)| {
            let mut story = record.into_story(continent, index);
            story.source_url = sources
                .get(index)
                .or_else(|| sources.first())
                .map(|source| source.uri.clone());
            story
        })
        .collect()
}
