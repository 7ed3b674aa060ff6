//! Data models for capsules and their study progress

use std::collections::BTreeSet;

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Number of answer options every quiz question carries
pub const QUIZ_OPTION_COUNT: usize = 4;

/// Milliseconds since the Unix epoch
pub type Timestamp = i64;

pub fn now_millis() -> Timestamp {
    Utc::now().timestamp_millis()
}

/// Decode `null` the same way as an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// A two-sided card, question on the front and answer on the back
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Flashcard {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub front: String,
    #[serde(deserialize_with = "null_as_default")]
    pub back: String,
}

impl Flashcard {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            front: front.into(),
            back: back.into(),
        }
    }
}

/// A multiple-choice question with exactly four options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuizQuestion {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub question: String,
    #[serde(deserialize_with = "null_as_default")]
    pub options: [String; QUIZ_OPTION_COUNT],
    /// Index into `options`
    #[serde(deserialize_with = "null_as_default")]
    pub correct_answer: usize,
}

impl QuizQuestion {
    pub fn new(
        question: impl Into<String>,
        options: [String; QUIZ_OPTION_COUNT],
        correct_answer: usize,
    ) -> Self {
        Self {
            id: new_id(),
            question: question.into(),
            options,
            correct_answer,
        }
    }

    pub fn is_correct(&self, answer: usize) -> bool {
        answer == self.correct_answer
    }

    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.correct_answer).map(String::as_str)
    }
}

/// A titled bundle of study content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Capsule {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub subject: String,
    #[serde(deserialize_with = "null_as_default")]
    pub level: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub notes: String,
    #[serde(deserialize_with = "null_as_default")]
    pub flashcards: Vec<Flashcard>,
    #[serde(deserialize_with = "null_as_default")]
    pub quiz: Vec<QuizQuestion>,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: Timestamp,
    #[serde(deserialize_with = "null_as_default")]
    pub updated_at: Timestamp,
}

impl Capsule {
    pub fn new(title: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            id: new_id(),
            title: title.into(),
            created_at: now,
            updated_at: now,
            ..Default::default()
        }
    }

    /// Notes, flashcards or quiz questions present
    pub fn has_content(&self) -> bool {
        !self.notes.is_empty() || !self.flashcards.is_empty() || !self.quiz.is_empty()
    }
}

/// Per-capsule study state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CapsuleProgress {
    /// Ids of flashcards marked as known; may hold ids of cards since deleted
    #[serde(deserialize_with = "null_as_default")]
    pub known_flashcards: BTreeSet<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub best_quiz_score: u32,
}
