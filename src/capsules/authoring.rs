//! Save-time rules applied by the authoring workflow
//!
//! The store accepts any capsule; these checks run before a capsule
//! written by the user is handed to it.

use thiserror::Error;

use super::models::{now_millis, Capsule, Flashcard, QuizQuestion, Timestamp};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthoringError {
    #[error("Please enter a title for your capsule")]
    MissingTitle,

    #[error("Please add at least one type of content (notes, flashcards, or quiz)")]
    NoContent,
}

/// Validate a capsule for saving and stamp its `updated_at`
pub fn prepare_for_save(capsule: &Capsule) -> Result<Capsule, AuthoringError> {
    prepare_for_save_at(capsule, now_millis())
}

pub fn prepare_for_save_at(capsule: &Capsule, now: Timestamp) -> Result<Capsule, AuthoringError> {
    validate(capsule)?;
    let mut prepared = capsule.clone();
    prepared.updated_at = now;
    Ok(prepared)
}

pub fn validate(capsule: &Capsule) -> Result<(), AuthoringError> {
    if capsule.title.trim().is_empty() {
        return Err(AuthoringError::MissingTitle);
    }
    if !capsule.has_content() {
        return Err(AuthoringError::NoContent);
    }
    Ok(())
}

impl Capsule {
    /// Append a flashcard, returning its id
    pub fn add_flashcard(&mut self, card: Flashcard) -> String {
        let id = card.id.clone();
        self.flashcards.push(card);
        id
    }

    pub fn remove_flashcard(&mut self, id: &str) -> Option<Flashcard> {
        let pos = self.flashcards.iter().position(|c| c.id == id)?;
        Some(self.flashcards.remove(pos))
    }

    /// Append a quiz question, returning its id
    pub fn add_question(&mut self, question: QuizQuestion) -> String {
        let id = question.id.clone();
        self.quiz.push(question);
        id
    }

    pub fn remove_question(&mut self, id: &str) -> Option<QuizQuestion> {
        let pos = self.quiz.iter().position(|q| q.id == id)?;
        Some(self.quiz.remove(pos))
    }
}
