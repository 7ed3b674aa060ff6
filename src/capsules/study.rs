//! Progress tracking and quiz scoring for study sessions

use serde::Serialize;

use super::models::{Capsule, CapsuleProgress, QuizQuestion};

/// Percentage at or above which a quiz result counts as good
const GOOD_SCORE_PERCENT: u32 = 70;

impl CapsuleProgress {
    pub fn mark_known(&mut self, flashcard_id: &str) {
        self.known_flashcards.insert(flashcard_id.to_string());
    }

    pub fn mark_unknown(&mut self, flashcard_id: &str) {
        self.known_flashcards.remove(flashcard_id);
    }

    pub fn is_known(&self, flashcard_id: &str) -> bool {
        self.known_flashcards.contains(flashcard_id)
    }

    /// Forget all known flashcards; the best quiz score is kept
    pub fn reset_flashcards(&mut self) {
        self.known_flashcards.clear();
    }

    /// Keep `score` if it beats the stored best. Returns whether it did.
    pub fn record_quiz_score(&mut self, score: u32) -> bool {
        if score > self.best_quiz_score {
            self.best_quiz_score = score;
            true
        } else {
            false
        }
    }

    /// Known cards that still exist in `capsule`
    pub fn known_count(&self, capsule: &Capsule) -> usize {
        capsule
            .flashcards
            .iter()
            .filter(|card| self.known_flashcards.contains(&card.id))
            .count()
    }

    pub fn flashcard_completion(&self, capsule: &Capsule) -> f64 {
        if capsule.flashcards.is_empty() {
            return 0.0;
        }
        self.known_count(capsule) as f64 / capsule.flashcards.len() as f64 * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum QuizGrade {
    Perfect,
    Good,
    KeepPracticing,
}

impl QuizGrade {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Perfect => "Perfect score! Outstanding work!",
            Self::Good => "Great job!",
            Self::KeepPracticing => "Keep practicing!",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub score: u32,
    pub total: u32,
    /// Rounded to the nearest whole percent
    pub percentage: u32,
    pub grade: QuizGrade,
}

/// Score one sitting of a quiz. `answers[i]` is the option picked for
/// `questions[i]`; missing or `None` answers count as wrong.
pub fn score_quiz(questions: &[QuizQuestion], answers: &[Option<usize>]) -> QuizResult {
    let score = questions
        .iter()
        .enumerate()
        .filter(|(i, q)| matches!(answers.get(*i), Some(Some(a)) if q.is_correct(*a)))
        .count() as u32;
    let total = questions.len() as u32;

    let percentage = if total == 0 {
        0
    } else {
        (score as f64 / total as f64 * 100.0).round() as u32
    };

    let grade = if total > 0 && score == total {
        QuizGrade::Perfect
    } else if percentage >= GOOD_SCORE_PERCENT {
        QuizGrade::Good
    } else {
        QuizGrade::KeepPracticing
    };

    QuizResult {
        score,
        total,
        percentage,
        grade,
    }
}
