//! Pocket Classroom: local storage, study progress and sharing for
//! learning capsules (notes, flashcards and quizzes)

pub mod capsules;
pub mod config;
pub mod kv;

pub use capsules::{Capsule, CapsuleProgress, CapsuleStore, Flashcard, QuizQuestion};
pub use config::Config;
