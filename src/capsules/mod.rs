//! Learning capsules for Pocket Classroom
//!
//! This module provides:
//! - Capsule, flashcard and quiz models
//! - Persistence of capsules and study progress over a key-value store
//! - Versioned export/import
//! - Authoring rules, study progress and quiz scoring

pub mod authoring;
pub mod interchange;
pub mod library;
pub mod models;
pub mod storage;
pub mod study;

pub use authoring::AuthoringError;
pub use interchange::{export_capsule, import_capsule, ImportError, SCHEMA_VERSION};
pub use models::*;
pub use storage::{CapsuleStore, StoreError};
pub use study::{score_quiz, QuizGrade, QuizResult};
