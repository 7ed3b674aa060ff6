//! Helpers for presenting the capsule library

use serde::Serialize;

use super::interchange::{self, ImportError};
use super::models::Capsule;

const SAMPLE_CAPSULE: &str = include_str!("sample-capsule.json");

/// Newest `updated_at` first
pub fn sort_by_recency(capsules: &mut [Capsule]) {
    capsules.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

/// File name for a downloaded export: lowercased title with whitespace runs
/// replaced by `-`
pub fn export_file_name(capsule: &Capsule) -> String {
    let slug = capsule
        .title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();
    let stem = if slug.is_empty() { capsule.id.as_str() } else { slug.as_str() };
    format!("{}.json", stem)
}

/// The bundled sample capsule, decoded through the regular import path
pub fn sample_capsule() -> Result<Capsule, ImportError> {
    interchange::import_capsule(SAMPLE_CAPSULE)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapsuleSummary {
    pub flashcards: usize,
    pub questions: usize,
    pub has_notes: bool,
}

pub fn summary(capsule: &Capsule) -> CapsuleSummary {
    CapsuleSummary {
        flashcards: capsule.flashcards.len(),
        questions: capsule.quiz.len(),
        has_notes: !capsule.notes.trim().is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_by_recency() {
        let mut capsules: Vec<Capsule> = [("old", 1), ("new", 3), ("mid", 2)]
            .into_iter()
            .map(|(id, updated_at)| Capsule {
                id: id.to_string(),
                updated_at,
                ..Default::default()
            })
            .collect();

        sort_by_recency(&mut capsules);
        let ids: Vec<&str> = capsules.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_export_file_name() {
        let mut capsule = Capsule::new("Intro to  React\tHooks");
        assert_eq!(export_file_name(&capsule), "intro-to-react-hooks.json");

        capsule.title = "   ".to_string();
        assert_eq!(export_file_name(&capsule), format!("{}.json", capsule.id));
    }

    #[test]
    fn test_sample_capsule_imports() {
        let capsule = sample_capsule().unwrap();
        assert_eq!(capsule.title, "The Solar System");
        assert_eq!(capsule.flashcards.len(), 3);
        assert_eq!(capsule.quiz.len(), 2);
        assert_eq!(capsule.quiz[1].correct_option(), Some("Neptune"));

        let counts = summary(&capsule);
        assert_eq!(
            counts,
            CapsuleSummary {
                flashcards: 3,
                questions: 2,
                has_notes: true
            }
        );
    }
}
