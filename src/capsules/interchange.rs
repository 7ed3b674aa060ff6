//! Capsule export/import in the versioned interchange format
//!
//! An interchange document is the capsule's JSON object with a `schema`
//! tag added at the top level:
//! ```json
//! { "schema": "pocket-classroom/v1", "id": "...", "title": "...", ... }
//! ```
//!
//! Import is strict about the schema tag and the identity fields and
//! lenient about everything else: missing optional fields take defaults.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::models::{Capsule, QUIZ_OPTION_COUNT};

pub const SCHEMA_VERSION: &str = "pocket-classroom/v1";

const SCHEMA_FIELD: &str = "schema";

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Document is not a JSON object")]
    NotAnObject,

    #[error("Missing schema tag")]
    SchemaMissing,

    #[error("Invalid schema version: {found}")]
    SchemaMismatch { found: String },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Malformed capsule: {0}")]
    Shape(#[source] serde_json::Error),

    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ImportError>;

#[derive(Serialize)]
struct InterchangeDocument<'a> {
    schema: &'static str,
    #[serde(flatten)]
    capsule: &'a Capsule,
}

/// Serialize a capsule as a pretty-printed interchange document
pub fn export_capsule(capsule: &Capsule) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&InterchangeDocument {
        schema: SCHEMA_VERSION,
        capsule,
    })
}

/// Parse an interchange document back into a capsule.
///
/// Validation runs in stages and stops at the first failure; see
/// [`ImportError`] for the possible reasons.
pub fn import_capsule(text: &str) -> Result<Capsule> {
    let result = parse_document(text).and_then(|mut doc| {
        check_schema(&doc)?;
        check_identity(&doc)?;
        doc.remove(SCHEMA_FIELD);
        let capsule = decode_capsule(doc)?;
        check_fields(&capsule)?;
        Ok(capsule)
    });

    match &result {
        Ok(capsule) => log::info!("Imported capsule {} ({})", capsule.id, capsule.title),
        Err(e) => log::warn!("Import failed: {}", e),
    }
    result
}

pub fn parse_document(text: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str(text).map_err(ImportError::Parse)? {
        Value::Object(map) => Ok(map),
        _ => Err(ImportError::NotAnObject),
    }
}

pub fn check_schema(doc: &Map<String, Value>) -> Result<()> {
    match doc.get(SCHEMA_FIELD) {
        None | Some(Value::Null) => Err(ImportError::SchemaMissing),
        Some(Value::String(s)) if s == SCHEMA_VERSION => Ok(()),
        Some(Value::String(s)) => Err(ImportError::SchemaMismatch { found: s.clone() }),
        Some(other) => Err(ImportError::SchemaMismatch {
            found: other.to_string(),
        }),
    }
}

/// `id` and `title` must be present as non-empty strings
pub fn check_identity(doc: &Map<String, Value>) -> Result<()> {
    for field in ["id", "title"] {
        match doc.get(field) {
            Some(Value::String(s)) if !s.is_empty() => {}
            _ => return Err(ImportError::MissingField(field)),
        }
    }
    Ok(())
}

pub fn decode_capsule(doc: Map<String, Value>) -> Result<Capsule> {
    serde_json::from_value(Value::Object(doc)).map_err(ImportError::Shape)
}

pub fn check_fields(capsule: &Capsule) -> Result<()> {
    for (i, question) in capsule.quiz.iter().enumerate() {
        if question.correct_answer >= QUIZ_OPTION_COUNT {
            return Err(ImportError::InvalidField {
                field: format!("quiz[{}].correctAnswer", i),
                reason: format!(
                    "{} is not an option index (0-{})",
                    question.correct_answer,
                    QUIZ_OPTION_COUNT - 1
                ),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capsules::models::{Flashcard, QuizQuestion};

    fn demo_capsule() -> Capsule {
        Capsule {
            id: "a1".to_string(),
            title: "Demo".to_string(),
            subject: "Math".to_string(),
            level: "Beginner".to_string(),
            description: "Small demo".to_string(),
            notes: "Line one\nLine two".to_string(),
            flashcards: vec![
                Flashcard {
                    id: "f1".to_string(),
                    front: "Q".to_string(),
                    back: "A".to_string(),
                },
                Flashcard {
                    id: "f2".to_string(),
                    front: "".to_string(),
                    back: "blank front".to_string(),
                },
            ],
            quiz: vec![QuizQuestion {
                id: "q1".to_string(),
                question: "2 + 2?".to_string(),
                options: ["3".into(), "4".into(), "5".into(), "22".into()],
                correct_answer: 1,
            }],
            created_at: 1_700_000_000_000,
            updated_at: 1_700_000_123_456,
        }
    }

    #[test]
    fn test_export_then_import_is_identity() {
        let capsule = demo_capsule();
        let text = export_capsule(&capsule).unwrap();
        assert_eq!(import_capsule(&text).unwrap(), capsule);
    }

    #[test]
    fn test_export_is_flat_and_tagged() {
        let text = export_capsule(&demo_capsule()).unwrap();
        assert!(text.starts_with("{\n  \"schema\": \"pocket-classroom/v1\""));

        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["schema"], SCHEMA_VERSION);
        assert_eq!(value["id"], "a1");
        assert_eq!(value["flashcards"][1]["id"], "f2");
        assert_eq!(value["createdAt"], 1_700_000_000_000i64);
        assert!(value.get("capsule").is_none());
    }

    #[test]
    fn test_scenario_minimal_capsule() {
        let capsule = Capsule {
            id: "a1".to_string(),
            title: "Demo".to_string(),
            flashcards: vec![Flashcard {
                id: "f1".to_string(),
                front: "Q".to_string(),
                back: "A".to_string(),
            }],
            ..Default::default()
        };
        let imported = import_capsule(&export_capsule(&capsule).unwrap()).unwrap();
        assert_eq!(imported, capsule);
    }

    #[test]
    fn test_rejects_other_schemas() {
        for schema in ["pocket-classroom/v2", "pocket-classroom/v0", "", "POCKET-CLASSROOM/V1"] {
            let text = format!(r#"{{"schema":"{}","id":"a1","title":"Demo"}}"#, schema);
            assert!(matches!(
                import_capsule(&text),
                Err(ImportError::SchemaMismatch { .. })
            ));
        }

        let numeric = r#"{"schema":1,"id":"a1","title":"Demo"}"#;
        assert!(matches!(
            import_capsule(numeric),
            Err(ImportError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_rejects_missing_schema() {
        let text = r#"{"id":"a1","title":"Demo"}"#;
        assert!(matches!(import_capsule(text), Err(ImportError::SchemaMissing)));

        let null_schema = r#"{"schema":null,"id":"a1","title":"Demo"}"#;
        assert!(matches!(import_capsule(null_schema), Err(ImportError::SchemaMissing)));
    }

    #[test]
    fn test_rejects_unparseable_text() {
        assert!(matches!(import_capsule("not json"), Err(ImportError::Parse(_))));
        assert!(matches!(import_capsule("[1, 2]"), Err(ImportError::NotAnObject)));
        assert!(matches!(import_capsule("\"pocket-classroom/v1\""), Err(ImportError::NotAnObject)));
    }

    #[test]
    fn test_rejects_missing_identity() {
        let no_id = r#"{"schema":"pocket-classroom/v1","title":"Demo"}"#;
        assert!(matches!(import_capsule(no_id), Err(ImportError::MissingField("id"))));

        let empty_title = r#"{"schema":"pocket-classroom/v1","id":"a1","title":""}"#;
        assert!(matches!(import_capsule(empty_title), Err(ImportError::MissingField("title"))));

        let numeric_id = r#"{"schema":"pocket-classroom/v1","id":7,"title":"Demo"}"#;
        assert!(matches!(import_capsule(numeric_id), Err(ImportError::MissingField("id"))));
    }

    #[test]
    fn test_lenient_about_missing_optional_fields() {
        let text = r#"{
            "schema": "pocket-classroom/v1",
            "id": "a1",
            "title": "Sparse",
            "flashcards": [{ "id": "f1", "front": "Q" }],
            "quiz": [{ "id": "q1", "question": "?" }],
            "somethingElse": true
        }"#;
        let capsule = import_capsule(text).unwrap();
        assert_eq!(capsule.subject, "");
        assert_eq!(capsule.flashcards[0].back, "");
        assert_eq!(capsule.quiz[0].options, <[String; 4]>::default());
        assert_eq!(capsule.quiz[0].correct_answer, 0);
        assert_eq!(capsule.created_at, 0);
    }

    #[test]
    fn test_null_optional_fields_pass_through() {
        let text = r#"{
            "schema": "pocket-classroom/v1",
            "id": "a1",
            "title": "Nulls",
            "subject": null,
            "notes": null,
            "flashcards": null,
            "quiz": null,
            "createdAt": null,
            "updatedAt": null
        }"#;
        let capsule = import_capsule(text).unwrap();
        assert_eq!(capsule.id, "a1");
        assert_eq!(capsule.subject, "");
        assert_eq!(capsule.notes, "");
        assert!(capsule.flashcards.is_empty());
        assert!(capsule.quiz.is_empty());
        assert_eq!(capsule.created_at, 0);

        let null_title = r#"{"schema":"pocket-classroom/v1","id":"a1","title":null}"#;
        assert!(matches!(import_capsule(null_title), Err(ImportError::MissingField("title"))));
    }

    #[test]
    fn test_rejects_wrong_types() {
        let text = r#"{"schema":"pocket-classroom/v1","id":"a1","title":"Demo","flashcards":"none"}"#;
        assert!(matches!(import_capsule(text), Err(ImportError::Shape(_))));

        let three_options = r#"{"schema":"pocket-classroom/v1","id":"a1","title":"Demo",
            "quiz":[{"id":"q1","question":"?","options":["a","b","c"],"correctAnswer":0}]}"#;
        assert!(matches!(import_capsule(three_options), Err(ImportError::Shape(_))));
    }

    #[test]
    fn test_rejects_out_of_range_answer() {
        let text = r#"{"schema":"pocket-classroom/v1","id":"a1","title":"Demo",
            "quiz":[{"id":"q1","question":"?","options":["a","b","c","d"],"correctAnswer":4}]}"#;
        match import_capsule(text) {
            Err(ImportError::InvalidField { field, .. }) => assert_eq!(field, "quiz[0].correctAnswer"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_stages_are_independent() {
        let doc = parse_document(r#"{"schema":"pocket-classroom/v1","title":"x"}"#).unwrap();
        assert!(check_schema(&doc).is_ok());
        assert!(check_identity(&doc).is_err());

        let doc = parse_document(r#"{"id":"a","title":"x"}"#).unwrap();
        assert!(check_schema(&doc).is_err());
        assert!(check_identity(&doc).is_ok());
    }
}
