use anyhow::{Context, Result};

use pocket_classroom::capsules::library::{sort_by_recency, summary};

use crate::app::App;
use crate::render::terminal::{format_timestamp, paint, short_id, Color};
use crate::OutputFormat;

pub fn run(app: &App, recent: bool, format: &OutputFormat, use_color: bool) -> Result<()> {
    let mut capsules = app.store.list_capsules().context("Failed to list capsules")?;
    if recent {
        sort_by_recency(&mut capsules);
    }

    match format {
        OutputFormat::Json => {
            let mut output = Vec::new();
            for capsule in &capsules {
                let progress = app.store.get_progress(&capsule.id)?;
                output.push(serde_json::json!({
                    "id": capsule.id,
                    "title": capsule.title,
                    "subject": capsule.subject,
                    "level": capsule.level,
                    "updatedAt": capsule.updated_at,
                    "summary": summary(capsule),
                    "knownFlashcards": progress.known_count(capsule),
                    "bestQuizScore": progress.best_quiz_score,
                }));
            }
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if capsules.is_empty() {
                println!("No capsules yet. Create one with `new` or try `sample`.");
                return Ok(());
            }
            for capsule in &capsules {
                let counts = summary(capsule);
                println!(
                    "{} {}  {}",
                    paint(&short_id(&capsule.id), Color::DIM, use_color),
                    paint(&capsule.title, Color::BOLD, use_color),
                    format_timestamp(capsule.updated_at),
                );
                println!(
                    "    {} cards, {} questions{}",
                    counts.flashcards,
                    counts.questions,
                    if counts.has_notes { ", notes" } else { "" }
                );
            }
        }
    }

    Ok(())
}
