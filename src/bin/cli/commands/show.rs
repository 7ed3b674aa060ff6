use anyhow::Result;

use crate::app::App;
use crate::render::terminal::{format_timestamp, paint, short_id, Color};
use crate::OutputFormat;

pub fn run(app: &App, query: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let capsule = app.find_capsule(query)?;
    let progress = app.store.get_progress(&capsule.id)?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "capsule": capsule,
                "progress": progress,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("{}", paint(&capsule.title, Color::BOLD, use_color));
            let meta: Vec<&str> = [capsule.subject.as_str(), capsule.level.as_str()]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect();
            if !meta.is_empty() {
                println!("{}", meta.join(" • "));
            }
            println!(
                "{}",
                paint(
                    &format!(
                        "id {}  created {}  updated {}",
                        capsule.id,
                        format_timestamp(capsule.created_at),
                        format_timestamp(capsule.updated_at)
                    ),
                    Color::DIM,
                    use_color
                )
            );
            if !capsule.description.is_empty() {
                println!("\n{}", capsule.description);
            }

            if !capsule.notes.is_empty() {
                println!("\n{}", paint("## Notes", Color::CYAN, use_color));
                println!("{}", capsule.notes);
            }

            if !capsule.flashcards.is_empty() {
                println!("\n{}", paint("## Flashcards", Color::CYAN, use_color));
                for card in &capsule.flashcards {
                    let mark = if progress.is_known(&card.id) {
                        paint("✓", Color::GREEN, use_color)
                    } else {
                        " ".to_string()
                    };
                    println!("{} {}  {} → {}", mark, short_id(&card.id), card.front, card.back);
                }
            }

            if !capsule.quiz.is_empty() {
                println!("\n{}", paint("## Quiz", Color::CYAN, use_color));
                for (i, question) in capsule.quiz.iter().enumerate() {
                    println!("{}. {}", i + 1, question.question);
                    for (j, option) in question.options.iter().enumerate() {
                        let line = format!("   {}) {}", (b'a' + j as u8) as char, option);
                        if question.is_correct(j) {
                            println!("{}", paint(&line, Color::GREEN, use_color));
                        } else {
                            println!("{}", line);
                        }
                    }
                }
            }
        }
    }

    Ok(())
}
