use anyhow::{bail, ensure, Context, Result};

use pocket_classroom::capsules::score_quiz;

use crate::app::{resolve_flashcard, App};
use crate::render::terminal::{paint, progress_bar, Color};
use crate::OutputFormat;

pub fn run_progress(app: &App, query: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let capsule = app.find_capsule(query)?;
    let progress = app.store.get_progress(&capsule.id)?;
    let known = progress.known_count(&capsule);
    let completion = progress.flashcard_completion(&capsule);

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "id": capsule.id,
                "knownFlashcards": known,
                "totalFlashcards": capsule.flashcards.len(),
                "completion": completion,
                "bestQuizScore": progress.best_quiz_score,
                "totalQuestions": capsule.quiz.len(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("{}", paint(&capsule.title, Color::BOLD, use_color));
            println!(
                "Flashcards {} {} / {} known",
                progress_bar(completion, 20),
                known,
                capsule.flashcards.len()
            );
            if progress.best_quiz_score > 0 {
                println!(
                    "Best quiz score {}",
                    paint(
                        &format!("{}/{}", progress.best_quiz_score, capsule.quiz.len()),
                        Color::YELLOW,
                        use_color
                    )
                );
            } else {
                println!("Quiz not taken yet");
            }
        }
    }
    Ok(())
}

pub fn run_known(app: &mut App, query: &str, card: &str, known: bool) -> Result<()> {
    let capsule = app.find_capsule(query)?;
    let card = resolve_flashcard(&capsule, card)?;

    let mut progress = app.store.get_progress(&capsule.id)?;
    if known {
        progress.mark_known(&card.id);
    } else {
        progress.mark_unknown(&card.id);
    }
    app.store
        .save_progress(&capsule.id, &progress)
        .context("Failed to save progress")?;

    println!(
        "'{}' marked {} ({} / {} known)",
        card.front,
        if known { "known" } else { "unknown" },
        progress.known_count(&capsule),
        capsule.flashcards.len()
    );
    Ok(())
}

/// Parse "a".."d" into an option index; "-" skips the question
fn parse_answer(answer: &str) -> Result<Option<usize>> {
    match answer.trim().to_lowercase().as_str() {
        "-" => Ok(None),
        "a" => Ok(Some(0)),
        "b" => Ok(Some(1)),
        "c" => Ok(Some(2)),
        "d" => Ok(Some(3)),
        other => bail!("Answer '{}' must be one of a, b, c, d or -", other),
    }
}

pub fn run_quiz(app: &mut App, query: &str, answers: &[String], format: &OutputFormat, use_color: bool) -> Result<()> {
    let capsule = app.find_capsule(query)?;
    ensure!(!capsule.quiz.is_empty(), "'{}' has no quiz questions", capsule.title);
    ensure!(
        answers.len() <= capsule.quiz.len(),
        "Got {} answers for {} questions",
        answers.len(),
        capsule.quiz.len()
    );

    let answers = answers
        .iter()
        .map(|a| parse_answer(a))
        .collect::<Result<Vec<_>>>()?;
    let result = score_quiz(&capsule.quiz, &answers);

    let mut progress = app.store.get_progress(&capsule.id)?;
    let previous_best = progress.best_quiz_score;
    let new_best = progress.record_quiz_score(result.score);
    if new_best {
        app.store
            .save_progress(&capsule.id, &progress)
            .context("Failed to save progress")?;
    }

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "result": result,
                "bestQuizScore": progress.best_quiz_score,
                "newBest": new_best,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            for (i, question) in capsule.quiz.iter().enumerate() {
                let picked = answers.get(i).copied().flatten();
                let correct = matches!(picked, Some(a) if question.is_correct(a));
                let mark = if correct {
                    paint("✓", Color::GREEN, use_color)
                } else {
                    paint("✗", Color::YELLOW, use_color)
                };
                println!("{} {}. {}", mark, i + 1, question.question);
                if !correct {
                    println!("     answer: {}", question.correct_option().unwrap_or("?"));
                }
            }
            println!(
                "\n{}/{} ({}%) {}",
                result.score,
                result.total,
                result.percentage,
                paint(result.grade.message(), Color::BOLD, use_color)
            );
            if previous_best > 0 && !new_best {
                println!("Best score: {}/{}", previous_best, result.total);
            } else if new_best {
                println!("New best score!");
            }
        }
    }
    Ok(())
}

pub fn run_reset(app: &mut App, query: &str) -> Result<()> {
    let capsule = app.find_capsule(query)?;
    let mut progress = app.store.get_progress(&capsule.id)?;
    progress.reset_flashcards();
    app.store
        .save_progress(&capsule.id, &progress)
        .context("Failed to save progress")?;
    println!("Flashcard progress reset for '{}'", capsule.title);
    Ok(())
}
