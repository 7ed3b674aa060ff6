use anyhow::{Context, Result};

use pocket_classroom::capsules::authoring::prepare_for_save;
use pocket_classroom::{Capsule, Flashcard, QuizQuestion};

use crate::app::{resolve_flashcard, resolve_question, App};
use crate::OutputFormat;

fn save(app: &mut App, capsule: &Capsule) -> Result<()> {
    let capsule = prepare_for_save(capsule)?;
    app.store.save_capsule(&capsule).context("Failed to save capsule")
}

pub fn run_add_card(app: &mut App, query: &str, front: String, back: String, format: &OutputFormat) -> Result<()> {
    let mut capsule = app.find_capsule(query)?;
    let card = Flashcard::new(front, back);
    let id = capsule.add_flashcard(card.clone());
    save(app, &capsule)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&card)?),
        OutputFormat::Plain => println!("Added flashcard {} to '{}'", id, capsule.title),
    }
    Ok(())
}

pub fn run_remove_card(app: &mut App, query: &str, card: &str) -> Result<()> {
    let mut capsule = app.find_capsule(query)?;
    let id = resolve_flashcard(&capsule, card)?.id.clone();
    capsule.remove_flashcard(&id);
    save(app, &capsule)?;
    println!("Removed flashcard {} from '{}'", id, capsule.title);
    Ok(())
}

pub fn run_add_question(
    app: &mut App,
    query: &str,
    question: String,
    options: Vec<String>,
    answer: usize,
    format: &OutputFormat,
) -> Result<()> {
    let options: [String; 4] = options
        .try_into()
        .map_err(|given: Vec<String>| anyhow::anyhow!("Expected 4 options, got {}", given.len()))?;

    let mut capsule = app.find_capsule(query)?;
    let question = QuizQuestion::new(question, options, answer);
    let id = capsule.add_question(question.clone());
    save(app, &capsule)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&question)?),
        OutputFormat::Plain => println!("Added question {} to '{}'", id, capsule.title),
    }
    Ok(())
}

pub fn run_remove_question(app: &mut App, query: &str, question: &str) -> Result<()> {
    let mut capsule = app.find_capsule(query)?;
    let id = resolve_question(&capsule, question)?.id.clone();
    capsule.remove_question(&id);
    save(app, &capsule)?;
    println!("Removed question {} from '{}'", id, capsule.title);
    Ok(())
}
