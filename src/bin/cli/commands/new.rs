use std::io::Read;

use anyhow::{bail, Context, Result};

use pocket_classroom::capsules::authoring::prepare_for_save;
use pocket_classroom::{Capsule, Flashcard};

use crate::app::App;
use crate::OutputFormat;

pub struct NewCapsule {
    pub title: String,
    pub subject: String,
    pub level: String,
    pub description: String,
    pub notes: Option<String>,
    pub cards: Vec<String>,
}

/// Resolve "-" as stdin
pub fn resolve_notes(notes: Option<String>) -> Result<Option<String>> {
    match notes.as_deref() {
        Some("-") => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read notes from stdin")?;
            Ok(Some(buf))
        }
        _ => Ok(notes),
    }
}

/// Split "front::back"
fn parse_card(arg: &str) -> Result<Flashcard> {
    match arg.split_once("::") {
        Some((front, back)) => Ok(Flashcard::new(front.trim(), back.trim())),
        None => bail!("Flashcard '{}' must look like \"front::back\"", arg),
    }
}

pub fn run(app: &mut App, new: NewCapsule, format: &OutputFormat) -> Result<()> {
    let mut capsule = Capsule::new(new.title);
    capsule.subject = new.subject;
    capsule.level = new.level;
    capsule.description = new.description;
    capsule.notes = new.notes.unwrap_or_default();
    for arg in &new.cards {
        capsule.add_flashcard(parse_card(arg)?);
    }

    let capsule = prepare_for_save(&capsule)?;
    app.store.save_capsule(&capsule).context("Failed to save capsule")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&capsule)?),
        OutputFormat::Plain => println!("Created '{}' ({})", capsule.title, capsule.id),
    }
    Ok(())
}
