use anyhow::{Context, Result};

use crate::app::App;

pub fn run(app: &mut App, query: &str) -> Result<()> {
    let capsule = app.find_capsule(query)?;
    app.store
        .delete_capsule(&capsule.id)
        .context("Failed to delete capsule")?;
    println!("Deleted '{}'", capsule.title);
    Ok(())
}
