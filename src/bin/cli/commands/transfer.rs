use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use pocket_classroom::capsules::library::{export_file_name, sample_capsule};
use pocket_classroom::capsules::{export_capsule, import_capsule};
use pocket_classroom::Capsule;

use crate::app::App;
use crate::OutputFormat;

pub fn run_export(app: &App, query: &str, out: Option<&Path>) -> Result<()> {
    let capsule = app.find_capsule(query)?;
    let document = export_capsule(&capsule)?;

    match out {
        None => println!("{}", document),
        Some(path) => {
            let path = if path.is_dir() {
                path.join(export_file_name(&capsule))
            } else {
                path.to_path_buf()
            };
            fs::write(&path, document).with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Exported '{}' to {}", capsule.title, path.display());
        }
    }
    Ok(())
}

pub fn run_import(app: &mut App, file: &Path, format: &OutputFormat) -> Result<()> {
    let text = if file == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?
    };

    let capsule = import_capsule(&text).context("Failed to import capsule. Please check the file format.")?;
    store(app, &capsule, format)
}

pub fn run_sample(app: &mut App, format: &OutputFormat) -> Result<()> {
    let capsule = sample_capsule().context("Bundled sample capsule is invalid")?;
    store(app, &capsule, format)
}

fn store(app: &mut App, capsule: &Capsule, format: &OutputFormat) -> Result<()> {
    let replaced = app.store.contains(&capsule.id)?;
    app.store.save_capsule(capsule).context("Failed to save capsule")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(capsule)?),
        OutputFormat::Plain => {
            let verb = if replaced { "Replaced" } else { "Imported" };
            println!("{} '{}' ({})", verb, capsule.title, capsule.id);
        }
    }
    Ok(())
}
