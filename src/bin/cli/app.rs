use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use pocket_classroom::kv::FileStore;
use pocket_classroom::{Capsule, CapsuleStore, Config, Flashcard, QuizQuestion};

/// Shared application state for CLI commands
pub struct App {
    pub store: CapsuleStore<FileStore>,
}

impl App {
    /// Open the store described by the config file, with `data_dir` taking precedence
    pub fn new(config_path: Option<PathBuf>, data_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = match config_path.or_else(Config::default_path) {
            Some(path) => Config::load(&path).context("Failed to load configuration")?,
            None => Config::default(),
        };
        if data_dir.is_some() {
            config.data_dir = data_dir;
        }

        let store = config.open_store().context("Failed to open capsule storage")?;
        if !store.storage_available() {
            log::warn!("Running without storage; changes will not be kept");
        }
        Ok(Self { store })
    }

    /// Find a capsule by id, id prefix, or title (case-insensitive prefix match)
    pub fn find_capsule(&self, query: &str) -> Result<Capsule> {
        if let Some(capsule) = self.store.get_capsule(query).context("Failed to read capsule")? {
            return Ok(capsule);
        }

        let capsules = self.store.list_capsules().context("Failed to list capsules")?;
        let query_lower = query.to_lowercase();
        let matches: Vec<&Capsule> = capsules
            .iter()
            .filter(|c| c.id.starts_with(query) || c.title.to_lowercase().starts_with(&query_lower))
            .collect();

        match matches.len() {
            0 => bail!("No capsule matching '{}'", query),
            1 => Ok(matches[0].clone()),
            _ => bail!(
                "Ambiguous capsule '{}'. Matches:\n{}",
                query,
                matches
                    .iter()
                    .map(|c| format!("  - {} ({})", c.title, c.id))
                    .collect::<Vec<_>>()
                    .join("\n")
            ),
        }
    }
}

/// Pick the single item whose id starts with `query`
fn resolve_by_id<'a, T>(items: &'a [T], query: &str, id: impl Fn(&T) -> &str, kind: &str) -> Result<&'a T> {
    if let Some(exact) = items.iter().find(|item| id(*item) == query) {
        return Ok(exact);
    }
    let matches: Vec<&T> = items.iter().filter(|item| id(*item).starts_with(query)).collect();
    match matches.len() {
        0 => bail!("No {} matching '{}'", kind, query),
        1 => Ok(matches[0]),
        n => bail!("Ambiguous {} '{}' ({} matches)", kind, query, n),
    }
}

pub fn resolve_flashcard<'a>(capsule: &'a Capsule, query: &str) -> Result<&'a Flashcard> {
    resolve_by_id(&capsule.flashcards, query, |c| c.id.as_str(), "flashcard")
}

pub fn resolve_question<'a>(capsule: &'a Capsule, query: &str) -> Result<&'a QuizQuestion> {
    resolve_by_id(&capsule.quiz, query, |q| q.id.as_str(), "question")
}
