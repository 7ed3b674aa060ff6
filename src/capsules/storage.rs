//! Capsule persistence over a key-value substrate
//!
//! Key layout:
//! ```text
//! pc_capsules_index    # JSON array of capsule ids, insertion order
//! pc_capsule_{id}      # full Capsule record
//! pc_progress_{id}     # CapsuleProgress record
//! ```
//!
//! Ids are trusted as unique. Saving a capsule whose id is already stored
//! overwrites the existing record.

use thiserror::Error;

use super::models::{Capsule, CapsuleProgress};
use crate::kv::{KeyValueStore, KvError};

pub const INDEX_KEY: &str = "pc_capsules_index";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Kv(#[from] KvError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

pub fn capsule_key(id: &str) -> String {
    format!("pc_capsule_{}", id)
}

pub fn progress_key(id: &str) -> String {
    format!("pc_progress_{}", id)
}

/// Storage manager for capsules and their progress records
pub struct CapsuleStore<S: KeyValueStore> {
    backend: S,
    /// Probed once at construction; when false every read yields an
    /// empty/default value and every write is skipped
    storage_available: bool,
}

impl<S: KeyValueStore> CapsuleStore<S> {
    pub fn new(backend: S) -> Self {
        let storage_available = backend.is_available();
        if !storage_available {
            log::warn!("Capsule storage unavailable; reads return defaults and writes are skipped");
        }
        Self {
            backend,
            storage_available,
        }
    }

    pub fn storage_available(&self) -> bool {
        self.storage_available
    }

    // ==================== Index ====================

    fn read_index(&self) -> Result<Option<Vec<String>>> {
        match self.backend.get(INDEX_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn write_index(&mut self, ids: &[String]) -> Result<()> {
        self.backend.set(INDEX_KEY, &serde_json::to_string(ids)?)?;
        Ok(())
    }

    /// Ids in the index, oldest first. Tombstoned entries are included.
    pub fn capsule_ids(&self) -> Result<Vec<String>> {
        if !self.storage_available {
            return Ok(Vec::new());
        }
        Ok(self.read_index()?.unwrap_or_default())
    }

    pub fn contains(&self, id: &str) -> Result<bool> {
        Ok(self.capsule_ids()?.iter().any(|i| i == id))
    }

    fn remove_from_index(&mut self, id: &str) -> Result<()> {
        let Some(mut ids) = self.read_index()? else {
            return Ok(());
        };
        let before = ids.len();
        ids.retain(|i| i != id);
        if ids.len() != before {
            self.write_index(&ids)?;
        }
        Ok(())
    }

    // ==================== Capsule Operations ====================

    /// List all capsules in index order, skipping ids whose record is missing
    pub fn list_capsules(&self) -> Result<Vec<Capsule>> {
        let mut capsules = Vec::new();
        for id in self.capsule_ids()? {
            match self.get_capsule(&id)? {
                Some(capsule) => capsules.push(capsule),
                None => log::debug!("Skipping indexed capsule {} with no record", id),
            }
        }
        Ok(capsules)
    }

    pub fn get_capsule(&self, id: &str) -> Result<Option<Capsule>> {
        if !self.storage_available {
            return Ok(None);
        }
        match self.backend.get(&capsule_key(id))? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Register the capsule in the index if new and overwrite its record.
    ///
    /// Timestamps are left exactly as the caller set them.
    pub fn save_capsule(&mut self, capsule: &Capsule) -> Result<()> {
        if !self.storage_available {
            log::debug!("Storage unavailable, not saving capsule {}", capsule.id);
            return Ok(());
        }

        let mut ids = self.read_index()?.unwrap_or_default();
        if !ids.contains(&capsule.id) {
            ids.push(capsule.id.clone());
            self.write_index(&ids)?;
        }

        self.backend
            .set(&capsule_key(&capsule.id), &serde_json::to_string(capsule)?)?;
        log::debug!("Saved capsule {}", capsule.id);
        Ok(())
    }

    /// Remove a capsule from the index along with its record and progress.
    ///
    /// The three writes are not atomic. Each is attempted even if an
    /// earlier one fails; the first failure is returned.
    pub fn delete_capsule(&mut self, id: &str) -> Result<()> {
        if !self.storage_available {
            return Ok(());
        }

        let mut first_error: Option<StoreError> = None;

        if let Err(e) = self.remove_from_index(id) {
            log::warn!("Failed to remove capsule {} from index: {}", id, e);
            first_error.get_or_insert(e);
        }

        for key in [capsule_key(id), progress_key(id)] {
            if let Err(e) = self.backend.remove(&key) {
                log::warn!("Failed to remove {}: {}", key, e);
                first_error.get_or_insert(e.into());
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                log::info!("Deleted capsule {}", id);
                Ok(())
            }
        }
    }

    // ==================== Progress Operations ====================

    /// Get the progress for a capsule, or the zero-value default if none is stored
    pub fn get_progress(&self, capsule_id: &str) -> Result<CapsuleProgress> {
        if !self.storage_available {
            return Ok(CapsuleProgress::default());
        }
        match self.backend.get(&progress_key(capsule_id))? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(CapsuleProgress::default()),
        }
    }

    /// Overwrite the progress for a capsule. The capsule need not exist.
    pub fn save_progress(&mut self, capsule_id: &str, progress: &CapsuleProgress) -> Result<()> {
        if !self.storage_available {
            log::debug!("Storage unavailable, not saving progress for {}", capsule_id);
            return Ok(());
        }
        self.backend
            .set(&progress_key(capsule_id), &serde_json::to_string(progress)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capsules::models::Flashcard;
    use crate::kv::MemoryStore;

    fn create_test_store() -> CapsuleStore<MemoryStore> {
        CapsuleStore::new(MemoryStore::new())
    }

    fn demo_capsule() -> Capsule {
        Capsule {
            id: "a1".to_string(),
            title: "Demo".to_string(),
            flashcards: vec![Flashcard {
                id: "f1".to_string(),
                front: "Q".to_string(),
                back: "A".to_string(),
            }],
            created_at: 1_700_000_000_000,
            updated_at: 1_700_000_000_000,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_store_lists_nothing() {
        let store = create_test_store();
        assert!(store.list_capsules().unwrap().is_empty());
        assert!(store.capsule_ids().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_list() {
        let mut store = create_test_store();
        let capsule = demo_capsule();
        store.save_capsule(&capsule).unwrap();

        assert_eq!(store.list_capsules().unwrap(), vec![capsule.clone()]);
        assert_eq!(store.get_capsule("a1").unwrap(), Some(capsule));
        assert_eq!(store.get_capsule("missing").unwrap(), None);
    }

    #[test]
    fn test_repeated_saves_index_once() {
        let mut store = create_test_store();
        let mut capsule = demo_capsule();
        for i in 0..5 {
            capsule.title = format!("Demo {}", i);
            store.save_capsule(&capsule).unwrap();
        }

        assert_eq!(store.capsule_ids().unwrap(), vec!["a1".to_string()]);
        let stored = store.get_capsule("a1").unwrap().unwrap();
        assert_eq!(stored.title, "Demo 4");
    }

    #[test]
    fn test_save_overwrites_without_merging() {
        let mut store = create_test_store();
        store.save_capsule(&demo_capsule()).unwrap();

        let replacement = Capsule {
            id: "a1".to_string(),
            title: "Replaced".to_string(),
            ..Default::default()
        };
        store.save_capsule(&replacement).unwrap();

        let stored = store.get_capsule("a1").unwrap().unwrap();
        assert!(stored.flashcards.is_empty());
        assert_eq!(stored, replacement);
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let mut store = create_test_store();
        for (id, updated_at) in [("c", 3), ("a", 1), ("b", 2)] {
            let capsule = Capsule {
                id: id.to_string(),
                title: id.to_uppercase(),
                updated_at,
                ..Default::default()
            };
            store.save_capsule(&capsule).unwrap();
        }

        let ids: Vec<String> = store.list_capsules().unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_delete_is_complete() {
        let mut store = create_test_store();
        store.save_capsule(&demo_capsule()).unwrap();
        let mut progress = CapsuleProgress::default();
        progress.known_flashcards.insert("f1".to_string());
        progress.best_quiz_score = 2;
        store.save_progress("a1", &progress).unwrap();

        store.delete_capsule("a1").unwrap();

        assert_eq!(store.get_capsule("a1").unwrap(), None);
        assert!(store.list_capsules().unwrap().is_empty());
        assert!(!store.contains("a1").unwrap());
        assert_eq!(store.get_progress("a1").unwrap(), CapsuleProgress::default());
        assert!(store.backend.get(&progress_key("a1")).unwrap().is_none());
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let mut store = create_test_store();
        store.save_capsule(&demo_capsule()).unwrap();
        store.delete_capsule("zzz").unwrap();
        assert_eq!(store.capsule_ids().unwrap(), vec!["a1".to_string()]);

        let mut empty = create_test_store();
        empty.delete_capsule("zzz").unwrap();
    }

    #[test]
    fn test_default_progress() {
        let store = create_test_store();
        let progress = store.get_progress("never-saved").unwrap();
        assert!(progress.known_flashcards.is_empty());
        assert_eq!(progress.best_quiz_score, 0);
    }

    #[test]
    fn test_progress_known_card_saved_twice() {
        let mut store = create_test_store();
        store.save_capsule(&demo_capsule()).unwrap();

        let mut progress = CapsuleProgress::default();
        progress.known_flashcards.insert("f1".to_string());
        store.save_progress("a1", &progress).unwrap();
        progress.known_flashcards.insert("f1".to_string());
        store.save_progress("a1", &progress).unwrap();

        let stored = store.get_progress("a1").unwrap();
        assert_eq!(stored.known_flashcards.iter().filter(|id| *id == "f1").count(), 1);
    }

    #[test]
    fn test_progress_for_unknown_capsule_is_allowed() {
        let mut store = create_test_store();
        let progress = CapsuleProgress {
            best_quiz_score: 4,
            ..Default::default()
        };
        store.save_progress("orphan", &progress).unwrap();
        assert_eq!(store.get_progress("orphan").unwrap().best_quiz_score, 4);
        assert!(store.capsule_ids().unwrap().is_empty());
    }

    #[test]
    fn test_tombstone_is_skipped() {
        let mut store = create_test_store();
        store.save_capsule(&demo_capsule()).unwrap();
        store.write_index(&["ghost".to_string(), "a1".to_string()]).unwrap();

        let capsules = store.list_capsules().unwrap();
        assert_eq!(capsules.len(), 1);
        assert_eq!(capsules[0].id, "a1");
        // Saving a tombstoned id does not duplicate the entry
        store
            .save_capsule(&Capsule {
                id: "ghost".to_string(),
                title: "Back".to_string(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(store.capsule_ids().unwrap(), vec!["ghost".to_string(), "a1".to_string()]);
    }

    #[test]
    fn test_corrupt_record_is_an_error() {
        let mut store = create_test_store();
        store.save_capsule(&demo_capsule()).unwrap();
        store.backend.set(&capsule_key("a1"), "{not json").unwrap();

        assert!(matches!(store.get_capsule("a1"), Err(StoreError::Json(_))));
        assert!(store.list_capsules().is_err());
    }

    #[test]
    fn test_unavailable_storage_degrades() {
        let mut store = CapsuleStore::new(MemoryStore::unavailable());
        assert!(!store.storage_available());

        store.save_capsule(&demo_capsule()).unwrap();
        store.save_progress("a1", &CapsuleProgress::default()).unwrap();
        store.delete_capsule("a1").unwrap();

        assert!(store.list_capsules().unwrap().is_empty());
        assert_eq!(store.get_capsule("a1").unwrap(), None);
        assert_eq!(store.get_progress("a1").unwrap(), CapsuleProgress::default());
        assert!(store.backend.get(INDEX_KEY).unwrap().is_none());
        assert!(store.backend.get(&capsule_key("a1")).unwrap().is_none());
    }

    #[test]
    fn test_quota_failure_surfaces() {
        let mut store = CapsuleStore::new(MemoryStore::with_quota(16));
        let result = store.save_capsule(&demo_capsule());
        assert!(matches!(result, Err(StoreError::Kv(KvError::QuotaExceeded { .. }))));
    }

    #[test]
    fn test_file_backed_store_survives_reopen() {
        use crate::capsules::interchange::{export_capsule, import_capsule};
        use crate::kv::FileStore;
        use tempfile::TempDir;

        let temp_dir = TempDir::new().unwrap();
        let capsule = demo_capsule();
        {
            let mut store = CapsuleStore::new(FileStore::open(temp_dir.path().to_path_buf()));
            store.save_capsule(&capsule).unwrap();
            let mut progress = store.get_progress("a1").unwrap();
            progress.known_flashcards.insert("f1".to_string());
            store.save_progress("a1", &progress).unwrap();
        }

        let reopened = CapsuleStore::new(FileStore::open(temp_dir.path().to_path_buf()));
        let listed = reopened.list_capsules().unwrap();
        assert_eq!(listed, vec![capsule.clone()]);
        assert!(reopened.get_progress("a1").unwrap().known_flashcards.contains("f1"));

        let text = export_capsule(&listed[0]).unwrap();
        assert_eq!(import_capsule(&text).unwrap(), capsule);
    }
}
