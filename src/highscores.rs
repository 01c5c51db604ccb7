//! Best survival time
//!
//! A single number of milliseconds, persisted to LocalStorage in the browser.
//! Storage failures never stop the game: they read as "no best time".

use crate::error::StoreError;

/// Backend holding the best time
pub trait ScoreStore {
    fn best_time(&self) -> Result<Option<f64>, StoreError>;
    fn set_best_time(&mut self, millis: f64) -> Result<(), StoreError>;
}

/// In-process store (native runs and tests)
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    best: Option<f64>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_best(millis: f64) -> Self {
        Self { best: Some(millis) }
    }
}

impl ScoreStore for MemoryScoreStore {
    fn best_time(&self) -> Result<Option<f64>, StoreError> {
        Ok(self.best)
    }

    fn set_best_time(&mut self, millis: f64) -> Result<(), StoreError> {
        self.best = Some(millis);
        Ok(())
    }
}

/// Read the best time, treating an unavailable or corrupt store as empty
pub fn load_best_time(store: &dyn ScoreStore) -> Option<f64> {
    match store.best_time() {
        Ok(best) => best,
        Err(e) => {
            log::warn!("Ignoring best time: {}", e);
            None
        }
    }
}

/// Commit a finished session: the stored value becomes
/// `max(known_best, stored, timer)`. `known_best` is the best time the caller
/// already holds, so an unreadable store can't make the record go down.
///
/// Returns the best time after the commit. If the store can't be written the
/// returned value still reflects this session.
pub fn record_session(store: &mut dyn ScoreStore, known_best: Option<f64>, timer_ms: f64) -> f64 {
    let best = match (load_best_time(store), known_best) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    };
    match best {
        Some(best) if best >= timer_ms => best,
        _ => {
            if let Err(e) = store.set_best_time(timer_ms) {
                log::warn!("Could not save best time: {}", e);
            } else {
                log::info!("New best time: {}", crate::format_time(timer_ms));
            }
            timer_ms
        }
    }
}

/// Parse a stored value (a bare JSON number)
pub fn parse_best_time(raw: &str) -> Result<f64, StoreError> {
    let millis: f64 = serde_json::from_str(raw).map_err(|e| StoreError::Corrupt(e.to_string()))?;
    if !millis.is_finite() || millis < 0.0 {
        return Err(StoreError::Corrupt(format!("{} is not a valid time", raw)));
    }
    Ok(millis)
}

/// Best time kept in the browser's LocalStorage
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct LocalStorageScoreStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageScoreStore {
    const STORAGE_KEY: &'static str = "rock_dodge_best_time";

    fn storage() -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| StoreError::Unavailable("localStorage not accessible".to_string()))
    }
}

#[cfg(target_arch = "wasm32")]
impl ScoreStore for LocalStorageScoreStore {
    fn best_time(&self) -> Result<Option<f64>, StoreError> {
        let storage = Self::storage()?;
        let raw = storage
            .get_item(Self::STORAGE_KEY)
            .map_err(|e| StoreError::Unavailable(format!("{:?}", e)))?;
        raw.map(|raw| parse_best_time(&raw)).transpose()
    }

    fn set_best_time(&mut self, millis: f64) -> Result<(), StoreError> {
        let storage = Self::storage()?;
        let json = serde_json::to_string(&millis).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        storage
            .set_item(Self::STORAGE_KEY, &json)
            .map_err(|e| StoreError::Unavailable(format!("{:?}", e)))
    }
}
