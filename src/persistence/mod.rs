//! Best-score persistence
//!
//! A single named key holding a non-negative integer. Reads never fail:
//! anything missing or unparsable is treated as 0. Writes may fail (private
//! mode, quota) and the caller is expected to log and carry on.

use thiserror::Error;

/// LocalStorage key. Matches the key earlier builds of the game wrote.
pub const BEST_SCORE_KEY: &str = "liiiiight_best_v1";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage is not available")]
    Unavailable,
    #[error("write rejected: {0}")]
    WriteRejected(String),
}

/// Key-value home for the best score
pub trait BestScoreStore {
    /// Stored best, or 0 when missing/invalid
    fn load_best(&self) -> u32;
    fn save_best(&mut self, best: u32) -> Result<(), StoreError>;
}

/// Parse a stored value. Missing, negative or garbage values read as 0.
pub fn parse_best(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .map(|v| v.min(u32::MAX as u64) as u32)
        .unwrap_or(0)
}

/// In-memory store (native builds and tests)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    raw: Option<String>,
    /// Simulate a blocked write
    pub fail_writes: bool,
    /// Successful writes so far
    pub writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a raw value, as if read back from disk
    pub fn with_raw(raw: &str) -> Self {
        Self {
            raw: Some(raw.to_string()),
            ..Default::default()
        }
    }

    /// Store whose writes are all rejected (private mode, full quota)
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Default::default()
        }
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }
}

impl BestScoreStore for MemoryStore {
    fn load_best(&self) -> u32 {
        parse_best(self.raw.as_deref())
    }

    fn save_best(&mut self, best: u32) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::WriteRejected("memory store is read-only".into()));
        }
        self.raw = Some(best.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// Browser LocalStorage store (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    key: &'static str,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    pub fn new() -> Self {
        Self {
            key: BEST_SCORE_KEY,
        }
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }
}

#[cfg(target_arch = "wasm32")]
impl Default for LocalStorageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl BestScoreStore for LocalStorageStore {
    fn load_best(&self) -> u32 {
        let raw = Self::storage().and_then(|s| s.get_item(self.key).ok().flatten());
        let best = parse_best(raw.as_deref());
        log::info!("Loaded best score {}", best);
        best
    }

    fn save_best(&mut self, best: u32) -> Result<(), StoreError> {
        let storage = Self::storage().ok_or(StoreError::Unavailable)?;
        storage
            .set_item(self.key, &best.to_string())
            .map_err(|e| StoreError::WriteRejected(format!("{:?}", e)))
    }
}
