//! Player preferences
//!
//! Persisted separately from the game session, one key per preference.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_GRID_SIZE, MAX_GRID_SIZE, MIN_GRID_SIZE};
use crate::persistence::keys;
use crate::platform::KeyValueStore;

/// Game settings/preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Side length of the next generated grid
    pub grid_size: usize,
    /// Audio cues off
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            muted: false,
        }
    }
}

impl Settings {
    /// Clamp a requested grid size into the supported range
    pub fn clamp_grid_size(n: usize) -> usize {
        n.clamp(MIN_GRID_SIZE, MAX_GRID_SIZE)
    }

    /// Load preferences, falling back to defaults per key
    pub fn load(store: &impl KeyValueStore) -> Self {
        let defaults = Self::default();
        let grid_size = store
            .get(keys::GRID_SIZE)
            .and_then(|s| s.trim().parse::<usize>().ok())
            .map(Self::clamp_grid_size)
            .unwrap_or(defaults.grid_size);
        let muted = store
            .get(keys::MUTED)
            .and_then(|s| s.trim().parse::<bool>().ok())
            .unwrap_or(defaults.muted);
        log::info!("Settings: grid {}x{}, muted {}", grid_size, grid_size, muted);
        Self { grid_size, muted }
    }

    /// Set and persist the grid size; returns the clamped value
    pub fn set_grid_size(&mut self, n: usize, store: &mut impl KeyValueStore) -> usize {
        self.grid_size = Self::clamp_grid_size(n);
        if let Err(e) = store.set(keys::GRID_SIZE, &self.grid_size.to_string()) {
            log::warn!("Failed to save grid size: {}", e);
        }
        self.grid_size
    }

    pub fn set_muted(&mut self, muted: bool, store: &mut impl KeyValueStore) {
        self.muted = muted;
        if let Err(e) = store.set(keys::MUTED, if muted { "true" } else { "false" }) {
            log::warn!("Failed to save mute flag: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    #[test]
    fn test_defaults_when_store_is_empty() {
        let store = MemoryStore::new();
        assert_eq!(Settings::load(&store), Settings::default());
        assert_eq!(Settings::default().grid_size, 13);
    }

    #[test]
    fn test_grid_size_is_clamped_and_persisted() {
        let mut store = MemoryStore::new();
        let mut settings = Settings::default();
        assert_eq!(settings.set_grid_size(40, &mut store), 20);
        assert_eq!(settings.set_grid_size(2, &mut store), 5);
        assert_eq!(store.get(keys::GRID_SIZE).as_deref(), Some("5"));
        assert_eq!(Settings::load(&store).grid_size, 5);
    }

    #[test]
    fn test_mute_round_trip_and_garbage() {
        let mut store = MemoryStore::new();
        let mut settings = Settings::default();
        settings.set_muted(true, &mut store);
        assert!(Settings::load(&store).muted);

        store.set(keys::MUTED, "maybe").unwrap();
        store.set(keys::GRID_SIZE, "huge").unwrap();
        assert_eq!(Settings::load(&store), Settings::default());
    }
}
