//! # Cart Persistence
//!
//! Durable local storage for the session cart. The full cart + promo
//! state is serialized as JSON on every mutation and rehydrated on
//! startup; malformed stored payloads are discarded rather than
//! propagated.

use crate::cart::{CartLine, PromoState};
use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Storage key for the serialized cart payload
pub const CART_STORAGE_KEY: &str = "artisan_cart";

/// The durable snapshot written on every cart mutation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistedCart {
    #[serde(default)]
    pub lines: Vec<CartLine>,
    #[serde(default)]
    pub promo: PromoState,
}

/// Durable local storage for the cart.
///
/// `load` returns `None` for missing OR malformed data; parse failures
/// never surface to the caller.
pub trait CartStorage: Send + Sync {
    fn save(&self, cart: &PersistedCart) -> StoreResult<()>;
    fn load(&self) -> Option<PersistedCart>;
}

impl<T: CartStorage + ?Sized> CartStorage for Arc<T> {
    fn save(&self, cart: &PersistedCart) -> StoreResult<()> {
        (**self).save(cart)
    }

    fn load(&self) -> Option<PersistedCart> {
        (**self).load()
    }
}

/// JSON file storage under a fixed path
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location: `{dir}/artisan_cart.json`
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let mut path = dir.into();
        path.push(format!("{CART_STORAGE_KEY}.json"));
        Self { path }
    }
}

impl CartStorage for JsonFileStorage {
    fn save(&self, cart: &PersistedCart) -> StoreResult<()> {
        let json = serde_json::to_string(cart)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        std::fs::write(&self.path, json)
            .map_err(|e| StoreError::Serialization(format!("write {}: {e}", self.path.display())))
    }

    fn load(&self) -> Option<PersistedCart> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(cart) => Some(cart),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "discarding malformed cart data");
                None
            }
        }
    }
}

/// In-memory storage (tests and ephemeral sessions)
#[derive(Default)]
pub struct MemoryStorage {
    raw: Mutex<Option<String>>,
}

impl MemoryStorage {
    /// Seed the raw stored payload directly (e.g., to simulate corruption)
    pub fn set_raw(&self, raw: impl Into<String>) {
        *self.raw.lock().expect("storage lock") = Some(raw.into());
    }
}

impl CartStorage for MemoryStorage {
    fn save(&self, cart: &PersistedCart) -> StoreResult<()> {
        let json = serde_json::to_string(cart)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        *self.raw.lock().map_err(|_| StoreError::Internal("storage lock poisoned".into()))? =
            Some(json);
        Ok(())
    }

    fn load(&self) -> Option<PersistedCart> {
        let guard = self.raw.lock().ok()?;
        let raw = guard.as_ref()?;
        match serde_json::from_str(raw) {
            Ok(cart) => Some(cart),
            Err(e) => {
                warn!(error = %e, "discarding malformed cart data");
                None
            }
        }
    }
}
