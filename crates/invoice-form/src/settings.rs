//! Typed access to the persisted editor state
//!
//! Reads never fail: missing, unreadable or ill-typed entries are logged and
//! replaced by defaults. Writes are fire-and-forget and only logged on
//! failure.

use crate::document::Document;
use crate::geometry::Calibration;
use crate::layout::{LayoutConfig, DEFAULT_LAYOUT};
use crate::store::KvStore;
use crate::style::FontSpec;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};

pub const LAYOUT_KEY: &str = "invoice-layout";
pub const CALIBRATION_KEY: &str = "invoice-calibration";
pub const DRAFT_KEY: &str = "invoice-draft";
pub const FONT_KEY: &str = "invoice-font";

/// Persisted layout, calibration, font and draft over a [`KvStore`]
#[derive(Debug, Clone)]
pub struct Settings<S> {
    store: S,
}

impl<S: KvStore> Settings<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Defaults deep-merged with the stored override
    pub fn load_layout(&self) -> LayoutConfig {
        LayoutConfig::from_persisted(self.read(LAYOUT_KEY).as_deref())
    }

    pub fn save_layout(&mut self, layout: &LayoutConfig) {
        self.write(LAYOUT_KEY, layout);
    }

    /// Forget the stored override and return the defaults
    pub fn reset_layout(&mut self) -> LayoutConfig {
        if let Err(e) = self.store.remove(LAYOUT_KEY) {
            warn!(error = %e, "failed to remove layout override");
        }
        info!("layout reset to defaults");
        DEFAULT_LAYOUT
    }

    pub fn load_calibration(&self) -> Calibration {
        self.load_or_default(CALIBRATION_KEY)
    }

    pub fn save_calibration(&mut self, calibration: &Calibration) {
        self.write(CALIBRATION_KEY, calibration);
    }

    pub fn load_font(&self) -> FontSpec {
        self.load_or_default(FONT_KEY)
    }

    pub fn save_font(&mut self, font: &FontSpec) {
        self.write(FONT_KEY, font);
    }

    /// Saved pages, normalised; a single empty page when nothing is stored
    pub fn load_draft(&self) -> Document {
        let Some(raw) = self.read(DRAFT_KEY) else {
            return Document::new();
        };
        match Document::from_json(&raw) {
            Ok(document) => document,
            Err(e) => {
                warn!(error = %e, "discarding unreadable draft");
                Document::new()
            }
        }
    }

    pub fn save_draft(&mut self, document: &Document) {
        self.write(DRAFT_KEY, document);
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "failed to read stored entry");
                None
            }
        }
    }

    fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let Some(raw) = self.read(key) else {
            return T::default();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(key, error = %e, "discarding unreadable stored entry");
            T::default()
        })
    }

    fn write<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!(key, error = %e, "failed to serialize entry");
                return;
            }
        };
        if let Err(e) = self.store.set(key, &json) {
            warn!(key, error = %e, "failed to persist entry");
        }
    }
}
