//! Per-batch image cache

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::podman::{self, ContainerEngine};

/// Images pulled during one batch, keyed by digest
///
/// A digest is pulled at most once per batch, from the repository of the
/// first directive that needs it.
#[derive(Debug, Default)]
pub struct ImageCache {
    pulled: HashMap<String, String>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the local image id for `digest`, pulling it on first use
    pub fn get_or_pull(
        &mut self,
        engine: &dyn ContainerEngine,
        source: &str,
        repository: &str,
        digest: &str,
    ) -> podman::Result<&str> {
        if !self.pulled.contains_key(digest) {
            let image_id = engine.pull(&format!("{}/{}@{}", source, repository, digest))?;
            self.pulled.insert(digest.to_string(), image_id);
        } else {
            debug!("Image {} already pulled", digest);
        }

        Ok(self.pulled[digest].as_str())
    }

    pub fn len(&self) -> usize {
        self.pulled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pulled.is_empty()
    }

    /// Removes every pulled image from the local engine
    ///
    /// Failures are logged; the cache is emptied either way.
    pub fn clear(&mut self, engine: &dyn ContainerEngine) {
        for (digest, image_id) in self.pulled.drain() {
            if let Err(e) = engine.remove(&image_id) {
                warn!("Unable to remove image {} ({}): {}", image_id, digest, e);
            }
        }
    }
}
