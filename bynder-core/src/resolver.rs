use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::asset::Asset;
use crate::context::AssetContext;
use crate::error::Result;
use crate::ids::AssetIdentifier;

/// Hands out one shared Asset per identifier
///
/// Scope a resolver to one host request so metadata is fetched at most once
/// per asset within it; the metadata cache covers reuse across requests.
pub struct AssetResolver {
    context: AssetContext,
    assets: Mutex<HashMap<AssetIdentifier, Arc<Asset>>>,
}

impl AssetResolver {
    pub fn new(context: AssetContext) -> Self {
        Self {
            context,
            assets: Mutex::new(HashMap::new()),
        }
    }

    pub fn context(&self) -> &AssetContext {
        &self.context
    }

    /// Validate `id` and return the Asset for it, creating it on first use
    pub fn get_or_create(&self, id: &str) -> Result<Arc<Asset>> {
        let identifier = AssetIdentifier::new(id)?;
        let mut assets = self.assets.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let asset = assets
            .entry(identifier.clone())
            .or_insert_with(|| Arc::new(Asset::new(identifier, self.context.clone())));
        Ok(asset.clone())
    }

    pub fn len(&self) -> usize {
        self.assets.lock().map(|a| a.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
