//! In-memory catalog source built from configuration.

use std::collections::BTreeMap;

use async_trait::async_trait;
use opspulse_core::CatalogSource;
use opspulse_domain::{CategoryCatalog, Result};

/// Serves the configured category overrides, or the built-in catalog when
/// no overrides are present.
pub struct StaticCatalogSource {
    catalog: CategoryCatalog,
}

impl StaticCatalogSource {
    pub fn new(overrides: Option<&BTreeMap<String, String>>) -> Self {
        let catalog = match overrides {
            Some(pairs) => CategoryCatalog::from_pairs(
                pairs.iter().map(|(code, name)| (code.clone(), name.clone())),
            ),
            None => CategoryCatalog::default(),
        };
        Self { catalog }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalogSource {
    async fn load_catalog(&self) -> Result<CategoryCatalog> {
        Ok(self.catalog.clone())
    }
}
