//! Shop catalog provider.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::models::ShopItem;

#[async_trait]
pub trait ShopCatalog: Send + Sync {
    async fn get_shop(&self) -> Result<Vec<ShopItem>>;
}

/// A catalog fixed at construction time.
#[derive(Debug, Clone, Default)]
pub struct StaticShopCatalog {
    items: Vec<ShopItem>,
}

impl StaticShopCatalog {
    pub fn new(items: Vec<ShopItem>) -> Self {
        Self { items }
    }

    /// Load a JSON array of catalog items.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read shop catalog: {}", path.display()))?;
        let items: Vec<ShopItem> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse shop catalog: {}", path.display()))?;
        Ok(Self::new(items))
    }
}

#[async_trait]
impl ShopCatalog for StaticShopCatalog {
    async fn get_shop(&self) -> Result<Vec<ShopItem>> {
        Ok(self.items.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_catalog_from_json_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("shop.json");
        std::fs::write(
            &path,
            r#"[{"recordId":"recItem1","name":"Hoodie","fairMarketValue":40.0},{"recordId":"recItem2"}]"#,
        )
        .expect("write catalog");

        let items = StaticShopCatalog::from_json_file(&path)
            .expect("catalog loads")
            .get_shop()
            .await
            .expect("items");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].fair_market_value, Some(40.0));
        assert_eq!(items[1].image_url, None);
    }

    #[test]
    fn test_missing_catalog_file_errors() {
        let err = StaticShopCatalog::from_json_file(Path::new("/nonexistent/shop.json"))
            .expect_err("must fail");
        assert!(err.to_string().contains("Failed to read shop catalog"));
    }
}
