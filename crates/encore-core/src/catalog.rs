//! Typed product catalog
//!
//! Maps store product codes to a display name and the price used when a
//! notification arrives without a usable price of its own.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use encore_types::Money;

/// Store product identifier (e.g. `premium.monthly`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductCode(pub String);

impl ProductCode {
    /// Create a new product code
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }
}

impl std::fmt::Display for ProductCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Catalog entry for a product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Human-readable product name
    pub display_name: String,
    /// Price charged for the product
    pub default_price: Money,
}

/// Result of a catalog lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogLookup<'a> {
    /// Product is in the catalog
    Known(&'a CatalogEntry),
    /// Product code is not in the catalog
    Unknown(&'a str),
}

/// Product catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductCatalog {
    entries: HashMap<ProductCode, CatalogEntry>,
}

impl ProductCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product
    pub fn with_product(
        mut self,
        code: impl Into<String>,
        display_name: impl Into<String>,
        default_price: Money,
    ) -> Self {
        self.entries.insert(
            ProductCode::new(code),
            CatalogEntry {
                display_name: display_name.into(),
                default_price,
            },
        );
        self
    }

    /// Parse a catalog from JSON: `{"<code>": {"display_name": .., "default_price": {..}}}`
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Look up a product code
    pub fn lookup<'a>(&'a self, code: &'a str) -> CatalogLookup<'a> {
        match self.entries.get(&ProductCode::new(code)) {
            Some(entry) => CatalogLookup::Known(entry),
            None => CatalogLookup::Unknown(code),
        }
    }

    /// Number of products
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encore_types::Currency;

    #[test]
    fn test_lookup_distinguishes_unknown_products() {
        let catalog = ProductCatalog::new().with_product(
            "premium.monthly",
            "Premium Monthly",
            Money::new(9990, Currency::parse("TRY").unwrap()),
        );

        match catalog.lookup("premium.monthly") {
            CatalogLookup::Known(entry) => assert_eq!(entry.default_price.amount_minor, 9990),
            CatalogLookup::Unknown(_) => panic!("expected known product"),
        }
        assert_eq!(catalog.lookup("premium.weekly"), CatalogLookup::Unknown("premium.weekly"));
    }

    #[test]
    fn test_from_json() {
        let catalog = ProductCatalog::from_json(
            r#"{
                "premium.yearly": {
                    "display_name": "Premium Yearly",
                    "default_price": {"amount_minor": 79990, "currency": "try"}
                }
            }"#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 1);
        let CatalogLookup::Known(entry) = catalog.lookup("premium.yearly") else {
            panic!("expected known product");
        };
        assert_eq!(entry.default_price.currency.as_str(), "TRY");
    }
}
