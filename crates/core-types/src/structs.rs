use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use std::fmt;

use crate::enums::UpsertOutcome;

/// A product as the remote catalog publishes it.
///
/// Prices arrive as floating-point major units (e.g. `19.99` dollars) and are
/// only ever converted once, on their way into the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalProduct {
    /// Assigned by the catalog and reused as the primary key of the stored row.
    pub id: i64,
    pub title: String,
    pub price: f64,
    pub description: String,
    pub category: String,
    /// The catalog omits the image for some items, or sends it as `null`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A product as it is persisted in the `products` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Price in minor currency units (cents). Never negative once stored.
    pub price: i64,
    pub description: String,
    pub category: String,
    pub image_url: Option<String>,
}

/// The payload for creating or updating a product through the repository,
/// where the store assigns (or already knows) the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: i64,
    pub description: String,
    pub category: String,
    pub image_url: Option<String>,
}

impl Product {
    /// Whether the product carries a usable image reference.
    pub fn has_image(&self) -> bool {
        self.image_url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

/// Aggregate counts of a batch import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Rows newly written by this run.
    pub imported: usize,
    /// Records whose id was already present in the store.
    pub unchanged: usize,
    /// Records whose upsert failed. These are logged, never fatal.
    pub failed: usize,
}

impl ImportSummary {
    pub fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.imported += 1,
            UpsertOutcome::Unchanged => self.unchanged += 1,
        }
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    /// Number of records that were attempted.
    pub fn total(&self) -> usize {
        self.imported + self.unchanged + self.failed
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} imported, {} unchanged, {} failed ({} total)",
            self.imported,
            self.unchanged,
            self.failed,
            self.total()
        )
    }
}
