use crate::DbError;
use async_trait::async_trait;
use core_types::{NewProduct, Product, UpsertOutcome};
use sqlx::SqlitePool;

const SELECT_PRODUCTS: &str =
    "SELECT id, name, price, description, category, image_url FROM products";

/// The write primitive the importer needs from a store: a conflict-aware
/// insert keyed on the product id.
#[async_trait]
pub trait ProductWriter: Send + Sync {
    /// Inserts `product`, or does nothing if a row with the same id exists.
    async fn upsert_product(&self, product: &Product) -> Result<UpsertOutcome, DbError>;
}

/// The `ProductRepository` provides a high-level, application-specific interface
/// to the `products` table. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new `ProductRepository` over a shared connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a product with a store-assigned id and returns that id.
    pub async fn create_product(&self, product: &NewProduct) -> Result<i64, DbError> {
        let result = sqlx::query(
            r#"
            INSERT INTO products (name, price, description, category, image_url)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&product.name)
        .bind(product.price)
        .bind(&product.description)
        .bind(&product.category)
        .bind(&product.image_url)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Fetches a single product by id.
    pub async fn get_product(&self, id: i64) -> Result<Product, DbError> {
        let product = sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCTS} WHERE id = ?"))
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| if let sqlx::Error::RowNotFound = e { DbError::NotFound } else { e.into() })?;

        Ok(product)
    }

    /// Fetches every product, ordered by id.
    pub async fn list_products(&self) -> Result<Vec<Product>, DbError> {
        let products = sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCTS} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    /// Replaces every column but the id. Fails with `NotFound` if no row matched.
    pub async fn update_product(&self, id: i64, product: &NewProduct) -> Result<(), DbError> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = ?, price = ?, description = ?, category = ?, image_url = ?
            WHERE id = ?
            "#,
        )
        .bind(&product.name)
        .bind(product.price)
        .bind(&product.description)
        .bind(&product.category)
        .bind(&product.image_url)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    pub async fn delete_product(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    /// Products whose name and category both contain the given fragments
    /// (case-insensitive for ASCII). An empty fragment matches everything.
    pub async fn search_by_name_and_category(
        &self,
        name: &str,
        category: &str,
    ) -> Result<Vec<Product>, DbError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            r"{SELECT_PRODUCTS} WHERE name LIKE ? ESCAPE '\' AND category LIKE ? ESCAPE '\' ORDER BY id"
        ))
        .bind(like_pattern(name))
        .bind(like_pattern(category))
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    pub async fn search_by_category(&self, category: &str) -> Result<Vec<Product>, DbError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            r"{SELECT_PRODUCTS} WHERE category LIKE ? ESCAPE '\' ORDER BY id"
        ))
        .bind(like_pattern(category))
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    /// Products with (`true`) or without (`false`) an image reference.
    /// NULL and the empty string both count as "no image".
    pub async fn search_by_image(&self, has_image: bool) -> Result<Vec<Product>, DbError> {
        let filter = if has_image {
            "image_url IS NOT NULL AND image_url != ''"
        } else {
            "image_url IS NULL OR image_url = ''"
        };
        let products = sqlx::query_as::<_, Product>(&format!(
            "{SELECT_PRODUCTS} WHERE {filter} ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }
}

#[async_trait]
impl ProductWriter for ProductRepository {
    async fn upsert_product(&self, product: &Product) -> Result<UpsertOutcome, DbError> {
        let result = sqlx::query(
            r#"
            INSERT INTO products (id, name, price, description, category, image_url)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(product.price)
        .bind(&product.description)
        .bind(&product.category)
        .bind(&product.image_url)
        .execute(&self.pool)
        .await?;

        Ok(UpsertOutcome::from_rows_affected(result.rows_affected()))
    }
}

/// Wraps a fragment in `%…%`, escaping LIKE wildcards it contains.
fn like_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
