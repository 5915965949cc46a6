//! Product catalog operations

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

use crate::error::DbError;
use crate::filter::ProductFilter;
use crate::models::{NewProduct, Product, ProductUpdate};
use crate::repository::Database;

const PRODUCT_COLUMNS: &str =
    "SELECT id, name, description, price, seller, created_at, updated_at FROM products";

impl Database {
    /// Insert a new product with a generated id
    pub async fn insert_product(&self, product: NewProduct) -> Result<Product, DbError> {
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price, seller, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.seller)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(Product {
            id,
            name: product.name,
            description: product.description,
            price: product.price,
            seller: product.seller,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a product by id
    pub async fn get_product(&self, id: &str) -> Result<Option<Product>, DbError> {
        let result = sqlx::query(&format!("{} WHERE id = ?", PRODUCT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        result
            .map(|row| Product::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// List products matching a filter, oldest first
    pub async fn find_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, DbError> {
        let mut builder = QueryBuilder::<Sqlite>::new(PRODUCT_COLUMNS);
        filter.push_where(&mut builder);
        builder.push(" ORDER BY created_at, id");

        let rows = builder.build().fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| Product::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Apply a partial update; returns whether the product exists
    pub async fn update_product(&self, id: &str, update: ProductUpdate) -> Result<bool, DbError> {
        if update.is_empty() {
            return Ok(self.get_product(id).await?.is_some());
        }

        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE products SET updated_at = ");
        builder.push_bind(Utc::now().to_rfc3339());
        if let Some(name) = update.name {
            builder.push(", name = ");
            builder.push_bind(name);
        }
        if let Some(description) = update.description {
            builder.push(", description = ");
            builder.push_bind(description);
        }
        if let Some(price) = update.price {
            builder.push(", price = ");
            builder.push_bind(price);
        }
        builder.push(" WHERE id = ");
        builder.push_bind(id.to_string());

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a product; returns whether a row was removed
    pub async fn delete_product(&self, id: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterCondition;

    fn new_product(name: &str, description: &str, price: f64, seller: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: description.to_string(),
            price,
            seller: seller.to_string(),
        }
    }

    async fn seeded() -> Database {
        let db = Database::in_memory().await.unwrap();
        db.insert_product(new_product("Cadeira", "cadeira de escritorio", 3.0, "alice"))
            .await
            .unwrap();
        db.insert_product(new_product("Mesa", "mesa de jantar 100%", 7.0, "bob"))
            .await
            .unwrap();
        db.insert_product(new_product("Sofa", "sofa retratil", 12.0, "alice"))
            .await
            .unwrap();
        db
    }

    fn names(products: &[Product]) -> Vec<&str> {
        let mut names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_find_all() {
        let db = seeded().await;
        let products = db.find_products(&ProductFilter::all()).await.unwrap();
        assert_eq!(names(&products), vec!["Cadeira", "Mesa", "Sofa"]);
    }

    #[tokio::test]
    async fn test_find_price_range() {
        let db = seeded().await;
        let filter = ProductFilter::all()
            .and(FilterCondition::PriceAtMost(10.0))
            .and(FilterCondition::PriceAtLeast(5.0));

        let products = db.find_products(&filter).await.unwrap();
        assert_eq!(names(&products), vec!["Mesa"]);
    }

    #[tokio::test]
    async fn test_find_inverted_range_is_empty() {
        let db = seeded().await;
        let filter = ProductFilter::all()
            .and(FilterCondition::PriceAtLeast(10.0))
            .and(FilterCondition::PriceAtMost(5.0));

        assert!(db.find_products(&filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_text_search() {
        let db = seeded().await;

        let filter = ProductFilter::all().and(FilterCondition::TextSearch("SOFA cadeira".into()));
        let products = db.find_products(&filter).await.unwrap();
        assert_eq!(names(&products), vec!["Cadeira", "Sofa"]);

        // LIKE wildcards in the term are literal
        let filter = ProductFilter::all().and(FilterCondition::TextSearch("100%".into()));
        let products = db.find_products(&filter).await.unwrap();
        assert_eq!(names(&products), vec!["Mesa"]);

        let filter = ProductFilter::all().and(FilterCondition::TextSearch("_".into()));
        assert!(db.find_products(&filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sql_agrees_with_in_memory_match() {
        let db = seeded().await;
        let all = db.find_products(&ProductFilter::all()).await.unwrap();
        let filter = ProductFilter::all()
            .and(FilterCondition::TextSearch("de".into()))
            .and(FilterCondition::PriceAtLeast(5.0));

        let from_sql = db.find_products(&filter).await.unwrap();
        let in_memory: Vec<Product> = all.into_iter().filter(|p| filter.matches(p)).collect();
        assert_eq!(names(&from_sql), names(&in_memory));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = Database::in_memory().await.unwrap();
        let product = db
            .insert_product(new_product("Mesa", "mesa", 7.0, "bob"))
            .await
            .unwrap();

        let updated = db
            .update_product(
                &product.id,
                ProductUpdate {
                    price: Some(9.5),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated);

        let stored = db.get_product(&product.id).await.unwrap().unwrap();
        assert_eq!(stored.price, 9.5);
        assert_eq!(stored.name, "Mesa");
        assert_eq!(stored.seller, "bob");

        assert!(!db.update_product("missing", ProductUpdate::default()).await.unwrap());
        assert!(db.delete_product(&product.id).await.unwrap());
        assert!(!db.delete_product(&product.id).await.unwrap());
        assert!(db.get_product(&product.id).await.unwrap().is_none());
    }
}
