//! Seller credential operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{NewSeller, Seller};
use crate::repository::Database;

impl Database {
    /// Insert a new seller
    pub async fn insert_seller(&self, seller: NewSeller) -> Result<Seller, DbError> {
        let now = Utc::now();

        if self.get_seller_by_name(&seller.name).await?.is_some() {
            return Err(DbError::Duplicate(format!(
                "Seller '{}' already exists",
                seller.name
            )));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO sellers (name, salt, password_hash, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&seller.name)
        .bind(&seller.salt)
        .bind(&seller.password_hash)
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DbError::Duplicate(format!("Seller '{}' already exists", seller.name))
            }
            _ => DbError::from(e),
        })?;

        let id: i64 = result.get("id");

        Ok(Seller {
            id,
            name: seller.name,
            salt: seller.salt,
            password_hash: seller.password_hash,
            created_at: now,
        })
    }

    /// Get a seller by name
    pub async fn get_seller_by_name(&self, name: &str) -> Result<Option<Seller>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, name, salt, password_hash, created_at
            FROM sellers
            WHERE name = ?
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        result
            .map(|row| Seller::try_from(&row).map_err(DbError::from))
            .transpose()
    }
}
