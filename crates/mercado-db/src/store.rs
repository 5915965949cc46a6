//! Store traits consumed by the service layer
//!
//! [`Database`] implements both; tests can substitute their own.

use async_trait::async_trait;

use crate::error::DbError;
use crate::filter::ProductFilter;
use crate::models::{NewProduct, NewSeller, Product, ProductUpdate, Seller};
use crate::repository::Database;

/// Seller credential storage
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find the credential registered under `name`
    async fn find_credential(&self, name: &str) -> Result<Option<Seller>, DbError>;

    /// Store a new credential; fails with [`DbError::Duplicate`] if the name is taken
    async fn insert_credential(&self, seller: NewSeller) -> Result<Seller, DbError>;
}

/// Product catalog storage
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find(&self, filter: &ProductFilter) -> Result<Vec<Product>, DbError>;

    async fn get(&self, id: &str) -> Result<Option<Product>, DbError>;

    async fn insert(&self, product: NewProduct) -> Result<Product, DbError>;

    /// Returns whether the product exists
    async fn update_fields(&self, id: &str, update: ProductUpdate) -> Result<bool, DbError>;

    /// Returns whether a product was removed
    async fn delete(&self, id: &str) -> Result<bool, DbError>;
}

#[async_trait]
impl CredentialStore for Database {
    async fn find_credential(&self, name: &str) -> Result<Option<Seller>, DbError> {
        self.get_seller_by_name(name).await
    }

    async fn insert_credential(&self, seller: NewSeller) -> Result<Seller, DbError> {
        self.insert_seller(seller).await
    }
}

#[async_trait]
impl CatalogStore for Database {
    async fn find(&self, filter: &ProductFilter) -> Result<Vec<Product>, DbError> {
        self.find_products(filter).await
    }

    async fn get(&self, id: &str) -> Result<Option<Product>, DbError> {
        self.get_product(id).await
    }

    async fn insert(&self, product: NewProduct) -> Result<Product, DbError> {
        self.insert_product(product).await
    }

    async fn update_fields(&self, id: &str, update: ProductUpdate) -> Result<bool, DbError> {
        self.update_product(id, update).await
    }

    async fn delete(&self, id: &str) -> Result<bool, DbError> {
        self.delete_product(id).await
    }
}
