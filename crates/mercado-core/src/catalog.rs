//! Product catalog service

use mercado_auth::{AuthError, AuthUser};
use mercado_db::{CatalogStore, NewProduct, Product, ProductUpdate};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::CoreError;
use crate::filter::{build_filter, FilterParams};

/// Product fields supplied by a seller
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: f64,
}

pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// List products matching the query parameters
    ///
    /// Invalid parameters fail before the store is queried.
    pub async fn list(&self, params: &FilterParams) -> Result<Vec<Product>, CoreError> {
        let filter = build_filter(params)?;
        debug!("Listing products with {} condition(s)", filter.conditions().len());
        Ok(self.store.find(&filter).await?)
    }

    /// Create a product owned by `owner`
    pub async fn create(&self, owner: &AuthUser, draft: ProductDraft) -> Result<Product, CoreError> {
        validate_price(draft.price)?;

        let product = self
            .store
            .insert(NewProduct {
                name: draft.name,
                description: draft.description,
                price: draft.price,
                seller: owner.name.clone(),
            })
            .await?;

        info!("Seller {} created product {}", owner.name, product.id);
        Ok(product)
    }

    /// Admit `user` only if they own product `id`
    pub async fn ensure_owner(&self, id: &str, user: &AuthUser) -> Result<Product, CoreError> {
        let product = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Product: {}", id)))?;

        if product.seller != user.name {
            debug!("{} is not the owner of product {}", user.name, id);
            return Err(AuthError::NotResourceOwner.into());
        }

        Ok(product)
    }

    /// Apply a partial update to product `id`
    pub async fn update(&self, id: &str, update: ProductUpdate) -> Result<(), CoreError> {
        if update.is_empty() {
            return Err(CoreError::Validation("no fields to update".to_string()));
        }
        if let Some(price) = update.price {
            validate_price(price)?;
        }

        if !self.store.update_fields(id, update).await? {
            return Err(CoreError::NotFound(format!("Product: {}", id)));
        }

        info!("Updated product {}", id);
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), CoreError> {
        if !self.store.delete(id).await? {
            return Err(CoreError::NotFound(format!("Product: {}", id)));
        }

        info!("Deleted product {}", id);
        Ok(())
    }
}

fn validate_price(price: f64) -> Result<(), CoreError> {
    if !price.is_finite() {
        return Err(CoreError::Validation("invalid product".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mercado_auth::Role;
    use mercado_db::{Database, DbError, ProductFilter};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls and returns nothing
    #[derive(Default)]
    struct CountingStore {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CatalogStore for CountingStore {
        async fn find(&self, _filter: &ProductFilter) -> Result<Vec<Product>, DbError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }

        async fn get(&self, _id: &str) -> Result<Option<Product>, DbError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }

        async fn insert(&self, _product: NewProduct) -> Result<Product, DbError> {
            unimplemented!()
        }

        async fn update_fields(&self, _id: &str, _update: ProductUpdate) -> Result<bool, DbError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(false)
        }

        async fn delete(&self, _id: &str) -> Result<bool, DbError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(false)
        }
    }

    fn seller(name: &str) -> AuthUser {
        AuthUser {
            name: name.to_string(),
            role: Role::Seller,
        }
    }

    fn draft(name: &str, price: f64) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            description: format!("{} description", name),
            price,
        }
    }

    async fn service() -> CatalogService {
        CatalogService::new(Arc::new(Database::in_memory().await.unwrap()))
    }

    #[tokio::test]
    async fn test_invalid_filter_never_reaches_store() {
        let store = Arc::new(CountingStore::default());
        let service = CatalogService::new(store.clone());

        let params = FilterParams {
            price_at_most: Some("abc".to_string()),
            ..Default::default()
        };
        let result = service.list(&params).await;

        assert!(matches!(result, Err(CoreError::Validation(_))));
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);

        service.list(&FilterParams::default()).await.unwrap();
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_list_price_range() {
        let service = service().await;
        let alice = seller("alice");
        for (name, price) in [("cheap", 3.0), ("middle", 7.0), ("pricey", 12.0)] {
            service.create(&alice, draft(name, price)).await.unwrap();
        }

        let params = FilterParams {
            price_at_most: Some("10".to_string()),
            price_at_least: Some("5".to_string()),
            ..Default::default()
        };
        let products = service.list(&params).await.unwrap();

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "middle");
    }

    #[tokio::test]
    async fn test_create_sets_owner() {
        let service = service().await;

        let product = service.create(&seller("alice"), draft("mesa", 7.0)).await.unwrap();
        assert_eq!(product.seller, "alice");

        let result = service.create(&seller("alice"), draft("mesa", f64::NAN)).await;
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_ownership() {
        let service = service().await;
        let product = service.create(&seller("alice"), draft("mesa", 7.0)).await.unwrap();

        assert!(service.ensure_owner(&product.id, &seller("alice")).await.is_ok());
        assert!(matches!(
            service.ensure_owner(&product.id, &seller("bob")).await,
            Err(CoreError::Auth(AuthError::NotResourceOwner))
        ));
        assert!(matches!(
            service.ensure_owner("missing", &seller("alice")).await,
            Err(CoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let service = service().await;
        let product = service.create(&seller("alice"), draft("mesa", 7.0)).await.unwrap();

        assert!(matches!(
            service.update(&product.id, ProductUpdate::default()).await,
            Err(CoreError::Validation(_))
        ));

        service
            .update(
                &product.id,
                ProductUpdate {
                    name: Some("mesa redonda".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let listed = service.list(&FilterParams::default()).await.unwrap();
        assert_eq!(listed[0].name, "mesa redonda");
        assert_eq!(listed[0].price, 7.0);

        service.delete(&product.id).await.unwrap();
        assert!(matches!(
            service.delete(&product.id).await,
            Err(CoreError::NotFound(_))
        ));
    }
}
