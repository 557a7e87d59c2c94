//! Owner-scoped product catalog: create, browse, edit, and remove.

use std::sync::Arc;

use super::normalize;
use crate::domain::{NewProduct, Product, ProductId, ProductPage, ProductPatch, ProductQuery};
use crate::error::PinpointError;
use crate::persistence::OfferStore;

/// Catalog operations over the [`OfferStore`].
///
/// Edits and deletes may name the acting owner. When they do, it must match
/// the product's `owner_uid` or the call fails with
/// [`PinpointError::Forbidden`]; when they don't, the change is applied
/// unconditionally.
#[derive(Debug, Clone)]
pub struct ProductService {
    store: Arc<dyn OfferStore>,
}

impl ProductService {
    /// Creates a new `ProductService`.
    #[must_use]
    pub fn new(store: Arc<dyn OfferStore>) -> Self {
        Self { store }
    }

    /// Adds a product to an owner's catalog.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::InvalidArgument`] if the owner or name is
    /// blank or the price is negative, or the store's error on failure.
    pub async fn create_product(&self, mut product: NewProduct) -> Result<Product, PinpointError> {
        product.owner_uid = product.owner_uid.trim().to_string();
        product.name = product.name.trim().to_string();
        if product.owner_uid.is_empty() || product.name.is_empty() {
            return Err(PinpointError::invalid("owner_uid and name are required"));
        }
        validate_price(product.price)?;
        product.description = normalize(product.description);
        product.image_url = normalize(product.image_url);

        let stored = self.store.insert_product(product).await?;
        tracing::info!(
            product_id = %stored.id,
            owner_uid = %stored.owner_uid,
            "product created"
        );
        Ok(stored)
    }

    /// Fetches a product.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::ProductNotFound`] if no such product exists.
    pub async fn get_product(&self, id: ProductId) -> Result<Product, PinpointError> {
        self.store.get_product(id).await
    }

    /// One page of an owner's catalog.
    ///
    /// # Errors
    ///
    /// Returns the store's error on failure.
    pub async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, PinpointError> {
        self.store.list_products(query).await
    }

    /// Applies a partial update.
    ///
    /// A blank name is ignored; a blank description or image reference
    /// clears the stored value.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::InvalidArgument`] for a negative price,
    /// [`PinpointError::ProductNotFound`] if the product does not exist, or
    /// [`PinpointError::Forbidden`] if `acting_owner` is not its owner.
    pub async fn update_product(
        &self,
        id: ProductId,
        acting_owner: Option<&str>,
        mut patch: ProductPatch,
    ) -> Result<Product, PinpointError> {
        if let Some(price) = patch.price {
            validate_price(price)?;
        }
        patch.name = normalize(patch.name);
        patch.description = patch.description.map(normalize);
        patch.image_url = patch.image_url.map(normalize);

        self.check_owner(id, acting_owner).await?;
        let product = self.store.update_product(id, patch).await?;
        tracing::info!(product_id = %id, "product updated");
        Ok(product)
    }

    /// Removes a product.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::ProductNotFound`] if the product does not
    /// exist, or [`PinpointError::Forbidden`] if `acting_owner` is not its
    /// owner.
    pub async fn delete_product(
        &self,
        id: ProductId,
        acting_owner: Option<&str>,
    ) -> Result<(), PinpointError> {
        self.check_owner(id, acting_owner).await?;
        self.store.delete_product(id).await?;
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }

    async fn check_owner(
        &self,
        id: ProductId,
        acting_owner: Option<&str>,
    ) -> Result<(), PinpointError> {
        let Some(acting_owner) = acting_owner.map(str::trim).filter(|o| !o.is_empty()) else {
            return Ok(());
        };
        let product = self.store.get_product(id).await?;
        if product.owner_uid != acting_owner {
            tracing::warn!(product_id = %id, "product owner mismatch");
            return Err(PinpointError::Forbidden(format!(
                "product {id} does not belong to {acting_owner}"
            )));
        }
        Ok(())
    }
}

fn validate_price(price: f64) -> Result<(), PinpointError> {
    if !price.is_finite() || price < 0.0 {
        return Err(PinpointError::invalid("price must be a non-negative number"));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::persistence::InMemoryStore;

    fn make_service() -> ProductService {
        ProductService::new(Arc::new(InMemoryStore::new()))
    }

    fn new_product(owner: &str, name: &str) -> NewProduct {
        NewProduct {
            owner_uid: owner.to_string(),
            name: name.to_string(),
            description: Some("  ".to_string()),
            price: 40.0,
            image_url: None,
        }
    }

    async fn created(service: &ProductService, owner: &str, name: &str) -> Product {
        let Ok(product) = service.create_product(new_product(owner, name)).await else {
            panic!("product creation failed");
        };
        product
    }

    #[tokio::test]
    async fn create_trims_and_normalizes() {
        let service = make_service();
        let product = created(&service, " owner-1 ", "  Samosa ").await;
        assert_eq!(product.owner_uid, "owner-1");
        assert_eq!(product.name, "Samosa");
        assert!(product.description.is_none());
    }

    #[tokio::test]
    async fn create_rejects_bad_input() {
        let service = make_service();
        assert!(service.create_product(new_product("", "Tea")).await.is_err());
        assert!(service.create_product(new_product("o", " ")).await.is_err());

        let mut negative = new_product("o", "Tea");
        negative.price = -0.5;
        assert!(matches!(
            service.create_product(negative).await,
            Err(PinpointError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn update_by_another_owner_is_forbidden() {
        let service = make_service();
        let product = created(&service, "owner-1", "Tea").await;
        let patch = ProductPatch {
            price: Some(15.0),
            ..ProductPatch::default()
        };

        let result = service
            .update_product(product.id, Some("owner-2"), patch.clone())
            .await;
        assert!(matches!(result, Err(PinpointError::Forbidden(_))));

        let Ok(updated) = service.update_product(product.id, Some("owner-1"), patch).await else {
            panic!("owner update failed");
        };
        assert!((updated.price - 15.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn blank_name_in_update_is_ignored() {
        let service = make_service();
        let product = created(&service, "owner-1", "Tea").await;
        let Ok(updated) = service
            .update_product(
                product.id,
                None,
                ProductPatch {
                    name: Some("   ".to_string()),
                    ..ProductPatch::default()
                },
            )
            .await
        else {
            panic!("update failed");
        };
        assert_eq!(updated.name, "Tea");
    }

    #[tokio::test]
    async fn delete_checks_owner_then_removes() {
        let service = make_service();
        let product = created(&service, "owner-1", "Tea").await;
        assert!(matches!(
            service.delete_product(product.id, Some("owner-2")).await,
            Err(PinpointError::Forbidden(_))
        ));
        assert!(service.delete_product(product.id, Some("owner-1")).await.is_ok());
        assert!(matches!(
            service.get_product(product.id).await,
            Err(PinpointError::ProductNotFound(_))
        ));
    }

    #[tokio::test]
    async fn missing_product_is_not_found_even_with_owner() {
        let service = make_service();
        assert!(matches!(
            service.delete_product(ProductId::new(404), Some("owner-1")).await,
            Err(PinpointError::ProductNotFound(404))
        ));
    }
}
