use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::CartError,
    models::{CartLine, ProductSnapshot},
    services::pricing::{CartLineView, CartSummary, PricingPolicy},
    store::{CartStore, ProductStore, StoreError},
};

/// Cart reads and writes for one user at a time.
///
/// Reads always price lines against the current product rows.
#[derive(Clone)]
pub struct CartService {
    carts: Arc<dyn CartStore>,
    products: Arc<dyn ProductStore>,
    pricing: PricingPolicy,
}

fn ensure_quantity(quantity: i32) -> Result<(), CartError> {
    if quantity < 1 {
        return Err(CartError::InvalidQuantity);
    }
    Ok(())
}

impl CartService {
    pub fn new(
        carts: Arc<dyn CartStore>,
        products: Arc<dyn ProductStore>,
        pricing: PricingPolicy,
    ) -> Self {
        Self {
            carts,
            products,
            pricing,
        }
    }

    pub fn pricing(&self) -> &PricingPolicy {
        &self.pricing
    }

    async fn product(&self, product_id: Uuid) -> Result<ProductSnapshot, CartError> {
        self.products
            .get_product(product_id)
            .await?
            .ok_or(CartError::ProductNotFound(product_id))
    }

    /// Adds `quantity` to the line for this product, creating it if needed.
    ///
    /// Quantities accumulate: adding 3 on top of 2 leaves 5. A sum past `i32::MAX` is
    /// rejected as [`CartError::InvalidQuantity`] and the line keeps its quantity.
    pub async fn add_product(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartLine, CartError> {
        ensure_quantity(quantity)?;
        self.product(product_id).await?;

        let line = self
            .carts
            .merge_line(user_id, product_id, quantity)
            .await
            .map_err(|err| match err {
                StoreError::QuantityOverflow => CartError::InvalidQuantity,
                err => CartError::StoreUnavailable(err),
            })?;
        tracing::debug!(
            %user_id,
            %product_id,
            added = quantity,
            quantity = line.quantity,
            "cart line merged"
        );
        Ok(line)
    }

    /// Overwrites the quantity of a line already in the cart.
    pub async fn set_quantity(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartLine, CartError> {
        ensure_quantity(quantity)?;

        let line = self
            .carts
            .update_line(user_id, product_id, quantity)
            .await?
            .ok_or(CartError::LineNotFound(product_id))?;
        tracing::debug!(%user_id, %product_id, quantity, "cart line updated");
        Ok(line)
    }

    /// Removing a product that is not in the cart succeeds.
    pub async fn remove_product(&self, user_id: Uuid, product_id: Uuid) -> Result<(), CartError> {
        let removed = self.carts.delete_line(user_id, product_id).await?;
        tracing::debug!(%user_id, %product_id, removed, "cart line removed");
        Ok(())
    }

    pub async fn get_cart(&self, user_id: Uuid) -> Result<CartSummary, CartError> {
        let lines = self.carts.get_lines_by_user(user_id).await?;

        let mut views = Vec::with_capacity(lines.len());
        for line in &lines {
            let product = self.product(line.product_id).await?;
            views.push(CartLineView::new(line, product));
        }

        Ok(self.pricing.summarize(views))
    }

    pub async fn get_line(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<CartLineView, CartError> {
        let line = self
            .carts
            .get_line(user_id, product_id)
            .await?
            .ok_or(CartError::LineNotFound(product_id))?;
        let product = self.product(product_id).await?;
        Ok(CartLineView::new(&line, product))
    }

    /// Total number of items, summed over line quantities.
    pub async fn count_products(&self, user_id: Uuid) -> Result<i64, CartError> {
        let lines = self.carts.get_lines_by_user(user_id).await?;
        Ok(lines.iter().map(|line| i64::from(line.quantity)).sum())
    }
}
