//! Cart pricing.
//!
//! A [`CartSummary`] is a pure function of the priced lines and the policy:
//! `subtotal = Σ price × quantity`, `tax = subtotal × rate` (shipping is not taxed),
//! `total = subtotal + shipping + tax`.

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    models::{CartLine, ProductSnapshot},
    money::Money,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingPolicy {
    pub shipping_fee: Money,
    pub tax_rate: Decimal,
}

impl PricingPolicy {
    pub fn new(shipping_fee: Money, tax_rate: Decimal) -> Self {
        Self {
            shipping_fee,
            tax_rate,
        }
    }

    /// Flat fee, whatever the cart holds.
    pub fn shipping(&self) -> Money {
        self.shipping_fee
    }

    pub fn tax(&self, subtotal: Money) -> Money {
        subtotal.apply_rate(self.tax_rate)
    }

    pub fn summarize(&self, lines: Vec<CartLineView>) -> CartSummary {
        let subtotal: Money = lines.iter().map(|line| line.subtotal).sum();
        let shipping = self.shipping();
        let tax = self.tax(subtotal);
        CartSummary {
            products: lines,
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self::new(Money::from_minor(500), Decimal::new(10, 2))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CartLineView {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = String, example = "19.99")]
    pub price: Money,
    pub quantity: i32,
    #[schema(value_type = String, example = "39.98")]
    pub subtotal: Money,
    pub image_url: Option<String>,
}

impl CartLineView {
    pub fn new(line: &CartLine, product: ProductSnapshot) -> Self {
        Self {
            id: product.id,
            subtotal: product.price.times(line.quantity),
            name: product.name,
            description: product.description,
            price: product.price,
            quantity: line.quantity,
            image_url: product.image_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CartSummary {
    pub products: Vec<CartLineView>,
    #[schema(value_type = String, example = "60.00")]
    pub subtotal: Money,
    #[schema(value_type = String, example = "5.00")]
    pub shipping: Money,
    #[schema(value_type = String, example = "6.00")]
    pub tax: Money,
    #[schema(value_type = String, example = "71.00")]
    pub total: Money,
}
