//! Cart validation and order pricing.
//!
//! The catalog is the source of truth for names, images, and unit prices:
//! nothing price-related is taken from the cart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_catalog::Product;
use storefront_core::{DomainError, DomainResult, OrderId, ProductId, UserId};

use crate::order::{Order, OrderItem, OrderParts, OrderStatus};

/// Largest order total accepted. Money is stored as a signed 64-bit amount.
pub const MAX_ORDER_TOTAL: u64 = i64::MAX as u64;

/// One caller-submitted cart line (unvalidated against the catalog).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: ProductId,
    pub amount: u32,
}

/// Create-order request as submitted by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrder {
    pub items: Option<Vec<CartItem>>,
    pub tax: Option<u64>,
    pub shipping_fee: Option<u64>,
}

/// A request that passed the structural checks; products not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCart {
    items: Vec<CartItem>,
    tax: u64,
    shipping_fee: u64,
}

impl CreateOrder {
    /// Structural validation.
    ///
    /// A zero tax or shipping fee counts as missing.
    pub fn validate(self) -> DomainResult<ValidatedCart> {
        let items = match self.items {
            Some(items) if !items.is_empty() => items,
            _ => return Err(DomainError::validation("no cart items provided")),
        };

        let (tax, shipping_fee) = match (self.tax, self.shipping_fee) {
            (Some(tax), Some(fee)) if tax != 0 && fee != 0 => (tax, fee),
            _ => return Err(DomainError::validation("no tax or shipping fee provided")),
        };

        if let Some(line) = items.iter().find(|line| line.amount == 0) {
            return Err(DomainError::validation(format!(
                "amount for product {} must be positive",
                line.product
            )));
        }

        Ok(ValidatedCart {
            items,
            tax,
            shipping_fee,
        })
    }
}

impl ValidatedCart {
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn tax(&self) -> u64 {
        self.tax
    }

    pub fn shipping_fee(&self) -> u64 {
        self.shipping_fee
    }

    /// Start an empty draft carrying this cart's tax and shipping fee.
    pub fn draft(&self) -> OrderDraft {
        OrderDraft {
            items: Vec::with_capacity(self.items.len()),
            subtotal: 0,
            tax: self.tax,
            shipping_fee: self.shipping_fee,
        }
    }
}

/// Priced order lines, accumulated one resolved product at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    items: Vec<OrderItem>,
    subtotal: u64,
    tax: u64,
    shipping_fee: u64,
}

impl OrderDraft {
    /// Snapshot `product` into a new line for `line.amount` units.
    pub fn add_line(&mut self, line: &CartItem, product: &Product) -> DomainResult<()> {
        if line.product != product.id {
            return Err(DomainError::validation(format!(
                "cart line references {} but resolved product is {}",
                line.product, product.id
            )));
        }

        let item = OrderItem {
            product: product.id,
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            amount: line.amount,
        };

        self.subtotal = item
            .line_total()
            .and_then(|line_total| self.subtotal.checked_add(line_total))
            .ok_or_else(|| DomainError::validation("order subtotal overflows"))?;
        self.items.push(item);
        Ok(())
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn subtotal(&self) -> u64 {
        self.subtotal
    }

    /// `tax + shipping_fee + subtotal`, capped at [`MAX_ORDER_TOTAL`].
    pub fn total(&self) -> DomainResult<u64> {
        self.tax
            .checked_add(self.shipping_fee)
            .and_then(|v| v.checked_add(self.subtotal))
            .filter(|total| *total <= MAX_ORDER_TOTAL)
            .ok_or_else(|| DomainError::validation("order total overflows"))
    }

    /// Finalize into a pending order owned by `user`.
    pub fn into_order(
        self,
        id: OrderId,
        user: UserId,
        client_secret: String,
        now: DateTime<Utc>,
    ) -> DomainResult<Order> {
        if self.items.is_empty() {
            return Err(DomainError::validation("no cart items provided"));
        }
        let total = self.total()?;

        Order::restore(OrderParts {
            id,
            items: self.items,
            subtotal: self.subtotal,
            tax: self.tax,
            shipping_fee: self.shipping_fee,
            total,
            client_secret,
            payment_intent_id: None,
            status: OrderStatus::Pending,
            user,
            created_at: now,
            updated_at: now,
        })
    }
}
