use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, Entity, OrderId, Owned, ProductId, UserId};

/// Order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
        }
    }
}

impl core::str::FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "paid" => Ok(OrderStatus::Paid),
            other => Err(DomainError::validation(format!("unknown order status '{other}'"))),
        }
    }
}

/// Order line: a snapshot of the catalog product at order time.
///
/// Later catalog edits never touch these values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product: ProductId,
    pub name: String,
    /// Unit price in smallest currency unit, copied from the catalog.
    pub price: u64,
    pub image: String,
    /// Quantity ordered.
    pub amount: u32,
}

impl OrderItem {
    pub fn line_total(&self) -> Option<u64> {
        self.price.checked_mul(u64::from(self.amount))
    }
}

/// Persistence form of an [`Order`]; used to rehydrate from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderParts {
    pub id: OrderId,
    pub items: Vec<OrderItem>,
    pub subtotal: u64,
    pub tax: u64,
    pub shipping_fee: u64,
    pub total: u64,
    pub client_secret: String,
    pub payment_intent_id: Option<String>,
    pub status: OrderStatus,
    pub user: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A placed order.
///
/// Everything except the payment confirmation is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    items: Vec<OrderItem>,
    subtotal: u64,
    tax: u64,
    shipping_fee: u64,
    total: u64,
    client_secret: String,
    payment_intent_id: Option<String>,
    status: OrderStatus,
    user: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    /// Rehydrate a stored order, re-checking the pricing invariant.
    pub fn restore(parts: OrderParts) -> DomainResult<Self> {
        let expected = parts
            .subtotal
            .checked_add(parts.tax)
            .and_then(|v| v.checked_add(parts.shipping_fee));
        if expected != Some(parts.total) {
            return Err(DomainError::validation(format!(
                "order {} total {} does not equal subtotal + tax + shipping fee",
                parts.id, parts.total
            )));
        }

        Ok(Self {
            id: parts.id,
            items: parts.items,
            subtotal: parts.subtotal,
            tax: parts.tax,
            shipping_fee: parts.shipping_fee,
            total: parts.total,
            client_secret: parts.client_secret,
            payment_intent_id: parts.payment_intent_id,
            status: parts.status,
            user: parts.user,
            created_at: parts.created_at,
            updated_at: parts.updated_at,
        })
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn subtotal(&self) -> u64 {
        self.subtotal
    }

    pub fn tax(&self) -> u64 {
        self.tax
    }

    pub fn shipping_fee(&self) -> u64 {
        self.shipping_fee
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Authorization handle returned by the payment processor.
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    pub fn payment_intent_id(&self) -> Option<&str> {
        self.payment_intent_id.as_deref()
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn user(&self) -> UserId {
        self.user
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Attach the payment confirmation and move `pending → paid`.
    pub fn mark_paid(&mut self, payment_intent_id: &str, now: DateTime<Utc>) -> DomainResult<()> {
        let payment_intent_id = payment_intent_id.trim();
        if payment_intent_id.is_empty() {
            return Err(DomainError::validation("no payment intent id provided"));
        }
        if self.status != OrderStatus::Pending {
            return Err(DomainError::conflict(format!("order {} is already paid", self.id)));
        }

        self.payment_intent_id = Some(payment_intent_id.to_string());
        self.status = OrderStatus::Paid;
        self.updated_at = now;
        Ok(())
    }

    pub fn into_parts(self) -> OrderParts {
        OrderParts {
            id: self.id,
            items: self.items,
            subtotal: self.subtotal,
            tax: self.tax,
            shipping_fee: self.shipping_fee,
            total: self.total,
            client_secret: self.client_secret,
            payment_intent_id: self.payment_intent_id,
            status: self.status,
            user: self.user,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Owned for Order {
    fn owner(&self) -> UserId {
        self.user
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts() -> OrderParts {
        let now = Utc::now();
        OrderParts {
            id: OrderId::new(),
            items: vec![OrderItem {
                product: ProductId::new(),
                name: "desk".into(),
                price: 100,
                image: "/uploads/desk.jpeg".into(),
                amount: 2,
            }],
            subtotal: 200,
            tax: 10,
            shipping_fee: 5,
            total: 215,
            client_secret: "secret".into(),
            payment_intent_id: None,
            status: OrderStatus::Pending,
            user: UserId::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn restore_rejects_inconsistent_total() {
        let bad = OrderParts { total: 216, ..parts() };
        assert!(matches!(Order::restore(bad), Err(DomainError::Validation(_))));
    }

    #[test]
    fn mark_paid_sets_intent_and_status() {
        let mut order = Order::restore(parts()).unwrap();
        let later = order.created_at() + chrono::Duration::seconds(5);

        order.mark_paid("pi_123", later).unwrap();

        assert_eq!(order.status(), OrderStatus::Paid);
        assert_eq!(order.payment_intent_id(), Some("pi_123"));
        assert_eq!(order.updated_at(), later);
        assert_eq!(order.total(), 215);
    }

    #[test]
    fn mark_paid_twice_is_a_conflict() {
        let mut order = Order::restore(parts()).unwrap();
        order.mark_paid("pi_1", Utc::now()).unwrap();

        let err = order.mark_paid("pi_2", Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(order.payment_intent_id(), Some("pi_1"));
    }

    #[test]
    fn mark_paid_requires_intent_id() {
        let mut order = Order::restore(parts()).unwrap();
        assert!(matches!(order.mark_paid("  ", Utc::now()), Err(DomainError::Validation(_))));
        assert_eq!(order.status(), OrderStatus::Pending);
    }

    #[test]
    fn into_parts_roundtrips_through_restore() {
        let original = parts();
        let order = Order::restore(original.clone()).unwrap();
        assert_eq!(order.into_parts(), original);
    }

    #[test]
    fn status_parses_from_storage_string() {
        assert_eq!("paid".parse::<OrderStatus>().unwrap(), OrderStatus::Paid);
        assert_eq!(OrderStatus::Pending.as_str(), "pending");
        assert!("refunded".parse::<OrderStatus>().is_err());
    }
}
