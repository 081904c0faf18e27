use serde::Deserialize;
use serde_json::json;

use storefront_core::{DomainError, ProductId};
use storefront_infra::services::ReviewInput;
use storefront_orders::{CartItem, CreateOrder, Order};
use storefront_reviews::{Review, ReviewWithProduct};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CartItemRequest {
    pub product: String,
    pub amount: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Option<Vec<CartItemRequest>>,
    pub tax: Option<u64>,
    pub shipping_fee: Option<u64>,
}

impl CreateOrderRequest {
    /// Parse product references; everything else is checked by the order service.
    pub fn into_command(self) -> Result<CreateOrder, DomainError> {
        let items = self
            .items
            .map(|items| {
                items
                    .into_iter()
                    .map(|line| {
                        Ok(CartItem {
                            product: line.product.parse()?,
                            amount: line.amount,
                        })
                    })
                    .collect::<Result<Vec<_>, DomainError>>()
            })
            .transpose()?;

        Ok(CreateOrder {
            items,
            tax: self.tax,
            shipping_fee: self.shipping_fee,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    pub payment_intent_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub product: Option<String>,
    pub rating: Option<u8>,
    pub title: Option<String>,
    pub comment: Option<String>,
}

impl CreateReviewRequest {
    pub fn into_parts(self) -> Result<(ProductId, ReviewInput), DomainError> {
        let product = self
            .product
            .ok_or_else(|| DomainError::validation("please provide product"))?
            .parse()?;
        Ok((
            product,
            ReviewInput {
                rating: self.rating,
                title: self.title,
                comment: self.comment,
            },
        ))
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateReviewRequest {
    pub rating: Option<u8>,
    pub title: Option<String>,
    pub comment: Option<String>,
}

impl From<UpdateReviewRequest> for ReviewInput {
    fn from(value: UpdateReviewRequest) -> Self {
        ReviewInput {
            rating: value.rating,
            title: value.title,
            comment: value.comment,
        }
    }
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn order_to_json(order: &Order) -> serde_json::Value {
    let items = order
        .items()
        .iter()
        .map(|item| {
            json!({
                "product": item.product.to_string(),
                "name": item.name,
                "price": item.price,
                "image": item.image,
                "amount": item.amount,
            })
        })
        .collect::<Vec<_>>();

    json!({
        "id": order.id_typed().to_string(),
        "orderItems": items,
        "subtotal": order.subtotal(),
        "tax": order.tax(),
        "shippingFee": order.shipping_fee(),
        "total": order.total(),
        "clientSecret": order.client_secret(),
        "paymentIntentId": order.payment_intent_id(),
        "status": order.status().as_str(),
        "user": order.user().to_string(),
        "createdAt": order.created_at(),
        "updatedAt": order.updated_at(),
    })
}

pub fn orders_to_json(orders: &[Order]) -> serde_json::Value {
    json!({
        "orders": orders.iter().map(order_to_json).collect::<Vec<_>>(),
        "count": orders.len(),
    })
}

pub fn review_to_json(review: &Review) -> serde_json::Value {
    json!({
        "id": review.id_typed().to_string(),
        "product": review.product().to_string(),
        "user": review.user().to_string(),
        "rating": review.rating().value(),
        "title": review.title(),
        "comment": review.comment(),
        "createdAt": review.created_at(),
        "updatedAt": review.updated_at(),
    })
}

pub fn reviews_to_json(reviews: &[Review]) -> serde_json::Value {
    json!({
        "reviews": reviews.iter().map(review_to_json).collect::<Vec<_>>(),
        "count": reviews.len(),
    })
}

/// Same as [`review_to_json`] but `product` becomes `{id, name, price}` when
/// the product still resolves.
pub fn review_with_product_to_json(entry: &ReviewWithProduct) -> serde_json::Value {
    let mut value = review_to_json(&entry.review);
    if let Some(summary) = &entry.product {
        value["product"] = json!({
            "id": summary.id.to_string(),
            "name": summary.name,
            "price": summary.price,
        });
    }
    value
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use storefront_catalog::ProductSummary;
    use storefront_core::{ReviewId, UserId};
    use storefront_reviews::ReviewContent;

    use super::*;

    #[test]
    fn create_order_request_reads_camel_case() {
        let product = ProductId::new();
        let body = json!({
            "items": [{ "product": product.to_string(), "amount": 2 }],
            "tax": 10,
            "shippingFee": 5,
        });
        let request: CreateOrderRequest = serde_json::from_value(body).unwrap();
        let command = request.into_command().unwrap();

        assert_eq!(command.items, Some(vec![CartItem { product, amount: 2 }]));
        assert_eq!(command.tax, Some(10));
        assert_eq!(command.shipping_fee, Some(5));
    }

    #[test]
    fn bad_product_reference_is_invalid_id() {
        let request: CreateOrderRequest =
            serde_json::from_value(json!({ "items": [{ "product": "nope", "amount": 1 }] })).unwrap();
        assert!(matches!(request.into_command(), Err(DomainError::InvalidId(_))));
    }

    #[test]
    fn create_review_requires_product() {
        let request: CreateReviewRequest = serde_json::from_value(json!({ "rating": 5 })).unwrap();
        assert!(matches!(request.into_parts(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn enriched_review_embeds_product_summary() {
        let product = ProductId::new();
        let review = Review::new(
            ReviewId::new(),
            product,
            UserId::new(),
            ReviewContent::new(Some(4), Some("nice".into()), Some("really".into())).unwrap(),
            Utc::now(),
        );

        let bare = review_with_product_to_json(&ReviewWithProduct {
            review: review.clone(),
            product: None,
        });
        assert_eq!(bare["product"], json!(product.to_string()));

        let joined = review_with_product_to_json(&ReviewWithProduct {
            review,
            product: Some(ProductSummary {
                id: product,
                name: "sofa".into(),
                price: 4_000,
            }),
        });
        assert_eq!(joined["product"]["name"], "sofa");
        assert_eq!(joined["product"]["price"], 4_000);
        assert_eq!(joined["rating"], 4);
    }
}
