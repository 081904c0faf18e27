//! Integration tests wiring both services over shared trait-object ports.
//!
//! Verifies:
//! - Services work through `Arc<dyn ...>` the way the API holds them
//! - Orders and reviews read from the same catalog
//! - Ownership rules are identical across the two resources

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use storefront_auth::Principal;
    use storefront_catalog::Product;
    use storefront_core::{Currency, ProductId, UserId};
    use storefront_orders::{CartItem, CreateOrder, OrderStatus};

    use crate::catalog::{InMemoryProductCatalog, ProductCatalog};
    use crate::payment::{FakePaymentAuthorizer, PaymentAuthorizer};
    use crate::services::{OrderService, ReviewInput, ReviewService, ServiceError};
    use crate::store::{InMemoryOrderStore, InMemoryReviewStore, OrderStore, ReviewStore};

    type DynOrders = OrderService<Arc<dyn ProductCatalog>, Arc<dyn PaymentAuthorizer>, Arc<dyn OrderStore>>;
    type DynReviews = ReviewService<Arc<dyn ProductCatalog>, Arc<dyn ReviewStore>>;

    fn lamp() -> Product {
        Product {
            id: ProductId::new(),
            name: "lamp".into(),
            price: 1_500,
            image: "/uploads/lamp.jpeg".into(),
            company: "liddy".into(),
            category: "bedroom".into(),
        }
    }

    fn wire(products: Vec<Product>) -> (DynOrders, DynReviews) {
        let catalog: Arc<dyn ProductCatalog> = Arc::new(InMemoryProductCatalog::from_products(products));
        let payments: Arc<dyn PaymentAuthorizer> = Arc::new(FakePaymentAuthorizer);
        let orders: Arc<dyn OrderStore> = Arc::new(InMemoryOrderStore::new());
        let reviews: Arc<dyn ReviewStore> = Arc::new(InMemoryReviewStore::new());

        (
            OrderService::new(catalog.clone(), payments, orders, Currency::new("PKR").unwrap()),
            ReviewService::new(catalog, reviews),
        )
    }

    #[tokio::test]
    async fn buy_pay_then_review() {
        let lamp = lamp();
        let (orders, reviews) = wire(vec![lamp.clone()]);
        let buyer = Principal::user(UserId::new());

        let order = orders
            .create_order(
                &buyer,
                CreateOrder {
                    items: Some(vec![CartItem { product: lamp.id, amount: 2 }]),
                    tax: Some(300),
                    shipping_fee: Some(200),
                },
            )
            .await
            .unwrap();
        assert_eq!(order.total(), 3_500);

        let paid = orders.confirm_payment(order.id_typed(), "pi_lamp", &buyer).await.unwrap();
        assert_eq!(paid.status(), OrderStatus::Paid);
        assert_eq!(orders.list_orders_for_user(&buyer).await.unwrap(), vec![paid]);

        let review = reviews
            .create_review(
                lamp.id,
                ReviewInput {
                    rating: Some(5),
                    title: Some("bright".into()),
                    comment: Some("lights the whole room".into()),
                },
                &buyer,
            )
            .await
            .unwrap();

        let listed = reviews.list_all_reviews().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].review, review);
        assert_eq!(listed[0].product.as_ref().map(|p| p.price), Some(1_500));
    }

    #[tokio::test]
    async fn ownership_gate_is_shared() {
        let lamp = lamp();
        let (orders, reviews) = wire(vec![lamp.clone()]);
        let owner = Principal::user(UserId::new());
        let stranger = Principal::user(UserId::new());

        let order = orders
            .create_order(
                &owner,
                CreateOrder {
                    items: Some(vec![CartItem { product: lamp.id, amount: 1 }]),
                    tax: Some(1),
                    shipping_fee: Some(1),
                },
            )
            .await
            .unwrap();
        let review = reviews
            .create_review(
                lamp.id,
                ReviewInput {
                    rating: Some(3),
                    title: Some("fine".into()),
                    comment: Some("does the job".into()),
                },
                &owner,
            )
            .await
            .unwrap();

        let order_err = orders.get_order(order.id_typed(), &stranger).await.unwrap_err();
        let review_err = reviews.delete_review(review.id_typed(), &stranger).await.unwrap_err();

        assert!(matches!(order_err, ServiceError::Unauthorized(_)));
        assert_eq!(order_err, review_err);
        assert!(reviews.get_review(review.id_typed()).await.is_ok());
    }
}
