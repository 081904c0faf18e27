use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::Utc;
use storefront_auth::Principal;
use storefront_catalog::Product;
use storefront_core::{Currency, ProductId, ReviewId, UserId};
use storefront_infra::catalog::InMemoryProductCatalog;
use storefront_infra::payment::FakePaymentAuthorizer;
use storefront_infra::services::{OrderService, ReviewService};
use storefront_infra::store::{InMemoryOrderStore, InMemoryReviewStore, ReviewStore};
use storefront_orders::{CartItem, CreateOrder};
use storefront_reviews::{Review, ReviewContent};

fn products(count: usize) -> Vec<Product> {
    (0..count)
        .map(|i| Product {
            id: ProductId::new(),
            name: format!("product {i}"),
            price: 100 + i as u64,
            image: "/uploads/example.jpeg".to_string(),
            company: "ikea".to_string(),
            category: "office".to_string(),
        })
        .collect()
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("failed to build tokio runtime")
}

/// End-to-end order creation: validate, resolve each line, authorize, insert.
fn bench_create_order_by_cart_size(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("create_order_by_cart_size");

    for lines in [1usize, 10, 100].iter() {
        group.throughput(Throughput::Elements(*lines as u64));
        group.bench_with_input(BenchmarkId::new("in_memory", lines), lines, |b, &lines| {
            let catalog = products(lines);
            let cart: Vec<CartItem> = catalog.iter().map(|p| CartItem { product: p.id, amount: 2 }).collect();
            let service = OrderService::new(
                InMemoryProductCatalog::from_products(catalog),
                FakePaymentAuthorizer,
                InMemoryOrderStore::new(),
                Currency::new("PKR").expect("valid currency"),
            );
            let caller = Principal::user(UserId::new());

            b.iter(|| {
                let request = CreateOrder {
                    items: Some(cart.clone()),
                    tax: Some(10),
                    shipping_fee: Some(5),
                };
                rt.block_on(service.create_order(&caller, black_box(request)))
                    .expect("order should be created")
            });
        });
    }

    group.finish();
}

/// Listing every review joined with its product projection.
fn bench_list_all_reviews(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("list_all_reviews");

    for count in [10usize, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("joined", count), count, |b, &count| {
            let catalog = products(count / 10 + 1);
            let store = InMemoryReviewStore::new();
            rt.block_on(async {
                for i in 0..count {
                    let product = catalog[i % catalog.len()].id;
                    let content = ReviewContent::new(Some(4), Some("good".into()), Some("solid".into()))
                        .expect("valid review content");
                    let review = Review::new(ReviewId::new(), product, UserId::new(), content, Utc::now());
                    store.insert(review).await.expect("unique review");
                }
            });
            let service = ReviewService::new(InMemoryProductCatalog::from_products(catalog), store);

            b.iter(|| rt.block_on(service.list_all_reviews()).expect("listing should succeed"));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_create_order_by_cart_size, bench_list_all_reviews);
criterion_main!(benches);
