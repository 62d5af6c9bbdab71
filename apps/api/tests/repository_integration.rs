//! Integration tests for the PostgreSQL repositories
//!
//! These tests need a live database and are ignored by default:
//!
//! ```text
//! DATABASE_URL=postgres://localhost/storefront_test cargo test -- --ignored
//! ```
//!
//! Every test works on freshly generated names so runs do not collide.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use storefront_api::auth::password::hash_password;
use storefront_api::domain::cart::{Cart, CartItem};
use storefront_api::domain::checkout::CheckoutSummary;
use storefront_api::domain::coupon::{Coupon, DiscountType, NewCoupon};
use storefront_api::domain::inventory::InventoryItem;
use storefront_api::domain::order::{
    Order, OrderDraft, OrderLine, OrderStatus, Payment, PaymentMethod, PaymentStatus,
    ShippingAddress,
};
use storefront_api::domain::pagination::PageRequest;
use storefront_api::domain::product::{
    Category, NewCategory, NewProduct, Product, ProductFilter, Variant,
};
use storefront_api::domain::repositories::{
    CartRepository, CatalogRepository, CouponRepository, InventoryRepository, OrderRepository,
    Placement, ProductRepository, RepositoryError, UserRepository,
};
use storefront_api::domain::user::{NewAddress, Profile, User, Username};
use storefront_api::infrastructure::db::{create_pool, run_migrations};
use storefront_api::infrastructure::repositories::{
    PostgresCartRepository, PostgresCouponRepository, PostgresInventoryRepository,
    PostgresOrderRepository, PostgresProductRepository, PostgresUserRepository,
};

/// Set up test database connection pool with the schema applied
async fn setup_test_db() -> PgPool {
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

    let pool = create_pool(&database_url, 5)
        .await
        .expect("Failed to connect to test database");
    run_migrations(&pool).await.expect("Failed to run migrations");
    pool
}

fn unique(prefix: &str) -> String {
    format!("{prefix}{}", &Uuid::new_v4().simple().to_string()[..8])
}

async fn create_user(pool: &PgPool) -> User {
    let hash = hash_password("secret123", 4).expect("hash password");
    let user = User::new(
        Username::new(unique("user")).unwrap(),
        hash,
        Profile::default(),
    );
    PostgresUserRepository::new(pool.clone())
        .create(&user)
        .await
        .expect("Failed to create test user");
    user
}

/// A one-variant product with `stock` units and its inventory row
async fn create_product(pool: &PgPool, stock: i32) -> Product {
    let catalog = PostgresProductRepository::new(pool.clone());
    let category = Category::new(NewCategory {
        name: unique("category"),
        ..Default::default()
    })
    .unwrap();
    catalog.create_category(&category).await.unwrap();

    let sku = unique("SKU-");
    let product = Product::new(NewProduct {
        name: unique("Tee "),
        description: "Cotton tee".into(),
        base_price: Some(Decimal::from(499)),
        category: Some(category.id),
        brand: "Acme".into(),
        variants: vec![Variant {
            size: Some("M".into()),
            color: None,
            sku,
            price: Decimal::from(499),
            stock,
        }],
        images: vec![],
        is_featured: false,
    })
    .unwrap();
    ProductRepository::create(&catalog, &product).await.unwrap();

    let rows: Vec<_> = product
        .variants
        .iter()
        .map(|v| InventoryItem::new(product.id, v.into(), v.stock))
        .collect();
    PostgresInventoryRepository::new(pool.clone())
        .ensure(&rows)
        .await
        .unwrap();
    product
}

fn draft(user: &User, product: &Product, quantity: i32, intent: Option<String>) -> Order {
    let variant = &product.variants[0];
    let subtotal = variant.price * Decimal::from(quantity);
    let summary = CheckoutSummary::compute(subtotal, "Kerala", Decimal::ZERO);
    Order::new(OrderDraft {
        user_id: user.id,
        lines: vec![OrderLine {
            product_id: product.id,
            product_name: product.name.clone(),
            variant: variant.into(),
            quantity,
            price: variant.price,
        }],
        shipping_address: ShippingAddress {
            state: "Kerala".into(),
            ..Default::default()
        },
        summary,
        coupon_code: None,
        payment: Payment {
            method: PaymentMethod::Card,
            payment_intent_id: intent,
            status: PaymentStatus::Completed,
            amount: summary.total,
            transaction_id: None,
        },
        status: OrderStatus::Confirmed,
        notes: None,
    })
    .unwrap()
}

async fn stock(pool: &PgPool, product: &Product) -> i32 {
    PostgresInventoryRepository::new(pool.clone())
        .find_by_variant(product.id, &product.variants[0].sku)
        .await
        .unwrap()
        .unwrap()
        .quantity
}

#[tokio::test]
#[ignore]
async fn test_user_repository_roundtrip() {
    let pool = setup_test_db().await;
    let repo = PostgresUserRepository::new(pool.clone());
    let mut user = create_user(&pool).await;

    let found = repo
        .find_by_username(user.username.as_str())
        .await
        .unwrap()
        .expect("user exists");
    assert_eq!(found.id, user.id);
    assert!(found.addresses.is_empty());

    user.add_address(NewAddress {
        full_name: "Asha Rao".into(),
        state: "Goa".into(),
        is_default: true,
        ..Default::default()
    });
    user.profile.first_name = Some("Asha".into());
    repo.update(&user).await.unwrap();
    repo.record_login(user.id).await.unwrap();

    let found = repo.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(found.addresses.len(), 1);
    assert_eq!(found.addresses[0].country, "India");
    assert_eq!(found.profile.first_name.as_deref(), Some("Asha"));
    assert!(found.last_login.is_some());

    let duplicate = repo.create(&user).await;
    assert!(matches!(duplicate, Err(RepositoryError::Conflict(_))));

    repo.delete(user.id).await.unwrap();
    assert!(repo.find_by_id(user.id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore]
async fn test_product_listing_and_rating() {
    let pool = setup_test_db().await;
    let repo = PostgresProductRepository::new(pool.clone());
    let product = create_product(&pool, 5).await;

    let filter = ProductFilter {
        active: Some(true),
        search: Some(product.name.clone()),
        ..Default::default()
    };
    let page = repo.list(&filter, PageRequest::default()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].variants[0].sku, product.variants[0].sku);

    repo.set_rating(
        product.id,
        storefront_api::domain::product::Rating {
            average: 4.5,
            count: 2,
        },
    )
    .await
    .unwrap();
    let found = repo.find_by_id(product.id).await.unwrap().unwrap();
    assert_eq!(found.rating.count, 2);
    assert!((found.rating.average - 4.5).abs() < f64::EPSILON);
}

#[tokio::test]
#[ignore]
async fn test_place_reserves_stock_and_clears_cart() {
    let pool = setup_test_db().await;
    let orders = PostgresOrderRepository::new(pool.clone());
    let carts = PostgresCartRepository::new(pool.clone());
    let user = create_user(&pool).await;
    let product = create_product(&pool, 5).await;

    let mut cart = Cart::new(user.id);
    cart.push(CartItem {
        id: Uuid::new_v4(),
        product_id: product.id,
        product_name: product.name.clone(),
        image: None,
        variant: (&product.variants[0]).into(),
        quantity: 2,
        price: product.variants[0].price,
    });
    carts.save(&cart).await.unwrap();

    let order = orders
        .place(
            draft(&user, &product, 2, None),
            Placement {
                coupon_code: None,
                clear_cart: true,
            },
        )
        .await
        .unwrap();
    assert!(order.order_number.starts_with("ORD-"));
    assert_eq!(stock(&pool, &product).await, 3);
    assert!(carts.find_by_user(user.id).await.unwrap().unwrap().is_empty());

    let too_many = orders
        .place(draft(&user, &product, 4, None), Placement::default())
        .await;
    assert!(matches!(too_many, Err(RepositoryError::Conflict(_))));
    assert_eq!(stock(&pool, &product).await, 3);

    let mut cancelled = orders.find_by_id(order.id).await.unwrap().unwrap();
    cancelled.cancel(None).unwrap();
    orders.cancel(&cancelled).await.unwrap();
    assert_eq!(stock(&pool, &product).await, 5);

    // a second cancel from a stale read must not restock again
    let again = orders.cancel(&cancelled).await;
    assert!(matches!(again, Err(RepositoryError::Conflict(_))));
    assert_eq!(stock(&pool, &product).await, 5);
    assert_eq!(
        orders.find_by_id(order.id).await.unwrap().unwrap().status,
        OrderStatus::Cancelled
    );
}

#[tokio::test]
#[ignore]
async fn test_payment_intent_is_unique() {
    let pool = setup_test_db().await;
    let orders = PostgresOrderRepository::new(pool.clone());
    let user = create_user(&pool).await;
    let product = create_product(&pool, 5).await;
    let intent = unique("pi_test_");

    let first = orders
        .place(draft(&user, &product, 1, Some(intent.clone())), Placement::default())
        .await
        .unwrap();
    let second = orders
        .place(draft(&user, &product, 1, Some(intent.clone())), Placement::default())
        .await;
    assert!(matches!(second, Err(RepositoryError::Conflict(_))));
    assert_eq!(stock(&pool, &product).await, 4);

    let found = orders.find_by_payment_intent(&intent).await.unwrap().unwrap();
    assert_eq!(found.id, first.id);
}

#[tokio::test]
#[ignore]
async fn test_place_redeems_coupon() {
    let pool = setup_test_db().await;
    let orders = PostgresOrderRepository::new(pool.clone());
    let coupons = PostgresCouponRepository::new(pool.clone());
    let user = create_user(&pool).await;
    let product = create_product(&pool, 5).await;

    let coupon = Coupon::new(NewCoupon {
        code: unique("save"),
        description: None,
        discount_type: DiscountType::Fixed,
        discount_value: Decimal::from(50),
        minimum_amount: Decimal::ZERO,
        maximum_discount: None,
        usage_limit: Some(1),
        valid_from: None,
        valid_until: Utc::now() + Duration::days(30),
    })
    .unwrap();
    coupons.create(&coupon).await.unwrap();

    let placement = Placement {
        coupon_code: Some(coupon.code.to_lowercase()),
        clear_cart: false,
    };
    orders
        .place(draft(&user, &product, 1, None), placement.clone())
        .await
        .unwrap();
    let used = coupons.find_by_id(coupon.id).await.unwrap().unwrap();
    assert_eq!(used.used_count, 1);

    let exhausted = orders.place(draft(&user, &product, 1, None), placement).await;
    assert!(matches!(exhausted, Err(RepositoryError::Conflict(_))));
    assert_eq!(stock(&pool, &product).await, 4);
}
