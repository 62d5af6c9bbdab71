use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::api::handlers::{
    admin, auth, cart, checkout, coupons, health, orders, payment, products, reviews, users,
};
use crate::state::AppState;

/// Builds the full `/api` router over `state`
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_check))
        .nest("/api/auth", auth_routes())
        .nest("/api/users", user_routes())
        .nest("/api/products", product_routes())
        .nest("/api/cart", cart_routes())
        .route("/api/checkout/calculate", post(checkout::calculate))
        .nest("/api/payment", payment_routes())
        .nest("/api/orders", order_routes())
        .nest("/api/coupons", coupon_routes())
        .nest("/api/reviews", review_routes())
        .nest("/api/admin", admin_routes())
        .fallback(health::not_found)
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(users::get_profile).patch(users::update_profile))
        .route("/change-password", patch(users::change_password))
        .route("/addresses", get(users::list_addresses).post(users::add_address))
        .route(
            "/addresses/:addressId",
            patch(users::update_address).delete(users::delete_address),
        )
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list_products).post(products::create_product))
        .route(
            "/categories",
            get(products::list_categories).post(products::create_category),
        )
        .route("/brands", get(products::list_brands).post(products::create_brand))
        .route(
            "/:id",
            get(products::get_product)
                .patch(products::update_product)
                .delete(products::delete_product),
        )
}

fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::get_cart))
        .route("/add", post(cart::add_item))
        .route(
            "/items/:itemId",
            patch(cart::update_item).delete(cart::remove_item),
        )
        .route("/clear", delete(cart::clear_cart))
}

fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/methods", get(payment::payment_methods))
        .route("/create-intent", post(payment::create_intent))
        .route("/success", post(payment::payment_success))
        .route("/failure", post(payment::payment_failure))
}

fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list_orders).post(orders::create_order))
        .route("/:id", get(orders::get_order))
        .route("/:id/cancel", patch(orders::cancel_order))
        .route("/:id/return", patch(orders::return_order))
        .route("/:id/invoice", get(orders::invoice))
        .route("/:id/status", patch(orders::update_status))
}

fn coupon_routes() -> Router<AppState> {
    Router::new()
        .route("/validate", post(coupons::validate_coupon))
        .route("/", get(coupons::list_coupons).post(coupons::create_coupon))
        .route(
            "/:id",
            patch(coupons::update_coupon).delete(coupons::delete_coupon),
        )
}

fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(reviews::create_review))
        .route("/product/:productId", get(reviews::product_reviews))
        .route("/my-reviews", get(reviews::my_reviews))
        .route("/:reviewId/helpful", patch(reviews::toggle_helpful))
        .route("/admin/pending", get(reviews::pending_reviews))
        .route("/admin/:reviewId/moderate", patch(reviews::moderate_review))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/analytics/sales", get(admin::sales_analytics))
        .route("/analytics/customers", get(admin::customer_analytics))
        .route("/users", get(admin::list_users))
        .route(
            "/users/:id",
            get(admin::get_user)
                .patch(admin::update_user)
                .delete(admin::delete_user),
        )
        .route(
            "/products",
            get(admin::list_products).post(admin::create_product),
        )
        .route(
            "/products/:id",
            get(admin::get_product)
                .patch(admin::update_product)
                .delete(admin::delete_product),
        )
        .route("/orders", get(admin::list_orders))
        .route("/orders/:id", get(admin::get_order))
        .route("/orders/:id/status", patch(admin::update_order_status))
        .route("/inventory", get(admin::list_inventory))
        .route("/inventory/:id", patch(admin::update_inventory))
        .route(
            "/categories",
            get(admin::list_categories).post(admin::create_category),
        )
        .route("/categories/:id", patch(admin::update_category))
        .route("/reviews/pending", get(reviews::pending_reviews))
        .route("/reviews/:id/moderate", patch(reviews::moderate_review))
        .route("/coupons", get(admin::list_coupons).post(coupons::create_coupon))
        .route("/coupons/:id", patch(coupons::update_coupon))
}
