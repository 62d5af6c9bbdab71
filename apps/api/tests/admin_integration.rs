//! Coupon, review and back-office HTTP tests

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{money, TestApp};

/// Places and delivers an order for `token`; returns the order id
async fn delivered_order(app: &TestApp, admin: &str, token: &str, product: &Value, quantity: i32) -> String {
    let res = app
        .post(
            "/api/orders",
            Some(token),
            json!({
                "items": [{ "productId": product["id"], "variant": { "sku": format!("{}-M", product["name"].as_str().unwrap()) }, "quantity": quantity }],
                "shippingAddress": { "fullName": "Asha Rao", "street": "12 MG Road", "city": "Pune", "state": "Kerala", "zipCode": "682001", "phone": "9876543210" },
                "payment": { "method": "cod" }
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    let id = res.body["data"]["order"]["id"].as_str().unwrap().to_string();
    let res = app.set_order_status(admin, &id, "delivered").await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    id
}

#[tokio::test]
async fn test_validate_coupon() {
    let app = TestApp::new();
    let admin = app.admin().await;
    app.coupon(&admin, "welcome20", "percentage", "20", "1000").await;

    let res = app
        .post("/api/coupons/validate", None, json!({ "code": "WELCOME20", "totalAmount": "1500" }))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let coupon = &res.body["data"]["coupon"];
    assert_eq!(coupon["code"], "WELCOME20");
    assert_eq!(coupon["discountType"], "percentage");
    assert_eq!(money(&coupon["discountAmount"]), 300.0);

    let res = app
        .post("/api/coupons/validate", None, json!({ "code": "welcome20", "totalAmount": "500" }))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Minimum order amount of 1000 required");

    let res = app
        .post("/api/coupons/validate", None, json!({ "code": "MISSING", "totalAmount": "500" }))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Invalid coupon code");
}

#[tokio::test]
async fn test_coupon_admin_lifecycle() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let coupon = app.coupon(&admin, "FLAT50", "fixed", "50", "0").await;
    let id = coupon["id"].as_str().unwrap();

    let duplicate = app
        .post(
            "/api/coupons",
            Some(&admin),
            json!({ "code": "flat50", "discountType": "fixed", "discountValue": "10", "validUntil": "2099-01-01T00:00:00Z" }),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);

    let invalid = app
        .post(
            "/api/coupons",
            Some(&admin),
            json!({ "code": "BIG", "discountType": "percentage", "discountValue": "150", "validUntil": "2099-01-01T00:00:00Z" }),
        )
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    assert!(invalid.body["message"]
        .as_str()
        .unwrap()
        .contains("Percentage discount cannot exceed 100"));

    let res = app
        .patch(&format!("/api/coupons/{id}"), Some(&admin), json!({ "discountValue": "75" }))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(money(&res.body["data"]["coupon"]["discountValue"]), 75.0);

    let res = app.delete(&format!("/api/coupons/{id}"), Some(&admin)).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    let active = app.get("/api/coupons", Some(&admin)).await;
    assert_eq!(active.body["results"], 0);

    let all = app.get("/api/admin/coupons", Some(&admin)).await;
    assert_eq!(all.body["results"], 1);
    assert_eq!(all.body["data"]["coupons"][0]["isActive"], false);

    let res = app
        .post("/api/coupons/validate", None, json!({ "code": "FLAT50", "totalAmount": "500" }))
        .await;
    assert_eq!(res.body["message"], "Invalid coupon code");
}

#[tokio::test]
async fn test_review_requires_delivered_order() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let token = app.customer("shopper").await;
    let product = app.product(&admin, "Tee", "499", 5).await;
    let other = app.product(&admin, "Cap", "299", 5).await;

    let res = app
        .post(
            "/api/orders",
            Some(&token),
            json!({
                "items": [{ "productId": product["id"], "variant": { "sku": "Tee-M" }, "quantity": 1 }],
                "shippingAddress": { "state": "Kerala" },
                "payment": { "method": "cod" }
            }),
        )
        .await;
    let pending = res.body["data"]["order"]["id"].clone();

    let review = |order: Value, product: Value| {
        json!({ "orderId": order, "productId": product, "rating": 4, "title": "Nice", "comment": "Fits well" })
    };

    let res = app
        .post("/api/reviews", Some(&token), review(pending, product["id"].clone()))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Order not found or not delivered");

    let delivered = delivered_order(&app, &admin, &token, &product, 1).await;
    let res = app
        .post("/api/reviews", Some(&token), review(json!(delivered), other["id"].clone()))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Product not found in this order");

    let res = app
        .post("/api/reviews", Some(&token), review(json!(delivered), product["id"].clone()))
        .await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    let created = &res.body["data"]["review"];
    assert_eq!(created["author"], "shopper");
    assert_eq!(created["isVerifiedPurchase"], true);
    assert_eq!(created["isApproved"], false);

    let res = app
        .post("/api/reviews", Some(&token), review(json!(delivered), product["id"].clone()))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        res.body["message"],
        "You have already reviewed this product for this order"
    );

    let intruder = app.customer("intruder").await;
    let res = app
        .post("/api/reviews", Some(&intruder), review(json!(delivered), product["id"].clone()))
        .await;
    assert_eq!(res.body["message"], "Order not found or not delivered");
}

#[tokio::test]
async fn test_review_moderation_updates_rating() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let token = app.customer("shopper").await;
    let product = app.product(&admin, "Tee", "499", 5).await;
    let product_id = product["id"].as_str().unwrap().to_string();
    let order = delivered_order(&app, &admin, &token, &product, 1).await;

    let res = app
        .post(
            "/api/reviews",
            Some(&token),
            json!({ "orderId": order, "productId": product_id, "rating": 5, "title": "Great", "comment": "Soft fabric" }),
        )
        .await;
    let review_id = res.body["data"]["review"]["id"].as_str().unwrap().to_string();

    let public = app.get(&format!("/api/reviews/product/{product_id}"), None).await;
    assert_eq!(public.status, StatusCode::OK);
    assert_eq!(public.body["results"], 0);
    assert_eq!(public.body["data"]["ratingSummary"]["count"], 0);

    let pending = app.get("/api/admin/reviews/pending", Some(&admin)).await;
    assert_eq!(pending.body["results"], 1);

    let res = app
        .patch(
            &format!("/api/reviews/admin/{review_id}/moderate"),
            Some(&admin),
            json!({ "action": "approve", "response": "Thanks!" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["review"]["isApproved"], true);
    assert_eq!(res.body["data"]["review"]["adminResponse"]["message"], "Thanks!");

    let pending = app.get("/api/reviews/admin/pending", Some(&admin)).await;
    assert_eq!(pending.body["results"], 0);

    let public = app.get(&format!("/api/reviews/product/{product_id}"), None).await;
    assert_eq!(public.body["results"], 1);
    let summary = &public.body["data"]["ratingSummary"];
    assert_eq!(summary["count"], 1);
    assert_eq!(summary["average"], 5.0);
    assert_eq!(summary["5"], 1);

    let product = app.get(&format!("/api/products/{product_id}"), None).await;
    assert_eq!(product.body["data"]["product"]["rating"]["average"], 5.0);
    assert_eq!(product.body["data"]["product"]["rating"]["count"], 1);

    let res = app
        .patch(
            &format!("/api/admin/reviews/{review_id}/moderate"),
            Some(&admin),
            json!({ "action": "reject" }),
        )
        .await;
    assert_eq!(res.body["data"]["review"]["isApproved"], false);
    let product = app.get(&format!("/api/products/{product_id}"), None).await;
    assert_eq!(product.body["data"]["product"]["rating"]["count"], 0);

    let mine = app.get("/api/reviews/my-reviews", Some(&token)).await;
    assert_eq!(mine.body["results"], 1);
}

#[tokio::test]
async fn test_review_helpful_toggle() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let token = app.customer("shopper").await;
    let reader = app.customer("reader").await;
    let product = app.product(&admin, "Tee", "499", 5).await;
    let order = delivered_order(&app, &admin, &token, &product, 1).await;

    let res = app
        .post(
            "/api/reviews",
            Some(&token),
            json!({ "orderId": order, "productId": product["id"], "rating": 3, "title": "Okay", "comment": "Runs small" }),
        )
        .await;
    let id = res.body["data"]["review"]["id"].as_str().unwrap().to_string();

    let res = app
        .patch(&format!("/api/reviews/{id}/helpful"), Some(&reader), json!({}))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["helpfulCount"], 1);
    assert_eq!(res.body["data"]["action"], "added");

    let res = app
        .patch(&format!("/api/reviews/{id}/helpful"), Some(&reader), json!({}))
        .await;
    assert_eq!(res.body["data"]["helpfulCount"], 0);
    assert_eq!(res.body["data"]["action"], "removed");

    let res = app
        .patch(
            &format!("/api/reviews/{}/helpful", uuid::Uuid::new_v4()),
            Some(&reader),
            json!({}),
        )
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["message"], "Review not found");
}

#[tokio::test]
async fn test_dashboard() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let token = app.customer("shopper").await;
    let product = app.product(&admin, "Tee", "499", 5).await;

    delivered_order(&app, &admin, &token, &product, 2).await;
    let res = app
        .post(
            "/api/orders",
            Some(&token),
            json!({
                "items": [{ "productId": product["id"], "variant": { "sku": "Tee-L" }, "quantity": 1 }],
                "shippingAddress": { "state": "Kerala" },
                "payment": { "method": "cod" }
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);

    let res = app.get("/api/admin/dashboard", Some(&admin)).await;
    assert_eq!(res.status, StatusCode::OK);
    let data = &res.body["data"];
    let stats = &data["stats"];
    assert_eq!(stats["totalUsers"], 2);
    assert_eq!(stats["totalProducts"], 1);
    assert_eq!(stats["totalOrders"], 2);
    assert_eq!(stats["todayOrders"], 2);
    // 998 + 50 shipping + 179.64 tax, delivered orders only
    assert_eq!(money(&stats["totalRevenue"]), 1227.64);
    assert_eq!(money(&stats["todayRevenue"]), 1227.64);
    assert_eq!(stats["lowStockProducts"], 2);
    assert_eq!(stats["pendingReviews"], 0);

    assert_eq!(data["orderStatusStats"].as_array().unwrap().len(), 2);
    assert_eq!(data["topProducts"][0]["name"], "Tee");
    assert_eq!(data["topProducts"][0]["totalSold"], 3);
    assert_eq!(data["recentOrders"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_sales_and_customer_analytics() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let token = app.customer("shopper").await;
    let product = app.product(&admin, "Tee", "499", 5).await;
    delivered_order(&app, &admin, &token, &product, 2).await;

    let res = app.get("/api/admin/analytics/sales?period=day", Some(&admin)).await;
    assert_eq!(res.status, StatusCode::OK);
    let data = &res.body["data"];
    assert_eq!(data["period"], "day");
    let buckets = data["salesData"].as_array().unwrap();
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0]["orders"], 1);
    assert_eq!(buckets[0]["uniqueCustomers"], 1);
    assert_eq!(money(&buckets[0]["revenue"]), 1227.64);

    let res = app.get("/api/admin/analytics/sales", Some(&admin)).await;
    assert_eq!(res.body["data"]["period"], "month");

    let res = app.get("/api/admin/analytics/customers", Some(&admin)).await;
    assert_eq!(res.status, StatusCode::OK);
    let data = &res.body["data"];
    assert_eq!(data["topCustomers"][0]["username"], "shopper");
    assert_eq!(data["topCustomers"][0]["orderCount"], 1);
    assert_eq!(data["retention"]["totalCustomers"], 1);
    assert_eq!(data["retention"]["repeatCustomers"], 0);
}

#[tokio::test]
async fn test_admin_user_management() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let token = app.customer("shopper").await;
    app.customer("another").await;

    let res = app.get("/api/admin/users?search=shop", Some(&admin)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["results"], 1);
    let id = res.body["data"]["users"][0]["id"].as_str().unwrap().to_string();

    let res = app.get(&format!("/api/admin/users/{id}"), Some(&admin)).await;
    assert_eq!(res.body["data"]["user"]["username"], "shopper");
    assert!(res.body["data"]["orders"].as_array().unwrap().is_empty());

    let res = app
        .patch(&format!("/api/admin/users/{id}"), Some(&admin), json!({ "isActive": false }))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["user"]["isActive"], false);

    let res = app.get("/api/users/profile", Some(&token)).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        res.body["message"],
        "Your account has been deactivated. Please contact support."
    );

    let me = app.get("/api/users/profile", Some(&admin)).await;
    let admin_id = me.body["data"]["user"]["id"].as_str().unwrap().to_string();
    let res = app.delete(&format!("/api/admin/users/{admin_id}"), Some(&admin)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "You cannot delete your own account");
}

#[tokio::test]
async fn test_admin_products_include_inactive() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let product = app.product(&admin, "Tee", "499", 5).await;
    app.product(&admin, "Cap", "299", 5).await;
    let id = product["id"].as_str().unwrap();

    let res = app.delete(&format!("/api/admin/products/{id}"), Some(&admin)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["product"]["isActive"], false);

    let all = app.get("/api/admin/products", Some(&admin)).await;
    assert_eq!(all.body["results"], 2);
    let inactive = app.get("/api/admin/products?status=inactive", Some(&admin)).await;
    assert_eq!(inactive.body["results"], 1);
    let active = app.get("/api/admin/products?status=active", Some(&admin)).await;
    assert_eq!(active.body["results"], 1);

    let res = app.get(&format!("/api/admin/products/{id}"), Some(&admin)).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_orders() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let token = app.customer("shopper").await;
    let product = app.product(&admin, "Tee", "499", 5).await;
    let id = delivered_order(&app, &admin, &token, &product, 1).await;

    let res = app.get("/api/admin/orders?status=delivered", Some(&admin)).await;
    assert_eq!(res.body["results"], 1);
    let res = app.get("/api/admin/orders?search=shopper", Some(&admin)).await;
    assert_eq!(res.body["results"], 1);
    let res = app.get("/api/admin/orders?status=pending", Some(&admin)).await;
    assert_eq!(res.body["results"], 0);

    let res = app.get(&format!("/api/admin/orders/{id}"), Some(&admin)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["customer"]["username"], "shopper");
    assert_eq!(res.body["data"]["order"]["status"], "delivered");

    let res = app
        .patch(&format!("/api/admin/orders/{id}/status"), Some(&admin), json!({ "status": "teleported" }))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_inventory() {
    let app = TestApp::new();
    let admin = app.admin().await;
    app.product(&admin, "Tee", "499", 5).await;
    app.product(&admin, "Hoodie", "1499", 50).await;

    let res = app.get("/api/admin/inventory", Some(&admin)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["results"], 4);
    assert_eq!(res.body["pagination"]["total"], 4);
    assert!(res.body["data"]["inventory"][0]["product"]["name"].is_string());

    let low = app.get("/api/admin/inventory?lowStock=true", Some(&admin)).await;
    assert_eq!(low.body["results"], 2);
    let row = low.body["data"]["inventory"][0].clone();
    assert_eq!(row["product"]["name"], "Tee");
    assert_eq!(row["isLowStock"], true);
    let id = row["id"].as_str().unwrap();

    let res = app
        .patch(&format!("/api/admin/inventory/{id}"), Some(&admin), json!({ "quantity": 40 }))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let item = &res.body["data"]["inventory"];
    assert_eq!(item["quantity"], 40);
    assert_eq!(item["isLowStock"], false);
    assert!(item["lastRestocked"].is_string());

    let res = app
        .patch(&format!("/api/admin/inventory/{id}"), Some(&admin), json!({ "quantity": -1 }))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .patch(
            &format!("/api/admin/inventory/{}", uuid::Uuid::new_v4()),
            Some(&admin),
            json!({ "quantity": 1 }),
        )
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["message"], "Inventory item not found");

    let low = app.get("/api/admin/inventory?lowStock=true", Some(&admin)).await;
    assert_eq!(low.body["results"], 1);
}

#[tokio::test]
async fn test_admin_categories() {
    let app = TestApp::new();
    let admin = app.admin().await;

    let res = app
        .post("/api/admin/categories", Some(&admin), json!({ "name": "Apparel" }))
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    let id = res.body["data"]["category"]["id"].as_str().unwrap().to_string();

    let res = app
        .patch(&format!("/api/admin/categories/{id}"), Some(&admin), json!({ "parent": id }))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "A category cannot be its own parent");

    let res = app
        .patch(&format!("/api/admin/categories/{id}"), Some(&admin), json!({ "isActive": false }))
        .await;
    assert_eq!(res.status, StatusCode::OK);

    let public = app.get("/api/products/categories", None).await;
    assert_eq!(public.body["results"], 0);
    let all = app.get("/api/admin/categories", Some(&admin)).await;
    assert_eq!(all.body["results"], 1);
}
