//! Catalog and cart HTTP tests

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{money, TestApp};

#[tokio::test]
async fn test_create_product_requires_admin() {
    let app = TestApp::new();
    let token = app.customer("shopper").await;

    let res = app
        .post("/api/products", Some(&token), json!({ "name": "Tee" }))
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app.post("/api/products", None, json!({ "name": "Tee" })).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_product_validation() {
    let app = TestApp::new();
    let admin = app.admin().await;

    let res = app
        .post(
            "/api/products",
            Some(&admin),
            json!({ "name": "", "basePrice": "0", "brand": "" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let message = res.body["message"].as_str().unwrap();
    assert!(message.contains("Product name is required"));
    assert!(message.contains("Price must be greater than 0"));
    assert!(message.contains("Category is required"));
    assert!(message.contains("Brand is required"));
}

#[tokio::test]
async fn test_create_product_unknown_category() {
    let app = TestApp::new();
    let admin = app.admin().await;

    let res = app
        .post(
            "/api/products",
            Some(&admin),
            json!({
                "name": "Tee",
                "basePrice": "499",
                "category": uuid::Uuid::new_v4(),
                "brand": "Acme"
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["message"], "Category not found");
}

#[tokio::test]
async fn test_product_lifecycle() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let product = app.product(&admin, "Tee", "499", 10).await;
    let id = product["id"].as_str().unwrap();

    assert_eq!(product["isActive"], true);
    assert_eq!(product["images"][0]["isPrimary"], true);
    assert_eq!(money(&product["basePrice"]), 499.0);

    let res = app.get(&format!("/api/products/{id}"), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["product"]["name"], "Tee");

    let res = app
        .patch(
            &format!("/api/products/{id}"),
            Some(&admin),
            json!({ "basePrice": "599", "isFeatured": true }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(money(&res.body["data"]["product"]["basePrice"]), 599.0);
    assert_eq!(res.body["data"]["product"]["isFeatured"], true);

    let res = app.delete(&format!("/api/products/{id}"), Some(&admin)).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    let listing = app.get("/api/products", None).await;
    assert_eq!(listing.body["results"], 0);

    let missing = app
        .get(&format!("/api/products/{}", uuid::Uuid::new_v4()), None)
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["message"], "Product not found");
}

#[tokio::test]
async fn test_product_listing_filters_and_pagination() {
    let app = TestApp::new();
    let admin = app.admin().await;
    app.product(&admin, "Tee", "499", 10).await;
    app.product(&admin, "Hoodie", "1499", 10).await;
    app.product(&admin, "Cap", "299", 10).await;

    let all = app.get("/api/products", None).await;
    assert_eq!(all.status, StatusCode::OK);
    assert_eq!(all.body["results"], 3);
    assert_eq!(all.body["pagination"]["total"], 3);
    assert_eq!(all.body["pagination"]["current"], 1);

    let cheap = app.get("/api/products?maxPrice=500&sort=price", None).await;
    let names: Vec<_> = cheap.body["data"]["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Cap", "Tee"]);

    let search = app.get("/api/products?search=hood", None).await;
    assert_eq!(search.body["results"], 1);
    assert_eq!(search.body["data"]["products"][0]["name"], "Hoodie");

    let brand = app.get("/api/products?brand=acme,undefined", None).await;
    assert_eq!(brand.body["results"], 3);

    let none = app.get("/api/products?brand=Other", None).await;
    assert_eq!(none.body["results"], 0);

    let paged = app.get("/api/products?page=2&limit=2&sort=name", None).await;
    assert_eq!(paged.body["results"], 1);
    assert_eq!(paged.body["pagination"]["pages"], 2);
    assert_eq!(paged.body["data"]["products"][0]["name"], "Tee");
}

#[tokio::test]
async fn test_categories_and_brands() {
    let app = TestApp::new();
    let admin = app.admin().await;

    let parent = app
        .post("/api/products/categories", Some(&admin), json!({ "name": "Apparel" }))
        .await;
    assert_eq!(parent.status, StatusCode::CREATED);
    let parent_id = parent.body["data"]["category"]["id"].clone();

    let orphan = app
        .post(
            "/api/products/categories",
            Some(&admin),
            json!({ "name": "Shirts", "parent": uuid::Uuid::new_v4() }),
        )
        .await;
    assert_eq!(orphan.status, StatusCode::NOT_FOUND);

    let child = app
        .post(
            "/api/products/categories",
            Some(&admin),
            json!({ "name": "Shirts", "parent": parent_id }),
        )
        .await;
    assert_eq!(child.status, StatusCode::CREATED);

    let categories = app.get("/api/products/categories", None).await;
    assert_eq!(categories.body["results"], 2);

    let brand = app
        .post("/api/products/brands", Some(&admin), json!({ "name": "Acme" }))
        .await;
    assert_eq!(brand.status, StatusCode::CREATED);

    let brands = app.get("/api/products/brands", None).await;
    assert_eq!(brands.body["results"], 1);
    assert_eq!(brands.body["data"]["brands"][0]["name"], "Acme");
}

#[tokio::test]
async fn test_cart_add_and_merge() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let token = app.customer("shopper").await;
    let product = app.product(&admin, "Tee", "499", 5).await;

    let empty = app.get("/api/cart", Some(&token)).await;
    assert_eq!(empty.status, StatusCode::OK);
    assert_eq!(empty.body["data"]["cart"]["totalItems"], 0);

    let res = app.add_to_cart(&token, &product, "M", 2).await;
    assert_eq!(res.status, StatusCode::OK);
    let cart = &res.body["data"]["cart"];
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);
    assert_eq!(cart["items"][0]["variant"]["size"], "M");
    assert_eq!(cart["items"][0]["productName"], "Tee");

    let res = app.add_to_cart(&token, &product, "M", 1).await;
    let cart = &res.body["data"]["cart"];
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);
    assert_eq!(cart["items"][0]["quantity"], 3);
    assert_eq!(cart["totalItems"], 3);
    assert_eq!(money(&cart["totalPrice"]), 1497.0);

    let res = app.add_to_cart(&token, &product, "L", 1).await;
    assert_eq!(res.body["data"]["cart"]["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_cart_stock_rules() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let token = app.customer("shopper").await;
    let product = app.product(&admin, "Tee", "499", 3).await;

    let res = app.add_to_cart(&token, &product, "M", 4).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Insufficient stock");

    app.add_to_cart(&token, &product, "M", 2).await;
    let res = app.add_to_cart(&token, &product, "M", 2).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Insufficient stock for requested quantity");

    let res = app.add_to_cart(&token, &product, "M", 0).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .post(
            "/api/cart/add",
            Some(&token),
            json!({ "productId": product["id"], "variant": { "sku": "nope" }, "quantity": 1 }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Insufficient stock");
}

#[tokio::test]
async fn test_cart_inactive_product() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let token = app.customer("shopper").await;
    let product = app.product(&admin, "Tee", "499", 3).await;
    let id = product["id"].as_str().unwrap();

    app.delete(&format!("/api/products/{id}"), Some(&admin)).await;

    let res = app.add_to_cart(&token, &product, "M", 1).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["message"], "Product not found");
}

#[tokio::test]
async fn test_cart_update_remove_clear() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let token = app.customer("shopper").await;
    let product = app.product(&admin, "Tee", "499", 5).await;

    let missing = app
        .patch(
            &format!("/api/cart/items/{}", uuid::Uuid::new_v4()),
            Some(&token),
            json!({ "quantity": 1 }),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["message"], "Cart not found");

    let res = app.add_to_cart(&token, &product, "M", 1).await;
    let line = res.body["data"]["cart"]["items"][0]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let too_many = app
        .patch(&format!("/api/cart/items/{line}"), Some(&token), json!({ "quantity": 6 }))
        .await;
    assert_eq!(too_many.status, StatusCode::BAD_REQUEST);
    assert_eq!(too_many.body["message"], "Insufficient stock");

    let res = app
        .patch(&format!("/api/cart/items/{line}"), Some(&token), json!({ "quantity": 4 }))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["cart"]["totalItems"], 4);

    let res = app
        .patch(&format!("/api/cart/items/{line}"), Some(&token), json!({ "quantity": 0 }))
        .await;
    assert_eq!(res.body["data"]["cart"]["totalItems"], 0);

    app.add_to_cart(&token, &product, "M", 1).await;
    let res = app.add_to_cart(&token, &product, "L", 1).await;
    let line = res.body["data"]["cart"]["items"][0]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let res = app.delete(&format!("/api/cart/items/{line}"), Some(&token)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["cart"]["items"].as_array().unwrap().len(), 1);

    let res = app.delete("/api/cart/clear", Some(&token)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["cart"]["totalItems"], 0);
    assert_eq!(money(&res.body["data"]["cart"]["totalPrice"]), 0.0);
}
