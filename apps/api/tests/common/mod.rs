//! Shared harness for the HTTP tests: the full router over the in-memory
//! store and the simulated payment gateway.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for oneshot

use storefront_api::api::build_router;
use storefront_api::auth::jwt::create_token;
use storefront_api::auth::password::hash_password;
use storefront_api::config::AuthSettings;
use storefront_api::domain::repositories::UserRepository;
use storefront_api::domain::user::{Profile, Role, User, Username};
use storefront_api::infrastructure::memory::MemoryStore;
use storefront_api::infrastructure::payments::SimulatedGateway;
use storefront_api::state::AppState;

pub const SECRET: &str = "test-secret";
pub const PASSWORD: &str = "secret123";

pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
    pub gateway: SimulatedGateway,
    pub auth: AuthSettings,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let gateway = SimulatedGateway::new();
        let auth = AuthSettings {
            jwt_secret: SECRET.to_string(),
            token_ttl: chrono::Duration::hours(1),
            bcrypt_cost: 4,
            cookie_secure: false,
        };
        let state = AppState::in_memory(store.clone(), Arc::new(gateway.clone()), auth.clone());
        Self {
            router: build_router(state),
            store,
            gateway,
            auth,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Signs up a customer and returns the session token
    pub async fn customer(&self, username: &str) -> String {
        let res = self
            .post(
                "/api/auth/signup",
                None,
                json!({ "username": username, "password": PASSWORD }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
        res.body["token"].as_str().unwrap().to_string()
    }

    /// Creates an admin directly in the store and returns a token for it
    pub async fn admin(&self) -> String {
        let hash = hash_password(PASSWORD, 4).unwrap();
        let mut user = User::new(Username::new("admin").unwrap(), hash, Profile::default());
        user.role = Role::Admin;
        UserRepository::create(&self.store, &user).await.unwrap();
        create_token(user.id, SECRET, chrono::Duration::hours(1)).unwrap()
    }

    /// Creates a category and a two-variant product; returns the product JSON
    pub async fn product(&self, admin: &str, name: &str, price: &str, stock: i32) -> Value {
        let category = self
            .post(
                "/api/products/categories",
                Some(admin),
                json!({ "name": format!("{name} category") }),
            )
            .await;
        assert_eq!(category.status, StatusCode::CREATED, "{}", category.body);
        let category_id = category.body["data"]["category"]["id"].clone();

        let res = self
            .post(
                "/api/products",
                Some(admin),
                json!({
                    "name": name,
                    "description": format!("A fine {name}"),
                    "basePrice": price,
                    "category": category_id,
                    "brand": "Acme",
                    "variants": [
                        { "size": "M", "color": "Blue", "sku": format!("{name}-M"), "price": price, "stock": stock },
                        { "size": "L", "color": "Blue", "sku": format!("{name}-L"), "price": price, "stock": stock }
                    ],
                    "images": [{ "url": format!("https://img.example.com/{name}.png") }]
                }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
        res.body["data"]["product"].clone()
    }

    /// Adds a default address for the token's user; returns the address id
    pub async fn address(&self, token: &str, state: &str) -> String {
        let res = self
            .post(
                "/api/users/addresses",
                Some(token),
                json!({
                    "fullName": "Asha Rao",
                    "street": "12 MG Road",
                    "city": "Pune",
                    "state": state,
                    "zipCode": "411001",
                    "phone": "9876543210",
                    "isDefault": true
                }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
        res.body["data"]["addresses"][0]["id"]
            .as_str()
            .unwrap()
            .to_string()
    }

    pub async fn add_to_cart(&self, token: &str, product: &Value, size: &str, quantity: i32) -> TestResponse {
        let sku = format!("{}-{size}", product["name"].as_str().unwrap());
        self.post(
            "/api/cart/add",
            Some(token),
            json!({
                "productId": product["id"],
                "variant": { "sku": sku },
                "quantity": quantity
            }),
        )
        .await
    }
}

impl TestApp {
    /// Creates a coupon valid until 2099; returns the coupon JSON
    pub async fn coupon(&self, admin: &str, code: &str, kind: &str, value: &str, minimum: &str) -> Value {
        let res = self
            .post(
                "/api/coupons",
                Some(admin),
                json!({
                    "code": code,
                    "description": format!("{code} promo"),
                    "discountType": kind,
                    "discountValue": value,
                    "minimumAmount": minimum,
                    "validUntil": "2099-12-31T23:59:59Z"
                }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
        res.body["data"]["coupon"].clone()
    }

    /// Current inventory quantity for `sku`, read through the admin API
    pub async fn stock(&self, admin: &str, sku: &str) -> i64 {
        let res = self.get("/api/admin/inventory?limit=100", Some(admin)).await;
        assert_eq!(res.status, StatusCode::OK, "{}", res.body);
        res.body["data"]["inventory"]
            .as_array()
            .unwrap()
            .iter()
            .find(|row| row["variant"]["sku"] == sku)
            .and_then(|row| row["quantity"].as_i64())
            .unwrap()
    }

    /// Moves an order through the admin status endpoint
    pub async fn set_order_status(&self, admin: &str, order_id: &str, status: &str) -> TestResponse {
        self.patch(
            &format!("/api/admin/orders/{order_id}/status"),
            Some(admin),
            json!({ "status": status }),
        )
        .await
    }
}

/// Decimal fields serialize as strings; compare numerically
pub fn money(value: &Value) -> f64 {
    match value {
        Value::String(s) => s.parse().unwrap(),
        Value::Number(n) => n.as_f64().unwrap(),
        other => panic!("not a money value: {other}"),
    }
}
