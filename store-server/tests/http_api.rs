//! HTTP-level API tests
//!
//! Drives the composed router with tower oneshot calls: status codes,
//! error codes on the wire, auth gating and the camelCase contract.

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use chrono::Utc;
use store_server::db::models::Product;
use store_server::db::repository::ProductRepository;
use store_server::{Config, ServerState, api};

async fn test_app() -> (Router, ServerState, tempfile::TempDir) {
    let tmp = tempfile::tempdir().unwrap();
    let config = Config::with_overrides(tmp.path().to_string_lossy().to_string(), 0);
    let state = ServerState::initialize(&config).await;
    let app = api::build_app(&state).with_state(state.clone());
    (app, state, tmp)
}

async fn seed_product(state: &ServerState, name: &str, price: f64, stock: i64) -> String {
    let now = Utc::now();
    ProductRepository::new(state.db.clone())
        .create(Product {
            id: None,
            name: name.to_string(),
            description: String::new(),
            price,
            original_price: None,
            images: Vec::new(),
            cover_image: None,
            category: None,
            tags: Vec::new(),
            in_stock: true,
            stock_quantity: stock,
            featured: false,
            variants: Vec::new(),
            created_at: now,
            updated_at: now,
        })
        .await
        .unwrap()
        .id_string()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn bearer(request: Request<Body>, token: &str) -> Request<Body> {
    let (mut parts, body) = request.into_parts();
    parts.headers.insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().unwrap(),
    );
    Request::from_parts(parts, body)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn register(app: &Router, email: &str) -> Value {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            json!({
                "email": email,
                "password": "hunter2hunter2",
                "firstName": "Ada",
                "lastName": "Lovelace"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn register_returns_credentials_in_camel_case() {
    let (app, _state, _tmp) = test_app().await;

    let body = register(&app, "ada@example.com").await;
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(body["user"]["role"], "customer");
    assert!(body["token"].is_string());
    assert!(body["refreshToken"].is_string());
    // Credential material never serializes
    assert!(body["user"].get("passwordHash").is_none());

    // Duplicate email conflicts
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            json!({
                "email": "ada@example.com",
                "password": "hunter2hunter2",
                "firstName": "Ada",
                "lastName": "Lovelace"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"], "Conflict");
}

#[tokio::test]
async fn login_failures_are_unified_401s() {
    let (app, _state, _tmp) = test_app().await;
    register(&app, "ada@example.com").await;

    let wrong_password = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({ "email": "ada@example.com", "password": "not-the-password" }),
        ))
        .await
        .unwrap();
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let wrong_password = body_json(wrong_password).await;

    let unknown_user = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({ "email": "nobody@example.com", "password": "whatever1" }),
        ))
        .await
        .unwrap();
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    let unknown_user = body_json(unknown_user).await;

    // Same code and message for both; no account enumeration
    assert_eq!(wrong_password["error"], unknown_user["error"]);
    assert_eq!(wrong_password["message"], unknown_user["message"]);
}

#[tokio::test]
async fn protected_routes_require_a_valid_bearer_token() {
    let (app, _state, _tmp) = test_app().await;

    let response = app
        .clone()
        .oneshot(Request::get("/api/cart").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = register(&app, "ada@example.com").await;
    let token = body["token"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(bearer(
            Request::get("/api/cart").body(Body::empty()).unwrap(),
            token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["cart"]["totalItems"], 0);
    assert_eq!(body["cart"]["totalPrice"], 0.0);
}

#[tokio::test]
async fn refresh_rotation_over_http_rejects_replays() {
    let (app, _state, _tmp) = test_app().await;
    let body = register(&app, "ada@example.com").await;
    let original = body["refreshToken"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/refresh",
            json!({ "refreshToken": original }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let rotated = body_json(response).await;
    assert!(rotated["refreshToken"].is_string());
    assert_ne!(rotated["refreshToken"].as_str().unwrap(), original);

    // The old secret is now unusable, with the refresh-specific code
    let replay = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/refresh",
            json!({ "refreshToken": original }),
        ))
        .await
        .unwrap();
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(replay).await["error"], "InvalidToken");
}

#[tokio::test]
async fn logout_always_succeeds() {
    let (app, _state, _tmp) = test_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/logout",
            json!({ "refreshToken": "not-a-real-token" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);
}

#[tokio::test]
async fn guest_cart_requires_the_session_header() {
    let (app, _state, _tmp) = test_app().await;

    let response = app
        .clone()
        .oneshot(Request::get("/api/cart/guest").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(
            Request::get("/api/cart/guest")
                .header("X-Session-ID", "session-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["cart"]["sessionId"], "session-1");
    assert!(body["cart"]["userId"].is_null());
}

#[tokio::test]
async fn checkout_maps_failures_to_400_and_409() {
    let (app, state, _tmp) = test_app().await;
    let product = seed_product(&state, "basket", 10.0, 1).await;

    let order_body = |quantity: u32, subtotal: f64| {
        json!({
            "items": [{
                "productId": product.clone(),
                "productName": "basket",
                "productImage": "basket.jpg",
                "price": 10.0,
                "quantity": quantity,
                "total": 10.0 * quantity as f64
            }],
            "shipping": {
                "firstName": "Ada", "lastName": "Lovelace",
                "address1": "1 Analytical Way", "city": "London",
                "state": "LDN", "postalCode": "N1 7AA", "country": "GB",
                "method": "standard", "cost": 0.0
            },
            "billing": {
                "firstName": "Ada", "lastName": "Lovelace",
                "address1": "1 Analytical Way", "city": "London",
                "state": "LDN", "postalCode": "N1 7AA", "country": "GB"
            },
            "payment": { "method": "card" },
            "totals": {
                "subtotal": subtotal, "shipping": 0.0, "tax": 0.0,
                "discount": 0.0, "total": subtotal
            }
        })
    };

    // Declared subtotal disagrees with the line items
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/orders", order_body(1, 50.0)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "BadRequest");

    // More units than stocked
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/orders", order_body(3, 30.0)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"], "Conflict");

    // Guest checkout of the single unit succeeds
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/orders", order_body(1, 10.0)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["item"]["status"], "pending");
    assert!(body["item"]["orderNumber"].as_str().unwrap().starts_with("TW-"));
}

#[tokio::test]
async fn admin_routes_are_role_gated() {
    let (app, _state, _tmp) = test_app().await;
    let body = register(&app, "ada@example.com").await;
    let customer_token = body["token"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::get("/api/orders/admin/list")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(bearer(
            Request::get("/api/orders/admin/list")
                .body(Body::empty())
                .unwrap(),
            customer_token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["error"], "Forbidden");
}
