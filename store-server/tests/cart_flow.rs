//! Cart service integration tests
//!
//! Totals invariants, merge semantics and guest-cart absorption against an
//! embedded database.

use chrono::Utc;
use shared::dto::cart::{CartItemInput, MergeStrategy};
use store_server::db::models::{Identity, Product};
use store_server::db::repository::ProductRepository;
use store_server::{Config, ServerState};

async fn test_state() -> (ServerState, tempfile::TempDir) {
    let tmp = tempfile::tempdir().unwrap();
    let config = Config::with_overrides(tmp.path().to_string_lossy().to_string(), 0);
    let state = ServerState::initialize(&config).await;
    (state, tmp)
}

async fn seed_product(state: &ServerState, name: &str, price: f64, in_stock: bool) -> String {
    let now = Utc::now();
    let repo = ProductRepository::new(state.db.clone());
    let product = repo
        .create(Product {
            id: None,
            name: name.to_string(),
            description: format!("{name} description"),
            price,
            original_price: None,
            images: vec![format!("{name}.jpg")],
            cover_image: None,
            category: Some("baskets".to_string()),
            tags: Vec::new(),
            in_stock,
            stock_quantity: 50,
            featured: false,
            variants: Vec::new(),
            created_at: now,
            updated_at: now,
        })
        .await
        .unwrap();
    product.id_string()
}

fn client_item(item_id: &str, product_id: &str, price: f64, quantity: u32) -> CartItemInput {
    CartItemInput {
        id: item_id.to_string(),
        product_id: product_id.to_string(),
        name: format!("client {item_id}"),
        price,
        image: "client.jpg".to_string(),
        category: "baskets".to_string(),
        description: String::new(),
        quantity,
        variant_name: None,
        custom_items: None,
        basket_items: None,
    }
}

#[tokio::test]
async fn totals_hold_after_every_mutation() {
    let (state, _tmp) = test_state().await;
    let product_a = seed_product(&state, "willow basket", 10.0, true).await;
    let product_b = seed_product(&state, "rattan tray", 7.5, true).await;
    let identity = Identity::User("user:ada".to_string());

    let (cart, _, _) = state
        .cart_service
        .add_item(&identity, client_item("a", &product_a, 10.0, 2))
        .await
        .unwrap();
    assert_eq!(cart.total_items, 2);
    assert_eq!(cart.total_price, 20.0);

    let (cart, _, _) = state
        .cart_service
        .add_item(&identity, client_item("b", &product_b, 7.5, 1))
        .await
        .unwrap();
    assert_eq!(cart.total_items, 3);
    assert_eq!(cart.total_price, 27.5);

    let (cart, quantity) = state
        .cart_service
        .update_item(&identity, "a", 1)
        .await
        .unwrap();
    assert_eq!(quantity, 1);
    assert_eq!(cart.total_items, 2);
    assert_eq!(cart.total_price, 17.5);

    let cart = state.cart_service.remove_item(&identity, "b").await.unwrap();
    assert_eq!(cart.total_items, 1);
    assert_eq!(cart.total_price, 10.0);

    let cart = state.cart_service.clear(&identity).await.unwrap();
    assert_eq!(cart.total_items, 0);
    assert_eq!(cart.total_price, 0.0);
}

#[tokio::test]
async fn add_uses_catalog_price_and_accumulates() {
    let (state, _tmp) = test_state().await;
    let product = seed_product(&state, "willow basket", 12.0, true).await;
    let identity = Identity::User("user:ada".to_string());

    // Client claims price 1.0; the catalog wins
    let (cart, _, quantity) = state
        .cart_service
        .add_item(&identity, client_item("a", &product, 1.0, 2))
        .await
        .unwrap();
    assert_eq!(quantity, 2);
    assert_eq!(cart.items[0].price, 12.0);

    // Adding again increments (unlike merge)
    let (cart, _, quantity) = state
        .cart_service
        .add_item(&identity, client_item("a", &product, 12.0, 3))
        .await
        .unwrap();
    assert_eq!(quantity, 5);
    assert_eq!(cart.total_items, 5);
}

#[tokio::test]
async fn add_rejects_unknown_and_delisted_products() {
    let (state, _tmp) = test_state().await;
    let delisted = seed_product(&state, "retired basket", 5.0, false).await;
    let identity = Identity::User("user:ada".to_string());

    let err = state
        .cart_service
        .add_item(&identity, client_item("x", "product:missing", 5.0, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, store_server::AppError::NotFound(_)));

    let err = state
        .cart_service
        .add_item(&identity, client_item("y", &delisted, 5.0, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, store_server::AppError::Invalid(_)));
}

#[tokio::test]
async fn merge_keeps_server_price_max_quantity_and_drops_vanished() {
    let (state, _tmp) = test_state().await;
    let product_a = seed_product(&state, "willow basket", 10.0, true).await;
    let identity = Identity::User("user:ada".to_string());

    // Server side: A×2 @ 10
    state
        .cart_service
        .add_item(&identity, client_item("a", &product_a, 10.0, 2))
        .await
        .unwrap();

    // Client snapshot: A×1 @ stale price 8, plus B referencing a product
    // that no longer exists
    let (cart, conflicts) = state
        .cart_service
        .sync(
            &identity,
            vec![
                client_item("a", &product_a, 8.0, 1),
                client_item("b", "product:deleted", 8.0, 1),
            ],
            MergeStrategy::Merge,
        )
        .await
        .unwrap();

    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].id, "a");
    assert_eq!(cart.items[0].quantity, 2);
    assert_eq!(cart.items[0].price, 10.0);
    assert!(cart.last_synced_at.is_some());

    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].item_id, "a");
    assert_eq!(conflicts[0].local_quantity, 1);
    assert_eq!(conflicts[0].server_quantity, 2);
}

#[tokio::test]
async fn merge_drops_delisted_products_without_failing() {
    let (state, _tmp) = test_state().await;
    let sellable = seed_product(&state, "willow basket", 10.0, true).await;
    let delisted = seed_product(&state, "retired basket", 5.0, false).await;
    let identity = Identity::User("user:ada".to_string());

    let (cart, conflicts) = state
        .cart_service
        .sync(
            &identity,
            vec![
                client_item("keep", &sellable, 10.0, 1),
                client_item("drop", &delisted, 5.0, 1),
            ],
            MergeStrategy::Merge,
        )
        .await
        .unwrap();

    assert!(conflicts.is_empty());
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].id, "keep");
}

#[tokio::test]
async fn merge_is_idempotent_across_repeated_syncs() {
    let (state, _tmp) = test_state().await;
    let product = seed_product(&state, "willow basket", 10.0, true).await;
    let identity = Identity::User("user:ada".to_string());

    state
        .cart_service
        .add_item(&identity, client_item("a", &product, 10.0, 2))
        .await
        .unwrap();

    let snapshot = vec![client_item("a", &product, 10.0, 4)];

    let (first, first_conflicts) = state
        .cart_service
        .sync(&identity, snapshot.clone(), MergeStrategy::Merge)
        .await
        .unwrap();
    let (second, second_conflicts) = state
        .cart_service
        .sync(&identity, snapshot, MergeStrategy::Merge)
        .await
        .unwrap();

    // Quantities resolved to max(4, 2) = 4, not 6, and a retried sync
    // changes nothing
    assert_eq!(first.items[0].quantity, 4);
    assert_eq!(second.items[0].quantity, 4);
    assert_eq!(first.total_price, second.total_price);
    assert_eq!(first_conflicts.len(), 1);
    assert!(second_conflicts.is_empty());
}

#[tokio::test]
async fn local_and_server_strategies() {
    let (state, _tmp) = test_state().await;
    let product = seed_product(&state, "willow basket", 10.0, true).await;
    let identity = Identity::User("user:ada".to_string());

    state
        .cart_service
        .add_item(&identity, client_item("a", &product, 10.0, 2))
        .await
        .unwrap();

    // Server wins: snapshot ignored
    let (cart, conflicts) = state
        .cart_service
        .sync(
            &identity,
            vec![client_item("a", &product, 10.0, 9)],
            MergeStrategy::Server,
        )
        .await
        .unwrap();
    assert!(conflicts.is_empty());
    assert_eq!(cart.items[0].quantity, 2);

    // Client wins wholesale
    let (cart, _) = state
        .cart_service
        .sync(
            &identity,
            vec![client_item("z", &product, 3.0, 1)],
            MergeStrategy::Local,
        )
        .await
        .unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].id, "z");
    assert_eq!(cart.total_items, 1);
}

#[tokio::test]
async fn guest_cart_is_absorbed_and_deleted_on_merge() {
    let (state, _tmp) = test_state().await;
    let product_a = seed_product(&state, "willow basket", 10.0, true).await;
    let product_b = seed_product(&state, "rattan tray", 7.0, true).await;

    let user = Identity::User("user:ada".to_string());
    let guest = Identity::Guest("session-123".to_string());

    // Guest shopped anonymously
    state
        .cart_service
        .add_item(&guest, client_item("a", &product_a, 10.0, 5))
        .await
        .unwrap();
    let guest_cart = state.cart_service.get_cart(&guest).await.unwrap();
    let guest_cart_id = guest_cart.id.clone().unwrap();

    // User already had A×2
    state
        .cart_service
        .add_item(&user, client_item("a", &product_a, 10.0, 2))
        .await
        .unwrap();

    let (cart, merged_items) = state
        .cart_service
        .merge_guest(
            &user,
            Some("session-123".to_string()),
            vec![
                client_item("a", &product_a, 10.0, 5),
                client_item("b", &product_b, 7.0, 1),
            ],
        )
        .await
        .unwrap();

    // Max, not sum; new item reported
    assert_eq!(cart.items.len(), 2);
    assert_eq!(cart.find_item("a").map(|i| cart.items[i].quantity), Some(5));
    assert_eq!(merged_items, vec!["b".to_string()]);

    // The guest cart is gone; the session id reaches a fresh empty cart
    let fresh = state.cart_service.get_cart(&guest).await.unwrap();
    assert_ne!(fresh.id.unwrap(), guest_cart_id);
    assert!(fresh.items.is_empty());
}

#[tokio::test]
async fn one_cart_per_identity() {
    let (state, _tmp) = test_state().await;
    let identity = Identity::User("user:ada".to_string());

    let first = state.cart_service.get_cart(&identity).await.unwrap();
    let second = state.cart_service.get_cart(&identity).await.unwrap();
    assert_eq!(first.id.unwrap(), second.id.unwrap());

    // Same session string under a guest identity is a different cart
    let guest = Identity::Guest("user:ada".to_string());
    let guest_cart = state.cart_service.get_cart(&guest).await.unwrap();
    assert_ne!(guest_cart.id.unwrap(), second.id.unwrap());
}
