use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use printshop_api::{app, AppState};
use printshop_catalog::{InMemoryDatasetCache, PricingEngine};
use printshop_core::repository::StaticSettingsProvider;
use printshop_shared::{
    AttributeSelector, AttributeTerm, ModelKind, NumType, PriceType, PricingEntry, PricingModel, Product,
    ShopSettings,
};
use printshop_store::InMemoryStore;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

struct Shop {
    store: Arc<InMemoryStore>,
    fixed_id: Uuid,
    matrix_id: Uuid,
    base_id: Uuid,
}

fn entry(model_id: Uuid, attrs_key: &str, breakpoint: i64, price: &str) -> PricingEntry {
    PricingEntry {
        id: Uuid::new_v4(),
        model_id,
        attrs_key: attrs_key.to_string(),
        breakpoint,
        price: d(price),
    }
}

/// A fixed-price product at 10.00 and a business-card matrix keyed on paper (dimension 3)
fn shop() -> Shop {
    let store = Arc::new(InMemoryStore::new());

    let fixed = Product {
        id: Uuid::new_v4(),
        name: "Pečiatka".to_string(),
        price_type: PriceType::Fixed,
        price_from: d("10"),
        price_after_discount_from: None,
        legacy_id: None,
        is_active: true,
    };
    let matrix = Product {
        id: Uuid::new_v4(),
        name: "Vizitky".to_string(),
        price_type: PriceType::Matrix,
        price_from: d("0.50"),
        price_after_discount_from: None,
        legacy_id: Some(12),
        is_active: true,
    };

    let mut paper = AttributeSelector::new(3);
    paper.terms = vec![
        AttributeTerm { key: "300".to_string(), value: "300g".to_string() },
        AttributeTerm { key: "350".to_string(), value: "350g".to_string() },
    ];
    let base = PricingModel {
        id: Uuid::new_v4(),
        product_id: matrix.id,
        kind: ModelKind::Base,
        title: "Tlač".to_string(),
        breakpoints: vec![100, 200],
        num_type: NumType::FixedQuantity,
        unit_scale: Decimal::ONE,
        attribute_selectors: vec![paper],
        scale_below_min: None,
        scale_above_max: None,
        default_quantity: Some(100),
        sort_order: 0,
        is_active: true,
    };

    store.insert_entry(entry(base.id, "3:300g", 100, "100"));
    store.insert_entry(entry(base.id, "3:300g", 200, "180"));
    store.insert_entry(entry(base.id, "3:350g", 100, "120"));
    store.insert_entry(entry(base.id, "3:350g", 200, "210"));

    let shop = Shop {
        store: store.clone(),
        fixed_id: fixed.id,
        matrix_id: matrix.id,
        base_id: base.id,
    };
    store.insert_model(base);
    store.insert_product(fixed);
    store.insert_product(matrix);
    shop
}

fn router(shop: &Shop) -> Router {
    let settings = ShopSettings {
        vat_rate: d("0.20"),
        prices_include_vat: false,
    };
    let engine = PricingEngine::new(
        shop.store.clone(),
        shop.store.clone(),
        Arc::new(StaticSettingsProvider::new(settings)),
        Arc::new(InMemoryDatasetCache::default()),
    );
    app(AppState::new(engine))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(json) => Body::from(json.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let shop = shop();
    let (status, body) = send(&router(&shop), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_fixed_product_quote() {
    let shop = shop();
    let (status, body) = send(
        &router(&shop),
        "POST",
        &format!("/v1/products/{}/quote", shop.fixed_id),
        Some(json!({"selection": {"quantity": 3}})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["net"], "30.00");
    assert_eq!(body["vatAmount"], "6.00");
    assert_eq!(body["gross"], "36.00");
    assert_eq!(body["currency"], "EUR");
    assert_eq!(body["breakdown"]["pricingPath"], "FIXED");
    assert_eq!(body["breakdown"]["audience"], "b2c");
}

#[tokio::test]
async fn test_matrix_quote_uses_selected_paper() {
    let shop = shop();
    let (status, body) = send(
        &router(&shop),
        "POST",
        &format!("/v1/products/{}/quote", shop.matrix_id),
        Some(json!({
            "selection": {
                "quantity": 100,
                "selections": {"3": {"350": "350g"}},
                "productionSpeedPercent": "10",
                "userDiscountPercent": "5"
            },
            "audience": {"audience": "b2b", "source": "cart"}
        })),
    )
    .await;

    // 120 * 1.10 * 0.95
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["net"], "125.40");
    assert_eq!(body["gross"], "150.48");
    assert_eq!(body["breakdown"]["pricingPath"], "MATRIX");
    assert_eq!(body["breakdown"]["audience"], "b2b");
    assert_eq!(body["breakdown"]["source"], "cart");
    assert_eq!(body["breakdown"]["components"][0]["attrsKey"], "3:350g");
}

#[tokio::test]
async fn test_matrix_quote_defaults_to_first_paper() {
    let shop = shop();
    let (status, body) = send(
        &router(&shop),
        "POST",
        &format!("/v1/products/{}/quote", shop.matrix_id),
        Some(json!({"selection": {"quantity": 150}})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["net"], "140.00");
}

#[tokio::test]
async fn test_unknown_product_is_404() {
    let shop = shop();
    let (status, body) = send(
        &router(&shop),
        "POST",
        &format!("/v1/products/{}/quote", Uuid::new_v4()),
        Some(json!({"selection": {"quantity": 1}})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Produkt sa nenašiel.");
}

#[tokio::test]
async fn test_invalid_selection_is_400() {
    let shop = shop();
    let (status, body) = send(
        &router(&shop),
        "POST",
        &format!("/v1/products/{}/quote", shop.fixed_id),
        Some(json!({"selection": {"quantity": 0}})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_corrupt_pricing_is_500() {
    let shop = shop();
    shop.store.insert_entry(entry(shop.base_id, "3:300g", 100, "99"));

    let (status, body) = send(
        &router(&shop),
        "POST",
        &format!("/v1/products/{}/quote", shop.matrix_id),
        Some(json!({"selection": {"quantity": 100}})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal Server Error");
}

#[tokio::test]
async fn test_batch_quote_totals() {
    let shop = shop();
    let (status, body) = send(
        &router(&shop),
        "POST",
        "/v1/quotes/batch",
        Some(json!({
            "items": [
                {"productId": shop.fixed_id, "selection": {"quantity": 3}},
                {"productId": shop.matrix_id, "selection": {"quantity": 200}, "audience": {"audience": "b2b"}}
            ]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["totals"]["net"], "210.00");
    assert_eq!(body["totals"]["vatAmount"], "42.00");
    assert_eq!(body["totals"]["gross"], "252.00");
}

#[tokio::test]
async fn test_invalidate_picks_up_new_prices() {
    let shop = shop();
    let app = router(&shop);
    let uri = format!("/v1/products/{}/quote", shop.matrix_id);
    let body = json!({"selection": {"quantity": 100}});

    let (_, before) = send(&app, "POST", &uri, Some(body.clone())).await;
    assert_eq!(before["net"], "100.00");

    shop.store.replace_entries(
        shop.base_id,
        vec![
            entry(shop.base_id, "3:300g", 100, "95"),
            entry(shop.base_id, "3:300g", 200, "175"),
        ],
    );
    let (_, cached) = send(&app, "POST", &uri, Some(body.clone())).await;
    assert_eq!(cached["net"], "100.00");

    let (status, _) = send(
        &app,
        "POST",
        &format!("/v1/admin/products/{}/pricing/invalidate", shop.matrix_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, after) = send(&app, "POST", &uri, Some(body)).await;
    assert_eq!(after["net"], "95.00");
}
