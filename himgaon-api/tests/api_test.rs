use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use himgaon_api::{app, auth::hash_password, AppState};
use himgaon_store::app_config::{
    AuthConfig, CatalogSettings, Config, DatabaseConfig, OrderSettings, ServerConfig,
};
use himgaon_store::DbClient;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

const ADMIN_PASSWORD: &str = "pahadi-ghee";

struct TestApp {
    _dir: TempDir,
    router: Router,
}

async fn setup() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("himgaon-api.db").display());

    let config = Config {
        server: ServerConfig { port: 0 },
        database: DatabaseConfig::for_url(url),
        auth: AuthConfig {
            jwt_secret: "test-secret".into(),
            jwt_expiration_seconds: 600,
            admin_username: "admin".into(),
            admin_password_hash: hash_password(ADMIN_PASSWORD).unwrap(),
        },
        orders: OrderSettings::default(),
        catalog: CatalogSettings::default(),
    };

    let db = DbClient::new(&config.database).await.unwrap();
    db.migrate().await.unwrap();
    db.seed_demo_products().await.unwrap();

    let state = AppState::build(&db, &config).unwrap();
    TestApp {
        _dir: dir,
        router: app(state),
    }
}

impl TestApp {
    async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn post(&self, uri: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    async fn login(&self) -> String {
        let (status, body) = self
            .post(
                "/v1/admin/login",
                json!({ "username": "admin", "password": ADMIN_PASSWORD }),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    async fn product_named(&self, name: &str) -> Value {
        let (_, products) = self.get("/v1/products", None).await;
        products
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["name_en"] == name)
            .cloned()
            .unwrap()
    }
}

fn order_body(product_id: &Value, quantity: i64) -> Value {
    json!({
        "customer_name": "Asha Joshi",
        "email": "asha@example.com",
        "phone": "9876543210",
        "address": "Near Bus Stand, Pithoragarh",
        "items": [{ "product_id": product_id, "quantity": quantity }]
    })
}

#[tokio::test]
async fn test_checkout_and_track_flow() {
    let app = setup().await;
    let milk = app.product_named("Fresh Cow Milk").await;
    assert_eq!(milk["price_paise"], 6000);

    let (status, placed) = app.post("/v1/orders", order_body(&milk["id"], 2), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(placed["total_paise"], 12000);

    let (status, order) = app
        .post(
            "/v1/orders/track",
            json!({ "order_code": placed["order_code"], "phone": "9876543210" }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "Pending");
    assert_eq!(order["items"][0]["quantity"], 2);

    let (_, milk) = app
        .get(&format!("/v1/products/{}", milk["id"].as_str().unwrap()), None)
        .await;
    assert_eq!(milk["stock"], 48);

    let (status, _) = app
        .post(
            "/v1/orders/track",
            json!({ "order_code": placed["order_code"], "phone": "1111111111" }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_checkout_errors_are_explained() {
    let app = setup().await;
    let ghee = app.product_named("Pure Desi Ghee").await;

    let (status, body) = app.post("/v1/orders", order_body(&ghee["id"], 31), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("Pure Desi Ghee"));

    let mut empty = order_body(&ghee["id"], 1);
    empty["items"] = json!([]);
    let (status, _) = app.post("/v1/orders", empty, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/v1/orders",
            order_body(&json!(uuid::Uuid::new_v4()), 1),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // A negative line for a product already in the request is refused, not netted off
    let mut netted = order_body(&ghee["id"], 5);
    netted["items"] = json!([
        { "product_id": ghee["id"], "quantity": 5 },
        { "product_id": ghee["id"], "quantity": -3 }
    ]);
    let (status, _) = app.post("/v1/orders", netted, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post("/v1/orders", order_body(&ghee["id"], i64::MAX / 1000), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let ghee = app.product_named("Pure Desi Ghee").await;
    assert_eq!(ghee["stock"], 30);
}

#[tokio::test]
async fn test_admin_routes_require_token() {
    let app = setup().await;

    let (status, _) = app.get("/v1/admin/dashboard", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/v1/admin/dashboard", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post(
            "/v1/admin/login",
            json!({ "username": "admin", "password": "wrong" }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_reject_restores_stock() {
    let app = setup().await;
    let token = app.login().await;
    let butter = app.product_named("Mountain Butter").await;

    let (_, placed) = app.post("/v1/orders", order_body(&butter["id"], 3), None).await;
    let order_id = placed["order_id"].as_str().unwrap().to_string();

    let (status, dashboard) = app.get("/v1/admin/dashboard", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["pending_orders"], 1);
    assert_eq!(dashboard["total_products"], 7);

    let (status, order) = app
        .post(
            &format!("/v1/admin/orders/{}/reject", order_id),
            json!({ "notes": "Customer cancelled by phone" }),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "Rejected");
    assert_eq!(order["admin_notes"], "Customer cancelled by phone");

    let (status, _) = app
        .post(
            &format!("/v1/admin/orders/{}/reject", order_id),
            json!({}),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let butter = app.product_named("Mountain Butter").await;
    assert_eq!(butter["stock"], 35);

    let (status, rejected) = app
        .get("/v1/admin/orders?status=Rejected", Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rejected.as_array().unwrap().len(), 1);

    let (status, _) = app
        .get("/v1/admin/orders?status=shipped", Some(&token))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_accept_and_deliver() {
    let app = setup().await;
    let token = app.login().await;
    let eggs = app.product_named("Free Range Eggs").await;

    let (_, placed) = app.post("/v1/orders", order_body(&eggs["id"], 4), None).await;
    let order_id = placed["order_id"].as_str().unwrap().to_string();

    let (status, _) = app
        .post(
            &format!("/v1/admin/orders/{}/deliver", order_id),
            json!({}),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    for (action, expected) in [("accept", "Accepted"), ("deliver", "Delivered")] {
        let (status, order) = app
            .post(
                &format!("/v1/admin/orders/{}/{}", order_id, action),
                json!({}),
                Some(&token),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(order["status"], expected);
    }

    let eggs = app.product_named("Free Range Eggs").await;
    assert_eq!(eggs["stock"], 96);
}

#[tokio::test]
async fn test_admin_product_management() {
    let app = setup().await;
    let token = app.login().await;

    let (status, created) = app
        .post(
            "/v1/admin/products",
            json!({
                "name_en": "Buttermilk",
                "name_hi": "छाछ",
                "price_paise": 3000,
                "stock": 25
            }),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .post(
            "/v1/admin/products",
            json!({ "name_en": "Free Milk", "name_hi": "दूध", "price_paise": 0, "stock": 1 }),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let update = Request::builder()
        .method("PUT")
        .uri(format!("/v1/admin/products/{}", id))
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(
            json!({ "name_en": "Buttermilk", "name_hi": "छाछ", "price_paise": 3500, "stock": 5 })
                .to_string(),
        ))
        .unwrap();
    let (status, updated) = app.send(update).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price_paise"], 3500);

    let delete = Request::builder()
        .method("DELETE")
        .uri(format!("/v1/admin/products/{}", id))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(delete).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&format!("/v1/products/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
