use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use api_types::assistant::{AiProduct, AssistantLog, CreditsUpdate, ProductMetadataUpdate};
use api_types::loan::{Loan, PaymentMethod, Repayment, RepaymentNew};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use client::{ApiError, Client, RestResource, paths};
use engine::{
    FailureStatus, FilterValue, ListParams, LocationSource, ResourceService, ServiceError,
};
use serde_json::{Value, json};

type BearerHeader = Option<TypedHeader<Authorization<Bearer>>>;

#[derive(Clone, Default)]
struct Backend {
    queries: Arc<Mutex<Vec<Vec<(String, String)>>>>,
    tokens: Arc<Mutex<Vec<Option<String>>>>,
    bodies: Arc<Mutex<Vec<Value>>>,
}

impl Backend {
    fn record_token(&self, auth: &BearerHeader) {
        let token = auth.as_ref().map(|TypedHeader(auth)| auth.token().to_string());
        self.tokens.lock().unwrap().push(token);
    }
}

fn loan_json(id: u64) -> Value {
    json!({
        "id": id,
        "user": { "id": 100 + id, "firstname": "Amina", "lastname": "Said" },
        "amount": format!("{}.00", id * 1000),
        "interest_rate": 5,
        "repayment_amount": id * 1050,
        "due_date": "2026-12-01",
        "status": "active"
    })
}

fn query_value<'a>(query: &'a [(String, String)], key: &str) -> Option<&'a str> {
    query
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

async fn list_loans(
    State(backend): State<Backend>,
    auth: BearerHeader,
    Query(query): Query<Vec<(String, String)>>,
) -> Json<Value> {
    backend.record_token(&auth);
    let page: u64 = query_value(&query, "page").and_then(|v| v.parse().ok()).unwrap_or(1);
    let per_page: u64 = query_value(&query, "perPage")
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);
    backend.queries.lock().unwrap().push(query);

    let total = 25_u64;
    let first = (page - 1) * per_page + 1;
    let data: Vec<Value> = (first..=total).take(per_page as usize).map(loan_json).collect();
    Json(json!({
        "data": data,
        "meta": { "current_page": page, "per_page": per_page, "total": total }
    }))
}

async fn show_loan(Path(id): Path<u64>) -> (StatusCode, Json<Value>) {
    if id > 25 {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Loan not found" })),
        );
    }
    (StatusCode::OK, Json(json!({ "data": loan_json(id) })))
}

async fn delete_loan(Path(_id): Path<u64>) -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn create_repayment(
    State(backend): State<Backend>,
    auth: BearerHeader,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    backend.record_token(&auth);
    backend.bodies.lock().unwrap().push(body.clone());
    if body["amount"].as_f64().unwrap_or_default() > 10_000.0 {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "message": "Amount exceeds remaining balance" })),
        );
    }
    let mut created = body;
    created["id"] = json!(1);
    (StatusCode::CREATED, Json(json!({ "data": created })))
}

async fn payouts(State(backend): State<Backend>, auth: BearerHeader) -> (StatusCode, Json<Value>) {
    backend.record_token(&auth);
    match auth {
        Some(_) => (StatusCode::OK, Json(json!({ "data": [], "meta": { "current_page": 1, "per_page": 10, "total": 0 } }))),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Unauthenticated." })),
        ),
    }
}

async fn location(Path(id): Path<u64>) -> Json<Value> {
    Json(json!({ "data": { "lat": "-6.8161", "lng": 39.2803, "trip_id": id } }))
}

async fn optimize(Path(_id): Path<u64>) -> Json<Value> {
    Json(json!({ "message": "Trip optimized" }))
}

async fn assistant_logs() -> Json<Value> {
    Json(json!({
        "current_page": 2,
        "per_page": 15,
        "total": 16,
        "data": [{ "id": 16, "request_type": "search", "successful": true }]
    }))
}

async fn assistant_update(
    State(backend): State<Backend>,
    Path(_id): Path<u64>,
    Json(body): Json<Value>,
) -> Json<Value> {
    backend.bodies.lock().unwrap().push(body);
    Json(json!({ "message": "Updated" }))
}

async fn delete_orders(
    State(backend): State<Backend>,
    Query(query): Query<Vec<(String, String)>>,
) -> StatusCode {
    backend.queries.lock().unwrap().push(query);
    StatusCode::NO_CONTENT
}

async fn products() -> Json<Value> {
    Json(json!({
        "data": [{
            "id": 3,
            "name": "Pilau",
            "calories": "650",
            "ingredient_tags": ["halal"],
            "popularity_score": 8.5
        }],
        "total": 21
    }))
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(2)).await;
    Json(json!({ "data": [] }))
}

async fn broken() -> &'static str {
    "<html>maintenance</html>"
}

fn router(backend: Backend) -> Router {
    Router::new()
        .route("/api/v1/dashboard/admin/loans", get(list_loans))
        .route(
            "/api/v1/dashboard/admin/loans/{id}",
            get(show_loan).delete(delete_loan),
        )
        .route(
            "/api/v1/dashboard/admin/loan-repayments",
            post(create_repayment),
        )
        .route("/api/v1/dashboard/admin/payouts", get(payouts))
        .route(
            "/api/v1/dashboard/admin/trip-tracking/{id}/location",
            get(location),
        )
        .route("/api/v1/dashboard/admin/trips/{id}/optimize", post(optimize))
        .route("/api/v1/dashboard/admin/ai-assistant/logs", get(assistant_logs))
        .route(
            "/api/v1/dashboard/admin/ai-assistant/user-credits/{id}",
            put(assistant_update),
        )
        .route(
            "/api/v1/dashboard/admin/ai-assistant/product-metadata/{id}",
            put(assistant_update),
        )
        .route("/api/v1/dashboard/admin/orders/delete", delete(delete_orders))
        .route("/api/v1/dashboard/admin/products", get(products))
        .route("/api/v1/slow", get(slow))
        .route("/api/v1/broken", get(broken))
        .with_state(backend)
}

async fn spawn_backend() -> (SocketAddr, Backend) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let backend = Backend::default();
    let app = router(backend.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, backend)
}

fn client_for(addr: SocketAddr, token: Option<&str>) -> Client {
    Client::builder()
        .base_url(&format!("http://{addr}"))
        .token(token.map(str::to_string))
        .build()
        .unwrap()
}

#[tokio::test]
async fn list_sends_query_and_bearer_token() {
    let (addr, backend) = spawn_backend().await;
    let loans: RestResource<Loan> = RestResource::new(client_for(addr, Some("secret")), paths::LOANS);

    let params = ListParams::new(3, 10)
        .with_search("amina")
        .with_filter("status", FilterValue::List(vec!["active".into(), "repaid".into()]));
    let page = loans.list(&params).await.unwrap();

    assert_eq!(page.data.len(), 5);
    assert_eq!(page.meta.total, 25);
    assert_eq!(page.data[0].id, 21);
    assert_eq!(page.data[0].amount, 21_000.0);

    let query = backend.queries.lock().unwrap()[0].clone();
    assert_eq!(query_value(&query, "perPage"), Some("10"));
    assert_eq!(query_value(&query, "search"), Some("amina"));
    let statuses: Vec<_> = query
        .iter()
        .filter(|(k, _)| k == "status[]")
        .map(|(_, v)| v.as_str())
        .collect();
    assert_eq!(statuses, vec!["active", "repaid"]);
    assert!(query_value(&query, "sort").is_none());
    assert_eq!(
        backend.tokens.lock().unwrap()[0].as_deref(),
        Some("secret")
    );
}

#[tokio::test]
async fn get_unwraps_envelope_and_maps_not_found() {
    let (addr, _) = spawn_backend().await;
    let loans: RestResource<Loan> = RestResource::new(client_for(addr, Some("secret")), paths::LOANS);

    let loan = loans.get(4).await.unwrap();
    assert_eq!(loan.id, 4);
    assert_eq!(loan.user.unwrap().display_name(), "Amina Said");

    let err = loans.get(99).await.unwrap_err();
    assert_eq!(
        err,
        ServiceError::RequestFailed {
            status: FailureStatus::Http(404),
            message: "Loan not found".to_string(),
        }
    );
}

#[tokio::test]
async fn create_posts_payload_and_surfaces_validation_message() {
    let (addr, backend) = spawn_backend().await;
    let repayments: RestResource<Repayment> =
        RestResource::new(client_for(addr, Some("secret")), paths::LOAN_REPAYMENTS);
    let paid_at = chrono::NaiveDate::from_ymd_opt(2026, 3, 1)
        .unwrap()
        .and_hms_opt(10, 30, 0)
        .unwrap();

    let mut payload = RepaymentNew {
        loan_id: 2,
        amount: 1050.0,
        payment_method: PaymentMethod::MobileMoney,
        paid_at,
    };
    let created = repayments.create(&payload).await.unwrap();
    assert_eq!(created.id, 1);
    assert_eq!(created.loan_id, 2);
    assert_eq!(created.payment_method, Some(PaymentMethod::MobileMoney));

    let body = backend.bodies.lock().unwrap()[0].clone();
    assert_eq!(body["paid_at"], "2026-03-01 10:30:00");
    assert_eq!(body["payment_method"], "mobile_money");

    payload.amount = 50_000.0;
    let err = repayments.create(&payload).await.unwrap_err();
    assert_eq!(err.to_string(), "Amount exceeds remaining balance");
    assert_eq!(err.status(), Some(FailureStatus::Http(422)));
}

#[tokio::test]
async fn unauthenticated_answer_runs_hook_and_token_can_be_replaced() {
    let (addr, backend) = spawn_backend().await;
    let calls = Arc::new(AtomicUsize::new(0));
    let hook_calls = Arc::clone(&calls);
    let client = Client::builder()
        .base_url(&format!("http://{addr}"))
        .on_unauthenticated(move || {
            hook_calls.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .unwrap();

    let err = client
        .get::<Value>(paths::PAYOUTS, &[])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::RequestFailed { status: FailureStatus::Http(401), ref message } if message == "Unauthenticated."
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    client.set_token(Some("fresh".to_string())).await;
    assert!(client.has_token().await);
    client.get::<Value>(paths::PAYOUTS, &[]).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        backend.tokens.lock().unwrap().last().cloned().flatten().as_deref(),
        Some("fresh")
    );
}

#[tokio::test]
async fn slow_server_times_out() {
    let (addr, _) = spawn_backend().await;
    let client = Client::builder()
        .base_url(&format!("http://{addr}"))
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();

    let err = client.get::<Value>("slow", &[]).await.unwrap_err();
    assert_eq!(err.status(), Some(FailureStatus::Timeout));
}

#[tokio::test]
async fn malformed_success_body_is_decode_error() {
    let (addr, _) = spawn_backend().await;
    let err = client_for(addr, None)
        .get::<Value>("broken", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client_for(addr, None)
        .get::<Value>(paths::LOANS, &[])
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert!(matches!(ServiceError::from(err), ServiceError::Network(_)));
}

#[tokio::test]
async fn flattened_pagination_is_accepted() {
    let (addr, _) = spawn_backend().await;
    let logs: RestResource<AssistantLog> =
        RestResource::new(client_for(addr, Some("secret")), paths::AI_ASSISTANT_LOGS);

    let page = logs.list(&ListParams::new(2, 15)).await.unwrap();
    assert_eq!(page.meta.current_page, 2);
    assert_eq!(page.meta.per_page, 15);
    assert_eq!(page.meta.total, 16);
    assert!(page.data[0].successful);
}

#[tokio::test]
async fn delete_accepts_empty_answer() {
    let (addr, _) = spawn_backend().await;
    let loans: RestResource<Loan> = RestResource::new(client_for(addr, Some("secret")), paths::LOANS);
    loans.delete(3).await.unwrap();
}

#[tokio::test]
async fn tracking_and_trip_actions() {
    let (addr, _) = spawn_backend().await;
    let client = client_for(addr, Some("secret"));

    let position = client.location(12).await.unwrap();
    assert!((position.lat + 6.8161).abs() < 1e-9);
    assert!((position.lng - 39.2803).abs() < 1e-9);

    let ack = client.trips_optimize(12).await.unwrap();
    assert_eq!(ack.message.as_deref(), Some("Trip optimized"));
}

#[tokio::test]
async fn assistant_updates_put_their_payloads() {
    let (addr, backend) = spawn_backend().await;
    let client = client_for(addr, Some("secret"));

    let ack = client
        .ai_update_credits(4, &CreditsUpdate { credits: 250 })
        .await
        .unwrap();
    assert_eq!(ack.message.as_deref(), Some("Updated"));

    client
        .ai_update_product_metadata(
            9,
            &ProductMetadataUpdate {
                calories: Some(420),
                ingredient_tags: vec!["vegetarian".to_string()],
                allergen_flags: vec!["peanut".to_string(), "sesame".to_string()],
                representative_image: None,
            },
        )
        .await
        .unwrap();

    let bodies = backend.bodies.lock().unwrap();
    assert_eq!(bodies[0], json!({ "credits": 250 }));
    assert_eq!(
        bodies[1],
        json!({
            "calories": 420,
            "ingredient_tags": ["vegetarian"],
            "allergen_flags": ["peanut", "sesame"]
        })
    );
}

#[tokio::test]
async fn bulk_order_delete_indexes_ids() {
    let (addr, backend) = spawn_backend().await;
    let client = client_for(addr, Some("secret"));

    client.orders_delete(&[4, 9, 12]).await.unwrap();

    let queries = backend.queries.lock().unwrap();
    assert_eq!(
        queries[0],
        vec![
            ("ids[0]".to_string(), "4".to_string()),
            ("ids[1]".to_string(), "9".to_string()),
            ("ids[2]".to_string(), "12".to_string()),
        ]
    );
}

#[tokio::test]
async fn product_list_with_total_only() {
    let (addr, _) = spawn_backend().await;
    let products: RestResource<AiProduct> =
        RestResource::new(client_for(addr, Some("secret")), paths::PRODUCTS);

    let page = products.list(&ListParams::new(1, 10)).await.unwrap();
    assert_eq!(page.meta.total, 21);
    assert_eq!(page.data[0].calories, Some(650.0));
    assert_eq!(page.data[0].allergen_flags, Vec::<String>::new());
}
