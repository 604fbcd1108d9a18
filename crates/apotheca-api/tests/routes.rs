use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;
use tower::ServiceExt;

use apotheca_api::auth::{AppState, AppStateInner};
use apotheca_core::notifications::{AvailabilityEvent, NotificationQueue};
use apotheca_core::object_store::LocalObjectStore;
use apotheca_db::{Database, SubscriptionStore};
use apotheca_types::models::MedicineSubscription;

struct TestApp {
    app: Router,
    db: Arc<Database>,
    state: AppState,
    events: UnboundedReceiver<AvailabilityEvent>,
    _uploads: TempDir,
}

struct Actors {
    admin: String,
    owner: String,
    owner_id: String,
    pharmacy_id: String,
    user: String,
    user_id: String,
    medicine_id: String,
}

async fn setup() -> TestApp {
    let uploads = tempfile::tempdir().unwrap();
    let db = Arc::new(Database::open_in_memory().unwrap());
    let objects = Arc::new(
        LocalObjectStore::new(uploads.path().to_path_buf(), "http://localhost/uploads")
            .await
            .unwrap(),
    );
    let (queue, events) = NotificationQueue::new();
    let state: AppState = Arc::new(AppStateInner::new(
        db.clone(),
        objects,
        queue,
        4,
        "test-secret".into(),
    ));

    TestApp {
        app: apotheca_api::router(state.clone()),
        db,
        state,
        events,
        _uploads: uploads,
    }
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
        Some(body) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, value)
}

async fn bootstrap(t: &TestApp) -> Actors {
    let (status, body) = call(
        &t.app,
        Method::POST,
        "/auth/admin/register",
        None,
        Some(json!({"name": "Root", "email": "root@example.com", "password": "admin-pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let admin = body["token"].as_str().unwrap().to_string();

    let (status, body) = call(
        &t.app,
        Method::POST,
        "/admin/medicines",
        Some(&admin),
        Some(json!({"title": "Aspirin", "description": "Pain relief"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let medicine_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &t.app,
        Method::POST,
        "/admin/pharmacies",
        Some(&admin),
        Some(json!({
            "title": "Corner Pharmacy",
            "description": "Open late",
            "location": {"latitude": 41.0, "longitude": 29.0},
            "ownerName": "Olga",
            "ownerEmail": "olga@example.com",
            "ownerPassword": "owner-pass"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let pharmacy_id = body["pharmacy"]["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &t.app,
        Method::POST,
        "/auth/owners/login",
        None,
        Some(json!({"email": "OLGA@example.com", "password": "owner-pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pharmacy"]["id"], pharmacy_id.as_str());
    let owner = body["token"].as_str().unwrap().to_string();
    let owner_id = body["owner"]["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &t.app,
        Method::POST,
        "/auth/users/register",
        None,
        Some(json!({
            "fullName": "Pat Patient",
            "email": "pat@example.com",
            "password": "user-pass",
            "confirmPassword": "user-pass"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let user = body["token"].as_str().unwrap().to_string();
    let user_id = body["account"]["id"].as_str().unwrap().to_string();

    Actors {
        admin,
        owner,
        owner_id,
        pharmacy_id,
        user,
        user_id,
        medicine_id,
    }
}

#[tokio::test]
async fn health_is_public() {
    let t = setup().await;
    let (status, body) = call(&t.app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn auth_and_roles_are_enforced() {
    let t = setup().await;
    let a = bootstrap(&t).await;

    let (status, body) = call(&t.app, Method::GET, "/admin/medicines", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = call(&t.app, Method::GET, "/admin/medicines", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&t.app, Method::GET, "/admin/medicines", Some(&a.user), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&t.app, Method::GET, "/owner/medicines", Some(&a.admin), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&t.app, Method::GET, "/chat/conversations", Some(&a.admin), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(&t.app, Method::GET, "/admin/medicines", Some(&a.admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    // Wrong password, duplicate email, mismatched confirmation.
    let (status, _) = call(
        &t.app,
        Method::POST,
        "/auth/users/login",
        None,
        Some(json!({"email": "pat@example.com", "password": "nope-nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(
        &t.app,
        Method::POST,
        "/auth/admin/register",
        None,
        Some(json!({"name": "Again", "email": "ROOT@example.com", "password": "admin-pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = call(
        &t.app,
        Method::POST,
        "/auth/users/register",
        None,
        Some(json!({
            "fullName": "Sam",
            "email": "sam@example.com",
            "password": "abcdef",
            "confirmPassword": "abcdeg"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn owner_inventory_flow_queues_notifications() {
    let mut t = setup().await;
    let a = bootstrap(&t).await;
    let base = format!("/owner/pharmacies/{}/medicines", a.pharmacy_id);

    t.db.insert_subscription(&MedicineSubscription {
        id: "sub-1".into(),
        user_id: a.user_id.clone(),
        pharmacy_id: a.pharmacy_id.clone(),
        medicine_name: "Aspirin".into(),
        pharmacy_name: "Corner Pharmacy".into(),
        notified: false,
        triggered: false,
        triggered_at: None,
    })
    .unwrap();

    let (status, body) = call(&t.app, Method::GET, &format!("{base}/addable"), Some(&a.owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, row) = call(
        &t.app,
        Method::POST,
        &base,
        Some(&a.owner),
        Some(json!({"medicineId": a.medicine_id, "status": "unavailable"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(t.events.try_recv().is_err());
    let row_id = row["id"].as_str().unwrap().to_string();

    let (status, _) = call(
        &t.app,
        Method::POST,
        &base,
        Some(&a.owner),
        Some(json!({"medicineId": a.medicine_id})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = call(
        &t.app,
        Method::PATCH,
        &format!("{base}/{row_id}"),
        Some(&a.owner),
        Some(json!({"status": "available"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "available");

    let event = t.events.try_recv().unwrap();
    assert_eq!(event.medicine_name, "Aspirin");
    let summary = t
        .state
        .notifications
        .check_availability(&event.pharmacy_id, &event.medicine_name)
        .await;
    assert_eq!(summary.triggered, 1);

    let (status, body) = call(
        &t.app,
        Method::GET,
        &format!("/notifications/pharmacies/{}", a.pharmacy_id),
        Some(&a.owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["triggered"], true);

    let (status, body) = call(&t.app, Method::GET, &base, Some(&a.owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["medicine"]["title"], "Aspirin");
    assert_eq!(body[0]["pharmacyId"], a.pharmacy_id.as_str());

    let (status, _) = call(&t.app, Method::DELETE, &format!("{base}/{row_id}"), Some(&a.owner), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = call(&t.app, Method::GET, &base, Some(&a.owner), None).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn other_owners_cannot_touch_a_pharmacy() {
    let t = setup().await;
    let a = bootstrap(&t).await;

    call(
        &t.app,
        Method::POST,
        "/admin/pharmacies",
        Some(&a.admin),
        Some(json!({
            "title": "Rival Pharmacy",
            "description": "Across the street",
            "location": {"latitude": 41.0, "longitude": 29.1},
            "ownerEmail": "rival@example.com",
            "ownerPassword": "rival-pass"
        })),
    )
    .await;
    let (_, body) = call(
        &t.app,
        Method::POST,
        "/auth/owners/login",
        None,
        Some(json!({"email": "rival@example.com", "password": "rival-pass"})),
    )
    .await;
    let rival = body["token"].as_str().unwrap().to_string();

    let uri = format!("/owner/pharmacies/{}/medicines", a.pharmacy_id);
    let (status, body) = call(&t.app, Method::GET, &uri, Some(&rival), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());

    let (status, _) = call(
        &t.app,
        Method::GET,
        "/owner/pharmacies/missing/medicines",
        Some(&rival),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn chat_flow_tracks_unread_counts() {
    let t = setup().await;
    let a = bootstrap(&t).await;

    let open = json!({
        "userId": a.user_id,
        "pharmacyOwnerId": a.owner_id,
        "pharmacyId": a.pharmacy_id
    });
    let (status, conversation) =
        call(&t.app, Method::POST, "/chat/conversations", Some(&a.user), Some(open.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let id = conversation["id"].as_str().unwrap().to_string();

    let (_, again) = call(&t.app, Method::POST, "/chat/conversations", Some(&a.owner), Some(open)).await;
    assert_eq!(again["id"], id.as_str());

    let messages = format!("/chat/conversations/{id}/messages");
    for text in ["first", "second", "third"] {
        let (status, msg) = call(
            &t.app,
            Method::POST,
            &messages,
            Some(&a.user),
            Some(json!({"content": text})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(msg["type"], "text");
        assert_eq!(msg["senderName"], "Pat Patient");
    }

    let (status, _) = call(&t.app, Method::POST, &messages, Some(&a.user), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, c) = call(&t.app, Method::GET, &format!("/chat/conversations/{id}"), Some(&a.owner), None).await;
    assert_eq!(c["unreadCountPharmacyOwner"], 3);
    assert_eq!(c["unreadCountUser"], 0);
    assert_eq!(c["lastMessage"], "third");

    let (_, page) = call(&t.app, Method::GET, &format!("{messages}?limit=2"), Some(&a.owner), None).await;
    let page = page.as_array().unwrap().clone();
    assert_eq!(page[0]["content"], "third");
    assert_eq!(page.len(), 2);
    let cursor = page[1]["id"].as_str().unwrap();
    let (_, rest) = call(
        &t.app,
        Method::GET,
        &format!("{messages}?limit=2&cursor={cursor}"),
        Some(&a.owner),
        None,
    )
    .await;
    assert_eq!(rest.as_array().unwrap().len(), 1);
    assert_eq!(rest[0]["content"], "first");

    let read = format!("/chat/conversations/{id}/read");
    let (_, body) = call(&t.app, Method::POST, &read, Some(&a.user), None).await;
    assert_eq!(body["markedCount"], 0);
    let (_, body) = call(&t.app, Method::POST, &read, Some(&a.owner), None).await;
    assert_eq!(body, json!({"success": true, "markedCount": 3}));

    let (_, c) = call(&t.app, Method::GET, &format!("/chat/conversations/{id}"), Some(&a.user), None).await;
    assert_eq!(c["unreadCountPharmacyOwner"], 0);

    let (status, _) = call(
        &t.app,
        Method::PATCH,
        &format!("/chat/conversations/{id}/archive"),
        Some(&a.user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, list) = call(&t.app, Method::GET, "/chat/conversations", Some(&a.user), None).await;
    assert!(list.as_array().unwrap().is_empty());
}

fn multipart_image(uri: &str, token: &str, content_type: &str) -> Request<Body> {
    let boundary = "XBOUNDARYX";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"pic\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"\x89PNG\r\n\x1a\nfake");
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn upload(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn chat_image_upload_validates_type() {
    let t = setup().await;
    let a = bootstrap(&t).await;

    let (status, body) = upload(&t.app, multipart_image("/chat/images", &a.user, "image/png")).await;
    assert_eq!(status, StatusCode::CREATED);
    let url = body["imageUrl"].as_str().unwrap();
    assert!(url.starts_with("http://localhost/uploads/chat-images/"));
    assert!(url.ends_with(".png"));

    let (status, _) = upload(&t.app, multipart_image("/chat/images", &a.user, "text/plain")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_catalog_image_uploads() {
    let t = setup().await;
    let a = bootstrap(&t).await;

    let (status, body) = upload(
        &t.app,
        multipart_image("/admin/medicines/images", &a.admin, "image/webp"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(
        body["imageUrl"]
            .as_str()
            .unwrap()
            .starts_with("http://localhost/uploads/medicines/")
    );

    // Chat allows GIFs, the catalog does not.
    let (status, _) = upload(
        &t.app,
        multipart_image("/admin/pharmacies/upload-image", &a.admin, "image/gif"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = upload(
        &t.app,
        multipart_image("/admin/pharmacies/upload-image", &a.owner, "image/png"),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_edits_and_deletes_medicines() {
    let t = setup().await;
    let a = bootstrap(&t).await;
    let path = format!("/admin/medicines/{}", a.medicine_id);

    let (status, body) = call(
        &t.app,
        Method::PATCH,
        &path,
        Some(&a.admin),
        Some(json!({"title": "Aspirin 500", "status": "unavailable"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Aspirin 500");
    assert_eq!(body["description"], "Pain relief");

    let (status, _) = call(
        &t.app,
        Method::PATCH,
        &path,
        Some(&a.admin),
        Some(json!({"dosage": "twice"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, list) = call(&t.app, Method::GET, "/admin/medicines?status=unavailable", Some(&a.admin), None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    let (_, list) = call(&t.app, Method::GET, "/admin/medicines?status=available", Some(&a.admin), None).await;
    assert!(list.as_array().unwrap().is_empty());

    let (status, found) = call(&t.app, Method::GET, "/admin/medicines/search?q=asp", Some(&a.admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found[0]["id"], a.medicine_id.as_str());
    let (status, _) = call(&t.app, Method::GET, "/admin/medicines/search", Some(&a.admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&t.app, Method::DELETE, &path, Some(&a.admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&t.app, Method::GET, &path, Some(&a.admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&t.app, Method::DELETE, &path, Some(&a.admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_edits_and_deletes_pharmacies_with_owner() {
    let t = setup().await;
    let a = bootstrap(&t).await;
    let path = format!("/admin/pharmacies/{}", a.pharmacy_id);
    let owner_login = |password: &'static str| {
        call(
            &t.app,
            Method::POST,
            "/auth/owners/login",
            None,
            Some(json!({"email": "olga@example.com", "password": password})),
        )
    };

    let (status, _) = call(
        &t.app,
        Method::PATCH,
        &path,
        Some(&a.admin),
        Some(json!({"ownerPassword": "123"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &t.app,
        Method::PATCH,
        &path,
        Some(&a.admin),
        Some(json!({"title": "Corner Pharmacy 24h", "ownerPassword": "fresh-pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Corner Pharmacy 24h");
    assert_eq!(body["owner"]["email"], "olga@example.com");

    assert_eq!(owner_login("owner-pass").await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(owner_login("fresh-pass").await.0, StatusCode::OK);

    let (_, owners) = call(&t.app, Method::GET, "/admin/pharmacies/owners/all", Some(&a.admin), None).await;
    assert_eq!(owners.as_array().unwrap().len(), 1);
    let (status, owner) = call(
        &t.app,
        Method::GET,
        &format!("/admin/pharmacies/owners/{}", a.owner_id),
        Some(&a.admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(owner["name"], "Olga");
    let (_, found) = call(&t.app, Method::GET, "/admin/pharmacies/search?q=24H", Some(&a.admin), None).await;
    assert_eq!(found.as_array().unwrap().len(), 1);

    // Stocked pharmacies can still be deleted.
    let (status, _) = call(
        &t.app,
        Method::POST,
        &format!("/owner/pharmacies/{}/medicines", a.pharmacy_id),
        Some(&a.owner),
        Some(json!({"medicineId": a.medicine_id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = call(&t.app, Method::DELETE, &path, Some(&a.admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&t.app, Method::GET, &path, Some(&a.admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(owner_login("fresh-pass").await.0, StatusCode::UNAUTHORIZED);
    let (_, owners) = call(&t.app, Method::GET, "/admin/pharmacies/owners/all", Some(&a.admin), None).await;
    assert!(owners.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn banned_users_cannot_log_in() {
    let t = setup().await;
    let a = bootstrap(&t).await;
    let status_path = format!("/admin/users/{}/status", a.user_id);
    let user_login = || {
        call(
            &t.app,
            Method::POST,
            "/auth/users/login",
            None,
            Some(json!({"email": "pat@example.com", "password": "user-pass"})),
        )
    };

    let (status, body) = call(
        &t.app,
        Method::PATCH,
        &status_path,
        Some(&a.admin),
        Some(json!({"status": "banned"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "banned");

    let (status, body) = user_login().await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Your account has been banned");

    let (_, banned) = call(&t.app, Method::GET, "/admin/users?status=banned", Some(&a.admin), None).await;
    assert_eq!(banned.as_array().unwrap().len(), 1);

    let (status, _) = call(
        &t.app,
        Method::PATCH,
        &status_path,
        Some(&a.admin),
        Some(json!({"status": "inactive"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Only end users can be banned here.
    let (status, _) = call(
        &t.app,
        Method::PATCH,
        &format!("/admin/users/{}/status", a.owner_id),
        Some(&a.admin),
        Some(json!({"status": "banned"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &t.app,
        Method::PATCH,
        &status_path,
        Some(&a.user),
        Some(json!({"status": "active"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(
        &t.app,
        Method::PATCH,
        &status_path,
        Some(&a.admin),
        Some(json!({"status": "active"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user_login().await.0, StatusCode::OK);

    let (_, found) = call(&t.app, Method::GET, "/admin/users/search?q=PATIENT", Some(&a.admin), None).await;
    assert_eq!(found[0]["id"], a.user_id.as_str());

    let user_path = format!("/admin/users/{}", a.user_id);
    let (status, _) = call(&t.app, Method::DELETE, &user_path, Some(&a.admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&t.app, Method::GET, &user_path, Some(&a.admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(user_login().await.0, StatusCode::UNAUTHORIZED);
}
