use actix_web::cookie::Cookie;
use actix_web::{test, App};
use backend::auth::SESSION_COOKIE;
use backend::datastore::collections::{BLOG_POSTS, COMMENTS, EVENTS, RSVPS};
use backend::error::REGISTRATIONS_UNAVAILABLE;
use backend::middleware::{Logger, REQUEST_ID_HEADER};
use backend::routes::{self, Services};
use backend::test_support::{MemoryRowSource, StaticAdminGate};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;

fn seeded() -> MemoryRowSource {
    MemoryRowSource::new()
        .with_rows(
            BLOG_POSTS,
            vec![
                json!({"id": 1, "title": "Welcome", "category": "News", "status": "published", "created_at": "2024-04-01T08:00:00Z"}),
                json!({"id": 2, "title": "Volunteers", "category": "News", "status": "published", "created_at": "2024-04-03T08:00:00Z"}),
                json!({"id": 3, "title": "Recap", "category": "Events", "status": "published", "created_at": "2024-04-02T08:00:00Z"}),
                json!({"id": 4, "title": "Draft A", "category": "News", "status": "draft", "created_at": "2024-04-04T08:00:00Z"}),
                json!({"id": 5, "title": "Draft B", "category": null, "status": "draft", "created_at": "2024-04-05T08:00:00Z"}),
            ],
        )
        .with_rows(
            COMMENTS,
            vec![
                json!({"id": 10, "status": "approved", "blog_post_id": 2}),
                json!({"id": 11, "status": "approved", "blog_post_id": 2}),
                json!({"id": 12, "status": "pending", "blog_post_id": 1}),
                json!({"id": 13, "status": "approved", "blog_post_id": 3}),
            ],
        )
        .with_rows(
            EVENTS,
            vec![
                json!({"registered": 10}),
                json!({"registered": 5}),
                json!({"registered": 0}),
            ],
        )
        .with_rows(
            RSVPS,
            vec![
                json!({"id": 100, "name": "Ada Lovelace", "email": "ada@example.com", "phone": "555-0101",
                       "created_at": "2024-05-01T10:00:00Z", "event_id": 9, "events": {"title": "Summer Gala"}}),
                json!({"id": 101, "name": "Grace Hopper", "email": "grace@example.com", "phone": null,
                       "created_at": "2024-05-03T10:00:00Z", "event_id": 4, "events": {"title": "Hackathon"}}),
            ],
        )
}

fn services(source: MemoryRowSource) -> Services {
    Services {
        source: Arc::new(source),
        gate: Arc::new(
            StaticAdminGate::new()
                .with_session("admin-session", "admin@example.com", true)
                .with_session("editor-session", "editor@example.com", false),
        ),
        redis: None,
        top_posts_limit: 5,
    }
}

macro_rules! app {
    ($services:expr) => {{
        let services = $services;
        test::init_service(
            App::new()
                .wrap(Logger)
                .configure(|cfg| routes::configure(cfg, &services)),
        )
        .await
    }};
}

fn admin_get(uri: &str) -> test::TestRequest {
    test::TestRequest::get()
        .uri(uri)
        .cookie(Cookie::new(SESSION_COOKIE, "admin-session"))
}

#[actix_web::test]
async fn test_analytics_summary_end_to_end() {
    let app = app!(services(seeded()));

    let resp = test::call_service(&app, admin_get("/api/admin/analytics/summary").to_request()).await;
    assert_eq!(resp.status().as_u16(), 200);
    assert!(resp.headers().contains_key(REQUEST_ID_HEADER));

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["blog"]["total"], 5);
    assert_eq!(body["blog"]["published"], 3);
    assert_eq!(body["blog"]["draft"], 2);
    assert_eq!(body["comments"]["approved"], 3);
    assert_eq!(body["comments"]["pending"], 1);
    assert_eq!(body["events"]["total_events"], 3);
    assert_eq!(body["events"]["total_registrations"], 15);
    assert_eq!(
        body["top_posts"],
        json!([
            {"post_id": "2", "title": "Volunteers", "comment_count": 2},
            {"post_id": "3", "title": "Recap", "comment_count": 1},
            {"post_id": "1", "title": "Welcome", "comment_count": 0},
        ])
    );
    assert_eq!(
        body["categories"],
        json!([
            {"category": "News", "count": 2, "percentage": 67},
            {"category": "Events", "count": 1, "percentage": 33},
        ])
    );
    assert_eq!(body["degraded"], json!([]));
}

#[actix_web::test]
async fn test_event_failure_degrades_only_events() {
    let app = app!(services(seeded().failing(EVENTS)));

    let resp = test::call_service(&app, admin_get("/api/admin/analytics/summary").to_request()).await;
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["degraded"], json!(["events"]));
    assert_eq!(body["events"], json!({"total_events": 0, "total_registrations": 0}));
    assert_eq!(body["blog"]["published"], 3);
    assert_eq!(body["comments"]["total"], 4);
}

#[actix_web::test]
async fn test_admin_routes_reject_non_admins() {
    let app = app!(services(seeded()));

    for uri in ["/api/admin/analytics/summary", "/api/admin/registrations"] {
        let anonymous = test::TestRequest::get().uri(uri).to_request();
        assert_eq!(test::call_service(&app, anonymous).await.status().as_u16(), 401);

        let editor = test::TestRequest::get()
            .uri(uri)
            .cookie(Cookie::new(SESSION_COOKIE, "editor-session"))
            .to_request();
        let resp = test::call_service(&app, editor).await;
        assert_eq!(resp.status().as_u16(), 403);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "FORBIDDEN");
    }
}

#[actix_web::test]
async fn test_registrations_filtering() {
    let app = app!(services(seeded()));

    let resp = test::call_service(&app, admin_get("/api/admin/registrations").to_request()).await;
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["matched"], 2);
    assert_eq!(body["rows"][0]["id"], "101");
    assert_eq!(body["events"][0], json!({"event_id": "4", "title": "Hackathon"}));

    let resp = test::call_service(
        &app,
        admin_get("/api/admin/registrations?search=GALA&event_id=").to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["matched"], 1);
    assert_eq!(body["rows"][0]["name"], "Ada Lovelace");
    assert_eq!(body["rows"][0]["event_title"], "Summer Gala");

    let resp = test::call_service(
        &app,
        admin_get("/api/admin/registrations?event_id=4").to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["matched"], 1);
    assert_eq!(body["rows"][0]["email"], "grace@example.com");
}

#[actix_web::test]
async fn test_registrations_failure_surfaces_notification() {
    let app = app!(services(seeded().failing(RSVPS)));

    let resp = test::call_service(&app, admin_get("/api/admin/registrations").to_request()).await;
    assert_eq!(resp.status().as_u16(), 502);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "UPSTREAM_ERROR");
    assert_eq!(body["notification"], REGISTRATIONS_UNAVAILABLE);
}

#[actix_web::test]
async fn test_overlong_search_is_rejected() {
    let app = app!(services(seeded()));
    let uri = format!("/api/admin/registrations?search={}", "a".repeat(201));

    let resp = test::call_service(&app, admin_get(&uri).to_request()).await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_web::test]
async fn test_health_and_metrics_are_public() {
    let app = app!(services(seeded()));

    let health = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(health.status().as_u16(), 200);

    let metrics = test::call_service(&app, test::TestRequest::get().uri("/metrics").to_request()).await;
    assert_eq!(metrics.status().as_u16(), 200);
}
