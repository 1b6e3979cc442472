// Integration tests for the cache-aware `ApiClient` using wiremock.
#![allow(clippy::unwrap_used, clippy::float_cmp)]

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vendtrack_api::{
    ApiClient, BulkVisit, BulkVisitPayload, Error, MachineRestockPayload, QueryParams,
    RestockEntryPayload,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let client =
        ApiClient::from_reqwest(&format!("{}/api", server.uri()), reqwest::Client::new()).unwrap();
    (server, client)
}

fn product(id: i64, name: &str) -> serde_json::Value {
    json!({ "id": id, "name": name, "sku": format!("SKU-{id}"), "average_cost": "0.45" })
}

fn sample_bulk() -> BulkVisitPayload {
    BulkVisitPayload {
        visit: BulkVisit {
            location: 3,
            visit_date: "2025-03-01T09:00".into(),
            notes: String::new(),
            user: Some(4),
        },
        machine_restocks: vec![MachineRestockPayload {
            machine: 7,
            notes: String::new(),
            restock_entries: vec![RestockEntryPayload {
                product: 12,
                stock_before: 3,
                discarded: 0,
                restocked: 9,
            }],
        }],
    }
}

// ── Read-through ────────────────────────────────────────────────────

#[tokio::test]
async fn test_second_read_is_served_from_cache() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/locations/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "id": 1, "name": "Depot", "address": "1 Main St" }])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let first = client.list_locations(false).await.unwrap();
    let second = client.list_locations(false).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first[0].name, "Depot");
    let stats = client.cache_stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}

#[tokio::test]
async fn test_skip_cache_goes_to_network_and_refreshes_entry() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/suppliers/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&server)
        .await;

    client
        .list_suppliers(&QueryParams::new(), false)
        .await
        .unwrap();
    client
        .list_suppliers(&QueryParams::new(), true)
        .await
        .unwrap();

    // Still cached after the forced read.
    assert!(client.cache().get("/suppliers/").is_some());
}

#[tokio::test]
async fn test_params_are_sent_and_keyed() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/machines/"))
        .and(query_param("location", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 7, "location": 3, "machine_type": "Snack", "model": "AP 123" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let params = QueryParams::new().with("location", 3);
    let machines = client.list_machines(&params, false).await.unwrap();

    assert_eq!(machines[0].label(), "Snack AP 123");
    assert!(client.cache().get("/machines/?location=3").is_some());
    assert!(client.cache().get("/machines/").is_none());
}

// ── Collection normalization ────────────────────────────────────────

#[tokio::test]
async fn test_paginated_and_bare_collections_both_normalize() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/products/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "results": [product(1, "Cola"), product(2, "Chips")]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/purchases/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 5, "product": 1, "quantity": 24, "total_cost": "10.80" }
        ])))
        .mount(&server)
        .await;

    let products = client
        .list_products(&QueryParams::new(), false)
        .await
        .unwrap();
    let purchases = client
        .list_purchases(&QueryParams::new(), false)
        .await
        .unwrap();

    assert_eq!(products.len(), 2);
    assert_eq!(products[1].name, "Chips");
    assert_eq!(products[0].average_cost, Some(0.45));
    assert_eq!(purchases[0].total_cost, Some(10.8));
}

// ── Write invalidation ──────────────────────────────────────────────

#[tokio::test]
async fn test_products_miss_hit_create_miss() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/products/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([product(1, "Cola")])))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/products/"))
        .and(body_json(json!({ "name": "Water", "sku": "W-1" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(product(2, "Water")))
        .expect(1)
        .mount(&server)
        .await;

    let none = QueryParams::new();
    client.list_products(&none, false).await.unwrap(); // miss
    client.list_products(&none, false).await.unwrap(); // hit

    let created = client
        .create_product(&json!({ "name": "Water", "sku": "W-1" }))
        .await
        .unwrap();
    assert_eq!(created.id, 2);

    client.list_products(&none, false).await.unwrap(); // miss again
}

#[tokio::test]
async fn test_failed_write_keeps_cache_and_reports_field_errors() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/locations/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/locations/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "name": ["This field is required."],
            "address": ["This field may not be blank."]
        })))
        .mount(&server)
        .await;

    client.list_locations(false).await.unwrap();
    let err = client.create_location(&json!({})).await.unwrap_err();

    match &err {
        Error::Api {
            status, message, ..
        } => {
            assert_eq!(*status, 400);
            assert_eq!(
                message,
                "address: This field may not be blank.; name: This field is required."
            );
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert!(err.field_summary().is_some());

    // Cached list survived the rejected write; the GET mock expects one hit.
    client.list_locations(false).await.unwrap();
}

#[tokio::test]
async fn test_bulk_visit_save_drops_reports_but_not_machines() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/dashboard/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "locations": 4, "machines": 9, "revenue_total": "812.40"
        })))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/analytics/stock-levels/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "low_stock_count": 2, "items": [] })),
        )
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/machines/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/visits/bulk-save/"))
        .and(body_json(serde_json::to_value(sample_bulk()).unwrap()))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 42, "location": 3, "visit_date": "2025-03-01T09:00:00Z", "user": 4
        })))
        .expect(1)
        .mount(&server)
        .await;

    let days = QueryParams::new().with("days", 30);
    let none = QueryParams::new();

    let dash = client.dashboard(&days, false).await.unwrap();
    assert_eq!(dash.machines, 9);
    assert_eq!(dash.revenue_total, 812.4);
    client.stock_levels(&none, false).await.unwrap();
    client.list_machines(&none, false).await.unwrap();

    let visit = client.create_visit_bulk(&sample_bulk()).await.unwrap();
    assert_eq!(visit.id, 42);

    client.dashboard(&days, false).await.unwrap();
    client.stock_levels(&none, false).await.unwrap();
    client.list_machines(&none, false).await.unwrap();
}

#[tokio::test]
async fn test_bulk_update_uses_put_on_visit_path() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/visits/42/bulk-update/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 42, "location": 3, "visit_date": "2025-03-01T09:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let visit = client.update_visit_bulk(42, &sample_bulk()).await.unwrap();
    assert_eq!(visit.location, 3);
}

#[tokio::test]
async fn test_delete_invalidates_after_no_content() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/machine-items/8/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client
        .cache()
        .set("/machine-items/?machine=7", json!([]));
    client
        .cache()
        .set("/inventory/current-stock/", json!({}));
    client.cache().set("/locations/", json!([]));

    client.delete_machine_item(8).await.unwrap();

    assert!(client.cache().get("/machine-items/?machine=7").is_none());
    assert!(client.cache().get("/inventory/current-stock/").is_none());
    assert!(client.cache().get("/locations/").is_some());
}

#[tokio::test]
async fn test_toggle_supplier_posts_without_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/suppliers/3/toggle_active/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3, "name": "Island Wholesale", "is_active": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    client.cache().set("/suppliers/active/", json!([]));
    let supplier = client.toggle_supplier_active(3).await.unwrap();

    assert!(!supplier.is_active);
    assert!(client.cache().get("/suppliers/active/").is_none());
}

// ── Errors ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_server_error_is_transient_and_not_cached() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/inventory/stock-coverage/"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = client
        .stock_coverage(&QueryParams::new().with("analysis_days", 30), false)
        .await
        .unwrap_err();

    assert!(err.is_transient());
    assert_eq!(err.status(), Some(503));
    assert!(client.cache().is_empty());
}

#[tokio::test]
async fn test_bulk_error_key_becomes_message() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/visits/bulk-save/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "Location is required" })),
        )
        .mount(&server)
        .await;

    let err = client.create_visit_bulk(&sample_bulk()).await.unwrap_err();
    match err {
        Error::Api { message, .. } => assert_eq!(message, "Location is required"),
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_routes_unwraps_envelope() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/locations/routes/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "routes": ["North", "South"] })),
        )
        .mount(&server)
        .await;

    let routes = client.list_routes(false).await.unwrap();
    assert_eq!(routes, vec!["North".to_owned(), "South".to_owned()]);
}
