use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

use std::sync::Arc;

use crate::{catalog, scenarios, sessions::Sessions, worksheet};
use engine::{CurrencyPair, Engine};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub sessions: Sessions,
    /// Currencies printed on worksheet reports.
    pub currencies: CurrencyPair,
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/catalog", get(catalog::list))
        .route("/scenarios", get(scenarios::list))
        .route("/scenarios/{scenario_id}", delete(scenarios::delete))
        .route("/worksheets", post(worksheet::session_new))
        .route(
            "/worksheets/{session_id}",
            get(worksheet::session_get).delete(worksheet::session_delete),
        )
        .route("/worksheets/{session_id}/lines", post(worksheet::line_new))
        .route(
            "/worksheets/{session_id}/lines/{line_id}",
            patch(worksheet::line_update).delete(worksheet::line_delete),
        )
        .route("/worksheets/{session_id}/tier", put(worksheet::tier_switch))
        .route(
            "/worksheets/{session_id}/controls",
            patch(worksheet::controls_update),
        )
        .route("/worksheets/{session_id}/reset", post(worksheet::reset))
        .route("/worksheets/{session_id}/save", post(worksheet::save))
        .route("/worksheets/{session_id}/load", post(worksheet::load))
        .route("/worksheets/{session_id}/export", get(worksheet::export_csv))
        .route("/worksheets/{session_id}/print", get(worksheet::print))
        .route("/worksheets/{session_id}/shipment", get(worksheet::shipment))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
    currencies: CurrencyPair,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        sessions: Sessions::default(),
        currencies,
    };

    axum::serve(listener, router(state)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, Bytes},
        http::{Method, Request, StatusCode, header},
    };
    use engine::{CatalogVariant, Packaging, PriceTiers, UnitCosts};
    use http_body_util::BodyExt;
    use migration::MigratorTrait;
    use sea_orm::Database;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use uuid::Uuid;

    async fn test_router() -> (Router, CatalogVariant) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let engine = Engine::builder().database(db).build().await.unwrap();

        let variant = CatalogVariant {
            id: Uuid::new_v4(),
            brand: "Acme".to_string(),
            model: "Kettle".to_string(),
            code: "AC-K1".to_string(),
            description: "1.7l".to_string(),
            packaging: Packaging {
                units_per_carton: 4,
                length_cm: 40.0,
                width_cm: 30.0,
                height_cm: 20.0,
            },
            costs: UnitCosts {
                foreign: 10.0,
                local: 0.0,
            },
            prices: PriceTiers {
                standard: 120.0,
                online: 99.0,
                proposal: 90.0,
            },
        };
        engine.upsert_variants(&[variant.clone()]).await.unwrap();

        let state = ServerState {
            engine: Arc::new(engine),
            sessions: Sessions::default(),
            currencies: CurrencyPair::default(),
        };
        (router(state), variant)
    }

    async fn send(
        router: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Bytes) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes)
    }

    async fn send_json(
        router: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, bytes) = send(router, method, uri, body).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn open_session(router: &Router) -> String {
        let (status, body) = send_json(router, Method::POST, "/worksheets", None).await;
        assert_eq!(status, StatusCode::CREATED);
        body["session_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn catalog_lists_seeded_variant() {
        let (router, variant) = test_router().await;
        let (status, body) = send_json(&router, Method::GET, "/catalog", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["code"], "AC-K1");
        assert_eq!(body[0]["id"], variant.id.to_string());
    }

    #[tokio::test]
    async fn add_line_recomputes_the_worksheet() {
        let (router, variant) = test_router().await;
        let session = open_session(&router).await;

        let (status, body) = send_json(
            &router,
            Method::POST,
            &format!("/worksheets/{session}/lines"),
            Some(json!({ "variant_id": variant.id, "quantity": 10 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body["line_id"].is_string());

        let (status, view) = send_json(
            &router,
            Method::GET,
            &format!("/worksheets/{session}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["state"], "editing");
        assert_eq!(view["unsaved"], true);
        let row = &view["rows"][0];
        assert_eq!(row["quantity"], 10);
        assert_eq!(row["target_price"], 120.0);
        assert_eq!(row["tier_label"], "standard");
        assert!((row["exact_cartons"].as_f64().unwrap() - 2.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn add_line_without_selection_is_rejected() {
        let (router, _) = test_router().await;
        let session = open_session(&router).await;

        let (status, body) = send_json(
            &router,
            Method::POST,
            &format!("/worksheets/{session}/lines"),
            Some(json!({ "variant_id": null, "quantity": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "No catalog variant selected");
    }

    #[tokio::test]
    async fn tier_switch_reprices_lines() {
        let (router, variant) = test_router().await;
        let session = open_session(&router).await;
        send(
            &router,
            Method::POST,
            &format!("/worksheets/{session}/lines"),
            Some(json!({ "variant_id": variant.id, "quantity": 2 })),
        )
        .await;

        let (status, view) = send_json(
            &router,
            Method::PUT,
            &format!("/worksheets/{session}/tier"),
            Some(json!({ "tier": "online" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["tier"], "online");
        assert_eq!(view["rows"][0]["target_price"], 99.0);
        assert_eq!(view["rows"][0]["tier_label"], "online");
    }

    #[tokio::test]
    async fn invalid_line_update_changes_nothing() {
        let (router, variant) = test_router().await;
        let session = open_session(&router).await;
        let (_, created) = send_json(
            &router,
            Method::POST,
            &format!("/worksheets/{session}/lines"),
            Some(json!({ "variant_id": variant.id, "quantity": 3 })),
        )
        .await;
        let line_id = created["line_id"].as_str().unwrap();

        let (status, _) = send_json(
            &router,
            Method::PATCH,
            &format!("/worksheets/{session}/lines/{line_id}"),
            Some(json!({ "quantity": 7, "target_price": -1.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (_, view) = send_json(
            &router,
            Method::GET,
            &format!("/worksheets/{session}"),
            None,
        )
        .await;
        assert_eq!(view["rows"][0]["quantity"], 3);
        assert_eq!(view["rows"][0]["tier_label"], "standard");
    }

    #[tokio::test]
    async fn reset_with_lines_needs_confirmation() {
        let (router, variant) = test_router().await;
        let session = open_session(&router).await;
        send(
            &router,
            Method::POST,
            &format!("/worksheets/{session}/lines"),
            Some(json!({ "variant_id": variant.id, "quantity": 1 })),
        )
        .await;

        let uri = format!("/worksheets/{session}/reset");
        let (status, _) = send_json(&router, Method::POST, &uri, Some(json!({}))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, view) =
            send_json(&router, Method::POST, &uri, Some(json!({ "confirm": true }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["state"], "empty");
        assert_eq!(view["rows"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn save_list_and_load_round_trip() {
        let (router, variant) = test_router().await;
        let session = open_session(&router).await;
        send(
            &router,
            Method::POST,
            &format!("/worksheets/{session}/lines"),
            Some(json!({ "variant_id": variant.id, "quantity": 8 })),
        )
        .await;
        send(
            &router,
            Method::PATCH,
            &format!("/worksheets/{session}/controls"),
            Some(json!({ "exchange_rate": 4.2 })),
        )
        .await;

        let (status, saved) = send_json(
            &router,
            Method::POST,
            &format!("/worksheets/{session}/save"),
            Some(json!({ "name": "Spring order" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let scenario_id = saved["id"].as_str().unwrap().to_string();

        let (_, listed) = send_json(&router, Method::GET, "/scenarios", None).await;
        assert_eq!(listed[0]["name"], "Spring order");
        assert_eq!(listed[0]["line_count"], 1);

        let other = open_session(&router).await;
        let (status, view) = send_json(
            &router,
            Method::POST,
            &format!("/worksheets/{other}/load"),
            Some(json!({ "scenario_id": scenario_id })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["state"], "loaded");
        assert_eq!(view["controls"]["exchange_rate"], 4.2);
        assert_eq!(view["rows"][0]["quantity"], 8);
        assert_eq!(view["rows"][0]["tier_label"], "manual");

        let (status, _) = send(
            &router,
            Method::DELETE,
            &format!("/scenarios/{scenario_id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, listed) = send_json(&router, Method::GET, "/scenarios", None).await;
        assert_eq!(listed.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn save_without_name_is_rejected() {
        let (router, _) = test_router().await;
        let session = open_session(&router).await;
        let (status, body) = send_json(
            &router,
            Method::POST,
            &format!("/worksheets/{session}/save"),
            Some(json!({ "name": " " })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "scenario name must not be empty");
    }

    #[tokio::test]
    async fn load_unknown_scenario_is_404() {
        let (router, _) = test_router().await;
        let session = open_session(&router).await;
        let (status, _) = send_json(
            &router,
            Method::POST,
            &format!("/worksheets/{session}/load"),
            Some(json!({ "scenario_id": Uuid::new_v4() })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_session_is_404() {
        let (router, _) = test_router().await;
        let (status, _) = send(
            &router,
            Method::GET,
            &format!("/worksheets/{}", Uuid::new_v4()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn export_print_and_shipment() {
        let (router, variant) = test_router().await;
        let session = open_session(&router).await;
        send(
            &router,
            Method::POST,
            &format!("/worksheets/{session}/lines"),
            Some(json!({ "variant_id": variant.id, "quantity": 9 })),
        )
        .await;

        let (status, csv) = send(
            &router,
            Method::GET,
            &format!("/worksheets/{session}/export"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let csv = String::from_utf8(csv.to_vec()).unwrap();
        assert!(csv.starts_with("brand,model,code"));
        assert_eq!(csv.lines().count(), 2);

        let (status, text) = send(
            &router,
            Method::GET,
            &format!("/worksheets/{session}/print?title=Spring"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(text.to_vec()).unwrap().starts_with("Spring\n"));

        let (status, report) = send_json(
            &router,
            Method::GET,
            &format!("/worksheets/{session}/shipment"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["lines"][0]["cartons"], 3);
        assert_eq!(report["total_cartons"], 3);
    }
}
