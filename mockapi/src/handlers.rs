use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::Value;
use std::collections::HashMap;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/:resource", get(list_resource))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/* ---------------- handlers HTTP ---------------- */

async fn health() -> &'static str {
    "ok"
}

// Lista un recurso filtrando por igualdad en cada query param (?userId=1&id=3)
async fn list_resource(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Query(filters): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Value>>, StatusCode> {
    let resources = state
        .resources
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let Some(items) = resources.get(&resource) else {
        warn!("recurso desconocido: /{}", resource);
        return Err(StatusCode::NOT_FOUND);
    };

    let out: Vec<Value> = items
        .iter()
        .filter(|item| matches_filters(item, &filters))
        .cloned()
        .collect();

    debug!("/{} {:?} -> {} registros", resource, filters, out.len());
    Ok(Json(out))
}

/// El valor del campo, como texto, tiene que ser igual al del query param.
fn matches_filters(item: &Value, filters: &HashMap<String, String>) -> bool {
    filters.iter().all(|(field, expected)| {
        item.get(field)
            .map(|v| value_as_text(v) == *expected)
            .unwrap_or(false)
    })
}

fn value_as_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::json;
    use tower::ServiceExt;

    fn state() -> AppState {
        let mut resources = HashMap::new();
        resources.insert(
            "todos".to_string(),
            vec![
                json!({"userId": 1, "id": 1, "title": "a"}),
                json!({"userId": 2, "id": 2, "title": "b"}),
                json!({"userId": 1, "id": 3, "title": "c"}),
            ],
        );
        AppState::new(resources)
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let resp = build_router(state())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[test]
    fn matches_filters_compara_como_texto() {
        let item = json!({"userId": 1, "name": "Ana"});
        let mut f = HashMap::new();
        f.insert("userId".to_string(), "1".to_string());
        f.insert("name".to_string(), "Ana".to_string());
        assert!(matches_filters(&item, &f));

        f.insert("missing".to_string(), "x".to_string());
        assert!(!matches_filters(&item, &f));
    }

    #[tokio::test]
    async fn lista_todo_el_recurso_sin_filtros() {
        let (status, body) = get_json("/todos").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn filtra_por_query_param() {
        let (status, body) = get_json("/todos?userId=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([
                {"userId": 1, "id": 1, "title": "a"},
                {"userId": 1, "id": 3, "title": "c"}
            ])
        );
    }

    #[tokio::test]
    async fn filtro_sin_coincidencias_da_array_vacio() {
        let (status, body) = get_json("/todos?userId=9").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn recurso_desconocido_es_404() {
        let (status, _) = get_json("/albums?userId=1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_responde_ok() {
        let resp = build_router(state())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
