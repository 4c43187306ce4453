use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};
use tracing::debug;

use crate::error::{AggregateError, Result};

/// Capacidad mínima que necesita el motor: GET de una URL completa -> JSON.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<Value>;
}

/* =========================
   Transporte HTTP (reqwest)
   ========================= */

/// Transporte real sobre un `reqwest::Client` compartido.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Cliente con timeout por request.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AggregateError::Config(format!("no se pudo crear el cliente HTTP: {e}")))?;
        Ok(Self { client })
    }

    /// Reusa un cliente ya configurado por quien llama.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, url: &str) -> Result<Value> {
        debug!("GET {}", url);

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AggregateError::transport(url, e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AggregateError::http_status(url, status.as_u16()));
        }

        resp.json::<Value>()
            .await
            .map_err(|e| AggregateError::transport(url, format!("cuerpo JSON inválido: {e}")))
    }
}

/* =========================
   Transporte en memoria
   ========================= */

#[derive(Debug, Clone)]
enum Canned {
    Body(Value),
    Status(u16),
}

/// Transporte en memoria con respuestas fijas por URL.
/// - URLs no registradas responden 404
/// - se puede agregar una demora por URL para simular latencia
/// - guarda el log de URLs pedidas
#[derive(Debug, Clone, Default)]
pub struct StaticTransport {
    routes: HashMap<String, Canned>,
    delays: HashMap<String, Duration>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StaticTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, url: impl Into<String>, body: Value) -> Self {
        self.routes.insert(url.into(), Canned::Body(body));
        self
    }

    pub fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.routes.insert(url.into(), Canned::Status(status));
        self
    }

    pub fn with_delay(mut self, url: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(url.into(), delay);
        self
    }

    /// URLs pedidas hasta ahora, en orden de llamada.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|log| log.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Transport for StaticTransport {
    async fn get_json(&self, url: &str) -> Result<Value> {
        if let Ok(mut log) = self.requests.lock() {
            log.push(url.to_string());
        }

        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }

        match self.routes.get(url) {
            Some(Canned::Body(body)) => Ok(body.clone()),
            Some(Canned::Status(status)) => Err(AggregateError::http_status(url, *status)),
            None => Err(AggregateError::http_status(url, 404)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn static_transport_devuelve_respuesta_registrada() {
        let t = StaticTransport::new().with_response("http://x/posts", json!([1, 2]));

        let body = t.get_json("http://x/posts").await.unwrap();

        assert_eq!(body, json!([1, 2]));
        assert_eq!(t.requests(), vec!["http://x/posts".to_string()]);
    }

    #[tokio::test]
    async fn static_transport_url_desconocida_es_404() {
        let t = StaticTransport::new();

        let err = t.get_json("http://x/nada").await.unwrap_err();

        match err {
            AggregateError::Transport { url, status, .. } => {
                assert_eq!(url, "http://x/nada");
                assert_eq!(status, Some(404));
            }
            other => panic!("error inesperado: {other:?}"),
        }
    }

    #[tokio::test]
    async fn static_transport_status_registrado_es_error() {
        let t = StaticTransport::new().with_status("http://x/todos?userId=2", 500);

        let err = t.get_json("http://x/todos?userId=2").await.unwrap_err();

        assert!(err.is_transport());
        assert_eq!(t.request_count(), 1);
    }

    #[tokio::test]
    async fn static_transport_clones_comparten_log() {
        let t = StaticTransport::new().with_response("http://x/a", json!([]));
        let clone = t.clone();

        clone.get_json("http://x/a").await.unwrap();

        assert_eq!(t.request_count(), 1);
    }
}
