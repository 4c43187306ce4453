use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use url::form_urlencoded;

use crate::error::Result;
use crate::record::GroupKey;
use crate::sink::{LogLevel, Sink};
use crate::transport::Transport;

/// Marcador que se reemplaza por la clave en los templates de URL.
pub const KEY_PLACEHOLDER: &str = "{key}";

/// Respuesta de una request dependiente, etiquetada con la clave que la originó.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelatedResult {
    pub key: GroupKey,
    pub payload: Value,
}

/// Future de una request por clave. `'static` para poder spawnearla.
pub type RequestFuture = BoxFuture<'static, Result<CorrelatedResult>>;

/// Template de URL de un endpoint dependiente, ej: "/todos?userId={key}".
/// Si no tiene `{key}`, la clave se concatena al final ("/users?id=" + clave).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UrlTemplate(String);

impl UrlTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path (o URL absoluta) para una clave concreta.
    /// La clave va codificada: "a&b c" queda "a%26b%20c".
    pub fn render(&self, key: &GroupKey) -> String {
        let key = encode_key(key);
        if self.0.contains(KEY_PLACEHOLDER) {
            self.0.replace(KEY_PLACEHOLDER, &key)
        } else {
            format!("{}{}", self.0, key)
        }
    }
}

// '+' sólo sale de un espacio (un '+' literal queda %2B); %20 vale en path y en query.
fn encode_key(key: &GroupKey) -> String {
    form_urlencoded::byte_serialize(key.to_string().as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Une base y path. Los paths absolutos (http/https) se usan tal cual.
pub fn resolve_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        format!("{}{}", base_url.trim_end_matches('/'), path)
    }
}

/// Arma la request de cada clave y etiqueta la respuesta con esa misma clave.
/// La correlación sale siempre de la clave de entrada, nunca del body:
/// los endpoints filtrados por query param no repiten la clave.
#[derive(Clone)]
pub struct RequestCorrelator {
    transport: Arc<dyn Transport>,
    sink: Arc<dyn Sink>,
    base_url: String,
}

impl RequestCorrelator {
    pub fn new(
        transport: Arc<dyn Transport>,
        sink: Arc<dyn Sink>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            sink,
            base_url: base_url.into(),
        }
    }

    pub fn request(&self, key: GroupKey, template: &UrlTemplate) -> RequestFuture {
        let path = template.render(&key);
        let url = resolve_url(&self.base_url, &path);
        let transport = Arc::clone(&self.transport);
        let sink = Arc::clone(&self.sink);

        Box::pin(async move {
            let payload = transport.get_json(&url).await?;
            sink.log(LogLevel::Info, &path);
            Ok(CorrelatedResult { key, payload })
        })
    }
}
