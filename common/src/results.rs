use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use uuid::Uuid;

use crate::engine::AggregateMap;
use crate::error::Result;

pub type RunId = Uuid;

/// Resultado de una corrida completa del pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct AggregationRun {
    pub run_id: RunId,

    /// -------- Métricas de la corrida --------
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Claves distintas en la colección primaria
    pub keys: usize,
    /// Requests dependientes lanzadas (sin contar la primaria)
    pub requests_issued: usize,

    pub map: AggregateMap,

    /// El mapa ya serializado, tal cual se entregó al sink
    #[serde(skip)]
    pub output: String,
}

impl AggregationRun {
    pub fn elapsed_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

/// JSON legible con indentación de un espacio.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b" "));
    value.serialize(&mut ser)?;
    // serde_json sólo escribe UTF-8 válido
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
