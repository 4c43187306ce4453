use crate::record::GroupKey;

/// Resultado usado en todo el motor de agregación.
pub type Result<T> = std::result::Result<T, AggregateError>;

/// Errores que puede producir una corrida de agregación.
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    /// Falla de red o status HTTP no exitoso en una request.
    #[error("error de transporte en {url}: {message}")]
    Transport {
        url: String,
        /// Status HTTP si el servidor llegó a responder.
        status: Option<u16>,
        message: String,
    },

    /// Un registro primario no trae el campo de agrupación.
    #[error("el registro #{index} no tiene el campo clave `{field}`")]
    MissingKeyField { field: String, index: usize },

    /// El campo de agrupación existe pero no es entero ni string.
    #[error("el registro #{index} tiene un valor no soportado en `{field}`: {value}")]
    UnsupportedKey {
        field: String,
        index: usize,
        value: String,
    },

    /// Un resultado correlacionado apunta a una clave que no está en el mapa.
    #[error("la clave {key} no existe en el mapa (slot `{slot}`)")]
    UnknownKey { key: GroupKey, slot: String },

    /// Se intentó escribir en un slot que no fue declarado.
    #[error("el slot `{slot}` no está declarado")]
    UnknownSlot { slot: String },

    /// La respuesta no tiene la forma esperada (ej: objeto en vez de array).
    #[error("respuesta inesperada de {url}: se esperaba {expected}")]
    UnexpectedShape { url: String, expected: &'static str },

    /// Una tarea de request terminó con panic o fue abortada por el runtime.
    #[error("falló la tarea de request: {0}")]
    Join(String),

    #[error("configuración inválida: {0}")]
    Config(String),

    #[error("error de serialización: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("error de IO: {0}")]
    Io(#[from] std::io::Error),
}

impl AggregateError {
    /// Construye un error de transporte sin status (red, timeout, decode).
    pub fn transport(url: impl Into<String>, message: impl Into<String>) -> Self {
        AggregateError::Transport {
            url: url.into(),
            status: None,
            message: message.into(),
        }
    }

    /// Construye un error de transporte a partir de un status HTTP.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        AggregateError::Transport {
            url: url.into(),
            status: Some(status),
            message: format!("status HTTP {status}"),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, AggregateError::Transport { .. })
    }
}
