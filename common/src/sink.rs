use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::{error, info};

/// Severidad de una línea de progreso.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Error,
}

/// Destino de las líneas de progreso y del documento final.
pub trait Sink: Send + Sync {
    fn log(&self, level: LogLevel, line: &str);

    /// Recibe el mapa agregado ya serializado.
    fn publish(&self, text: &str);
}

/// Manda todo a `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl Sink for TracingSink {
    fn log(&self, level: LogLevel, line: &str) {
        match level {
            LogLevel::Info => info!("{}", line),
            LogLevel::Error => error!("{}", line),
        }
    }

    fn publish(&self, text: &str) {
        info!("resultado:\n{}", text);
    }
}

/// Guarda líneas y documento en memoria (tests, embebido en otra app).
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<(LogLevel, String)>>,
    published: Mutex<Option<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(LogLevel, String)> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn lines_with(&self, level: LogLevel) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, line)| line)
            .collect()
    }

    pub fn published(&self) -> Option<String> {
        self.published.lock().ok().and_then(|p| p.clone())
    }
}

impl Sink for MemorySink {
    fn log(&self, level: LogLevel, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((level, line.to_string()));
        }
    }

    fn publish(&self, text: &str) {
        if let Ok(mut published) = self.published.lock() {
            *published = Some(text.to_string());
        }
    }
}
