// mockapi/src/state.rs

use anyhow::{Context, Result};
use glob::glob;
use serde_json::Value;
use std::{
    collections::HashMap,
    fs,
    sync::{Arc, Mutex},
};
use tracing::info;

use crate::seed;

/// Nombre de recurso ("posts", "todos", ...) -> registros.
pub type Resources = HashMap<String, Vec<Value>>;

#[derive(Clone)]
pub struct AppState {
    pub resources: Arc<Mutex<Resources>>,
}

impl AppState {
    pub fn new(resources: Resources) -> Self {
        Self {
            resources: Arc::new(Mutex::new(resources)),
        }
    }

    /// Estado con el dataset fijo de `seed`.
    pub fn seeded() -> Self {
        Self::new(seed::dataset())
    }

    /// Carga cada `<dir>/<recurso>.json` (un array JSON por archivo).
    pub fn from_dir(dir: &str) -> Result<Self> {
        let pattern = format!("{}/*.json", dir.trim_end_matches('/'));
        let mut resources = Resources::new();

        for entry in glob(&pattern).with_context(|| format!("patrón inválido {pattern}"))? {
            let path = entry?;
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let raw = fs::read_to_string(&path)
                .with_context(|| format!("no se pudo leer {}", path.display()))?;
            let items: Vec<Value> = serde_json::from_str(&raw)
                .with_context(|| format!("{} no es un array JSON", path.display()))?;

            info!("recurso /{} cargado: {} registros", name, items.len());
            resources.insert(name.to_string(), items);
        }

        Ok(Self::new(resources))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, path::PathBuf};

    fn temp_dir(sub: &str) -> PathBuf {
        let base = env::temp_dir().join("mockapi_state_tests").join(sub);
        let _ = fs::remove_dir_all(&base);
        fs::create_dir_all(&base).unwrap();
        base
    }

    #[test]
    fn from_dir_usa_el_nombre_de_archivo_como_recurso() {
        let dir = temp_dir("ok");
        fs::write(dir.join("albums.json"), r#"[{"userId": 1, "id": 1}]"#).unwrap();
        fs::write(dir.join("notas.txt"), "ignorado").unwrap();

        let state = AppState::from_dir(dir.to_str().unwrap()).unwrap();
        let resources = state.resources.lock().unwrap();

        assert_eq!(resources.len(), 1);
        assert_eq!(resources["albums"].len(), 1);
    }

    #[test]
    fn from_dir_falla_si_el_archivo_no_es_array() {
        let dir = temp_dir("bad");
        fs::write(dir.join("users.json"), r#"{"id": 1}"#).unwrap();

        assert!(AppState::from_dir(dir.to_str().unwrap()).is_err());
    }
}
