use serde::{Deserialize, Serialize};
use std::{collections::HashSet, env, fs, path::Path, time::Duration};

use crate::correlate::UrlTemplate;
use crate::error::{AggregateError, Result};

pub const DEFAULT_BASE_URL: &str = "http://jsonplaceholder.typicode.com";

/// Env var que pisa la URL base configurada.
pub const BASE_URL_ENV: &str = "AGGREGATOR_BASE_URL";

/// Colección primaria: de acá salen las claves del mapa.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrimarySource {
    /// Slot donde quedan los registros primarios, ej: "posts".
    pub slot: String,
    /// Path del endpoint, ej: "/posts".
    pub path: String,
}

/// Slot dependiente. Sin `source` el slot se declara pero queda vacío.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlotConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<UrlTemplate>,
}

impl SlotConfig {
    pub fn fetched(name: &str, template: &str) -> Self {
        Self {
            name: name.to_string(),
            source: Some(UrlTemplate::new(template)),
        }
    }

    pub fn declared(name: &str) -> Self {
        Self {
            name: name.to_string(),
            source: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    pub base_url: String,

    /// Campo de agrupación, ej: "userId".
    pub group_key: String,

    pub primary: PrimarySource,

    /// Slots dependientes, en el orden en que se van a pedir.
    #[serde(default)]
    pub slots: Vec<SlotConfig>,

    /// Timeout por request (sin valor: sin timeout).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for PipelineConfig {
    /// posts de cada usuario + sus todos + su perfil, contra jsonplaceholder.
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            group_key: "userId".to_string(),
            primary: PrimarySource {
                slot: "posts".to_string(),
                path: "/posts".to_string(),
            },
            slots: vec![
                SlotConfig::fetched("tasks", "/todos?userId={key}"),
                SlotConfig::declared("comments"),
                SlotConfig::fetched("user", "/users?id={key}"),
            ],
            request_timeout_secs: None,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let cfg: PipelineConfig = serde_json::from_str(raw)?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Aplica `AGGREGATOR_BASE_URL` si está definida y no vacía.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                self.base_url = url;
            }
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(AggregateError::Config("base_url vacía".to_string()));
        }
        if self.group_key.trim().is_empty() {
            return Err(AggregateError::Config("group_key vacío".to_string()));
        }
        if self.primary.slot.trim().is_empty() || self.primary.path.trim().is_empty() {
            return Err(AggregateError::Config(
                "primary necesita slot y path".to_string(),
            ));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(self.primary.slot.as_str());

        for slot in &self.slots {
            if slot.name.trim().is_empty() {
                return Err(AggregateError::Config("slot sin nombre".to_string()));
            }
            if !seen.insert(slot.name.as_str()) {
                return Err(AggregateError::Config(format!(
                    "slot `{}` repetido",
                    slot.name
                )));
            }
            if let Some(source) = &slot.source {
                if source.as_str().trim().is_empty() {
                    return Err(AggregateError::Config(format!(
                        "slot `{}` con source vacío",
                        slot.name
                    )));
                }
            }
        }

        Ok(())
    }

    /// Nombres de todos los slots dependientes (con o sin source).
    pub fn slot_names(&self) -> Vec<String> {
        self.slots.iter().map(|s| s.name.clone()).collect()
    }

    /// Slots que se llenan con fan-out, en orden de configuración.
    pub fn fetched_slots(&self) -> impl Iterator<Item = (&str, &UrlTemplate)> {
        self.slots
            .iter()
            .filter_map(|s| s.source.as_ref().map(|t| (s.name.as_str(), t)))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{io::Write, path::PathBuf};

    fn temp_dir(sub: &str) -> PathBuf {
        let base = env::temp_dir().join("config_tests").join(sub);
        let _ = fs::remove_dir_all(&base);
        fs::create_dir_all(&base).unwrap();
        base
    }

    #[test]
    fn default_es_valida_y_apunta_a_jsonplaceholder() {
        let cfg = PipelineConfig::default();
        cfg.validate().unwrap();

        assert_eq!(cfg.group_key, "userId");
        assert_eq!(cfg.primary.slot, "posts");
        assert_eq!(cfg.slot_names(), vec!["tasks", "comments", "user"]);

        let fetched: Vec<_> = cfg.fetched_slots().map(|(n, t)| (n, t.as_str())).collect();
        assert_eq!(
            fetched,
            vec![("tasks", "/todos?userId={key}"), ("user", "/users?id={key}")]
        );
    }

    #[test]
    fn from_json_str_lee_slots_y_timeout() {
        let cfg = PipelineConfig::from_json_str(
            r#"{
                "base_url": "http://localhost:8080",
                "group_key": "postId",
                "primary": {"slot": "comments", "path": "/comments"},
                "slots": [
                    {"name": "post", "source": "/posts?id={key}"},
                    {"name": "notes"}
                ],
                "request_timeout_secs": 5
            }"#,
        )
        .unwrap();

        cfg.validate().unwrap();
        assert_eq!(cfg.slots[0], SlotConfig::fetched("post", "/posts?id={key}"));
        assert_eq!(cfg.slots[1], SlotConfig::declared("notes"));
        assert_eq!(cfg.request_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn from_json_str_rechaza_campos_desconocidos() {
        let err = PipelineConfig::from_json_str(
            r#"{"base_url": "x", "group_key": "k",
                "primary": {"slot": "a", "path": "/a"}, "retries": 3}"#,
        )
        .unwrap_err();
        assert!(matches!(err, AggregateError::Serialization(_)));
    }

    #[test]
    fn from_file_lee_json_de_disco() {
        let dir = temp_dir("from_file");
        let path = dir.join("pipeline.json");
        let mut f = fs::File::create(&path).unwrap();
        let raw = serde_json::to_string_pretty(&PipelineConfig::default()).unwrap();
        f.write_all(raw.as_bytes()).unwrap();

        let cfg = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(cfg, PipelineConfig::default());
    }

    #[test]
    fn from_file_inexistente_es_error_io() {
        let err = PipelineConfig::from_file("/no/existe/pipeline.json").unwrap_err();
        assert!(matches!(err, AggregateError::Io(_)));
    }

    #[test]
    fn with_env_overrides_pisa_la_base_url() {
        env::set_var(BASE_URL_ENV, "http://mockapi:8080");
        let cfg = PipelineConfig::default().with_env_overrides();
        env::remove_var(BASE_URL_ENV);

        assert_eq!(cfg.base_url, "http://mockapi:8080");
        assert_eq!(PipelineConfig::default().with_env_overrides().base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn validate_rechaza_slots_repetidos() {
        let mut cfg = PipelineConfig::default();
        cfg.slots.push(SlotConfig::declared("tasks"));
        assert!(matches!(cfg.validate(), Err(AggregateError::Config(_))));
    }

    #[test]
    fn validate_rechaza_slot_igual_al_primario() {
        let mut cfg = PipelineConfig::default();
        cfg.slots.push(SlotConfig::fetched("posts", "/posts?userId={key}"));
        assert!(matches!(cfg.validate(), Err(AggregateError::Config(_))));
    }

    #[test]
    fn validate_rechaza_group_key_vacio() {
        let cfg = PipelineConfig {
            group_key: " ".to_string(),
            ..PipelineConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(AggregateError::Config(_))));
    }
}
