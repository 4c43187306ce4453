use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::correlate::{resolve_url, RequestCorrelator};
use crate::engine::{build_keyed_map, merge_results};
use crate::error::{AggregateError, Result};
use crate::fanout::join_all;
use crate::record::GroupKey;
use crate::results::{to_pretty_json, AggregationRun, RunId};
use crate::sink::{LogLevel, Sink};
use crate::transport::{HttpTransport, Transport};

/// Orquesta una corrida completa:
/// 1. GET de la colección primaria -> mapa por clave
/// 2. por cada slot dependiente (en orden): fan-out por clave + merge
/// 3. serializa el mapa y lo entrega al sink
///
/// Cualquier error corta la corrida entera: no se publica nada parcial.
pub struct AggregationPipeline {
    config: PipelineConfig,
    transport: Arc<dyn Transport>,
    sink: Arc<dyn Sink>,
}

impl AggregationPipeline {
    pub fn new(
        config: PipelineConfig,
        transport: Arc<dyn Transport>,
        sink: Arc<dyn Sink>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            transport,
            sink,
        })
    }

    /// Pipeline con transporte HTTP real (respeta el timeout de la config).
    pub fn over_http(config: PipelineConfig, sink: Arc<dyn Sink>) -> Result<Self> {
        let transport = match config.request_timeout() {
            Some(timeout) => HttpTransport::with_timeout(timeout)?,
            None => HttpTransport::new(),
        };
        Self::new(config, Arc::new(transport), sink)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub async fn run(&self) -> Result<AggregationRun> {
        let run_id = Uuid::new_v4();

        match self.execute(run_id).await {
            Ok(run) => {
                self.sink.publish(&run.output);
                info!(
                    "corrida {} terminada: {} claves, {} requests, {} ms",
                    run_id,
                    run.keys,
                    run.requests_issued,
                    run.elapsed_ms()
                );
                Ok(run)
            }
            Err(e) => {
                self.sink.log(LogLevel::Error, &e.to_string());
                error!("corrida {} fallida: {}", run_id, e);
                Err(e)
            }
        }
    }

    async fn execute(&self, run_id: RunId) -> Result<AggregationRun> {
        let started_at = Utc::now();
        let cfg = &self.config;

        // 1) Colección primaria
        self.sink.log(LogLevel::Info, "obteniendo datos iniciales");
        let primary_url = resolve_url(&cfg.base_url, &cfg.primary.path);
        let body = self.transport.get_json(&primary_url).await?;
        self.sink.log(LogLevel::Info, &cfg.primary.path);

        let records = match body {
            Value::Array(items) => items,
            _ => {
                return Err(AggregateError::UnexpectedShape {
                    url: primary_url,
                    expected: "un array JSON",
                })
            }
        };
        info!(
            "corrida {}: {} registros primarios desde {}",
            run_id,
            records.len(),
            primary_url
        );

        let mut map = build_keyed_map(
            records,
            &cfg.group_key,
            &cfg.slot_names(),
            &cfg.primary.slot,
        )?;

        // Las claves quedan fijas acá; los merges sólo tocan contenido de slots.
        let keys: Vec<GroupKey> = map.keys().cloned().collect();

        // 2) Un fan-out por slot, de a uno por vez
        let correlator = RequestCorrelator::new(
            Arc::clone(&self.transport),
            Arc::clone(&self.sink),
            cfg.base_url.clone(),
        );
        let mut requests_issued = 0;

        for (slot, template) in cfg.fetched_slots() {
            info!(
                "corrida {}: slot `{}` -> {} requests ({})",
                run_id,
                slot,
                keys.len(),
                template.as_str()
            );
            requests_issued += keys.len();
            let results = join_all(keys.clone(), |key| correlator.request(key, template)).await?;
            merge_results(&mut map, results, slot)?;
        }

        // 3) Salida
        let output = to_pretty_json(&map)?;

        Ok(AggregationRun {
            run_id,
            started_at,
            finished_at: Utc::now(),
            keys: keys.len(),
            requests_issued,
            map,
            output,
        })
    }
}
