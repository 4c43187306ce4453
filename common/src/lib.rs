//! Motor de agregación por clave sobre endpoints REST.
//!
//! Pide una colección primaria, la agrupa por un campo clave y después,
//! por cada slot dependiente, lanza una request por clave en paralelo,
//! espera a todas y vuelca cada respuesta en la entrada de su clave.

pub mod config;
pub mod correlate;
pub mod engine;
pub mod error;
pub mod fanout;
pub mod pipeline;
pub mod record;
pub mod results;
pub mod sink;
pub mod transport;

pub use config::{PipelineConfig, PrimarySource, SlotConfig, BASE_URL_ENV, DEFAULT_BASE_URL};
pub use correlate::{CorrelatedResult, RequestCorrelator, RequestFuture, UrlTemplate};
pub use engine::{build_keyed_map, merge_results, AggregateEntry, AggregateMap};
pub use error::{AggregateError, Result};
pub use fanout::join_all;
pub use pipeline::AggregationPipeline;
pub use record::{GroupKey, Record, Records};
pub use results::{to_pretty_json, AggregationRun, RunId};
pub use sink::{LogLevel, MemorySink, Sink, TracingSink};
pub use transport::{HttpTransport, StaticTransport, Transport};
