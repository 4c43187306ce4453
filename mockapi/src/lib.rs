//! Backend REST de prueba con la forma de jsonplaceholder
//! (`/posts`, `/todos`, `/users`, `/comments`), filtrable por query params.

pub mod handlers;
pub mod seed;
pub mod state;

pub use handlers::build_router;
pub use state::AppState;

/// Directorio con `<recurso>.json`; si no está, se usa el dataset fijo.
pub const DATA_DIR_ENV: &str = "MOCKAPI_DATA_DIR";
pub const ADDR_ENV: &str = "MOCKAPI_ADDR";
pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";
