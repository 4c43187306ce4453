use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, warn};

use crate::correlate::{CorrelatedResult, RequestFuture};
use crate::error::{AggregateError, Result};
use crate::record::GroupKey;

/// Lanza una request por clave y espera a que terminen todas.
///
/// - todas las requests se spawnean antes de esperar la primera (sin tope de concurrencia)
/// - cada resultado se escribe una sola vez en su posición del buffer
/// - el primer error gana: se devuelve enseguida y las demás requests siguen
///   corriendo sueltas en el runtime, su resultado se descarta
/// - sin claves no se lanza nada
pub async fn join_all<F>(keys: Vec<GroupKey>, request_fn: F) -> Result<Vec<CorrelatedResult>>
where
    F: Fn(GroupKey) -> RequestFuture,
{
    if keys.is_empty() {
        return Ok(Vec::new());
    }

    let total = keys.len();

    // collect() consume el iterador entero: todo queda en vuelo antes del primer await
    let mut pending: FuturesUnordered<_> = keys
        .into_iter()
        .enumerate()
        .map(|(idx, key)| {
            debug!("lanzando request para clave {}", key);
            let handle = tokio::spawn(request_fn(key));
            async move { (idx, handle.await) }
        })
        .collect();

    let mut buffer: Vec<Option<CorrelatedResult>> = (0..total).map(|_| None).collect();
    let mut remaining = total;

    while let Some((idx, joined)) = pending.next().await {
        match joined {
            Ok(Ok(result)) => {
                buffer[idx] = Some(result);
                remaining -= 1;
            }
            Ok(Err(e)) => {
                warn!(
                    "request fallida, se abandona el join ({} de {} pendientes): {}",
                    remaining, total, e
                );
                return Err(e);
            }
            Err(e) => return Err(AggregateError::Join(e.to_string())),
        }
    }

    debug!("join completo: {} resultados", total - remaining);
    Ok(buffer.into_iter().flatten().collect())
}
