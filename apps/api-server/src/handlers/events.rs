//! The push channel: a Server-Sent Events stream of "changed" signals.
//!
//! One stream per browser session, server-to-client only. The `retry:`
//! preamble sets the client's fixed reconnect delay; dropping the stream on
//! disconnect drops its receiver and removes the channel from the fan-out
//! set. Delivery never blocks the mutation path.

use actix_web::{HttpResponse, web};
use futures::{StreamExt, stream};
use tokio::sync::broadcast::error::RecvError;

use crate::state::AppState;

/// Reconnect delay handed to the client, in milliseconds.
const RETRY_MS: u32 = 3000;

/// GET /api/events
pub async fn subscribe(state: web::Data<AppState>) -> HttpResponse {
    let rx = state.updates.subscribe();
    tracing::debug!(channels = state.updates.receiver_count(), "Push channel opened");

    let preamble = stream::iter(vec![Ok::<_, actix_web::Error>(web::Bytes::from(format!(
        "retry: {RETRY_MS}\n\n"
    )))]);

    let signals = stream::unfold(rx, |mut rx| async move {
        match rx.recv().await {
            Ok(_) => Some((
                Ok(web::Bytes::from_static(b"data: changed\n\n")),
                rx,
            )),
            // Clients re-fetch everything on any signal, so missed
            // signals coalesce into the one we deliver now.
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Push channel lagged; coalescing signals");
                Some((Ok(web::Bytes::from_static(b"data: changed\n\n")), rx))
            }
            Err(RecvError::Closed) => None,
        }
    });

    HttpResponse::Ok()
        .insert_header(("Cache-Control", "no-cache"))
        .content_type("text/event-stream")
        .streaming(preamble.chain(signals))
}
