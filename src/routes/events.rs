use actix_web::{web, HttpResponse, Responder};
use tokio::sync::broadcast;

use crate::services::events::EventBus;

/// Change feed as server-sent events. Consumers treat each event as a
/// hint to refetch the named collection, so dropped events on a lagging
/// subscriber are tolerable.
pub async fn subscribe(bus: web::Data<EventBus>) -> impl Responder {
    let rx = bus.subscribe();

    let stream = futures::stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let payload = match serde_json::to_string(&event) {
                        Ok(payload) => payload,
                        Err(err) => {
                            eprintln!("Failed to serialize change event: {:?}", err);
                            continue;
                        }
                    };
                    let frame = format!("data: {}\n\n", payload);
                    return Some((
                        Ok::<web::Bytes, actix_web::Error>(web::Bytes::from(frame)),
                        rx,
                    ));
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::warn!("SSE subscriber lagged, skipped {} events", skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    });

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(stream)
}
