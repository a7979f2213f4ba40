//! Data stream wire format.
//!
//! Every part is one line. Answer text goes out as text parts,
//! `0:<json string>`; every other event goes out as a data part,
//! `2:[<event json>]`.

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderName};
use axum::response::{IntoResponse, Response};
use scout_answer::{Envelope, Event};
use scout_core::AppResult;
use std::convert::Infallible;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Header advertising the protocol version.
pub const PROTOCOL_HEADER: &str = "x-vercel-ai-data-stream";
pub const PROTOCOL_VERSION: &str = "v1";

/// Encode one event as a wire part, including the trailing newline.
pub fn encode(envelope: &Envelope) -> AppResult<String> {
    match &envelope.event {
        Event::Token { text } => Ok(format!("0:{}\n", serde_json::to_string(text)?)),
        _ => Ok(format!("2:{}\n", serde_json::to_string(&[envelope])?)),
    }
}

/// Aborts the turn task when the response body is dropped.
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Stream the events of a running turn as the response body.
pub fn stream_response(mut events: mpsc::Receiver<Envelope>, task: JoinHandle<()>) -> Response {
    let guard = AbortOnDrop(task);

    let body = async_stream::stream! {
        let _guard = guard;
        while let Some(envelope) = events.recv().await {
            match encode(&envelope) {
                Ok(part) => {
                    yield Ok::<_, Infallible>(Bytes::from(part));
                }
                Err(err) => {
                    tracing::warn!(error = %err, event = envelope.event.kind(), "Skipping unencodable event");
                }
            }
        }
    };

    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (HeaderName::from_static(PROTOCOL_HEADER), PROTOCOL_VERSION),
        ],
        Body::from_stream(body),
    )
        .into_response()
}
