//! Draining a response body so it can be both stored and sent.

use axum::{
    body::Body,
    http::{StatusCode, response::Parts},
    response::Response,
};
use bytes::Bytes;
use http_body_util::BodyExt;

use super::store::CacheError;

/// A response whose body has been read to the end.
///
/// The buffered bytes can be replayed into a fresh response any number of
/// times.
#[derive(Debug)]
pub struct BufferedResponse {
    parts: Parts,
    body: Bytes,
}

impl BufferedResponse {
    pub fn status(&self) -> StatusCode {
        self.parts.status
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn into_response(self) -> Response {
        Response::from_parts(self.parts, Body::from(self.body))
    }
}

/// Collect every body chunk, in order, into one buffer.
///
/// On a body error the original head is returned with an empty body.
pub async fn buffer_response(response: Response) -> Result<BufferedResponse, (Response, CacheError)> {
    let (parts, body) = response.into_parts();
    match BodyExt::collect(body).await {
        Ok(collected) => Ok(BufferedResponse {
            parts,
            body: collected.to_bytes(),
        }),
        Err(error) => {
            let rebuilt = Response::from_parts(parts, Body::empty());
            Err((
                rebuilt,
                CacheError::backend(format!("failed to buffer response body: {error}")),
            ))
        }
    }
}
