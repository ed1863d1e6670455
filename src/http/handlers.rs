//! Axum handler that records each request and replays the configured response

use axum::{
    body::{self, Body},
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    response::Response,
};
use tracing::{debug, warn};

use crate::state::{EndpointState, MockResponse, RecordedRequest};

pub async fn record_and_respond(State(state): State<EndpointState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = body::to_bytes(body, usize::MAX).await.unwrap_or_default();

    let recorded = RecordedRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    debug!(
        method = %recorded.method,
        path = %recorded.path,
        body_len = recorded.body.len(),
        "recorded request"
    );
    state.record(recorded);

    render(&state.response())
}

fn render(mock: &MockResponse) -> Response {
    let mut response = Response::new(Body::from(mock.body.clone()));
    *response.status_mut() = mock.status;

    let headers = response.headers_mut();
    for (name, values) in &mock.headers {
        let Ok(header_name) = HeaderName::from_bytes(name.as_bytes()) else {
            warn!(header = %name, "skipping invalid response header name");
            continue;
        };

        headers.remove(&header_name);
        for value in values {
            match HeaderValue::from_str(value) {
                Ok(header_value) => {
                    headers.append(header_name.clone(), header_value);
                }
                Err(_) => warn!(header = %name, "skipping invalid response header value"),
            }
        }
    }

    response
}
