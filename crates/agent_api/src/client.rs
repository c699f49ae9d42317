use std::future::Future;
use std::sync::{atomic::AtomicBool, atomic::Ordering, Arc};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response, StatusCode};

use crate::config::AgentApiConfig;
use crate::error::{parse_error_message, ApiError};
use crate::events::{decode_frame, FinishInfo, StreamEvent};
use crate::headers::build_headers;
use crate::payload::ChatRequest;
use crate::retry::{is_retryable_http_error, retry_delay_ms, MAX_RETRIES};
use crate::sse::FrameReader;
use crate::url::normalize_chat_url;

/// Optional cancellation signal shared across request and stream loops.
pub type CancellationSignal = Arc<AtomicBool>;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug)]
pub struct AgentApiClient {
    http: Client,
    config: AgentApiConfig,
}

#[derive(Debug, Clone)]
pub struct StreamResult {
    pub events: Vec<StreamEvent>,
    pub finish: Option<FinishInfo>,
}

impl AgentApiClient {
    pub fn new(config: AgentApiConfig) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &AgentApiConfig {
        &self.config
    }

    pub fn normalized_endpoint(&self) -> String {
        normalize_chat_url(&self.config.base_url)
    }

    pub fn build_headers(&self, user_agent: Option<&str>) -> Result<HeaderMap, ApiError> {
        let headers = build_headers(&self.config, user_agent)?;
        let mut out = HeaderMap::new();
        for (key, value) in headers {
            out.insert(
                HeaderName::from_bytes(key.as_bytes())
                    .map_err(|_| ApiError::InvalidBaseUrl(format!("invalid header key: {key}")))?,
                HeaderValue::from_str(&value).map_err(|_| {
                    ApiError::InvalidBaseUrl(format!("invalid header value for {key}"))
                })?,
            );
        }
        Ok(out)
    }

    pub fn build_request(&self, request: &ChatRequest) -> Result<reqwest::RequestBuilder, ApiError> {
        validate_request_payload_shape(request)?;

        let headers = self.build_headers(self.config.user_agent.as_deref())?;
        Ok(self
            .http
            .post(self.normalized_endpoint())
            .headers(headers)
            .json(request))
    }

    pub async fn send_with_retry(
        &self,
        request: &ChatRequest,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<Response, ApiError> {
        let mut last_status: Option<StatusCode> = None;
        let mut last_error = None;

        for attempt in 0..=MAX_RETRIES {
            if is_cancelled(cancellation) {
                return Err(ApiError::Cancelled);
            }

            let response = self.build_request(request)?.send();
            let response = await_or_cancel(response, cancellation)
                .await?
                .map_err(ApiError::from);

            match response {
                Ok(response) => {
                    if response.status().is_success() {
                        return Ok(response);
                    }

                    let status = response.status();
                    last_status = Some(status);
                    let body = await_or_cancel(response.text(), cancellation)
                        .await?
                        .unwrap_or_else(|_| {
                            status
                                .canonical_reason()
                                .unwrap_or("request failed")
                                .to_string()
                        });
                    let message = parse_error_message(status, &body);
                    last_error = Some(message.clone());

                    if status == StatusCode::UNAUTHORIZED {
                        return Err(ApiError::Unauthorized(message));
                    }

                    if attempt < MAX_RETRIES && is_retryable_http_error(status.as_u16(), &body) {
                        await_or_cancel(tokio::time::sleep(retry_delay_ms(attempt)), cancellation)
                            .await?;
                        continue;
                    }

                    return Err(ApiError::Status(status, message));
                }
                Err(error) => {
                    last_error = Some(error.to_string());
                    if attempt < MAX_RETRIES {
                        await_or_cancel(tokio::time::sleep(retry_delay_ms(attempt)), cancellation)
                            .await?;
                        continue;
                    }

                    return Err(ApiError::RetryExhausted {
                        status: last_status,
                        last_error,
                    });
                }
            }
        }

        Err(ApiError::RetryExhausted {
            status: last_status,
            last_error,
        })
    }

    /// Stream decoded events to `on_event` until the body ends or the caller
    /// cancels. Returns the identifiers of the last `finish` event, if any.
    pub async fn stream_with_handler<F>(
        &self,
        request: &ChatRequest,
        cancellation: Option<&CancellationSignal>,
        mut on_event: F,
    ) -> Result<Option<FinishInfo>, ApiError>
    where
        F: FnMut(StreamEvent),
    {
        let response = self.send_with_retry(request, cancellation).await?;
        let mut bytes = response.bytes_stream();
        let mut reader = FrameReader::default();
        let mut finish: Option<FinishInfo> = None;

        loop {
            let Some(chunk) = await_or_cancel(bytes.next(), cancellation).await? else {
                break;
            };
            if is_cancelled(cancellation) {
                return Err(ApiError::Cancelled);
            }
            let chunk = chunk.map_err(ApiError::from)?;
            for payload in reader.feed(&chunk) {
                let Some(event) = decode_frame(&payload) else {
                    continue;
                };
                track_finish(&event, &mut finish);
                on_event(event);
            }
        }

        if is_cancelled(cancellation) {
            return Err(ApiError::Cancelled);
        }

        Ok(finish)
    }

    pub async fn stream(
        &self,
        request: &ChatRequest,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<StreamResult, ApiError> {
        let mut events = Vec::new();
        let finish = self
            .stream_with_handler(request, cancellation, |event| {
                events.push(event);
            })
            .await?;

        Ok(StreamResult { events, finish })
    }
}

fn validate_request_payload_shape(request: &ChatRequest) -> Result<(), ApiError> {
    if request.messages.is_empty() {
        return Err(ApiError::InvalidRequestPayload(
            "'messages' must not be empty".to_string(),
        ));
    }

    if request.session_id.trim().is_empty() {
        return Err(ApiError::InvalidRequestPayload(
            "'session_id' must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn track_finish(event: &StreamEvent, finish: &mut Option<FinishInfo>) {
    let StreamEvent::Finish {
        chat_id,
        trace_id,
        session_id,
    } = event
    else {
        return;
    };

    let info = finish.get_or_insert_with(FinishInfo::default);
    if chat_id.is_some() {
        info.chat_id = chat_id.clone();
    }
    if trace_id.is_some() {
        info.trace_id = trace_id.clone();
    }
    if session_id.is_some() {
        info.session_id = session_id.clone();
    }
}

fn is_cancelled(cancel: Option<&CancellationSignal>) -> bool {
    cancel.is_some_and(|token| token.load(Ordering::Acquire))
}

async fn await_or_cancel<F>(
    future: F,
    cancellation: Option<&CancellationSignal>,
) -> Result<F::Output, ApiError>
where
    F: Future,
{
    if cancellation.is_none() {
        return Ok(future.await);
    }

    let mut future = Box::pin(future);

    loop {
        if is_cancelled(cancellation) {
            return Err(ApiError::Cancelled);
        }

        if let Ok(output) = tokio::time::timeout(CANCEL_POLL_INTERVAL, &mut future).await {
            if is_cancelled(cancellation) {
                return Err(ApiError::Cancelled);
            }
            return Ok(output);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::track_finish;
    use crate::events::{FinishInfo, StreamEvent};

    #[test]
    fn track_finish_merges_identifiers_last_wins() {
        let mut finish = None;

        track_finish(
            &StreamEvent::Finish {
                chat_id: Some("chat-1".to_string()),
                trace_id: None,
                session_id: None,
            },
            &mut finish,
        );
        track_finish(
            &StreamEvent::Finish {
                chat_id: None,
                trace_id: Some("trace-9".to_string()),
                session_id: None,
            },
            &mut finish,
        );

        assert_eq!(
            finish,
            Some(FinishInfo {
                chat_id: Some("chat-1".to_string()),
                trace_id: Some("trace-9".to_string()),
                session_id: None,
            })
        );
    }

    #[test]
    fn track_finish_ignores_non_terminal_events() {
        let mut finish = None;
        track_finish(
            &StreamEvent::TextDelta {
                delta: "hello".to_string(),
            },
            &mut finish,
        );

        assert!(finish.is_none());
    }
}
