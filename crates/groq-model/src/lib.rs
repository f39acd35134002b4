//! A model provider for the Groq API (OpenAI-compatible chat
//! completions with JSON-schema structured output).

#[macro_use]
extern crate tracing;

mod config;
mod proto;
mod response;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use cite_agent_model::{
    ErrorKind, ModelProvider, ModelProviderError, ModelRequest,
};
use reqwest::{Client, StatusCode, header};

pub use config::{GroqConfig, GroqConfigBuilder};
use proto::ChatCompletion;
pub use response::GroqResponse;

/// Error type for [`GroqProvider`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// Groq model provider.
#[derive(Clone, Debug)]
pub struct GroqProvider {
    client: Client,
    config: Arc<GroqConfig>,
}

impl GroqProvider {
    /// Creates a new `GroqProvider` with the given configuration.
    #[inline]
    pub fn new(config: GroqConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }
}

impl ModelProvider for GroqProvider {
    type Error = Error;
    type Response = GroqResponse;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        let groq_req = proto::create_request(req, &self.config);
        let resp_fut = self
            .client
            .post(format!("{}{}", self.config.base_url, "/chat/completions"))
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.config.api_key),
            )
            .header(header::CONTENT_TYPE, "application/json")
            .json(&groq_req)
            .send();

        async move {
            let resp = match resp_fut.await {
                Ok(resp) => resp,
                Err(err) => return Err(transport_error(&err)),
            };

            let status = resp.status();
            if !status.is_success() {
                return Err(Error::new(
                    format!("chat completion failed with status {status}"),
                    status_error_kind(status),
                ));
            }

            // Here we got a successful response.
            let completion: ChatCompletion = match resp.json().await {
                Ok(completion) => completion,
                Err(err) => {
                    return Err(Error::new(
                        format!("malformed completion body: {err}"),
                        ErrorKind::Other,
                    ));
                }
            };
            GroqResponse::from_completion(completion)
        }
    }
}

fn transport_error(err: &reqwest::Error) -> Error {
    let kind = if err.is_connect() || err.is_timeout() {
        ErrorKind::Unreachable
    } else {
        ErrorKind::Other
    };
    Error::new(format!("{err}"), kind)
}

fn status_error_kind(status: StatusCode) -> ErrorKind {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ErrorKind::AuthFailed
        }
        StatusCode::TOO_MANY_REQUESTS => ErrorKind::RateLimitExceeded,
        _ => ErrorKind::Other,
    }
}
