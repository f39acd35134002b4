//! A local fake model for testing purpose.

mod preset;

use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::future::ready;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::task::{Context, Poll, ready};
use std::time::Duration;

use cite_agent_model::{
    ErrorKind, ModelFinishReason, ModelProvider, ModelProviderError,
    ModelRequest, ModelResponse, ModelResponseEvent,
};
use tokio::time::{Sleep, sleep};

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    #[allow(dead_code)]
    message: &'static str,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

#[derive(Debug)]
pub struct TestModelResponse {
    events: Vec<PresetEvent>,
    delay: Duration,
    event_idx: usize,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl ModelResponse for TestModelResponse {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        // SAFETY: This type does not require to be pinned.
        let this = unsafe { self.get_unchecked_mut() };

        if let Some(sleep) = &mut this.sleep {
            let sleep = sleep.as_mut();
            ready!(sleep.poll(cx));
            this.sleep = None;

            if this.event_idx < this.events.len() {
                let event = match &this.events[this.event_idx] {
                    PresetEvent::MessageDelta(msg) => {
                        ModelResponseEvent::MessageDelta(msg.clone())
                    }
                    PresetEvent::ToolCall(req) => {
                        ModelResponseEvent::ToolCall(req.clone())
                    }
                };
                this.event_idx += 1;
                return Poll::Ready(Ok(Some(event)));
            } else if this.event_idx == this.events.len() {
                this.event_idx += 1;
                let has_tool_call = this
                    .events
                    .iter()
                    .any(|event| matches!(event, PresetEvent::ToolCall(_)));
                return Poll::Ready(Ok(Some(ModelResponseEvent::Completed(
                    if has_tool_call {
                        ModelFinishReason::ToolCalls
                    } else {
                        ModelFinishReason::Stop
                    },
                ))));
            } else {
                // In case this method is called after completion.
                return Poll::Ready(Ok(None));
            }
        }
        this.sleep = Some(Box::pin(sleep(this.delay)));
        Pin::new(this).poll_next_event(cx)
    }
}

/// A local fake model for testing purpose.
///
/// Before sending requests, you need to setup the response script, which
/// is how the model should respond to each request. Requests consume the
/// scripted responses in order; if the script runs out, an error will be
/// returned. Enable [`set_repeat_last`](Self::set_repeat_last) to replay
/// the last scripted response forever instead, which is handy for
/// simulating a backend that never stops requesting tool calls.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy memory
/// copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    script: Vec<Arc<ScriptStep>>,
    repeat_last: bool,
    delay: Option<Duration>,
    next_step: Arc<AtomicUsize>,
    requests: Arc<AtomicU64>,
}

struct ScriptStep {
    response: PresetResponse,
    attempts: AtomicU64,
}

impl TestModelProvider {
    /// Appends a scripted response for the next request.
    #[inline]
    pub fn add_response_step(&mut self, preset: PresetResponse) {
        self.script.push(Arc::new(ScriptStep {
            response: preset,
            attempts: AtomicU64::new(0),
        }));
    }

    /// Replays the last scripted response for every request after the
    /// script is exhausted.
    #[inline]
    pub fn set_repeat_last(&mut self, repeat_last: bool) {
        self.repeat_last = repeat_last;
    }

    /// Sets the artificial delay between events.
    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns how many requests this provider has received, including
    /// the ones that were scripted to fail.
    #[inline]
    pub fn requests_served(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }
}

impl ModelProvider for TestModelProvider {
    type Error = crate::Error;
    type Response = TestModelResponse;

    fn send_request(
        &self,
        _req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        self.requests.fetch_add(1, Ordering::Relaxed);

        let mut step_idx = self.next_step.load(Ordering::Relaxed);
        if self.repeat_last && !self.script.is_empty() {
            step_idx = step_idx.min(self.script.len() - 1);
        }
        let Some(step) = self.script.get(step_idx) else {
            return ready(Err(Error {
                message: "no enough steps",
                kind: ErrorKind::Unreachable,
            }));
        };

        // A failing attempt does not consume the step, so a retried
        // request replays the same scripted turn.
        if let Some(failures) = step.response.failures {
            let attempt = step.attempts.fetch_add(1, Ordering::Relaxed);
            if failures == 0 || attempt < failures {
                return ready(Err(Error {
                    message: "scripted failure",
                    kind: ErrorKind::RateLimitExceeded,
                }));
            }
        }
        self.next_step.store(step_idx + 1, Ordering::Relaxed);

        let resp = TestModelResponse {
            events: step.response.events.clone(),
            delay: self.delay.unwrap_or(Duration::from_millis(1)),
            event_idx: 0,
            sleep: None,
        };
        ready(Ok(resp))
    }
}
