use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use cite_agent_model::{
    ErrorKind, ModelFinishReason, ModelResponse, ModelResponseEvent,
    ToolCallRequest,
};

use crate::Error;
use crate::proto::ChatCompletion;

/// A buffered response from the Groq API.
///
/// The completion is received as one JSON document, so the events are
/// prepared up front and replayed through `poll_next_event` to satisfy
/// the [`ModelResponse`] contract.
pub struct GroqResponse {
    events: VecDeque<ModelResponseEvent>,
}

impl GroqResponse {
    pub(crate) fn from_completion(
        completion: ChatCompletion,
    ) -> Result<Self, Error> {
        trace!("handling completion {}", completion.id);
        let Some(choice) = completion.choices.into_iter().next() else {
            return Err(Error::new(
                "chat completion contains no choices",
                ErrorKind::Other,
            ));
        };

        let mut events = VecDeque::new();
        if let Some(content) = choice.message.content {
            if !content.is_empty() {
                events.push_back(ModelResponseEvent::MessageDelta(content));
            }
        }

        let mut has_tool_calls = false;
        for call in choice.message.tool_calls.into_iter().flatten() {
            let arguments = serde_json::from_str(&call.function.arguments)
                .map_err(|err| {
                    Error::new(
                        format!("malformed tool call arguments: {err}"),
                        ErrorKind::Other,
                    )
                })?;
            has_tool_calls = true;
            events.push_back(ModelResponseEvent::ToolCall(ToolCallRequest {
                id: call.id,
                name: call.function.name,
                arguments,
            }));
        }

        // The finish reason from the wire is advisory; the explicit
        // tool-call list decides how the turn is classified.
        let finish_reason = if has_tool_calls {
            ModelFinishReason::ToolCalls
        } else {
            ModelFinishReason::Stop
        };
        if let Some(reason) = &choice.finish_reason {
            trace!("finish reason from the server: {reason}");
        }
        events.push_back(ModelResponseEvent::Completed(finish_reason));

        Ok(Self { events })
    }
}

impl ModelResponse for GroqResponse {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        // This type does not require to be pinned.
        let this = self.get_mut();
        Poll::Ready(Ok(this.events.pop_front()))
    }
}

#[cfg(test)]
mod tests {
    use std::future::poll_fn;
    use std::pin::pin;

    use serde_json::json;

    use super::*;

    async fn collect(resp: GroqResponse) -> Vec<ModelResponseEvent> {
        let mut resp = pin!(resp);
        let mut events = Vec::new();
        while let Some(event) =
            poll_fn(|cx| resp.as_mut().poll_next_event(cx))
                .await
                .unwrap()
        {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_text_completion() {
        let completion: ChatCompletion = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "choices": [{
                "message": {
                    "content": "{\"answer\": \"hi\", \"citations\": []}"
                },
                "finish_reason": "stop"
            }]
        }))
        .unwrap();

        let events =
            collect(GroqResponse::from_completion(completion).unwrap()).await;
        assert_eq!(
            events,
            [
                ModelResponseEvent::MessageDelta(
                    "{\"answer\": \"hi\", \"citations\": []}".to_owned()
                ),
                ModelResponseEvent::Completed(ModelFinishReason::Stop),
            ]
        );
    }

    #[tokio::test]
    async fn test_tool_call_completion() {
        let completion: ChatCompletion = serde_json::from_value(json!({
            "id": "chatcmpl-2",
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "search_handbook",
                            "arguments": "{\"query\": \"registration\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }))
        .unwrap();

        let events =
            collect(GroqResponse::from_completion(completion).unwrap()).await;
        assert_eq!(events.len(), 2);
        let ModelResponseEvent::ToolCall(call) = &events[0] else {
            panic!("expected a tool call event");
        };
        assert_eq!(call.name, "search_handbook");
        assert_eq!(call.arguments, json!({ "query": "registration" }));
        assert_eq!(
            events[1],
            ModelResponseEvent::Completed(ModelFinishReason::ToolCalls)
        );
    }

    #[test]
    fn test_malformed_arguments_are_rejected() {
        let completion: ChatCompletion = serde_json::from_value(json!({
            "id": "chatcmpl-3",
            "choices": [{
                "message": {
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "search_handbook",
                            "arguments": "{not json"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }))
        .unwrap();

        assert!(GroqResponse::from_completion(completion).is_err());
    }

    #[tokio::test]
    async fn test_first_choice_is_used() {
        let completion: ChatCompletion = serde_json::from_value(json!({
            "id": "chatcmpl-5",
            "choices": [
                {
                    "message": { "content": "first" },
                    "finish_reason": "stop"
                },
                {
                    "message": { "content": "second" },
                    "finish_reason": "stop"
                }
            ]
        }))
        .unwrap();

        let events =
            collect(GroqResponse::from_completion(completion).unwrap()).await;
        assert_eq!(
            events[0],
            ModelResponseEvent::MessageDelta("first".to_owned())
        );
    }

    #[test]
    fn test_empty_choices_are_rejected() {
        let completion: ChatCompletion = serde_json::from_value(json!({
            "id": "chatcmpl-4",
            "choices": []
        }))
        .unwrap();
        assert!(GroqResponse::from_completion(completion).is_err());
    }
}
