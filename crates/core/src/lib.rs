//! Core logic including the dispatch loop, tool registry, conversation
//! state, and the citation-annotated answer schema.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod agent;
pub mod answer;
pub mod conversation;
mod model_client;
pub mod tool;

pub use agent::{Agent, AgentBuilder, AskError, DEFAULT_MAX_ITERATIONS};
pub use answer::{AgentAnswer, Citation, CitationSource};
