//! An out-of-the-box research agent that answers questions with
//! citation-annotated, schema-validated answers.
//!
//! The crate assembles the built-in tools (local handbook search, web
//! page fetch, domain-restricted web search) and a model provider into
//! a ready-to-use [`Session`].

#![deny(missing_docs)]

#[allow(unused_imports)]
#[macro_use]
extern crate tracing;

mod session;
pub mod tools;

pub use session::{Session, SessionBuilder};

/// Re-exports of [`cite_agent_core`] crate.
pub mod core {
    pub use cite_agent_core::*;
}

/// Re-exports of [`cite_agent_groq_model`] crate.
pub mod groq {
    pub use cite_agent_groq_model::*;
}
