//! The structured answer types the model's final output must conform to.

use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a cited excerpt came from.
#[derive(
    Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum CitationSource {
    /// A web address.
    Url(String),
    /// A section reference within a local document (e.g. `"2.1"`).
    Section(String),
}

/// An excerpt plus its source reference, substantiating part of an
/// answer.
#[derive(
    Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
pub struct Citation {
    /// A brief text excerpt from the cited material.
    pub excerpt: String,
    /// The source the excerpt traces back to.
    pub source: CitationSource,
}

/// The terminal value of one `ask` invocation: the answer text plus an
/// ordered list of supporting citations. Immutable once returned.
///
/// The citation list is empty when the model answered directly without
/// consulting any tool; otherwise every citation's source traces to a
/// tool result consumed during the same invocation.
#[derive(
    Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
pub struct AgentAnswer {
    /// The answer to the user's question.
    pub answer: String,
    /// Supporting citations, most load-bearing first.
    pub citations: Vec<Citation>,
}

impl AgentAnswer {
    /// Returns the JSON schema that the model's final output must
    /// conform to.
    pub fn output_schema() -> Value {
        schema_for!(AgentAnswer).to_value()
    }

    /// Strictly decodes a model's final text into an answer.
    ///
    /// This is a schema-validating decode with an explicit failure
    /// path: any deviation from the schema is an error, there is no
    /// best-effort recovery.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text.trim())
    }
}
