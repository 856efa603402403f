//! Worked request/response examples for the self-description catalog.
//!
//! Each example pairs a structured request object with the responses a
//! caller should expect. The `json`/`yaml` fields hold rendered text forms
//! of the structured objects; they are filled when the API description is
//! built (see [`Api::describe`](crate::Api::describe)), so registered
//! commands stay untouched during dispatch.

use serde::{Deserialize, Serialize};

use crate::request::Request;
use crate::response::Response;

/// A worked example showing how to use a command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Example {
    /// Short example name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// What the example demonstrates.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// The request to send.
    #[serde(default)]
    pub request: ExampleRequest,
    /// The responses a caller may receive.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub responses: Vec<ExampleResponse>,
}

impl Example {
    /// Creates a named example for the given request.
    pub fn new(name: impl Into<String>, request: Request) -> Self {
        Example {
            name: name.into(),
            request: ExampleRequest::new(request),
            ..Example::default()
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Adds an expected response.
    pub fn with_response(mut self, response: ExampleResponse) -> Self {
        self.responses.push(response);
        self
    }

    /// Returns a copy with the JSON and YAML text forms rendered.
    pub fn rendered(&self) -> Example {
        let mut out = self.clone();
        out.request.json = out.request.json_string();
        out.request.yaml = out.request.yaml_string();
        for response in &mut out.responses {
            response.json = response.json_string();
            response.yaml = response.yaml_string();
        }
        out
    }
}

/// The request half of an example.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExampleRequest {
    /// The structured request object.
    pub request: Request,
    /// Rendered JSON form (filled at description time).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub json: String,
    /// Rendered YAML form (filled at description time).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub yaml: String,
}

impl ExampleRequest {
    /// Wraps a structured request.
    pub fn new(request: Request) -> Self {
        ExampleRequest {
            request,
            json: String::new(),
            yaml: String::new(),
        }
    }

    /// Renders the structured request as pretty JSON. Rendering failures
    /// degrade to an empty string.
    pub fn json_string(&self) -> String {
        serde_json::to_string_pretty(&self.request).unwrap_or_default()
    }

    /// Renders the structured request as YAML. Rendering failures degrade
    /// to an empty string.
    pub fn yaml_string(&self) -> String {
        serde_yaml::to_string(&self.request).unwrap_or_default()
    }
}

/// One expected response of an example.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExampleResponse {
    /// Short response name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// When a caller should expect this response.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// The structured response object.
    pub response: Response,
    /// Rendered JSON form (filled at description time).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub json: String,
    /// Rendered YAML form (filled at description time).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub yaml: String,
}

impl ExampleResponse {
    /// Wraps a structured response.
    pub fn new(response: Response) -> Self {
        ExampleResponse {
            response,
            ..ExampleResponse::default()
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Renders the structured response as pretty JSON. Rendering failures
    /// degrade to an empty string.
    pub fn json_string(&self) -> String {
        serde_json::to_string_pretty(&self.response).unwrap_or_default()
    }

    /// Renders the structured response as YAML. Rendering failures degrade
    /// to an empty string.
    pub fn yaml_string(&self) -> String {
        serde_yaml::to_string(&self.response).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendered_fills_text_forms() {
        let example = Example::new("simple", Request::new("help"))
            .with_response(ExampleResponse::new(Response::default()));
        assert!(example.request.json.is_empty());

        let rendered = example.rendered();
        assert!(rendered.request.json.contains("\"command\": \"help\""));
        assert!(rendered.request.yaml.contains("command: help"));
        assert!(!rendered.responses[0].json.is_empty());

        // The original is untouched.
        assert!(example.request.json.is_empty());
    }
}
