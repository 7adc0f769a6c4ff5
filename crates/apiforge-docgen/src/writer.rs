//! Documentation writers.
//!
//! A [`DocWriter`] turns one function's source into documentation text in
//! the block format `apiforge-docs` parses. [`AnthropicDocWriter`] asks a
//! model through the Messages API.

use crate::error::{DocgenError, Result};
use crate::scanner::FunctionSite;
use apiforge_core::DocgenConfig;
use apiforge_docs::{parse_doc, render_doc, strip_block_comment};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: usize = 1024;

/// Produces documentation text for one function.
#[async_trait]
pub trait DocWriter: Send + Sync {
    /// Writes the documentation body for `site`, without comment markers.
    ///
    /// # Errors
    ///
    /// Returns a [`DocgenError`] if no documentation could be produced.
    async fn write_doc(&self, site: &FunctionSite) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: usize,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

/// [`DocWriter`] backed by the Anthropic Messages API.
#[derive(Clone)]
pub struct AnthropicDocWriter {
    client: reqwest::Client,
    model: String,
    api_key: String,
    endpoint: String,
}

impl std::fmt::Debug for AnthropicDocWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicDocWriter")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl AnthropicDocWriter {
    /// Creates a writer for `model`.
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            model: model.into(),
            api_key: api_key.into(),
            endpoint: MESSAGES_URL.to_string(),
        }
    }

    /// Creates a writer from settings, reading the key from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`DocgenError::MissingApiKey`] if the variable is unset or
    /// empty.
    pub fn from_config(config: &DocgenConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| DocgenError::MissingApiKey {
                var: config.api_key_env.clone(),
            })?;
        Ok(Self::new(config.model.clone(), api_key))
    }

    /// Sends requests to another endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl DocWriter for AnthropicDocWriter {
    async fn write_doc(&self, site: &FunctionSite) -> Result<String> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: "user",
                content: build_prompt(site),
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| DocgenError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DocgenError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| DocgenError::Transport(e.to_string()))?;
        let text = body
            .content
            .iter()
            .filter(|block| block.content_type == "text")
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        normalize_doc(&text).ok_or_else(|| DocgenError::EmptyResponse {
            function: site.name.clone(),
        })
    }
}

fn build_prompt(site: &FunctionSite) -> String {
    format!(
        r"Write a documentation block for the TypeScript function `{name}` below.

Use exactly this plain-text layout and nothing else:

One or two sentences summarising what the function does.

Args:
    param_name (type): What the parameter means.

Returns:
    type: What the function returns.

Raises:
    ErrorName: When it is raised.

Omit sections that do not apply. Use types such as string, integer, number,
boolean, object, list of strings or file. Do not wrap the answer in a code
fence or comment markers.

```typescript
{source}
```",
        name = site.name,
        source = site.source,
    )
}

/// Cleans model output into parser-compatible documentation text.
///
/// Strips code fences and comment markers, then round-trips through the
/// parser so the inserted block always parses back. Returns `None` when
/// nothing usable remains.
///
/// # Examples
///
/// ```
/// use apiforge_docgen::normalize_doc;
///
/// let text = normalize_doc("```\nAdds numbers.\n\nArgs:\n    a (integer): First.\n```").unwrap();
/// assert_eq!(text, "Adds numbers.\n\nArgs:\n    a (integer): First.");
/// assert!(normalize_doc("```\n```").is_none());
/// ```
#[must_use]
pub fn normalize_doc(text: &str) -> Option<String> {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```") {
        body = rest.split_once('\n').map_or("", |(_, rest)| rest);
        body = body.trim_end().strip_suffix("```").unwrap_or(body).trim();
    }

    let body = if body.starts_with("/**") {
        strip_block_comment(body)
    } else {
        body.to_string()
    };

    let doc = parse_doc(&body);
    if doc.is_empty() {
        return None;
    }
    Some(render_doc(&doc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_comment_markers() {
        let text = normalize_doc("/**\n * Deletes a pet.\n *\n * Returns:\n *     any: Nothing.\n */").unwrap();
        assert_eq!(text, "Deletes a pet.\n\nReturns:\n    any: Nothing.");
    }

    #[test]
    fn test_normalize_rejects_blank() {
        assert!(normalize_doc("   ").is_none());
    }

    #[test]
    fn test_prompt_contains_source() {
        let site = FunctionSite {
            name: "add".to_string(),
            line: 0,
            indent: String::new(),
            source: "function add(a, b) { return a + b; }".to_string(),
        };
        let prompt = build_prompt(&site);
        assert!(prompt.contains("`add`"));
        assert!(prompt.contains("function add(a, b)"));
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = DocgenConfig {
            api_key_env: "APIFORGE_TEST_UNSET_KEY".to_string(),
            ..DocgenConfig::default()
        };
        let err = AnthropicDocWriter::from_config(&config).unwrap_err();
        assert!(matches!(err, DocgenError::MissingApiKey { var } if var == "APIFORGE_TEST_UNSET_KEY"));
    }
}
