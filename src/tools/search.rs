use super::Tool;
use crate::config::DEFAULT_SERPER_BASE_URL;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::{pin::Pin, time::Duration};
use tracing::warn;

const MAX_RESULTS: usize = 5;

/// Parameters accepted by the web search tool
#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct WebSearchParams {
    /// What to search for, e.g. "best seafood restaurants in Havelock"
    pub query: String,
}

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default, rename = "answerBox")]
    answer_box: Option<SerperAnswerBox>,
    #[serde(default)]
    organic: Vec<SerperOrganic>,
}

#[derive(Debug, Deserialize)]
struct SerperAnswerBox {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SerperOrganic {
    title: String,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
}

/// Web search over the Serper API.
///
/// Transport problems and a missing key are reported back to the model as
/// plain text so the conversation can continue without search results.
#[derive(Debug, Clone)]
pub struct WebSearchTool {
    api_key: Option<String>,
    base_url: String,
    client: Client,
}

impl WebSearchTool {
    pub fn new(api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .unwrap_or_default();

        Self {
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: DEFAULT_SERPER_BASE_URL.to_string(),
            client,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub async fn search(&self, query: &str) -> String {
        let Some(api_key) = self.api_key.as_deref() else {
            return format!(
                "Web search is unavailable (no SERPER_API_KEY configured). Answer \"{query}\" from your own knowledge."
            );
        };

        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        let response = match self
            .client
            .post(&url)
            .header("X-API-KEY", api_key)
            .json(&json!({ "q": query }))
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!(target: "wego::steps", "web search request failed: {}", err);
                return format!("Web search failed ({err}). Answer from your own knowledge.");
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(target: "wego::steps", "web search returned status {}", status);
            return format!("Web search returned status {status}. Answer from your own knowledge.");
        }

        match response.json::<SerperResponse>().await {
            Ok(parsed) => format_results(query, &parsed),
            Err(err) => {
                warn!(target: "wego::steps", "web search response unreadable: {}", err);
                format!("Web search results could not be read ({err}). Answer from your own knowledge.")
            }
        }
    }
}

impl Tool for WebSearchTool {
    fn name(&self) -> &'static str {
        "web_search"
    }

    fn description(&self) -> &'static str {
        "Search the web for travel options, restaurants, attractions and activities at the destination"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::to_value(schemars::schema_for!(WebSearchParams)).unwrap_or_default()
    }

    fn execute(
        &self,
        parameters: Value,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Value, crate::AgentError>> + Send + '_>>
    {
        Box::pin(async move {
            let params: WebSearchParams = serde_json::from_value(parameters).map_err(|err| {
                crate::AgentError::ToolExecution(format!("Invalid parameters: {}", err))
            })?;

            Ok(Value::String(self.search(&params.query).await))
        })
    }
}

fn format_results(query: &str, response: &SerperResponse) -> String {
    let mut lines = vec![format!("Search results for \"{query}\":")];

    if let Some(answer) = response
        .answer_box
        .as_ref()
        .and_then(|answer_box| answer_box.answer.as_ref().or(answer_box.snippet.as_ref()))
    {
        lines.push(format!("Answer: {answer}"));
    }

    for (idx, result) in response.organic.iter().take(MAX_RESULTS).enumerate() {
        let mut line = format!("{}. {}", idx + 1, result.title);
        if let Some(snippet) = &result.snippet {
            line.push_str(&format!(" - {snippet}"));
        }
        if let Some(link) = &result.link {
            line.push_str(&format!(" ({link})"));
        }
        lines.push(line);
    }

    if lines.len() == 1 {
        return format!("No search results found for \"{query}\".");
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_results_caps_and_orders() {
        let response: SerperResponse = serde_json::from_value(json!({
            "organic": (1..=8).map(|n| json!({
                "title": format!("Spot {n}"),
                "link": format!("https://example.com/{n}"),
                "snippet": "Great views"
            })).collect::<Vec<_>>()
        }))
        .unwrap();

        let text = format_results("beaches", &response);
        assert!(text.starts_with("Search results for \"beaches\":"));
        assert!(text.contains("1. Spot 1 - Great views (https://example.com/1)"));
        assert!(text.contains("5. Spot 5"));
        assert!(!text.contains("Spot 6"));
    }

    #[test]
    fn test_format_results_empty() {
        let response: SerperResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(
            format_results("x", &response),
            "No search results found for \"x\"."
        );
    }

    #[test]
    fn test_parameters_schema_follows_params_struct() {
        let schema = WebSearchTool::new(None).parameters_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["query"]["type"], "string");
        assert!(schema["properties"]["query"]["description"]
            .as_str()
            .unwrap()
            .starts_with("What to search for"));
        assert_eq!(schema["required"], json!(["query"]));
    }

    #[tokio::test]
    async fn test_invalid_parameters_rejected() {
        let tool = WebSearchTool::new(None);
        let err = tool.execute(json!({"q": 1})).await.unwrap_err();
        assert_eq!(err.error_code(), "TOOL_EXECUTION_ERROR");
    }
}
