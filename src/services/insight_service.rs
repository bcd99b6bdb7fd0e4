//! Advisory insights for an analysis.
//!
//! The text comes from a generative model. Whatever goes wrong there, the
//! advisor still hands back exactly three insights, switching to a fixed set
//! built from the same figures.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::{ADVISORY_KEY_ENV, AdvisoryConfig};
use crate::errors::AdvisoryError;
use crate::models::analysis::{Content, GenerateContentRequest, GenerateContentResponse, InsightSource, Insights, Part};

pub const INSIGHT_COUNT: usize = 3;

/// Free-text generation backend.
#[async_trait]
pub trait AdvisoryService: Send + Sync {
    async fn generate_insights(&self, prompt: &str) -> Result<String, AdvisoryError>;
}

/// Figures the insights are written about.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightContext {
    pub location: String,
    pub capacity_kw: f64,
    pub annual_savings: i64,
    pub net_cost: i64,
    pub roi_years: f64,
    pub flux: f64,
}

/// Gemini `generateContent` client
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &AdvisoryConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl AdvisoryService for GeminiClient {
    async fn generate_insights(&self, prompt: &str) -> Result<String, AdvisoryError> {
        let api_key = self.api_key.as_deref().ok_or(AdvisoryError::MissingCredential(ADVISORY_KEY_ENV))?;

        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);
        let request = GenerateContentRequest {
            contents: vec![Content { parts: vec![Part { text: Some(prompt.to_string()) }] }],
        };

        let response = self.client.post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send().await?
            .error_for_status()?;

        let parsed: GenerateContentResponse = serde_json::from_str(&response.text().await?)?;
        let text = parsed.candidates
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .flat_map(|content| content.parts)
            .filter_map(|part| part.text)
            .collect::<Vec<_>>()
            .join("\n");

        if text.trim().is_empty() {
            return Err(AdvisoryError::EmptyResponse);
        }
        Ok(text)
    }
}

pub struct InsightAdvisor {
    service: Arc<dyn AdvisoryService>,
}

impl InsightAdvisor {
    pub fn new(service: Arc<dyn AdvisoryService>) -> Self {
        Self { service }
    }

    /// Three insights: financial, maintenance, strategic.
    pub async fn insights(&self, context: &InsightContext) -> Insights {
        let fallback = fallback_insights(context);

        let text = match self.service.generate_insights(&build_prompt(context)).await {
            Ok(text) => text,
            Err(e) => {
                warn!("advisory service degraded ({}), using fallback insights", e);
                return Insights { items: fallback, source: InsightSource::Fallback };
            }
        };

        let parsed = parse_insights(&text);
        if parsed.is_empty() {
            warn!("advisory response had no usable lines, using fallback insights");
            return Insights { items: fallback, source: InsightSource::Fallback };
        }

        if parsed.len() < INSIGHT_COUNT {
            debug!("advisory response gave {} insights, topping up from fallback", parsed.len());
        }
        // Missing slots keep the fallback for that position
        let mut parsed = parsed.into_iter();
        let items = fallback.into_iter()
            .map(|default| parsed.next().unwrap_or(default))
            .collect::<Vec<_>>();
        info!("generated {} insights for {}", items.len(), context.location);

        Insights { items, source: InsightSource::Generated }
    }
}

pub fn build_prompt(context: &InsightContext) -> String {
    format!(
        "You are an expert Solar Energy Consultant for a homeowner in {location}.\n\
         Here is their analysis data:\n\
         - Recommended System: {capacity} kW\n\
         - Yearly Savings: INR {savings}\n\
         - Net Installation Cost: INR {cost}\n\
         - ROI Period: {roi} years\n\
         - Solar Flux: {flux} kWh/m2/day\n\
         \n\
         Write exactly 3 distinct, high-value insights for them.\n\
         1. Financial Insight (Focus on ROI/Savings).\n\
         2. Technical/Maintenance Insight (Focus on flux/cleaning).\n\
         3. Strategic Insight (Policy/Battery/Usage).\n\
         \n\
         Output ONLY the 3 sentences, one per line. No intro, no numbering, no asterisks.",
        location = context.location,
        capacity = context.capacity_kw,
        savings = context.annual_savings,
        cost = context.net_cost,
        roi = context.roi_years,
        flux = context.flux,
    )
}

/// Splits free text into at most three cleaned, non-empty lines.
pub fn parse_insights(text: &str) -> Vec<String> {
    text.lines()
        .map(clean_line)
        .filter(|line| !line.is_empty())
        .take(INSIGHT_COUNT)
        .collect()
}

/// Strips list markers (bullets, numbering, headings) and emphasis characters.
fn clean_line(line: &str) -> String {
    let mut rest = line.trim();
    loop {
        let before = rest;
        rest = rest.trim_start_matches(|c: char| matches!(c, '-' | '*' | '+' | '•' | '#' | '>') || c.is_whitespace());

        let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        if digits > 0 {
            let after = &rest[digits..];
            if let Some(tail) = after.strip_prefix('.').or_else(|| after.strip_prefix(')')) {
                if tail.is_empty() || tail.starts_with(char::is_whitespace) {
                    rest = tail;
                }
            }
        }

        if rest == before {
            break;
        }
    }
    rest.replace(['*', '`'], "").trim().to_string()
}

/// The fixed insight set used whenever the advisory service cannot help.
pub fn fallback_insights(context: &InsightContext) -> Vec<String> {
    vec![
        format!(
            "ROI Alert: You will break even in {} years, creating free electricity afterwards.",
            context.roi_years
        ),
        format!(
            "Maintenance: Clean panels every 2 weeks to maintain {} kWh/m2 efficiency.",
            context.flux
        ),
        "Policy: Apply for central government subsidies to reduce installation costs.".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    struct StubService(Option<&'static str>);

    #[async_trait]
    impl AdvisoryService for StubService {
        async fn generate_insights(&self, _prompt: &str) -> Result<String, AdvisoryError> {
            self.0.map(str::to_string).ok_or(AdvisoryError::Request("timed out".to_string()))
        }
    }

    fn context() -> InsightContext {
        InsightContext {
            location: "Mumbai".to_string(),
            capacity_kw: 3.0,
            annual_savings: 33_600,
            net_cost: 57_000,
            roi_years: 1.7,
            flux: 5.2,
        }
    }

    async fn insights_for(response: Option<&'static str>) -> Insights {
        InsightAdvisor::new(Arc::new(StubService(response))).insights(&context()).await
    }

    #[test]
    fn cleans_bullets_numbering_and_emphasis() {
        let text = "Here you go:\n\n1. **Financial:** Payback in 1.7 years.\n- Clean panels *often*.\n  3) Battery backup helps.\n4. Extra line";
        let parsed = parse_insights(text);
        assert_eq!(parsed, vec![
            "Here you go:".to_string(),
            "Financial: Payback in 1.7 years.".to_string(),
            "Clean panels often.".to_string(),
        ]);
    }

    #[test]
    fn keeps_leading_decimal_numbers() {
        assert_eq!(parse_insights("3.5 kW fits your roof."), vec!["3.5 kW fits your roof.".to_string()]);
        assert_eq!(parse_insights("2. 3.5 kW fits."), vec!["3.5 kW fits.".to_string()]);
    }

    #[test]
    fn marker_only_lines_are_dropped() {
        assert!(parse_insights("-\n* \n1.\n\n").is_empty());
    }

    #[tokio::test]
    async fn uses_first_three_generated_lines() {
        let insights = insights_for(Some("* One.\n* Two.\n* Three.\n* Four.")).await;
        assert_eq!(insights.source, InsightSource::Generated);
        assert_eq!(insights.items, vec!["One.", "Two.", "Three."]);
    }

    #[tokio::test]
    async fn service_failure_falls_back() {
        let insights = insights_for(None).await;
        assert_eq!(insights.source, InsightSource::Fallback);
        assert_eq!(insights.items, fallback_insights(&context()));
        assert!(insights.items[0].contains("1.7 years"));
        assert!(insights.items[1].contains("5.2 kWh/m2"));
    }

    #[tokio::test]
    async fn unusable_text_falls_back() {
        let insights = insights_for(Some("\n  \n**\n")).await;
        assert_eq!(insights.source, InsightSource::Fallback);
        assert_eq!(insights.items.len(), INSIGHT_COUNT);
    }

    #[tokio::test]
    async fn short_response_is_topped_up() {
        let insights = insights_for(Some("Only one idea.")).await;
        let fallback = fallback_insights(&context());
        assert_eq!(insights.source, InsightSource::Generated);
        assert_eq!(insights.items, vec!["Only one idea.".to_string(), fallback[1].clone(), fallback[2].clone()]);
        assert!(insights.items[1].starts_with("Maintenance:"));
        assert!(insights.items[2].starts_with("Policy:"));
    }

    #[tokio::test]
    async fn always_three_non_empty_insights() {
        for response in [None, Some(""), Some("a"), Some("a\nb"), Some("a\nb\nc\nd")] {
            let insights = insights_for(response).await;
            assert_eq!(insights.items.len(), INSIGHT_COUNT);
            assert!(insights.items.iter().all(|item| !item.trim().is_empty()));
        }
    }

    #[test]
    fn prompt_carries_the_figures() {
        let prompt = build_prompt(&context());
        assert!(prompt.contains("Mumbai"));
        assert!(prompt.contains("3 kW"));
        assert!(prompt.contains("INR 57000"));
        assert!(prompt.contains("1.7 years"));
    }

    fn gemini_for(url: String, api_key: Option<&str>) -> GeminiClient {
        GeminiClient::new(&AdvisoryConfig {
            base_url: url,
            model: "gemini-pro".to_string(),
            api_key: api_key.map(str::to_string),
            timeout_secs: 5,
        }).unwrap()
    }

    #[tokio::test]
    async fn gemini_returns_candidate_text() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/gemini-pro:generateContent")
            .match_header("x-goog-api-key", "secret")
            .match_body(Matcher::PartialJson(json!({ "contents": [{ "parts": [{ "text": "hello" }] }] })))
            .with_status(200)
            .with_body(json!({
                "candidates": [{ "content": { "parts": [{ "text": "Line one\nLine two" }] } }]
            }).to_string())
            .create_async()
            .await;

        let text = gemini_for(server.url(), Some("secret")).generate_insights("hello").await.unwrap();
        assert_eq!(text, "Line one\nLine two");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn gemini_empty_candidates_is_an_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1beta/models/gemini-pro:generateContent")
            .with_status(200)
            .with_body(json!({ "candidates": [] }).to_string())
            .create_async()
            .await;

        let err = gemini_for(server.url(), Some("secret")).generate_insights("hello").await.unwrap_err();
        assert!(matches!(err, AdvisoryError::EmptyResponse));
    }

    #[tokio::test]
    async fn gemini_without_key_is_an_error() {
        let err = gemini_for("http://127.0.0.1:9".to_string(), None).generate_insights("hello").await.unwrap_err();
        assert!(matches!(err, AdvisoryError::MissingCredential(ADVISORY_KEY_ENV)));
    }
}
