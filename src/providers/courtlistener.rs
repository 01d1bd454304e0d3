//! # CourtListener Client
//!
//! ## Purpose
//! Credentialed search against the CourtListener case-law API. A reporter
//! citation is believed to be available there; searching for it returns the
//! concrete decisions printed at that volume and page.
//!
//! ## Credentials
//! The integration requires a username/password pair. When credentials are
//! not configured the client is disabled and every search returns an empty
//! result list.

use crate::config::Credentials;
use crate::errors::{ResolveError, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// A decision returned by the search API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseResult {
    pub case_name: String,
    pub court: String,
    /// Result-page path (site-relative)
    pub absolute_url: String,
    /// All citation strings the decision is reported under
    pub cites: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(rename = "caseName", default)]
    case_name: Option<String>,
    #[serde(default)]
    court: Option<String>,
    #[serde(default)]
    absolute_url: String,
    #[serde(default)]
    citation: Vec<String>,
}

/// CourtListener client
pub struct CourtListenerClient {
    http: Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl CourtListenerClient {
    pub fn new(http: Client, base_url: String, credentials: Option<Credentials>) -> Self {
        Self {
            http,
            base_url,
            credentials,
        }
    }

    /// Whether the integration is configured
    pub fn enabled(&self) -> bool {
        self.credentials.is_some()
    }

    /// Absolute URL of a result page from its site-relative path
    pub fn result_url(&self, absolute_url: &str) -> String {
        format!("{}{}", self.base_url, absolute_url)
    }

    /// Run a search with the given raw query string (the query part of a
    /// search landing link). Returns an empty list when disabled or when the
    /// search has no matches.
    pub async fn search_case_law(&self, query: &str) -> Result<Vec<CaseResult>> {
        let credentials = match &self.credentials {
            Some(credentials) => credentials,
            None => return Ok(Vec::new()),
        };

        let url = format!("{}/api/rest/v3/search/?{}", self.base_url, query);
        debug!(%url, "searching case law");

        let response = self
            .http
            .get(&url)
            .basic_auth(&credentials.username, Some(&credentials.password))
            .send()
            .await
            .map_err(|e| ResolveError::from_http(e, &url))?;

        if !response.status().is_success() {
            return Err(ResolveError::DataSourceUnavailable {
                source_name: "courtlistener".to_string(),
                details: format!("HTTP {} for {}", response.status(), url),
            });
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| ResolveError::DataParsing {
                source_name: "courtlistener".to_string(),
                details: e.to_string(),
            })?;

        Ok(body
            .results
            .into_iter()
            .map(|result| CaseResult {
                case_name: result.case_name.unwrap_or_default(),
                court: result.court.unwrap_or_default(),
                absolute_url: result.absolute_url,
                cites: result.citation,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials() -> Option<Credentials> {
        Some(Credentials {
            username: "user".to_string(),
            password: "secret".to_string(),
        })
    }

    #[tokio::test]
    async fn test_disabled_without_credentials() {
        let client = CourtListenerClient::new(
            Client::new(),
            "https://www.courtlistener.com".to_string(),
            None,
        );
        assert!(!client.enabled());
        let results = client.search_case_law("q=347+U.S.+483").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_search_maps_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/rest/v3/search/"))
            .and(query_param("q", "347 U.S. 483"))
            // base64("user:secret")
            .and(header("Authorization", "Basic dXNlcjpzZWNyZXQ="))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{
                    "caseName": "Brown v. Board of Education",
                    "court": "Supreme Court of the United States",
                    "absolute_url": "/opinion/105221/brown-v-board-of-education/",
                    "citation": ["347 U.S. 483", "74 S. Ct. 686"]
                }]
            })))
            .mount(&server)
            .await;

        let client = CourtListenerClient::new(Client::new(), server.uri(), credentials());
        let results = client.search_case_law("q=347%20U.S.%20483").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].case_name, "Brown v. Board of Education");
        assert_eq!(results[0].cites.len(), 2);
    }
}
