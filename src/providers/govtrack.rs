//! # GovTrack Client
//!
//! ## Purpose
//! Resolves bill-tracker search pages. A public-law citation links to a
//! search page; when the search is unambiguous the site redirects straight to
//! a bill detail page, which identifies the originating bill and carries
//! title metadata via a JSON rendering of the same page.

use crate::errors::{ResolveError, Result};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// A resolved bill detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillPage {
    pub congress: u32,
    pub bill_type: String,
    pub number: u32,
    /// Full title, including the bill number prefix
    pub title: Option<String>,
    /// Title without the bill number, preferred for display
    pub display_title: Option<String>,
    /// Final URL of the bill detail page after redirects
    pub landing_url: String,
    /// Statutes at Large page parsed from the published-text PDF name
    pub statute_page: Option<(u32, u32)>,
}

#[derive(Debug, Deserialize)]
struct BillDetail {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    title_without_number: Option<String>,
    #[serde(default)]
    text_info: Option<TextInfo>,
}

#[derive(Debug, Deserialize)]
struct TextInfo {
    #[serde(default)]
    gpo_pdf_url: Option<String>,
}

/// GovTrack client
pub struct GovTrackClient {
    http: Client,
    bill_path: Regex,
    statute_pdf: Regex,
}

impl GovTrackClient {
    pub fn new(http: Client) -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| ResolveError::Internal {
                message: format!("invalid bill page pattern: {e}"),
            })
        };
        Ok(Self {
            http,
            bill_path: compile(r"/congress/bills/(\d+)/([a-z]+?)(\d+)$")?,
            statute_pdf: compile(r"STATUTE-(\d+)-Pg(\d+)\.pdf")?,
        })
    }

    /// Follow a search URL; `None` when it does not land on a recognizable
    /// bill detail page.
    pub async fn resolve_bill_search_redirect(&self, url: &str) -> Result<Option<BillPage>> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ResolveError::from_http(e, url))?;

        let landing_url = response.url().to_string();
        let caps = match self.bill_path.captures(landing_url.trim_end_matches('/')) {
            Some(caps) => caps,
            None => {
                debug!(%landing_url, "search did not redirect to a bill page");
                return Ok(None);
            }
        };

        let congress = caps[1].parse().unwrap_or_default();
        let bill_type = caps[2].to_string();
        let number = caps[3].parse().unwrap_or_default();

        // The detail page has a hidden JSON rendering at the same URL.
        let json_url = format!("{}.json", landing_url.trim_end_matches('/'));
        let detail: BillDetail = self
            .http
            .get(&json_url)
            .send()
            .await
            .map_err(|e| ResolveError::from_http(e, &json_url))?
            .json()
            .await
            .map_err(|e| ResolveError::DataParsing {
                source_name: "govtrack".to_string(),
                details: e.to_string(),
            })?;

        let statute_page = detail
            .text_info
            .as_ref()
            .and_then(|info| info.gpo_pdf_url.as_deref())
            .and_then(|pdf_url| self.statute_pdf.captures(pdf_url))
            .and_then(|caps| Some((caps[1].parse().ok()?, caps[2].parse().ok()?)));

        Ok(Some(BillPage {
            congress,
            bill_type,
            number,
            title: detail.title,
            display_title: detail.title_without_number,
            landing_url,
            statute_page,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_resolves_redirect_to_bill_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", "/congress/bills/93/hr11510"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/congress/bills/93/hr11510"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/congress/bills/93/hr11510.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "congress": 93,
                "number": 11510,
                "title": "H.R. 11510 (93rd): Energy Supply Act",
                "title_without_number": "Energy Supply Act",
                "text_info": { "gpo_pdf_url": "https://example.com/STATUTE-88-Pg96.pdf" }
            })))
            .mount(&server)
            .await;

        let client = GovTrackClient::new(Client::new()).unwrap();
        let page = client
            .resolve_bill_search_redirect(&format!("{}/search", server.uri()))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(page.congress, 93);
        assert_eq!(page.bill_type, "hr");
        assert_eq!(page.number, 11510);
        assert_eq!(page.display_title.as_deref(), Some("Energy Supply Act"));
        assert_eq!(page.statute_page, Some((88, 96)));
    }

    #[tokio::test]
    async fn test_non_bill_redirect_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = GovTrackClient::new(Client::new()).unwrap();
        let page = client
            .resolve_bill_search_redirect(&format!("{}/search", server.uri()))
            .await
            .unwrap();
        assert!(page.is_none());
    }
}
