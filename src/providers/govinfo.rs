//! # GovInfo Client
//!
//! ## Purpose
//! Talks to the U.S. Government Publishing Office's GovInfo archive: fetches
//! document metadata records (MODS), the related-documents index that maps a
//! public law onto its Statutes at Large pages, and performs no-redirect
//! existence checks against document URLs.
//!
//! ## Input/Output Specification
//! - **Input**: Metadata URLs carried on citation links, public-law fields
//! - **Output**: Extracted metadata fields; only the fields the resolvers
//!   consume are surfaced, everything else in the record is ignored
//!
//! ## Metadata Extraction
//! MODS records are consumed for exactly three extension fields: related
//! law references, the originating bill reference and the short title. The
//! fields are pulled with precompiled patterns; attribute order inside an
//! element is not significant.

use crate::errors::{ResolveError, Result};
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

/// Metadata fields extracted from a document metadata (MODS) record. All
/// fields are optional in the source record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub related_laws: Vec<RelatedLaw>,
    pub related_bills: Vec<RelatedBill>,
    pub short_title: Option<String>,
}

/// A parallel public/private-law reference found in a metadata record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedLaw {
    pub congress: u32,
    pub number: u32,
    pub is_private: bool,
}

/// The originating-bill reference found in a metadata record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedBill {
    pub congress: u32,
    pub bill_type: String,
    pub number: u32,
}

/// A Statutes at Large page reference from the related-documents index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatPage {
    pub volume: u32,
    pub page: u32,
}

#[derive(Debug, Deserialize)]
struct PublinkCollection {
    #[serde(default)]
    collectioncode: String,
    #[serde(default)]
    contents: Vec<PublinkPackage>,
}

#[derive(Debug, Deserialize)]
struct PublinkPackage {
    #[serde(rename = "granuleId", default)]
    granule_id: String,
}

/// GovInfo client
pub struct GovInfoClient {
    http: Client,
    http_no_redirect: Client,
    base_url: String,
    law_element: Regex,
    bill_element: Regex,
    title_element: Regex,
    attribute: Regex,
    statute_granule: Regex,
}

impl GovInfoClient {
    pub fn new(http: Client, http_no_redirect: Client, base_url: String) -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| ResolveError::Internal {
                message: format!("invalid metadata pattern: {e}"),
            })
        };
        Ok(Self {
            http,
            http_no_redirect,
            base_url,
            law_element: compile(r"<law\b([^>]*)/?>")?,
            bill_element: compile(r"<bill\b([^>]*)/?>")?,
            title_element: compile(r"<(?:shortTitle|searchTitle)\b[^>]*>([^<]+)<")?,
            attribute: compile(r#"([\w:]+)\s*=\s*"([^"]*)""#)?,
            statute_granule: compile(r"^STATUTE-(\d+)-Pg(\d+)$")?,
        })
    }

    /// Fetch a document metadata record and extract the fields resolution
    /// consumes. Missing fields are simply absent from the result.
    pub async fn fetch_document_metadata(&self, mods_url: &str) -> Result<DocumentMetadata> {
        let response = self
            .http
            .get(mods_url)
            .send()
            .await
            .map_err(|e| ResolveError::from_http(e, mods_url))?;

        if !response.status().is_success() {
            return Err(ResolveError::DataSourceUnavailable {
                source_name: "govinfo".to_string(),
                details: format!("HTTP {} for {}", response.status(), mods_url),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ResolveError::from_http(e, mods_url))?;

        Ok(self.extract_metadata(&body))
    }

    fn extract_metadata(&self, record: &str) -> DocumentMetadata {
        let mut metadata = DocumentMetadata::default();

        for caps in self.law_element.captures_iter(record) {
            let attrs = self.attributes(&caps[1]);
            if let (Some(congress), Some(number)) = (
                attrs_u32(&attrs, "congress"),
                attrs_u32(&attrs, "number"),
            ) {
                metadata.related_laws.push(RelatedLaw {
                    congress,
                    number,
                    is_private: attrs_str(&attrs, "isPrivate") == Some("true"),
                });
            }
        }

        for caps in self.bill_element.captures_iter(record) {
            let attrs = self.attributes(&caps[1]);
            // Only the primary reference is the originating bill; the record
            // also lists bills merely mentioned in the text.
            if attrs_str(&attrs, "priority") != Some("primary") {
                continue;
            }
            if let (Some(congress), Some(bill_type), Some(number)) = (
                attrs_u32(&attrs, "congress"),
                attrs_str(&attrs, "type"),
                attrs_u32(&attrs, "number"),
            ) {
                metadata.related_bills.push(RelatedBill {
                    congress,
                    bill_type: bill_type.to_lowercase(),
                    number,
                });
            }
        }

        if let Some(caps) = self.title_element.captures(record) {
            let title = caps[1].trim().to_string();
            if !title.is_empty() {
                metadata.short_title = Some(title);
            }
        }

        metadata
    }

    fn attributes<'a>(&self, raw: &'a str) -> Vec<(&'a str, &'a str)> {
        self.attribute
            .captures_iter(raw)
            .map(|caps| {
                (
                    caps.get(1).map_or("", |m| m.as_str()),
                    caps.get(2).map_or("", |m| m.as_str()),
                )
            })
            .collect()
    }

    /// Look up the Statutes at Large pages a public law was published on
    pub async fn fetch_related_statute_pages(
        &self,
        congress: u32,
        number: u32,
    ) -> Result<Vec<StatPage>> {
        let url = format!(
            "{}/wssearch/publink/PLAW/PLAW-{}publ{}/STATUTE",
            self.base_url, congress, number
        );
        debug!(%url, "fetching related statute pages");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ResolveError::from_http(e, &url))?;

        if !response.status().is_success() {
            return Err(ResolveError::DataSourceUnavailable {
                source_name: "govinfo".to_string(),
                details: format!("HTTP {} for {}", response.status(), url),
            });
        }

        let collections: Vec<PublinkCollection> =
            response
                .json()
                .await
                .map_err(|e| ResolveError::DataParsing {
                    source_name: "govinfo".to_string(),
                    details: e.to_string(),
                })?;

        let mut pages = Vec::new();
        for collection in collections {
            if collection.collectioncode != "STATUTE" {
                continue;
            }
            for package in collection.contents {
                if let Some(caps) = self.statute_granule.captures(&package.granule_id) {
                    if let (Ok(volume), Ok(page)) = (caps[1].parse(), caps[2].parse()) {
                        pages.push(StatPage { volume, page });
                    }
                }
            }
        }
        Ok(pages)
    }

    /// Check whether a document URL resolves. The service answers a missing
    /// document with a redirect to its not-found page, so redirects are not
    /// followed and anything but 200 counts as absent.
    pub async fn check_document_exists(&self, url: &str) -> Result<bool> {
        let response = self
            .http_no_redirect
            .get(url)
            .send()
            .await
            .map_err(|e| ResolveError::from_http(e, url))?;
        Ok(response.status() == StatusCode::OK)
    }
}

fn attrs_str<'a>(attrs: &[(&'a str, &'a str)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| *value)
}

fn attrs_u32(attrs: &[(&str, &str)], name: &str) -> Option<u32> {
    attrs_str(attrs, name).and_then(|value| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GovInfoClient {
        GovInfoClient::new(
            Client::new(),
            Client::new(),
            "https://www.govinfo.gov".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_extract_metadata_fields() {
        let record = r#"<?xml version="1.0"?>
            <mods>
              <extension>
                <law congress="74" isPrivate="false" number="1"/>
                <bill congress="74" number="4120" priority="primary" type="HR"/>
                <bill congress="74" number="999" priority="secondary" type="S"/>
                <shortTitle>Social Security Act</shortTitle>
              </extension>
            </mods>"#;

        let metadata = client().extract_metadata(record);
        assert_eq!(
            metadata.related_laws,
            vec![RelatedLaw {
                congress: 74,
                number: 1,
                is_private: false
            }]
        );
        assert_eq!(
            metadata.related_bills,
            vec![RelatedBill {
                congress: 74,
                bill_type: "hr".to_string(),
                number: 4120
            }]
        );
        assert_eq!(metadata.short_title.as_deref(), Some("Social Security Act"));
    }

    #[test]
    fn test_extract_metadata_tolerates_missing_fields() {
        let metadata = client().extract_metadata("<mods><extension/></mods>");
        assert_eq!(metadata, DocumentMetadata::default());
    }

    #[test]
    fn test_attribute_order_is_not_significant() {
        let record = r#"<mods><extension>
            <law number="35" congress="97" isPrivate="true"/>
        </extension></mods>"#;
        let metadata = client().extract_metadata(record);
        assert_eq!(
            metadata.related_laws,
            vec![RelatedLaw {
                congress: 97,
                number: 35,
                is_private: true
            }]
        );
    }

    #[tokio::test]
    async fn test_fetch_related_statute_pages() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wssearch/publink/PLAW/PLAW-110publ5/STATUTE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "collectioncode": "STATUTE",
                    "contents": [
                        { "granuleId": "STATUTE-121-Pg8" },
                        { "granuleId": "not-a-statute-granule" }
                    ]
                },
                { "collectioncode": "OTHER", "contents": [] }
            ])))
            .mount(&server)
            .await;

        let client = GovInfoClient::new(Client::new(), Client::new(), server.uri()).unwrap();
        let pages = client.fetch_related_statute_pages(110, 5).await.unwrap();
        assert_eq!(pages, vec![StatPage { volume: 121, page: 8 }]);
    }

    #[tokio::test]
    async fn test_check_document_exists_ignores_redirects() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/present"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("Location", "/docnotfound"),
            )
            .mount(&server)
            .await;

        let client = GovInfoClient::new(
            Client::new(),
            Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .unwrap(),
            server.uri(),
        )
        .unwrap();

        assert!(client
            .check_document_exists(&format!("{}/present", server.uri()))
            .await
            .unwrap());
        assert!(!client
            .check_document_exists(&format!("{}/missing", server.uri()))
            .await
            .unwrap());
    }
}
