//! # Reporter Citation Resolver
//!
//! ## Purpose
//! Explodes potentially ambiguous case reporter citations through the
//! case-law search engine. A single volume/page citation can correspond to
//! several decisions, so every returned case becomes its own citation
//! carrying the case name and deciding court; the case's other reported
//! citations are attached as parallel citations.

use super::{Resolved, ResolverContext, ResolverOutcome};
use crate::citation::{CaseCite, Citation, CitationPayload, LinkSource, SourceLink};
use tracing::{debug, warn};

pub(crate) async fn explode_reporter(
    ctx: &ResolverContext<'_>,
    mut citation: Citation,
) -> ResolverOutcome {
    let is_top = citation.is_top_level();
    citation.checked.mark_case_search();

    // The landing link is a search page; its query string is reused
    // against the search API.
    let query = citation
        .links
        .get("courtlistener")
        .and_then(|link| link.landing.as_deref())
        .and_then(|landing| landing.split_once('?'))
        .map(|(_, query)| query.to_string());
    let query = match query {
        Some(query) => query,
        None => return ResolverOutcome::pass_through(citation),
    };

    let cases = match ctx.providers.courtlistener.search_case_law(&query).await {
        Ok(cases) => cases,
        Err(e) => {
            warn!(id = %citation.id, error = %e, category = e.category(),
                "case-law search failed");
            return ResolverOutcome::pass_through(citation);
        }
    };
    if cases.is_empty() {
        debug!(id = %citation.id, "no case-law matches");
        return ResolverOutcome::pass_through(citation);
    }

    let original_text = citation.citation.clone();
    let mut produced = Vec::new();

    for case in cases {
        let mut cite = ctx.registry.create(citation.payload.clone());
        cite.checked = citation.checked;
        if !case.case_name.is_empty() {
            cite.title = Some(case.case_name.clone());
        }
        if !case.court.is_empty() {
            cite.type_name = case.court.clone();
        }
        cite.links.insert(
            "courtlistener".to_string(),
            SourceLink {
                source: LinkSource::courtlistener(),
                html: Some(ctx.providers.courtlistener.result_url(&case.absolute_url)),
                ..SourceLink::default()
            },
        );

        let mut resolved = Resolved::new(cite);
        if is_top {
            resolved.cite.mark_top_level();
            for other in &case.cites {
                // A parallel citation identical to the input adds nothing.
                if Some(other) == original_text.as_ref() {
                    continue;
                }
                let parallel = ctx.registry.create(CitationPayload::Case(CaseCite {
                    cite: other.clone(),
                    court: Some(case.court.clone()),
                    url: Some(case.absolute_url.clone()),
                }));
                if resolved.cite.push_parallel(parallel.clone()) {
                    resolved.discovered.push(parallel);
                }
            }
        }
        produced.push(resolved);
    }

    ResolverOutcome {
        finished: Vec::new(),
        queue_top_level: produced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::citation::ReporterCite;
    use crate::config::ProvidersConfig;
    use crate::providers::ProviderClients;
    use crate::registry::{CitationRegistry, LinkBases};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup(server: &MockServer) -> (CitationRegistry, ProviderClients) {
        let registry = CitationRegistry::with_bases(LinkBases {
            courtlistener: server.uri(),
            ..LinkBases::default()
        });
        let mut config = ProvidersConfig::default();
        config.courtlistener.base_url = server.uri();
        config.courtlistener.username = Some("user".to_string());
        config.courtlistener.password = Some("secret".to_string());
        let providers = ProviderClients::new(&config).unwrap();
        (registry, providers)
    }

    #[tokio::test]
    async fn test_explodes_into_decisions_with_parallel_cites() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/rest/v3/search/"))
            .and(query_param("q", "347 U.S. 483"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{
                    "caseName": "Brown v. Board of Education",
                    "court": "Supreme Court of the United States",
                    "absolute_url": "/opinion/105221/brown/",
                    "citation": ["347 U.S. 483", "74 S. Ct. 686"]
                }]
            })))
            .mount(&server)
            .await;

        let (registry, providers) = setup(&server).await;
        let ctx = ResolverContext {
            registry: &registry,
            providers: &providers,
        };
        let citation = registry.create_top_level(CitationPayload::Reporter(ReporterCite {
            volume: 347,
            reporter: "U.S.".to_string(),
            page: 483,
        }));

        let outcome = explode_reporter(&ctx, citation).await;
        assert_eq!(outcome.queue_top_level.len(), 1);
        let resolved = &outcome.queue_top_level[0];
        let cite = &resolved.cite;
        assert!(cite.checked.case_search);
        assert_eq!(cite.title.as_deref(), Some("Brown v. Board of Education"));
        assert_eq!(cite.type_name, "Supreme Court of the United States");
        assert!(cite
            .links
            .get("courtlistener")
            .and_then(|l| l.html.as_deref())
            .unwrap()
            .ends_with("/opinion/105221/brown/"));

        // The citation matching the input is filtered; the other becomes a
        // case-result parallel citation.
        let parallels = cite.parallel_citations.as_ref().unwrap();
        assert_eq!(parallels.len(), 1);
        assert_eq!(parallels[0].id, "case/74 S. Ct. 686");
        assert_eq!(resolved.discovered.len(), 1);
    }

    #[tokio::test]
    async fn test_search_failure_passes_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/rest/v3/search/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (registry, providers) = setup(&server).await;
        let ctx = ResolverContext {
            registry: &registry,
            providers: &providers,
        };
        let citation = registry.create_top_level(CitationPayload::Reporter(ReporterCite {
            volume: 347,
            reporter: "U.S.".to_string(),
            page: 483,
        }));

        let outcome = explode_reporter(&ctx, citation).await;
        assert_eq!(outcome.queue_top_level.len(), 1);
        assert!(outcome.queue_top_level[0].cite.checked.case_search);
        assert!(outcome.queue_top_level[0].cite.title.is_none());
    }
}
