//! # Resolver Pipeline Module
//!
//! ## Purpose
//! The fixed, ordered set of resolver strategies the engine dispatches a
//! citation to, one per concern:
//!
//! 1. `historical.rs` — explode ambiguous statute/law citations against the
//!    historical volume datasets
//! 2. `reporter.rs` — explode reporter citations against the case-law search
//!    engine
//! 3. `uscode.rs` — verify a code section link actually resolves
//! 4. `enrich.rs` — the fallback batch of non-exploding enrichment resolvers
//!
//! Exactly one strategy fires per citation per round; first match wins.
//! Admission conditions pair a payload kind with a monotonic checked marker,
//! so a strategy never reprocesses a citation it already handled.

pub mod enrich;
pub mod historical;
pub mod reporter;
pub mod uscode;

use crate::citation::{Citation, CitationKind};
use crate::providers::ProviderClients;
use crate::registry::CitationRegistry;

/// Shared read-only state handed to every resolver invocation
pub struct ResolverContext<'a> {
    pub registry: &'a CitationRegistry,
    pub providers: &'a ProviderClients,
}

/// One citation produced by a resolver pass, together with the parallel
/// citations it discovered during that pass. Discoveries are already present
/// in the citation's own `parallel_citations` list; they are surfaced
/// separately so the engine can queue each for one enrichment pass of its
/// own and fold the result back into this citation's list.
#[derive(Debug)]
pub struct Resolved {
    pub cite: Citation,
    pub discovered: Vec<Citation>,
}

impl Resolved {
    pub fn new(cite: Citation) -> Self {
        Self {
            cite,
            discovered: Vec::new(),
        }
    }
}

/// Result of running one resolver pass over one citation
#[derive(Debug, Default)]
pub struct ResolverOutcome {
    /// Citations that need no further processing
    pub finished: Vec<Resolved>,
    /// Replacements for the processed citation, queued for the next round
    pub queue_top_level: Vec<Resolved>,
}

impl ResolverOutcome {
    /// The citation passes through to the next round unchanged
    pub(crate) fn pass_through(citation: Citation) -> Self {
        Self {
            queue_top_level: vec![Resolved::new(citation)],
            ..Self::default()
        }
    }
}

/// Run the single applicable resolver strategy for this citation.
pub async fn resolve_citation(
    ctx: &ResolverContext<'_>,
    citation: Citation,
) -> ResolverOutcome {
    if wants_historical(&citation) {
        return historical::explode_historical(ctx, citation).await;
    }
    if wants_case_search(ctx, &citation) {
        return reporter::explode_reporter(ctx, citation).await;
    }
    if wants_code_check(&citation) {
        return uscode::verify_code_section(ctx, citation).await;
    }
    enrich::enrich(ctx, citation).await
}

fn wants_historical(citation: &Citation) -> bool {
    matches!(citation.kind(), CitationKind::Stat | CitationKind::Law)
        && !citation.checked.historical
}

fn wants_case_search(ctx: &ResolverContext<'_>, citation: &Citation) -> bool {
    citation.kind() == CitationKind::Reporter
        && !citation.checked.case_search
        && ctx.providers.courtlistener.enabled()
        && citation
            .links
            .get("courtlistener")
            .and_then(|link| link.landing.as_deref())
            .is_some()
}

fn wants_code_check(citation: &Citation) -> bool {
    citation.kind() == CitationKind::Usc
        && !citation.checked.code_verified
        && citation.is_top_level()
        && citation
            .links
            .get("house")
            .and_then(|link| link.html.as_deref())
            .is_some()
}
