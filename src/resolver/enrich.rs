//! # Enrichment Resolvers
//!
//! ## Purpose
//! The fallback, non-exploding stage of the pipeline. Three enrichment
//! resolvers run concurrently over a citation:
//!
//! - **Document metadata**: the archive's metadata record for a statute or
//!   law yields a short title, the parallel law reference and the
//!   originating bill
//! - **Related documents**: the archive's related-documents index maps a
//!   modern public law onto its Statutes at Large pages
//! - **Originating bill**: a law's bill-tracker search link may redirect to a
//!   concrete bill page carrying titles and a published-text reference
//!
//! Each resolver returns an [`Enrichment`] delta; the caller merges deltas
//! sequentially, so concurrent resolvers never write into shared state.
//! Enrichment is best-effort: provider failures are logged and treated as
//! "nothing found".

use super::{Resolved, ResolverContext, ResolverOutcome};
use crate::citation::{
    BillCite, Citation, CitationKind, CitationPayload, LawCite, LawType, LinkSource, SourceLink,
    StatCite,
};
use crate::errors::Result;
use tracing::debug;

/// Field updates and discoveries produced by one enrichment resolver
#[derive(Debug, Default)]
struct Enrichment {
    title: Option<String>,
    links: Vec<(String, SourceLink)>,
    parallels: Vec<Citation>,
}

pub(crate) async fn enrich(ctx: &ResolverContext<'_>, mut citation: Citation) -> ResolverOutcome {
    let is_top = citation.is_top_level();
    let mut discovered = Vec::new();

    if !citation.checked.enriched {
        citation.checked.mark_enriched();

        let (metadata, related, bill) = futures::join!(
            document_metadata(ctx, &citation, is_top),
            related_documents(ctx, &citation, is_top),
            originating_bill(ctx, &citation, is_top),
        );

        let mut proposed = Vec::new();
        for result in [metadata, related, bill] {
            match result {
                Ok(delta) => {
                    if delta.title.is_some() {
                        citation.title = delta.title;
                    }
                    for (name, link) in delta.links {
                        citation.links.insert(name, link);
                    }
                    proposed.extend(delta.parallels);
                }
                Err(e) => {
                    debug!(id = %citation.id, error = %e, category = e.category(),
                        "enrichment source failed");
                }
            }
        }

        if is_top {
            for parallel in proposed {
                if citation.push_parallel(parallel.clone()) {
                    discovered.push(parallel);
                }
            }
        }
    }

    ResolverOutcome {
        finished: vec![Resolved {
            cite: citation,
            discovered,
        }],
        queue_top_level: Vec::new(),
    }
}

/// Pull title and cross-references from the document metadata record
async fn document_metadata(
    ctx: &ResolverContext<'_>,
    citation: &Citation,
    is_top: bool,
) -> Result<Enrichment> {
    if !matches!(citation.kind(), CitationKind::Stat | CitationKind::Law) {
        return Ok(Enrichment::default());
    }
    let mods_url = match citation
        .links
        .get("usgpo")
        .and_then(|link| link.mods.as_deref())
    {
        Some(url) => url.to_string(),
        None => return Ok(Enrichment::default()),
    };

    let metadata = ctx
        .providers
        .govinfo
        .fetch_document_metadata(&mods_url)
        .await?;

    let mut enrichment = Enrichment {
        title: metadata.short_title,
        ..Enrichment::default()
    };

    if is_top {
        for law in metadata.related_laws {
            enrichment
                .parallels
                .push(ctx.registry.create(CitationPayload::Law(LawCite {
                    law_type: if law.is_private {
                        LawType::Private
                    } else {
                        LawType::Public
                    },
                    congress: law.congress,
                    number: law.number,
                })));
        }
        for bill in metadata.related_bills {
            enrichment
                .parallels
                .push(ctx.registry.create(CitationPayload::Bill(BillCite {
                    congress: bill.congress,
                    bill_type: bill.bill_type,
                    number: bill.number,
                    is_enacted: true,
                })));
        }
    }

    Ok(enrichment)
}

/// Map a public law onto the Statutes at Large pages it was published on
async fn related_documents(
    ctx: &ResolverContext<'_>,
    citation: &Citation,
    is_top: bool,
) -> Result<Enrichment> {
    let law = match &citation.payload {
        CitationPayload::Law(law) => law,
        _ => return Ok(Enrichment::default()),
    };
    // The related-documents index starts with the 82nd Congress.
    if !is_top || law.law_type != LawType::Public || law.congress < 82 {
        return Ok(Enrichment::default());
    }

    let pages = ctx
        .providers
        .govinfo
        .fetch_related_statute_pages(law.congress, law.number)
        .await?;

    Ok(Enrichment {
        parallels: pages
            .into_iter()
            .map(|page| {
                ctx.registry.create(CitationPayload::Stat(StatCite {
                    volume: page.volume,
                    page: page.page,
                }))
            })
            .collect(),
        ..Enrichment::default()
    })
}

/// Resolve a law's bill-tracker search link to its originating bill
async fn originating_bill(
    ctx: &ResolverContext<'_>,
    citation: &Citation,
    is_top: bool,
) -> Result<Enrichment> {
    if citation.kind() != CitationKind::Law {
        return Ok(Enrichment::default());
    }
    let landing = match citation
        .links
        .get("govtrack")
        .and_then(|link| link.landing.as_deref())
    {
        Some(landing) => landing.to_string(),
        None => return Ok(Enrichment::default()),
    };

    let page = match ctx
        .providers
        .govtrack
        .resolve_bill_search_redirect(&landing)
        .await?
    {
        Some(page) => page,
        None => return Ok(Enrichment::default()),
    };

    let mut enrichment = Enrichment {
        title: page.display_title.clone(),
        ..Enrichment::default()
    };
    // The search link resolved; keep the concrete bill page instead.
    enrichment.links.push((
        "govtrack".to_string(),
        SourceLink {
            source: LinkSource::govtrack(),
            html: Some(format!("{}/text", page.landing_url)),
            landing: Some(page.landing_url.clone()),
            ..SourceLink::default()
        },
    ));

    if is_top {
        let mut bill = ctx.registry.create(CitationPayload::Bill(BillCite {
            congress: page.congress,
            bill_type: page.bill_type.clone(),
            number: page.number,
            is_enacted: true,
        }));
        bill.title = page.title.clone();
        enrichment.parallels.push(bill);

        // Published bill text names the statute page it became.
        if let Some((volume, stat_page)) = page.statute_page {
            enrichment
                .parallels
                .push(ctx.registry.create(CitationPayload::Stat(StatCite {
                    volume,
                    page: stat_page,
                })));
        }
    }

    Ok(enrichment)
}
