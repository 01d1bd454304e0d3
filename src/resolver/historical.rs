//! # Historical Statute Resolver
//!
//! ## Purpose
//! Explodes ambiguous Statutes at Large and public-law citations using the
//! historical volume datasets. A `X Stat. Y` citation can name a page that
//! carries several entries, and pre-modern public-law numbers restarted every
//! session, so one citation may legitimately resolve to multiple laws; each
//! match becomes its own citation with a disambiguation annotation.
//!
//! ## Matching
//! - Statute citations search their own physical volume; page containment is
//!   half-open (`start <= page < start + pages`) so a citation to an internal
//!   page of a multi-page entry resolves to that entry
//! - Law citations map congress → volume set through a static session table;
//!   numbering before the 60th Congress is irregular and may require
//!   checking two volumes
//! - No match passes the citation through unchanged

use super::{Resolved, ResolverContext, ResolverOutcome};
use crate::citation::{
    Citation, CitationKind, CitationPayload, LawCite, LawType, LinkSource, SourceLink, StatCite,
};
use crate::providers::legisworks::VolumeEntry;
use tracing::{debug, warn};

/// Base URL of the scanned volume PDFs
const PDF_ARCHIVE: &str = "https://govtrackus.s3.amazonaws.com/legislink/pdf/stat";

pub(crate) async fn explode_historical(
    ctx: &ResolverContext<'_>,
    mut citation: Citation,
) -> ResolverOutcome {
    let is_top = citation.is_top_level();
    citation.checked.mark_historical();

    let volumes: Vec<u32> = match &citation.payload {
        CitationPayload::Stat(c) => vec![c.volume],
        CitationPayload::Law(c) => congress_volumes(c.congress).to_vec(),
        _ => Vec::new(),
    };

    let mut matches: Vec<VolumeEntry> = Vec::new();
    for volume in volumes {
        let entries = match ctx
            .providers
            .legisworks
            .lookup_historical_volume(volume)
            .await
        {
            Ok(entries) => entries,
            Err(e) => {
                warn!(volume, error = %e, category = e.category(),
                    "historical volume lookup failed");
                continue;
            }
        };
        matches.extend(
            entries
                .into_iter()
                .filter(|entry| entry_matches(&citation.payload, entry)),
        );
    }

    if matches.is_empty() {
        debug!(id = %citation.id, "no historical entries for citation");
        return ResolverOutcome::pass_through(citation);
    }

    // Reverse discovery order so an entry starting on the cited page is
    // preferred over one that merely contains it.
    if citation.kind() == CitationKind::Stat {
        matches.reverse();
    }

    let ambiguous = matches.len() > 1;
    let mut produced = Vec::new();

    for entry in &matches {
        let mut resolved = Resolved::new(build_match(ctx, &citation, entry, ambiguous));
        if is_top {
            resolved.cite.mark_top_level();
            if let Some(parallel) = cross_reference(ctx, &citation.payload, entry) {
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

fn entry_matches(payload: &CitationPayload, entry: &VolumeEntry) -> bool {
    match payload {
        CitationPayload::Stat(c) => entry.volume == c.volume && entry.contains_page(c.page),
        CitationPayload::Law(c) => {
            c.law_type == LawType::Public
                && entry.is_law()
                && entry.congress == Some(c.congress)
                && entry.number == Some(c.number)
        }
        _ => false,
    }
}

/// Create the concrete citation for one matched entry
fn build_match(
    ctx: &ResolverContext<'_>,
    original: &Citation,
    entry: &VolumeEntry,
    ambiguous: bool,
) -> Citation {
    let mut cite = ctx.registry.create(original.payload.clone());
    cite.checked = original.checked;

    match &original.payload {
        CitationPayload::Stat(c) => {
            // Canonical rendering names the entry's start page.
            cite.citation = Some(format!("{} Stat. {}", entry.volume, entry.page));
            if ambiguous {
                cite.disambiguation = entry.citation.clone();
            }
            if entry.page != c.page {
                cite.note = Some(format!(
                    "Link is to an internal page within a statute beginning on page {}.",
                    entry.page
                ));
            }
        }
        CitationPayload::Law(_) => {
            if ambiguous {
                let mut disambiguation = format!("{} Stat. {}", entry.volume, entry.page);
                if let Some(session) = entry.session {
                    disambiguation = format!("Session {session}; {disambiguation}");
                }
                cite.disambiguation = Some(disambiguation);
            }
        }
        _ => {}
    }

    cite.title = entry.display_title();
    cite.links.insert(
        "legisworks".to_string(),
        SourceLink {
            source: LinkSource::legisworks(),
            pdf: entry
                .file
                .as_ref()
                .map(|file| format!("{}/{}/{}", PDF_ARCHIVE, entry.volume, file)),
            ..SourceLink::default()
        },
    );
    cite
}

/// The cross-reference a matched entry implies: the law printed at a statute
/// page, or the statute page a law was printed on. No links beyond the
/// registry defaults; they would target the same document.
fn cross_reference(
    ctx: &ResolverContext<'_>,
    payload: &CitationPayload,
    entry: &VolumeEntry,
) -> Option<Citation> {
    let mut cite = match payload {
        CitationPayload::Stat(_) if entry.is_law() => {
            ctx.registry.create(CitationPayload::Law(LawCite {
                law_type: LawType::Public,
                congress: entry.congress?,
                number: entry.number?,
            }))
        }
        CitationPayload::Law(_) => ctx.registry.create(CitationPayload::Stat(StatCite {
            volume: entry.volume,
            page: entry.page,
        })),
        _ => return None,
    };
    cite.title = entry.display_title();
    Some(cite)
}

/// Physical volume(s) holding a congress's session laws. Pre-modern numbering
/// is irregular: the first 28 congresses share reprint volumes 1-5 with
/// private laws in 6, chapters were used instead of law numbers through the
/// 56th, and numbering restarted each session through the 59th.
fn congress_volumes(congress: u32) -> &'static [u32] {
    match congress {
        1..=5 => &[1, 6],
        6..=12 => &[2, 6],
        13..=17 => &[3, 6],
        18..=23 => &[4, 6],
        24..=28 => &[5, 6],
        29..=31 => &[9],
        32..=33 => &[10],
        34..=35 => &[11],
        36..=37 => &[12],
        38 => &[13],
        39 => &[14],
        40 => &[15],
        41 => &[16],
        42 => &[17],
        43 => &[18],
        44 => &[19],
        45 => &[20],
        46 => &[21],
        47 => &[22],
        48 => &[23],
        49 => &[24],
        50 => &[25],
        51 => &[26],
        52 => &[27],
        53 => &[28],
        54 => &[29],
        55 => &[30],
        56 => &[31],
        57 => &[32],
        58 => &[33],
        59 => &[34],
        60 => &[35],
        61 => &[36],
        62 => &[37],
        63 => &[38],
        64 => &[39],
        65 => &[40],
        66 => &[41],
        67 => &[42],
        68 => &[43],
        69 => &[44],
        70 => &[45],
        71 => &[46],
        72 => &[47],
        73 => &[48],
        74 => &[49],
        75 => &[51, 52],
        76 => &[53, 54],
        77 => &[55, 56],
        78 => &[57, 58],
        79 => &[59, 60],
        80 => &[61, 62],
        81 => &[63, 64],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProvidersConfig;
    use crate::providers::ProviderClients;
    use crate::registry::CitationRegistry;
    use std::path::Path;

    fn providers_with_data(data_dir: &Path) -> ProviderClients {
        let mut config = ProvidersConfig::default();
        config.legisworks.data_dir = data_dir.to_path_buf();
        ProviderClients::new(&config).unwrap()
    }

    fn stat_citation(registry: &CitationRegistry, volume: u32, page: u32) -> Citation {
        registry.create_top_level(CitationPayload::Stat(StatCite { volume, page }))
    }

    #[tokio::test]
    async fn test_internal_page_resolves_with_note() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("050.yaml"),
            r#"
- volume: 50
  page: 100
  npages: 5
  type: publaw
  congress: 74
  number: 1
  title: Example Act
  file: example.pdf
"#,
        )
        .unwrap();
        let registry = CitationRegistry::bootstrap();
        let providers = providers_with_data(dir.path());
        let ctx = ResolverContext {
            registry: &registry,
            providers: &providers,
        };

        // Internal page: resolves to the entry, carries a start-page note.
        let outcome = explode_historical(&ctx, stat_citation(&registry, 50, 102)).await;
        assert_eq!(outcome.queue_top_level.len(), 1);
        let cite = &outcome.queue_top_level[0].cite;
        assert_eq!(cite.citation.as_deref(), Some("50 Stat. 100"));
        assert_eq!(cite.title.as_deref(), Some("Example Act"));
        assert!(cite.note.as_deref().unwrap().contains("page 100"));
        assert!(cite.checked.historical);
        assert!(cite.links.contains_key("legisworks"));

        // Start page: no note.
        let outcome = explode_historical(&ctx, stat_citation(&registry, 50, 100)).await;
        assert!(outcome.queue_top_level[0].cite.note.is_none());

        // Past the entry span: no match, passes through unchanged.
        let outcome = explode_historical(&ctx, stat_citation(&registry, 50, 106)).await;
        assert_eq!(outcome.queue_top_level.len(), 1);
        let cite = &outcome.queue_top_level[0].cite;
        assert!(cite.links.get("legisworks").is_none());
        assert!(cite.checked.historical);
    }

    #[tokio::test]
    async fn test_multiple_matches_disambiguate() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("050.yaml"),
            r#"
- volume: 50
  page: 100
  type: publaw
  congress: 74
  number: 1
  citation: Pub. L. 74-1
  title: First Act
- volume: 50
  page: 100
  type: publaw
  congress: 74
  number: 2
  citation: Pub. L. 74-2
  title: Second Act
"#,
        )
        .unwrap();
        let registry = CitationRegistry::bootstrap();
        let providers = providers_with_data(dir.path());
        let ctx = ResolverContext {
            registry: &registry,
            providers: &providers,
        };

        let outcome = explode_historical(&ctx, stat_citation(&registry, 50, 100)).await;
        assert_eq!(outcome.queue_top_level.len(), 2);
        for resolved in &outcome.queue_top_level {
            assert!(resolved.cite.disambiguation.is_some());
            assert!(resolved.cite.is_top_level());
            // Each match carries its own law cross-reference.
            assert_eq!(resolved.discovered.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_start_page_preferred_over_containment() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("050.yaml"),
            r#"
- volume: 50
  page: 90
  npages: 20
  type: publaw
  congress: 74
  number: 1
  citation: Pub. L. 74-1
  title: Spanning Act
- volume: 50
  page: 100
  type: publaw
  congress: 74
  number: 2
  citation: Pub. L. 74-2
  title: Starting Act
"#,
        )
        .unwrap();
        let registry = CitationRegistry::bootstrap();
        let providers = providers_with_data(dir.path());
        let ctx = ResolverContext {
            registry: &registry,
            providers: &providers,
        };

        let outcome = explode_historical(&ctx, stat_citation(&registry, 50, 100)).await;
        assert_eq!(outcome.queue_top_level.len(), 2);
        // The entry beginning on page 100 comes first.
        assert_eq!(
            outcome.queue_top_level[0].cite.title.as_deref(),
            Some("Starting Act")
        );
        assert!(outcome.queue_top_level[0].cite.note.is_none());
        assert!(outcome.queue_top_level[1].cite.note.is_some());
    }

    #[tokio::test]
    async fn test_law_lookup_spans_session_volumes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("052.yaml"),
            r#"
- volume: 52
  page: 31
  type: publaw
  congress: 75
  number: 430
  title: Third Session Act
  file: act.pdf
"#,
        )
        .unwrap();
        let registry = CitationRegistry::bootstrap();
        let providers = providers_with_data(dir.path());
        let ctx = ResolverContext {
            registry: &registry,
            providers: &providers,
        };

        let law = registry.create_top_level(CitationPayload::Law(LawCite {
            law_type: LawType::Public,
            congress: 75,
            number: 430,
        }));
        let outcome = explode_historical(&ctx, law).await;
        assert_eq!(outcome.queue_top_level.len(), 1);
        let resolved = &outcome.queue_top_level[0];
        assert_eq!(resolved.cite.title.as_deref(), Some("Third Session Act"));
        // The statute cross-reference is attached and surfaced for its own
        // enrichment pass.
        assert_eq!(resolved.discovered.len(), 1);
        assert_eq!(resolved.discovered[0].id, "stat/52/31");
        assert_eq!(
            resolved.cite.parallel_citations.as_ref().map(Vec::len),
            Some(1)
        );
    }

    #[test]
    fn test_congress_volume_table() {
        assert_eq!(congress_volumes(1), &[1, 6]);
        assert_eq!(congress_volumes(59), &[34]);
        assert_eq!(congress_volumes(74), &[49]);
        assert_eq!(congress_volumes(75), &[51, 52]);
        assert_eq!(congress_volumes(81), &[63, 64]);
        assert!(congress_volumes(82).is_empty());
    }
}
