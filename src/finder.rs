//! # Citation Extraction Module
//!
//! ## Purpose
//! Recognizes legal citations in free text and turns them into typed,
//! registry-initialized [`Citation`] values: Statutes at Large references,
//! public/private laws, U.S. Code sections and case reporter citations.
//!
//! ## Input/Output Specification
//! - **Input**: Raw text (search queries, pasted prose)
//! - **Output**: Top-level citations in order of appearance, deduplicated
//!   by id
//!
//! This is a practical extractor for the citation shapes the service
//! resolves, not a general citation grammar: overlapping matches are decided
//! by pattern priority (a "U.S.C." section is never also a "U.S." reporter
//! citation).

use crate::citation::{
    Citation, CitationPayload, LawCite, LawType, ReporterCite, StatCite, UscCite,
};
use crate::errors::{ResolveError, Result};
use crate::registry::CitationRegistry;
use regex::Regex;
use std::sync::Arc;

struct Pattern {
    regex: Regex,
    build: fn(&regex::Captures) -> Option<CitationPayload>,
}

/// Regex-driven citation extractor
pub struct CitationFinder {
    registry: Arc<CitationRegistry>,
    patterns: Vec<Pattern>,
}

impl CitationFinder {
    pub fn new(registry: Arc<CitationRegistry>) -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| ResolveError::Internal {
                message: format!("invalid citation pattern: {e}"),
            })
        };

        // Priority order matters: U.S.C. sections would otherwise also match
        // the "U.S." reporter pattern.
        let patterns = vec![
            Pattern {
                regex: compile(
                    r"(?i)\b(\d{1,2})\s+U\.?\s?S\.?\s?C\.?\s*(?:\u{a7}+|sec(?:tion|\.)?)?\s*(\d+[a-z0-9\-]*)",
                )?,
                build: build_usc,
            },
            Pattern {
                regex: compile(r"\b(\d{1,3})\s+Stat\.?\s+(\d{1,4})\b")?,
                build: build_stat,
            },
            Pattern {
                regex: compile(
                    r"(?i)\b(pub(?:lic)?|pvt|priv(?:ate)?|p)\.?\s*l(?:aw)?\.?\s*(?:no\.?\s*)?(\d{1,3})[-\u{2013}](\d{1,4})\b",
                )?,
                build: build_law,
            },
            Pattern {
                regex: compile(
                    r"\b(\d{1,4})\s+(U\.S\.|S\.\s?Ct\.|L\.\s?Ed\.(?:\s?2d)?|F\.(?:\s?(?:2d|3d))?|F\.\s?Supp\.(?:\s?2d)?)\s+(\d{1,5})\b",
                )?,
                build: build_reporter,
            },
        ];

        Ok(Self { registry, patterns })
    }

    /// Extract all citations from `text`, in order of appearance. Duplicate
    /// references to the same authority collapse onto one citation.
    pub fn find(&self, text: &str) -> Vec<Citation> {
        let mut found: Vec<(usize, Citation)> = Vec::new();
        let mut claimed: Vec<(usize, usize)> = Vec::new();

        for pattern in &self.patterns {
            for caps in pattern.regex.captures_iter(text) {
                let span = match caps.get(0) {
                    Some(m) => (m.start(), m.end()),
                    None => continue,
                };
                if claimed
                    .iter()
                    .any(|&(start, end)| span.0 < end && start < span.1)
                {
                    continue;
                }
                if let Some(payload) = (pattern.build)(&caps) {
                    claimed.push(span);
                    found.push((span.0, self.registry.create_top_level(payload)));
                }
            }
        }

        found.sort_by_key(|(start, _)| *start);

        let mut citations: Vec<Citation> = Vec::new();
        for (_, cite) in found {
            if !citations.iter().any(|existing| existing.id == cite.id) {
                citations.push(cite);
            }
        }
        citations
    }
}

fn build_usc(caps: &regex::Captures) -> Option<CitationPayload> {
    Some(CitationPayload::Usc(UscCite {
        title: caps.get(1)?.as_str().to_string(),
        section: caps.get(2)?.as_str().to_lowercase(),
    }))
}

fn build_stat(caps: &regex::Captures) -> Option<CitationPayload> {
    Some(CitationPayload::Stat(StatCite {
        volume: caps.get(1)?.as_str().parse().ok()?,
        page: caps.get(2)?.as_str().parse().ok()?,
    }))
}

fn build_law(caps: &regex::Captures) -> Option<CitationPayload> {
    let marker = caps.get(1)?.as_str().to_lowercase();
    let law_type = if marker.starts_with("pvt") || marker.starts_with("priv") {
        LawType::Private
    } else {
        LawType::Public
    };
    Some(CitationPayload::Law(LawCite {
        law_type,
        congress: caps.get(2)?.as_str().parse().ok()?,
        number: caps.get(3)?.as_str().parse().ok()?,
    }))
}

fn build_reporter(caps: &regex::Captures) -> Option<CitationPayload> {
    let reporter = caps
        .get(2)?
        .as_str()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    Some(CitationPayload::Reporter(ReporterCite {
        volume: caps.get(1)?.as_str().parse().ok()?,
        reporter,
        page: caps.get(3)?.as_str().parse().ok()?,
    }))
}
