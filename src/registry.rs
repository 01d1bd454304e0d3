//! # Citation Type Registry
//!
//! ## Purpose
//! Immutable lookup table from citation kind to its type descriptor: display
//! name, canonical rendering and the link builder that maps a citation's
//! fields onto provider URLs. Built once during process start-up and then
//! only read; the resolution engine receives it by shared reference.
//!
//! ## Input/Output Specification
//! - **Input**: Citation payloads
//! - **Output**: Fully initialized [`Citation`] values (id, display name,
//!   canonical text, links)
//!
//! ## Registered Types
//! The built-in descriptors cover the kinds the extractor produces (statute,
//! law, code section, reporter). Two further types exist only as targets of
//! discovered parallel citations and are registered on top: congressional
//! bills and concrete case-law search results.

use crate::citation::{
    BillCite, Checked, Citation, CitationKind, CitationPayload, LawCite, LawType, LinkMap,
    LinkSource, SourceLink, StatCite, UscCite,
};
use crate::config::ProvidersConfig;
use std::collections::HashMap;

/// Base URLs the link builders render against. Defaults point at the
/// production services; tests substitute mock servers.
#[derive(Debug, Clone)]
pub struct LinkBases {
    pub govinfo: String,
    pub govtrack: String,
    pub courtlistener: String,
    pub uscode: String,
}

impl Default for LinkBases {
    fn default() -> Self {
        Self {
            govinfo: "https://www.govinfo.gov".to_string(),
            govtrack: "https://www.govtrack.us".to_string(),
            courtlistener: "https://www.courtlistener.com".to_string(),
            uscode: "https://uscode.house.gov".to_string(),
        }
    }
}

impl From<&ProvidersConfig> for LinkBases {
    fn from(config: &ProvidersConfig) -> Self {
        Self {
            govinfo: config.govinfo.base_url.clone(),
            govtrack: config.govtrack.base_url.clone(),
            courtlistener: config.courtlistener.base_url.clone(),
            uscode: config.uscode.base_url.clone(),
        }
    }
}

/// Descriptor for one citation kind
pub struct TypeDescriptor {
    /// Human display name for the kind
    pub name: &'static str,
    /// Canonical human-readable rendering
    pub canonical: fn(&CitationPayload) -> Option<String>,
    /// Build the provider link map for a citation's fields
    pub build_links: fn(&CitationPayload, &LinkBases) -> LinkMap,
    /// Whether ids of this kind can be reversed into a citation (permalinks)
    pub permalinkable: bool,
}

/// Immutable kind → descriptor table
pub struct CitationRegistry {
    table: HashMap<CitationKind, TypeDescriptor>,
    bases: LinkBases,
}

impl CitationRegistry {
    /// Build the full registry against the production link bases
    pub fn bootstrap() -> Self {
        Self::with_bases(LinkBases::default())
    }

    /// Build the full registry: built-in types plus the two parallel-citation
    /// extension types. Called once at start-up; the table is never mutated
    /// afterwards.
    pub fn with_bases(bases: LinkBases) -> Self {
        let mut registry = Self {
            table: HashMap::new(),
            bases,
        };
        registry.register_builtin_types();
        registry.register_extension_types();
        registry
    }

    pub fn bases(&self) -> &LinkBases {
        &self.bases
    }

    fn register(&mut self, kind: CitationKind, descriptor: TypeDescriptor) {
        self.table.insert(kind, descriptor);
    }

    fn register_builtin_types(&mut self) {
        self.register(
            CitationKind::Stat,
            TypeDescriptor {
                name: "U.S. Statutes at Large",
                canonical: canonical_stat,
                build_links: stat_links,
                permalinkable: true,
            },
        );
        self.register(
            CitationKind::Law,
            TypeDescriptor {
                name: "U.S. Law",
                canonical: canonical_law,
                build_links: law_links,
                permalinkable: true,
            },
        );
        self.register(
            CitationKind::Usc,
            TypeDescriptor {
                name: "U.S. Code",
                canonical: canonical_usc,
                build_links: usc_links,
                permalinkable: true,
            },
        );
        self.register(
            CitationKind::Reporter,
            TypeDescriptor {
                name: "Case Reporter",
                canonical: canonical_reporter,
                build_links: reporter_links,
                permalinkable: false,
            },
        );
    }

    fn register_extension_types(&mut self) {
        self.register(
            CitationKind::Bill,
            TypeDescriptor {
                name: "U.S. Legislation",
                canonical: canonical_bill,
                build_links: bill_links,
                permalinkable: true,
            },
        );
        self.register(
            CitationKind::Case,
            TypeDescriptor {
                name: "Case Law",
                canonical: canonical_case,
                build_links: case_links,
                permalinkable: false,
            },
        );
    }

    pub fn descriptor(&self, kind: CitationKind) -> &TypeDescriptor {
        // Every kind is registered in bootstrap(); the table is total.
        &self.table[&kind]
    }

    pub fn can_permalink(&self, kind: CitationKind) -> bool {
        self.descriptor(kind).permalinkable
    }

    /// Create a fully initialized citation from a payload: id, display name,
    /// canonical rendering and provider links.
    pub fn create(&self, payload: CitationPayload) -> Citation {
        let descriptor = self.descriptor(payload.kind());
        let type_name = match &payload {
            // The deciding court is the most useful display name for a
            // concrete decision.
            CitationPayload::Case(c) if c.court.is_some() => {
                c.court.clone().unwrap_or_default()
            }
            _ => descriptor.name.to_string(),
        };
        Citation {
            id: payload.id(),
            type_name,
            citation: (descriptor.canonical)(&payload),
            title: None,
            note: None,
            disambiguation: None,
            links: (descriptor.build_links)(&payload, &self.bases),
            checked: Checked::default(),
            parallel_citations: None,
            payload,
        }
    }

    /// Create a citation carrying the top-level marker
    pub fn create_top_level(&self, payload: CitationPayload) -> Citation {
        let mut cite = self.create(payload);
        cite.mark_top_level();
        cite
    }

    /// Reverse a permalink id back into a payload. Returns `None` for ids of
    /// non-permalinkable kinds or malformed ids.
    pub fn from_id(&self, id: &str) -> Option<CitationPayload> {
        let mut parts = id.split('/');
        let payload = match parts.next()? {
            "stat" => CitationPayload::Stat(StatCite {
                volume: parts.next()?.parse().ok()?,
                page: parts.next()?.parse().ok()?,
            }),
            "law" => CitationPayload::Law(LawCite {
                law_type: match parts.next()? {
                    "public" => LawType::Public,
                    "private" => LawType::Private,
                    _ => return None,
                },
                congress: parts.next()?.parse().ok()?,
                number: parts.next()?.parse().ok()?,
            }),
            "usc" => CitationPayload::Usc(UscCite {
                title: parts.next()?.to_string(),
                section: parts.next()?.to_string(),
            }),
            "bill" => CitationPayload::Bill(BillCite {
                congress: parts.next()?.parse().ok()?,
                bill_type: parts.next()?.to_string(),
                number: parts.next()?.parse().ok()?,
                is_enacted: false,
            }),
            _ => return None,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(payload)
    }
}

/// Ordinal rendering for congress numbers: 1st, 2nd, 3rd, 4th, 11th, 93rd
pub fn ordinal(number: u32) -> String {
    let suffix = match number % 100 {
        11..=13 => "th",
        _ => match number % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    };
    format!("{number}{suffix}")
}

/// Display abbreviation for a bill type slug
pub fn bill_type_display(bill_type: &str) -> Option<&'static str> {
    match bill_type {
        "hr" => Some("H.R."),
        "s" => Some("S."),
        "hres" => Some("H.Res."),
        "sres" => Some("S.Res."),
        "hjres" => Some("H.J.Res."),
        "sjres" => Some("S.J.Res."),
        "hconres" => Some("H.Con.Res."),
        "sconres" => Some("S.Con.Res."),
        _ => None,
    }
}

fn canonical_stat(payload: &CitationPayload) -> Option<String> {
    match payload {
        CitationPayload::Stat(c) => Some(format!("{} Stat. {}", c.volume, c.page)),
        _ => None,
    }
}

fn canonical_law(payload: &CitationPayload) -> Option<String> {
    match payload {
        CitationPayload::Law(c) => Some(match c.law_type {
            LawType::Public => format!("Pub. L. {}-{}", c.congress, c.number),
            LawType::Private => format!("Pvt. L. {}-{}", c.congress, c.number),
        }),
        _ => None,
    }
}

fn canonical_usc(payload: &CitationPayload) -> Option<String> {
    match payload {
        CitationPayload::Usc(c) => Some(format!("{} U.S.C. \u{a7} {}", c.title, c.section)),
        _ => None,
    }
}

fn canonical_reporter(payload: &CitationPayload) -> Option<String> {
    match payload {
        CitationPayload::Reporter(c) => {
            Some(format!("{} {} {}", c.volume, c.reporter, c.page))
        }
        _ => None,
    }
}

fn canonical_bill(payload: &CitationPayload) -> Option<String> {
    match payload {
        CitationPayload::Bill(c) => {
            let display = bill_type_display(&c.bill_type)
                .map(str::to_string)
                .unwrap_or_else(|| c.bill_type.to_uppercase());
            Some(format!(
                "{} {} ({} Congress)",
                display,
                c.number,
                ordinal(c.congress)
            ))
        }
        _ => None,
    }
}

fn canonical_case(payload: &CitationPayload) -> Option<String> {
    match payload {
        CitationPayload::Case(c) => Some(c.cite.clone()),
        _ => None,
    }
}

fn stat_links(payload: &CitationPayload, bases: &LinkBases) -> LinkMap {
    let mut links = LinkMap::new();
    if let CitationPayload::Stat(c) = payload {
        links.insert(
            "usgpo".to_string(),
            SourceLink {
                source: LinkSource::usgpo(),
                pdf: Some(format!(
                    "{}/link/statute/{}/{}",
                    bases.govinfo, c.volume, c.page
                )),
                mods: Some(format!(
                    "{}/metadata/granule/STATUTE-{vol}/STATUTE-{vol}-Pg{page}/mods.xml",
                    bases.govinfo,
                    vol = c.volume,
                    page = c.page
                )),
                ..SourceLink::default()
            },
        );
    }
    links
}

fn law_links(payload: &CitationPayload, bases: &LinkBases) -> LinkMap {
    let mut links = LinkMap::new();
    if let CitationPayload::Law(c) = payload {
        // GovInfo carries public/private laws from the 104th Congress on.
        if c.congress >= 104 {
            let collection = match c.law_type {
                LawType::Public => "publ",
                LawType::Private => "pvtl",
            };
            links.insert(
                "usgpo".to_string(),
                SourceLink {
                    source: LinkSource::usgpo(),
                    pdf: Some(format!(
                        "{}/link/plaw/{}/{}/{}",
                        bases.govinfo,
                        c.congress,
                        c.law_type.as_str(),
                        c.number
                    )),
                    mods: Some(format!(
                        "{}/metadata/pkg/PLAW-{}{}{}/mods.xml",
                        bases.govinfo, c.congress, collection, c.number
                    )),
                    ..SourceLink::default()
                },
            );
        }
        if c.law_type == LawType::Public {
            let query = urlencoding::encode(&format!("P.L. {}-{}", c.congress, c.number))
                .into_owned();
            links.insert(
                "govtrack".to_string(),
                SourceLink {
                    source: LinkSource::govtrack(),
                    landing: Some(format!("{}/search?q={query}", bases.govtrack)),
                    ..SourceLink::default()
                },
            );
        }
    }
    links
}

fn usc_links(payload: &CitationPayload, bases: &LinkBases) -> LinkMap {
    let mut links = LinkMap::new();
    if let CitationPayload::Usc(c) = payload {
        links.insert(
            "house".to_string(),
            SourceLink {
                source: LinkSource::house_olrc(),
                html: Some(format!(
                    "{}/view.xhtml?req=granuleid:USC-prelim-title{}-section{}&num=0&edition=prelim",
                    bases.uscode, c.title, c.section
                )),
                ..SourceLink::default()
            },
        );
        links.insert(
            "cornell".to_string(),
            SourceLink {
                source: LinkSource::cornell_lii(),
                html: Some(format!(
                    "https://www.law.cornell.edu/uscode/text/{}/{}",
                    c.title, c.section
                )),
                ..SourceLink::default()
            },
        );
    }
    links
}

fn reporter_links(payload: &CitationPayload, bases: &LinkBases) -> LinkMap {
    let mut links = LinkMap::new();
    if let CitationPayload::Reporter(c) = payload {
        let query = urlencoding::encode(&format!("{} {} {}", c.volume, c.reporter, c.page))
            .into_owned();
        links.insert(
            "courtlistener".to_string(),
            SourceLink {
                source: LinkSource::courtlistener(),
                landing: Some(format!("{}/?q={query}", bases.courtlistener)),
                ..SourceLink::default()
            },
        );
    }
    links
}

fn bill_links(payload: &CitationPayload, bases: &LinkBases) -> LinkMap {
    let mut links = LinkMap::new();
    if let CitationPayload::Bill(c) = payload {
        // GovInfo only carries bill text from the 103rd Congress on.
        if c.congress >= 103 {
            links.insert(
                "usgpo".to_string(),
                SourceLink {
                    source: LinkSource::usgpo(),
                    pdf: Some(format!(
                        "{}/link/bills/{}/{}/{}",
                        bases.govinfo, c.congress, c.bill_type, c.number
                    )),
                    ..SourceLink::default()
                },
            );
        }
        // GovTrack starts at the 93rd Congress, except for bills it knows
        // became law.
        if c.congress >= 93 || c.is_enacted {
            let landing = format!(
                "{}/congress/bills/{}/{}{}",
                bases.govtrack, c.congress, c.bill_type, c.number
            );
            links.insert(
                "govtrack".to_string(),
                SourceLink {
                    source: LinkSource::govtrack(),
                    html: Some(format!("{landing}/text")),
                    landing: Some(landing),
                    ..SourceLink::default()
                },
            );
        }
    }
    links
}

fn case_links(payload: &CitationPayload, bases: &LinkBases) -> LinkMap {
    let mut links = LinkMap::new();
    if let CitationPayload::Case(c) = payload {
        let landing = match &c.url {
            Some(path) => format!("{}{}", bases.courtlistener, path),
            None => format!(
                "{}/?q={}",
                bases.courtlistener,
                urlencoding::encode(&c.cite)
            ),
        };
        links.insert(
            "courtlistener".to_string(),
            SourceLink {
                source: LinkSource::courtlistener(),
                landing: Some(landing),
                ..SourceLink::default()
            },
        );
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::citation::CaseCite;

    #[test]
    fn test_ordinal() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(13), "13th");
        assert_eq!(ordinal(93), "93rd");
        assert_eq!(ordinal(111), "111th");
    }

    #[test]
    fn test_bill_canonical_and_links() {
        let registry = CitationRegistry::bootstrap();
        let cite = registry.create(CitationPayload::Bill(BillCite {
            congress: 93,
            bill_type: "hr".to_string(),
            number: 1,
            is_enacted: false,
        }));
        assert_eq!(cite.citation.as_deref(), Some("H.R. 1 (93rd Congress)"));
        // 93rd Congress: tracker link yes, document link no (needs >= 103).
        assert!(cite.links.contains_key("govtrack"));
        assert!(!cite.links.contains_key("usgpo"));

        let modern = registry.create(CitationPayload::Bill(BillCite {
            congress: 110,
            bill_type: "s".to_string(),
            number: 22,
            is_enacted: false,
        }));
        assert!(modern.links.contains_key("usgpo"));

        let old = registry.create(CitationPayload::Bill(BillCite {
            congress: 74,
            bill_type: "hr".to_string(),
            number: 1,
            is_enacted: false,
        }));
        assert!(old.links.is_empty());

        let old_enacted = registry.create(CitationPayload::Bill(BillCite {
            congress: 74,
            bill_type: "hr".to_string(),
            number: 1,
            is_enacted: true,
        }));
        assert!(old_enacted.links.contains_key("govtrack"));
    }

    #[test]
    fn test_case_result_descriptor() {
        let registry = CitationRegistry::bootstrap();
        let cite = registry.create(CitationPayload::Case(CaseCite {
            cite: "347 U.S. 483".to_string(),
            court: Some("Supreme Court".to_string()),
            url: Some("/opinion/12345/brown-v-board/".to_string()),
        }));
        assert_eq!(cite.id, "case/347 U.S. 483");
        assert_eq!(cite.citation.as_deref(), Some("347 U.S. 483"));
        assert_eq!(cite.type_name, "Supreme Court");
        let link = cite.links.get("courtlistener").unwrap();
        assert_eq!(
            link.landing.as_deref(),
            Some("https://www.courtlistener.com/opinion/12345/brown-v-board/")
        );
    }

    #[test]
    fn test_from_id_round_trip() {
        let registry = CitationRegistry::bootstrap();
        for id in ["stat/50/100", "law/public/74/1", "usc/5/552", "bill/93/hr/1"] {
            let payload = registry.from_id(id).unwrap();
            assert_eq!(payload.id(), id);
        }
        assert!(registry.from_id("reporter/347/U.S./483").is_none());
        assert!(registry.from_id("stat/50").is_none());
        assert!(registry.from_id("stat/50/100/7").is_none());
        assert!(registry.from_id("law/bogus/74/1").is_none());
    }

    #[test]
    fn test_usc_links_follow_configured_base() {
        let registry = CitationRegistry::with_bases(LinkBases {
            uscode: "http://localhost:9999".to_string(),
            ..LinkBases::default()
        });
        let cite = registry.create(CitationPayload::Usc(UscCite {
            title: "5".to_string(),
            section: "552".to_string(),
        }));
        let house = cite.links.get("house").unwrap();
        let html = house.html.as_deref().unwrap();
        assert!(html.starts_with("http://localhost:9999/view.xhtml"));
        assert!(html.contains("title5-section552"));
        assert!(house.source.authoritative);
    }
}
