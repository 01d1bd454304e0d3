//! # Citation Data Model
//!
//! ## Purpose
//! The central data type of the service: a structured reference to a legal
//! authority (statute, public law, code section, case or bill) together with
//! everything resolution attaches to it — authoritative links, metadata and
//! parallel citations.
//!
//! ## Input/Output Specification
//! - **Input**: Typed payload fields produced by citation extraction or by a
//!   resolver exploding an ambiguous citation
//! - **Output**: Serialized citation trees (JSON) with links, titles and a
//!   depth-1 list of parallel citations on each top-level entry
//!
//! ## Key Invariants
//! - A citation's `id` is derived purely from payload fields: equal payloads
//!   always produce equal ids
//! - Checked flags are monotonic: once set they are never cleared
//! - `parallel_citations` never contains two entries with the same id
//! - Presence of `parallel_citations` marks a citation as top-level; entries
//!   inside it never carry their own non-empty list (depth exactly 1)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Discriminant for the citation kinds the service understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitationKind {
    /// Statutes at Large volume/page
    Stat,
    /// Public or private law
    Law,
    /// U.S. Code title/section
    Usc,
    /// Case reporter volume/reporter/page
    Reporter,
    /// Congressional bill
    Bill,
    /// A concrete decision returned by the case-law search engine
    Case,
}

/// Public vs. private law
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LawType {
    Public,
    Private,
}

impl LawType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LawType::Public => "public",
            LawType::Private => "private",
        }
    }
}

/// Statutes at Large citation fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatCite {
    pub volume: u32,
    pub page: u32,
}

/// Public/private law citation fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LawCite {
    pub law_type: LawType,
    pub congress: u32,
    pub number: u32,
}

/// U.S. Code citation fields. Title and section stay textual because both
/// admit letter suffixes ("50 App.", "§ 552a").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UscCite {
    pub title: String,
    pub section: String,
}

/// Case reporter citation fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReporterCite {
    pub volume: u32,
    pub reporter: String,
    pub page: u32,
}

/// Congressional bill citation fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillCite {
    pub congress: u32,
    pub bill_type: String,
    pub number: u32,
    /// Set when a provider confirmed the bill became law; relaxes the
    /// congress cutoff for bill-tracker links
    #[serde(default)]
    pub is_enacted: bool,
}

/// A decision surfaced by the case-law search engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseCite {
    /// The citation text as reported by the search engine
    pub cite: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub court: Option<String>,
    /// Result-page path on the search engine, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Tagged payload: a citation is exactly one of these, determined by the tag
/// rather than by field presence-testing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CitationPayload {
    Stat(StatCite),
    Law(LawCite),
    Usc(UscCite),
    Reporter(ReporterCite),
    Bill(BillCite),
    Case(CaseCite),
}

impl CitationPayload {
    pub fn kind(&self) -> CitationKind {
        match self {
            CitationPayload::Stat(_) => CitationKind::Stat,
            CitationPayload::Law(_) => CitationKind::Law,
            CitationPayload::Usc(_) => CitationKind::Usc,
            CitationPayload::Reporter(_) => CitationKind::Reporter,
            CitationPayload::Bill(_) => CitationKind::Bill,
            CitationPayload::Case(_) => CitationKind::Case,
        }
    }

    /// Stable identifier derived purely from payload fields. Used for
    /// deduplication and permalinks.
    pub fn id(&self) -> String {
        match self {
            CitationPayload::Stat(c) => format!("stat/{}/{}", c.volume, c.page),
            CitationPayload::Law(c) => {
                format!("law/{}/{}/{}", c.law_type.as_str(), c.congress, c.number)
            }
            CitationPayload::Usc(c) => format!("usc/{}/{}", c.title, c.section),
            CitationPayload::Reporter(c) => format!(
                "reporter/{}/{}/{}",
                c.volume,
                c.reporter.replace(' ', "_"),
                c.page
            ),
            CitationPayload::Bill(c) => {
                format!("bill/{}/{}/{}", c.congress, c.bill_type, c.number)
            }
            CitationPayload::Case(c) => format!("case/{}", c.cite),
        }
    }
}

/// Attribution block describing the provider a link points at
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSource {
    pub name: String,
    pub abbreviation: String,
    pub link: String,
    pub authoritative: bool,
}

impl LinkSource {
    pub fn usgpo() -> Self {
        Self {
            name: "U.S. Government Publishing Office".to_string(),
            abbreviation: "US GPO".to_string(),
            link: "https://www.govinfo.gov/".to_string(),
            authoritative: true,
        }
    }

    pub fn house_olrc() -> Self {
        Self {
            name: "Office of the Law Revision Counsel".to_string(),
            abbreviation: "OLRC".to_string(),
            link: "https://uscode.house.gov/".to_string(),
            authoritative: true,
        }
    }

    pub fn cornell_lii() -> Self {
        Self {
            name: "Cornell Legal Information Institute".to_string(),
            abbreviation: "LII".to_string(),
            link: "https://www.law.cornell.edu/".to_string(),
            authoritative: false,
        }
    }

    pub fn govtrack() -> Self {
        Self {
            name: "GovTrack.us".to_string(),
            abbreviation: "GovTrack.us".to_string(),
            link: "https://www.govtrack.us/".to_string(),
            authoritative: false,
        }
    }

    pub fn courtlistener() -> Self {
        Self {
            name: "Court Listener".to_string(),
            abbreviation: "CL".to_string(),
            link: "https://www.courtlistener.com/".to_string(),
            authoritative: false,
        }
    }

    pub fn legisworks() -> Self {
        Self {
            name: "Legisworks".to_string(),
            abbreviation: "Legisworks".to_string(),
            link: "https://github.com/unitedstates/legisworks-historical-statutes".to_string(),
            authoritative: false,
        }
    }
}

/// URLs a provider exposes for a citation. Slots mirror the document shapes
/// providers actually serve: a landing page, rendered text, a scanned PDF and
/// a metadata record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLink {
    pub source: LinkSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mods: Option<String>,
}

/// Map from provider-source-name to its links for one citation
pub type LinkMap = BTreeMap<String, SourceLink>;

/// Monotonic per-concern processing markers. Setters only ever flip a flag
/// to true; resolvers use these as admission conditions, which is what
/// guarantees the resolution fixed point terminates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Checked {
    /// Looked up against the historical statute volumes
    pub historical: bool,
    /// Queried against the case-law search engine
    pub case_search: bool,
    /// Existence-verified against the code text service
    pub code_verified: bool,
    /// Ran the non-exploding enrichment pass
    pub enriched: bool,
}

impl Checked {
    pub fn mark_historical(&mut self) {
        self.historical = true;
    }

    pub fn mark_case_search(&mut self) {
        self.case_search = true;
    }

    pub fn mark_code_verified(&mut self) {
        self.code_verified = true;
    }

    pub fn mark_enriched(&mut self) {
        self.enriched = true;
    }
}

/// A legal citation with everything resolution has attached to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    #[serde(flatten)]
    pub payload: CitationPayload,
    /// Stable payload-derived identifier, see [`CitationPayload::id`]
    pub id: String,
    /// Display name of the citation kind; replaced by the deciding court for
    /// case-search results
    pub type_name: String,
    /// Canonical human-readable rendering; a more authoritative source may
    /// overwrite it during resolution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
    /// Short title discovered opportunistically; last writer wins
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Explanatory note, e.g. when a link targets an internal page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Present when an ambiguous citation exploded into several matches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disambiguation: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub links: LinkMap,
    #[serde(default, skip_serializing_if = "Checked::is_default")]
    pub checked: Checked,
    /// `Some` marks the citation as top-level. Entries are at most one level
    /// deep: a parallel citation's own list is always absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel_citations: Option<Vec<Citation>>,
}

impl Checked {
    fn is_default(&self) -> bool {
        *self == Checked::default()
    }
}

impl Citation {
    /// Whether this citation came from the original input text (directly or
    /// via explosion), as opposed to being discovered as a cross-reference.
    pub fn is_top_level(&self) -> bool {
        self.parallel_citations.is_some()
    }

    /// Ensure the top-level marker is present
    pub fn mark_top_level(&mut self) {
        if self.parallel_citations.is_none() {
            self.parallel_citations = Some(Vec::new());
        }
    }

    pub fn kind(&self) -> CitationKind {
        self.payload.kind()
    }

    /// Append a discovered parallel citation unless an entry with the same id
    /// already exists. Returns whether the citation was appended.
    pub fn push_parallel(&mut self, cite: Citation) -> bool {
        let list = self.parallel_citations.get_or_insert_with(Vec::new);
        if list.iter().any(|existing| existing.id == cite.id) {
            return false;
        }
        list.push(cite);
        true
    }

    /// Replace the parallel entry sharing `cite`'s id, or append it when no
    /// entry matches. Used by the engine to fold the results of processing a
    /// queued parallel citation back into its owner.
    pub fn merge_parallel_entry(&mut self, cite: Citation) {
        let list = self.parallel_citations.get_or_insert_with(Vec::new);
        match list.iter_mut().find(|existing| existing.id == cite.id) {
            Some(entry) => *entry = cite,
            None => list.push(cite),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(volume: u32, page: u32) -> CitationPayload {
        CitationPayload::Stat(StatCite { volume, page })
    }

    #[test]
    fn test_id_deterministic() {
        assert_eq!(stat(50, 100).id(), stat(50, 100).id());
        assert_ne!(stat(50, 100).id(), stat(50, 101).id());

        let law = CitationPayload::Law(LawCite {
            law_type: LawType::Public,
            congress: 74,
            number: 1,
        });
        assert_eq!(law.id(), "law/public/74/1");

        let bill = CitationPayload::Bill(BillCite {
            congress: 93,
            bill_type: "hr".to_string(),
            number: 1,
            is_enacted: false,
        });
        assert_eq!(bill.id(), "bill/93/hr/1");
    }

    #[test]
    fn test_push_parallel_deduplicates() {
        let mut cite = Citation {
            payload: stat(50, 100),
            id: stat(50, 100).id(),
            type_name: "U.S. Statutes at Large".to_string(),
            citation: None,
            title: None,
            note: None,
            disambiguation: None,
            links: LinkMap::new(),
            checked: Checked::default(),
            parallel_citations: Some(Vec::new()),
        };

        let parallel = Citation {
            payload: CitationPayload::Law(LawCite {
                law_type: LawType::Public,
                congress: 74,
                number: 1,
            }),
            id: "law/public/74/1".to_string(),
            type_name: "U.S. Law".to_string(),
            citation: None,
            title: None,
            note: None,
            disambiguation: None,
            links: LinkMap::new(),
            checked: Checked::default(),
            parallel_citations: None,
        };

        assert!(cite.push_parallel(parallel.clone()));
        assert!(!cite.push_parallel(parallel));
        assert_eq!(cite.parallel_citations.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_merge_replaces_by_id() {
        let mut cite = Citation {
            payload: stat(50, 100),
            id: stat(50, 100).id(),
            type_name: "U.S. Statutes at Large".to_string(),
            citation: None,
            title: None,
            note: None,
            disambiguation: None,
            links: LinkMap::new(),
            checked: Checked::default(),
            parallel_citations: Some(Vec::new()),
        };

        let mut parallel = Citation {
            payload: CitationPayload::Law(LawCite {
                law_type: LawType::Public,
                congress: 74,
                number: 1,
            }),
            id: "law/public/74/1".to_string(),
            type_name: "U.S. Law".to_string(),
            citation: None,
            title: None,
            note: None,
            disambiguation: None,
            links: LinkMap::new(),
            checked: Checked::default(),
            parallel_citations: None,
        };
        cite.push_parallel(parallel.clone());

        parallel.title = Some("Example Act".to_string());
        cite.merge_parallel_entry(parallel);

        let list = cite.parallel_citations.as_ref().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].title.as_deref(), Some("Example Act"));
    }

    #[test]
    fn test_serialization_tags_payload() {
        let cite = Citation {
            payload: stat(50, 100),
            id: "stat/50/100".to_string(),
            type_name: "U.S. Statutes at Large".to_string(),
            citation: Some("50 Stat. 100".to_string()),
            title: None,
            note: None,
            disambiguation: None,
            links: LinkMap::new(),
            checked: Checked::default(),
            parallel_citations: Some(Vec::new()),
        };

        let value = serde_json::to_value(&cite).unwrap();
        assert_eq!(value["type"], "stat");
        assert_eq!(value["volume"], 50);
        assert_eq!(value["page"], 100);
        assert!(value.get("title").is_none());
    }
}
