//! Senate member roster (`cvc_member_data.xml`).
//!
//! The LIS vote feed identifies senators by LIS member id (`S354`). The roster
//! maps those ids to BioGuide ids and, for older vote files that omit it,
//! party and state.

use std::collections::HashMap;

use crate::error::{ParseError, ParseErrorKind};
use crate::model::{Chamber, Party};
use crate::xml;

/// One senator as listed in the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub lis_member_id: String,
    pub bioguide_id: Option<String>,
    pub name: String,
    pub party: Option<Party>,
    pub state: Option<String>,
}

/// LIS member id → roster entry.
#[derive(Debug, Clone, Default)]
pub struct SenateRoster {
    by_lis: HashMap<String, RosterEntry>,
}

impl SenateRoster {
    /// Parse the roster XML.
    ///
    /// Entries without an LIS member id are skipped, since nothing in a vote
    /// file could join against them.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] when the document is not well-formed XML.
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        let text = xml::decode(bytes);
        let doc = xml::parse(&text).map_err(|kind| ParseError::new(Chamber::Senate, kind))?;

        let mut skipped = 0_usize;
        let entries: Vec<RosterEntry> = doc
            .root_element()
            .descendants()
            .filter(|n| xml::is_named(*n, "senator"))
            .filter_map(|senator| {
                let lis = xml::attr(senator, "lis_member_id")
                    .map(str::to_string)
                    .or_else(|| xml::child_text_non_empty(senator, "lis_member_id"));
                let Some(lis_member_id) = lis else {
                    skipped += 1;
                    return None;
                };
                let name = match xml::child(senator, "name") {
                    Some(name) => {
                        let first = xml::child_text(name, "first").unwrap_or_default();
                        let last = xml::child_text(name, "last").unwrap_or_default();
                        let joined = format!("{first} {last}").trim().to_string();
                        if joined.is_empty() {
                            xml::text(name)
                        } else {
                            joined
                        }
                    }
                    None => String::new(),
                };
                Some(RosterEntry {
                    lis_member_id,
                    bioguide_id: xml::first_text(senator, &["bioguideId", "bioguide_id"]),
                    name,
                    party: xml::child_text(senator, "party").and_then(|p| Party::parse(&p)),
                    state: xml::child_text_non_empty(senator, "state"),
                })
            })
            .collect();

        if skipped > 0 {
            tracing::warn!(skipped, "roster entries without an LIS member id were skipped");
        }
        if entries.is_empty() {
            return Err(ParseError::new(
                Chamber::Senate,
                ParseErrorKind::MissingField("senator"),
            ));
        }
        Ok(Self::from_entries(entries))
    }

    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = RosterEntry>) -> Self {
        let by_lis = entries
            .into_iter()
            .map(|entry| (entry.lis_member_id.to_ascii_uppercase(), entry))
            .collect();
        Self { by_lis }
    }

    #[must_use]
    pub fn get(&self, lis_member_id: &str) -> Option<&RosterEntry> {
        self.by_lis.get(&lis_member_id.trim().to_ascii_uppercase())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_lis.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_lis.is_empty()
    }
}
