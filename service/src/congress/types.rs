//! Data types for Congress.gov API responses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tc_rollcall::Chamber;

/// Most recent action recorded on a bill.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LatestAction {
    #[serde(default)]
    pub action_date: Option<NaiveDate>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Core bill metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub congress: u16,
    /// Type code as the API reports it (e.g., "HR", "S")
    #[serde(rename = "type")]
    pub bill_type: String,
    /// Bill number; the API sends it as a string
    pub number: String,
    pub title: String,
    #[serde(default)]
    pub origin_chamber: Option<String>,
    #[serde(default)]
    pub latest_action: Option<LatestAction>,
    #[serde(default)]
    pub update_date: Option<String>,
}

/// Response from the bill detail endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillResponse {
    pub bill: Bill,
}

/// A cosponsor of a bill.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Cosponsor {
    /// Bioguide ID (e.g., "B001288")
    pub bioguide_id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub party: String,
    pub state: String,
    #[serde(default)]
    pub district: Option<u32>,
    #[serde(default)]
    pub sponsorship_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_original_cosponsor: bool,
}

/// Paging block attached to list responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    #[serde(default)]
    pub count: Option<u32>,
    /// URL of the next page, absent on the last one
    #[serde(default)]
    pub next: Option<String>,
}

/// One page from the cosponsors endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CosponsorsResponse {
    #[serde(default)]
    pub cosponsors: Vec<Cosponsor>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// A member of Congress as returned by member search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Bioguide ID (e.g., "A000360")
    pub bioguide_id: String,
    /// Display name, "Last, First"
    pub name: String,
    #[serde(default)]
    pub party_name: Option<String>,
    /// Full state name (e.g., "Tennessee")
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub district: Option<u32>,
}

/// Response from the member search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembersResponse {
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Optional narrowing for [`search_members`](super::CongressApiClient::search_members).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberFilters {
    pub congress: Option<u16>,
    pub chamber: Option<Chamber>,
    /// Two-letter state code
    pub state: Option<String>,
}
