//! Congress.gov API client module.
//!
//! Bill metadata, cosponsors and member search from the Congress.gov v3 JSON
//! API, complementing the roll-call XML feeds handled by [`crate::votes`].
//!
//! # Architecture
//!
//! The module uses a trait-based design for testability:
//!
//! - [`CongressApiClient`] - Trait defining API operations
//! - [`HttpCongressClient`] - Real HTTP implementation over [`crate::fetch::Fetcher`]
//! - [`mock::MockCongressClient`] - Mock for unit tests (behind `test-utils` feature)
//!
//! # Testing Patterns
//!
//! ## Unit Tests (Mock Implementation)
//!
//! ```ignore
//! use tinycongress_votes::congress::{bill_overview, mock::MockCongressClient};
//!
//! let mock = MockCongressClient::new();
//! mock.set_get_bill_result(Ok(Bill { ... }));
//!
//! let overview = bill_overview(&mock, 118, BillType::Hr, 815, false).await?;
//! assert_eq!(mock.get_bill_calls().len(), 1);
//! ```
//!
//! ## Integration Tests (HTTP Stubbing)
//!
//! ```ignore
//! let server = MockHttpServer::start().await;
//!
//! server
//!     .expect_get("/bill/118/hr/815")
//!     .with_header("X-API-Key", "test-key")
//!     .respond_with_json(json!({ "bill": { ... } }))
//!     .mount()
//!     .await;
//!
//! let client = HttpCongressClient::new(server.url(), "test-key").unwrap();
//! let bill = client.get_bill(118, BillType::Hr, 815).await.unwrap();
//! ```

mod client;
mod types;

use serde::Serialize;
use tc_rollcall::BillType;

pub use client::{
    CongressApiClient, CongressApiError, HttpCongressClient, COSPONSOR_PAGE_SIZE,
    MEMBER_SEARCH_LIMIT,
};
pub use types::{
    Bill, BillResponse, Cosponsor, CosponsorsResponse, LatestAction, Member, MemberFilters,
    MembersResponse, Pagination,
};

#[cfg(any(test, feature = "test-utils"))]
pub use client::mock;

/// A bill with, optionally, its full cosponsor list.
#[derive(Debug, Clone, Serialize)]
pub struct BillOverview {
    pub bill: Bill,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cosponsors: Option<Vec<Cosponsor>>,
}

/// Fetch a bill and, when asked, its cosponsors.
///
/// # Errors
///
/// Propagates the first [`CongressApiError`]; cosponsors are not requested
/// when the bill lookup fails.
pub async fn bill_overview(
    client: &dyn CongressApiClient,
    congress: u16,
    bill_type: BillType,
    number: u32,
    with_cosponsors: bool,
) -> Result<BillOverview, CongressApiError> {
    let bill = client.get_bill(congress, bill_type, number).await?;
    let cosponsors = if with_cosponsors {
        Some(client.list_cosponsors(congress, bill_type, number).await?)
    } else {
        None
    };
    Ok(BillOverview { bill, cosponsors })
}
