//! Common test utilities for integration tests.
//!
//! This module provides:
//!
//! - [`http_mock::MockHttpServer`] - Declarative HTTP stubbing over `wiremock`
//! - [`fixtures`] - Roll-call XML documents shared with the `tc-rollcall` tests
//!
//! # Usage
//!
//! ```ignore
//! mod common;
//!
//! use common::{fixtures, http_mock::MockHttpServer};
//!
//! #[tokio::test]
//! async fn test_serves_house_vote() {
//!     let server = MockHttpServer::start().await;
//!     server
//!         .expect_get("/evs/2023/roll006.xml")
//!         .respond_with_bytes(fixtures::HOUSE_2023_ROLL_6, "text/xml")
//!         .mount()
//!         .await;
//! }
//! ```

#![allow(dead_code)]

pub mod http_mock;

pub mod fixtures {
    //! Byte-for-byte feed documents.

    pub const HOUSE_2023_ROLL_6: &[u8] =
        include_bytes!("../../../crates/tc-rollcall/tests/fixtures/house_2023_roll006.xml");
    pub const HOUSE_TALLY_MISMATCH: &[u8] =
        include_bytes!("../../../crates/tc-rollcall/tests/fixtures/house_tally_mismatch.xml");
    pub const HOUSE_MISSING_ROLLCALL: &[u8] =
        include_bytes!("../../../crates/tc-rollcall/tests/fixtures/house_missing_rollcall.xml");
    pub const SENATE_NOMINATION: &[u8] = include_bytes!(
        "../../../crates/tc-rollcall/tests/fixtures/senate_119_1_00011_nomination.xml"
    );
    pub const SENATE_AMENDMENT: &[u8] = include_bytes!(
        "../../../crates/tc-rollcall/tests/fixtures/senate_119_1_00005_amendment.xml"
    );
    pub const SENATE_PROCEDURAL: &[u8] = include_bytes!(
        "../../../crates/tc-rollcall/tests/fixtures/senate_119_1_00030_procedural.xml"
    );
    pub const SENATE_ROSTER: &[u8] =
        include_bytes!("../../../crates/tc-rollcall/tests/fixtures/senate_roster.xml");
}
