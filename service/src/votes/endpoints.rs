//! Feed URL layout.

use tc_rollcall::Chamber;

use super::request::ResolvedScope;
use crate::config::FeedsConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEndpoints {
    pub house_base_url: String,
    pub senate_base_url: String,
    pub senate_roster_url: String,
}

impl FeedEndpoints {
    #[must_use]
    pub fn from_config(config: &FeedsConfig) -> Self {
        Self {
            house_base_url: config.house_base_url.clone(),
            senate_base_url: config.senate_base_url.clone(),
            senate_roster_url: config.senate_roster_url.clone(),
        }
    }

    /// Point every feed at one base URL (test servers).
    #[must_use]
    pub fn with_base(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            house_base_url: format!("{base}/evs"),
            senate_base_url: format!("{base}/legislative/LIS/roll_call_votes"),
            senate_roster_url: format!("{base}/legislative/LIS_MEMBER/cvc_member_data.xml"),
        }
    }

    /// `{house}/{year}/roll{NNN}.xml` or
    /// `{senate}/vote{congress}{session}/vote_{congress}_{session}_{NNNNN}.xml`.
    #[must_use]
    pub fn vote_url(&self, scope: &ResolvedScope, roll: u32) -> String {
        match scope.chamber {
            Chamber::House => format!(
                "{}/{}/roll{roll:03}.xml",
                self.house_base_url.trim_end_matches('/'),
                scope.year
            ),
            Chamber::Senate => {
                let (congress, session) = (scope.congress, scope.session);
                format!(
                    "{}/vote{congress}{session}/vote_{congress}_{session}_{roll:05}.xml",
                    self.senate_base_url.trim_end_matches('/')
                )
            }
        }
    }
}

impl Default for FeedEndpoints {
    fn default() -> Self {
        Self::from_config(&FeedsConfig::default())
    }
}
