use paceline_core::RateLimitProfile;
use serde_json::json;

use crate::output::{CommandOutput, RateLimitReport};

/// Describes `profile` without contacting the API.
pub fn run(profile: RateLimitProfile) -> CommandOutput {
    let profiles: Vec<_> = RateLimitProfile::ALL
        .iter()
        .map(|candidate| candidate.as_str())
        .collect();
    CommandOutput::new(
        json!({ "selected": profile.as_str(), "available": profiles }),
        RateLimitReport::idle(profile),
    )
}
