use paceline_core::Client;

use crate::error::CliError;
use crate::output::CommandOutput;

use super::report;

pub async fn run(id: u64, client: &Client) -> Result<CommandOutput, CliError> {
    let body = client.venue(id).await?;
    Ok(CommandOutput::new(body, report(client)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use paceline_core::{MockHttpClient, RateLimitProfile};

    use super::*;
    use crate::commands::test_support;

    #[tokio::test]
    async fn missing_venue_exits_with_not_found_code() {
        let mock = Arc::new(
            MockHttpClient::new().respond(404, r#"{"message": "venue 9 not found"}"#),
        );
        let client = test_support::client(&mock, RateLimitProfile::Disabled);

        let error = run(9, &client).await.expect_err("404 must fail");

        assert_eq!(error.exit_code(), 4);
        assert!(error.to_string().contains("venue 9 not found"));
    }
}
