use paceline_core::{pagination, Client, CountriesParams, PageParams};

use crate::cli::PageArgs;
use crate::error::CliError;
use crate::output::CommandOutput;

use super::report;

pub async fn run(args: PageArgs, client: &Client) -> Result<CommandOutput, CliError> {
    let params = CountriesParams {
        paging: PageParams::new(args.page, args.limit),
    };
    let body = client.countries(params).await?;
    let info = pagination::extract(&body);

    Ok(CommandOutput::new(body, report(client)).with_pagination(vec![info]))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use paceline_core::{MockHttpClient, RateLimitProfile};
    use serde_json::json;

    use super::*;
    use crate::commands::test_support;

    #[tokio::test]
    async fn prints_body_pagination_and_usage() {
        let mock = Arc::new(MockHttpClient::new().respond(
            200,
            r#"{"data": [{"code": "FR"}], "pagination": {"page": 1, "limit": 1, "total": 3}}"#,
        ));
        let client = test_support::client(&mock, RateLimitProfile::Standard);

        let args = PageArgs {
            page: Some(1),
            limit: Some(1),
        };
        let output = run(args, &client).await.expect("countries succeed");

        assert_eq!(output.data["data"][0]["code"], json!("FR"));
        assert_eq!(output.pagination[0].total_pages(), 3);
        assert_eq!(output.rate_limit.windows[0].used, 1);
        assert!(mock.requests()[0].url.ends_with("/countries?page=1&limit=1"));
    }
}
