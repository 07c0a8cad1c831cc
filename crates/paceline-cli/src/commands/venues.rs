use paceline_core::{pagination, Client, PageParams, VenuesParams};
use serde_json::Value;
use tokio::task::JoinSet;
use tracing::debug;

use crate::cli::VenuesArgs;
use crate::error::CliError;
use crate::output::CommandOutput;

use super::report;

pub async fn run(args: &VenuesArgs, client: &Client) -> Result<CommandOutput, CliError> {
    let base = VenuesParams {
        country: args.country.clone(),
        name: args.name.clone(),
        paging: PageParams::new(None, args.paging.limit),
    };
    // Fail on bad filters once, before any page is scheduled.
    base.validate()?;

    let first_page = args.paging.page.unwrap_or(1);
    if args.pages == 1 {
        let params = match args.paging.page {
            Some(page) => base.with_page(page),
            None => base,
        };
        let body = client.venues(params).await?;
        let info = pagination::extract(&body);
        return Ok(CommandOutput::new(body, report(client)).with_pagination(vec![info]));
    }

    debug!(first_page, pages = args.pages, "fetching venue pages concurrently");
    let mut tasks = JoinSet::new();
    for offset in 0..args.pages {
        let page = first_page.saturating_add(offset);
        let client = client.clone();
        let params = base.clone().with_page(page);
        tasks.spawn(async move { (offset, client.venues(params).await) });
    }

    let mut bodies: Vec<Option<Value>> = vec![None; args.pages as usize];
    while let Some(joined) = tasks.join_next().await {
        let (offset, result) = joined.map_err(|error| CliError::Task(error.to_string()))?;
        bodies[offset as usize] = Some(result?);
    }

    let bodies: Vec<Value> = bodies.into_iter().flatten().collect();
    let pagination = bodies.iter().map(pagination::extract).collect();
    Ok(CommandOutput::new(Value::Array(bodies), report(client)).with_pagination(pagination))
}
