mod countries;
mod limits;
mod venue;
mod venues;

use paceline_core::{Client, ClientConfig, ConfigError, RateLimitProfile};
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::output::{CommandOutput, RateLimitReport};

pub async fn run(cli: &Cli) -> Result<CommandOutput, CliError> {
    match &cli.command {
        Command::Limits => Ok(limits::run(resolve_profile(cli)?)),
        Command::Countries(args) => countries::run(*args, &connect(cli)?).await,
        Command::Venues(args) => venues::run(args, &connect(cli)?).await,
        Command::Venue(args) => venue::run(args.id, &connect(cli)?).await,
    }
}

fn connect(cli: &Cli) -> Result<Client, CliError> {
    Ok(Client::new(client_config(cli)?)?)
}

/// Environment first, then flags on top.
fn client_config(cli: &Cli) -> Result<ClientConfig, ConfigError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(profile) = cli.profile {
        config = config.with_profile(profile);
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_timeout_ms(timeout_ms);
    }
    if let Some(language) = &cli.language {
        config = config.with_language(language);
    }
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url);
    }
    config.validate()?;
    debug!(?config, "resolved configuration");
    Ok(config)
}

fn resolve_profile(cli: &Cli) -> Result<RateLimitProfile, ConfigError> {
    if let Some(profile) = cli.profile {
        return Ok(profile);
    }
    match std::env::var(paceline_core::config::ENV_RATE_LIMIT_PROFILE) {
        Ok(value) => value.parse(),
        Err(_) => Ok(RateLimitProfile::default()),
    }
}

fn report(client: &Client) -> RateLimitReport {
    RateLimitReport::from_status(&client.rate_limit_status())
}
