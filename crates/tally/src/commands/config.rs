//! Config command - shows the effective configuration.

use anyhow::Result;
use clap::Args;

use tally_config::TallyConfig;

use super::Context;

const REDACTED: &str = "<redacted>";

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Only list the files that were loaded
    #[arg(long)]
    pub sources: bool,
}

/// Run the config command.
pub fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    if args.sources {
        for source in &ctx.loaded.sources {
            let status = if source.loaded { "loaded" } else { "missing" };
            println!("{:8} {}", status, source.path.display());
        }
        return Ok(());
    }

    print!("{}", render(&ctx.loaded.config)?);
    Ok(())
}

/// Every section with defaults filled in, secret redacted.
fn render(config: &TallyConfig) -> Result<String> {
    let mut session = config.session();
    if session.secret.is_some() {
        session.secret = Some(REDACTED.to_string());
    }

    let effective = TallyConfig {
        server: Some(config.server()),
        login: Some(config.login()),
        session: Some(session),
        preferences: Some(config.preferences()),
        logging: Some(config.logging()),
    };

    Ok(toml::to_string_pretty(&effective)?)
}
