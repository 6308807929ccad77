use anyhow::Result;
use clap::Command;

mod cmd;
mod config;

fn make_cli() -> Command {
    Command::new("vitrine")
        .about("Flat-file portfolio CMS")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(cmd::serve::make_subcommand())
        .subcommand(cmd::user::make_subcommand())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vitrine_server=info,tower_http=info".into()),
        )
        .init();

    let matches = make_cli().get_matches();

    match matches.subcommand() {
        Some(("serve", args)) => cmd::serve::execute(args).await,
        Some(("user", args)) => cmd::user::execute(args),
        _ => unreachable!("subcommand required"),
    }
}
