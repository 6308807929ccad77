use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use vitrine_server::Server;

use crate::config::VitrineConfig;

pub fn make_subcommand() -> Command {
    Command::new("serve")
        .about("Run the CMS server (public site and admin panel)")
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("HOST")
                .help("Host to bind to")
                .default_value("127.0.0.1"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Port to serve on")
                .default_value("3576"),
        )
        .arg(
            Arg::new("data-dir")
                .short('d')
                .long("data-dir")
                .value_name("DIR")
                .help("Directory holding the JSON collections"),
        )
        .arg(
            Arg::new("uploads-dir")
                .long("uploads-dir")
                .value_name("DIR")
                .help("Directory uploaded media is written to"),
        )
        .arg(
            Arg::new("static-dir")
                .long("static-dir")
                .value_name("DIR")
                .help("Directory of static assets served at the root"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file")
                .default_value("./vitrine.toml"),
        )
}

pub async fn execute(args: &ArgMatches) -> Result<()> {
    let config = VitrineConfig::load(args)?;

    println!(
        "Starting {} at http://{}:{}",
        config.site.title.as_deref().unwrap_or("vitrine"),
        config.server.host,
        config.server.port
    );

    let server = Server::new(config.server_options());
    server.run().await
}
