use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use vitrine_core::{NewUser, UserStore};

use crate::config::VitrineConfig;

pub fn make_subcommand() -> Command {
    Command::new("user")
        .about("Manage admin panel users")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file")
                .default_value("./vitrine.toml")
                .global(true),
        )
        .subcommand(
            Command::new("add")
                .about("Create a user (how the first login gets bootstrapped)")
                .arg(Arg::new("username").required(true))
                .arg(
                    Arg::new("first-name")
                        .long("first-name")
                        .value_name("NAME")
                        .default_value(""),
                )
                .arg(
                    Arg::new("last-name")
                        .long("last-name")
                        .value_name("NAME")
                        .default_value(""),
                )
                .arg(
                    Arg::new("password")
                        .long("password")
                        .value_name("PASSWORD")
                        .required(true),
                )
                .arg(
                    Arg::new("admin")
                        .long("admin")
                        .help("Grant the admin role")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("list").about("List users"))
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    let config = VitrineConfig::load(args)?;
    let store = UserStore::new(PathBuf::from(&config.storage.data_dir).join("users.json"));

    match args.subcommand() {
        Some(("add", sub)) => {
            let user = store.create(NewUser {
                username: sub.get_one::<String>("username").cloned().unwrap_or_default(),
                first_name: sub.get_one::<String>("first-name").cloned().unwrap_or_default(),
                last_name: sub.get_one::<String>("last-name").cloned().unwrap_or_default(),
                password: sub.get_one::<String>("password").cloned().unwrap_or_default(),
                admin: sub.get_flag("admin"),
            })?;
            println!("Created user {} (id {})", user.username, user.id);
        }
        Some(("list", _)) => {
            for user in store.all() {
                println!("{}\t{} {}", user.username, user.first_name, user.last_name);
            }
        }
        _ => unreachable!("subcommand required"),
    }

    Ok(())
}
