//! `tpg` command line entry point

use anyhow::{bail, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use tpg_cli::{EdgeArgs, Edit, Snapshot};
use tpg_editor::EditorConfig;
use tracing_subscriber::EnvFilter;

fn snapshot_arg() -> Arg {
    Arg::new("snapshot")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Snapshot JSON file")
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON")
}

fn edge_command(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(snapshot_arg())
        .arg(
            Arg::new("parent")
                .long("parent")
                .required(true)
                .help("Parent parameter id or slug"),
        )
        .arg(
            Arg::new("option")
                .long("option")
                .required(true)
                .help("Parent option id or label"),
        )
        .arg(
            Arg::new("child")
                .long("child")
                .required(true)
                .help("Child parameter id or slug"),
        )
}

fn cli() -> Command {
    Command::new("tpg")
        .version(tpg_cli::VERSION)
        .about("Task parameter dependency graph tool")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Editor configuration TOML"),
        )
        .arg(
            Arg::new("log")
                .long("log")
                .global(true)
                .help("Log filter, overrides RUST_LOG"),
        )
        .subcommand(
            Command::new("check")
                .about("Load a snapshot and report on its consistency")
                .arg(snapshot_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("eval")
                .about("Show the parameters visible for a selection")
                .arg(snapshot_arg())
                .arg(
                    Arg::new("select")
                        .long("select")
                        .action(ArgAction::Append)
                        .help("Selected option as parameter=option"),
                )
                .arg(json_arg()),
        )
        .subcommand(edge_command("connect", "Add a dependency to a snapshot"))
        .subcommand(edge_command("disconnect", "Remove a dependency from a snapshot"))
}

fn init_logging(filter: Option<&String>) -> anyhow::Result<()> {
    let filter = match filter {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter '{directives}'"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn string<'a>(args: &'a ArgMatches, id: &str) -> anyhow::Result<&'a str> {
    args.get_one::<String>(id)
        .map(String::as_str)
        .with_context(|| format!("missing --{id}"))
}

fn snapshot_path(args: &ArgMatches) -> anyhow::Result<&PathBuf> {
    args.get_one::<PathBuf>("snapshot")
        .context("missing snapshot path")
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_edit(args: &ArgMatches, config: EditorConfig, edit: Edit) -> anyhow::Result<()> {
    let path = snapshot_path(args)?;
    let snapshot = Snapshot::read(path)?;
    let edge_args = EdgeArgs {
        parent: string(args, "parent")?,
        option: string(args, "option")?,
        child: string(args, "child")?,
    };

    let (updated, edge) = tpg_cli::edit(snapshot, config, edit, edge_args).await?;
    updated.write(path)?;

    match edit {
        Edit::Connect => println!("Connected {edge}"),
        Edit::Disconnect => println!("Disconnected {edge}"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    init_logging(matches.get_one::<String>("log"))?;

    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };

    match matches.subcommand() {
        Some(("check", args)) => {
            let snapshot = Snapshot::read(snapshot_path(args)?)?;
            let report = tpg_cli::check(&snapshot);

            if args.get_flag("json") {
                print_json(&report)?;
            } else {
                println!("{report}");
            }
            std::process::exit(if report.is_clean() { 0 } else { 1 });
        }
        Some(("eval", args)) => {
            let snapshot = Snapshot::read(snapshot_path(args)?)?;
            let picks = args
                .get_many::<String>("select")
                .unwrap_or_default()
                .map(String::as_str);
            let report = tpg_cli::eval(&snapshot, picks)?;

            if args.get_flag("json") {
                print_json(&report)?;
            } else {
                println!("{report}");
            }
        }
        Some(("connect", args)) => run_edit(args, config, Edit::Connect).await?,
        Some(("disconnect", args)) => run_edit(args, config, Edit::Disconnect).await?,
        Some((other, _)) => bail!("unknown command '{other}'"),
        None => bail!("no command given"),
    }
    Ok(())
}
