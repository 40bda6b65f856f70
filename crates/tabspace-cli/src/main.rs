//! `tabspace` - run scripted sessions against file-backed workspaces

mod script;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use script::{parse_script, referenced_spaces, Command as Step};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tabspace_core::{
    Diagnostics, FileStorage, LoadOutcome, LocalSpaces, OpenOptions, PersistenceCodec, Space,
    UrlMode, UrlUpdate, WorkbenchState, WorkspaceConfig, WorkspaceEngine,
};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    let state_dir = Arg::new("state-dir")
        .long("state-dir")
        .default_value(".tabspace")
        .value_parser(value_parser!(PathBuf))
        .help("Directory holding per-space snapshots");
    let space = Arg::new("space")
        .long("space")
        .help("Space to open (defaults to the system space)");

    Command::new("tabspace")
        .version(tabspace_core::VERSION)
        .about("Pane/tab workspace engine")
        .subcommand_required(true)
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("run")
                .about("Execute a session script")
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML configuration file"),
                )
                .arg(state_dir.clone())
                .arg(space.clone())
                .arg(
                    Arg::new("script")
                        .value_parser(value_parser!(PathBuf))
                        .help("Script file (stdin when omitted or `-`)"),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Print a space's stored snapshot")
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML configuration file"),
                )
                .arg(state_dir)
                .arg(space),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(args: &ArgMatches) -> Result<WorkspaceConfig> {
    match args.get_one::<PathBuf>("config") {
        Some(path) => WorkspaceConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(WorkspaceConfig::default()),
    }
}

fn open_storage(args: &ArgMatches) -> Result<Arc<FileStorage>> {
    let dir = args
        .get_one::<PathBuf>("state-dir")
        .context("missing --state-dir")?;
    let storage =
        FileStorage::open(dir).with_context(|| format!("opening state dir {}", dir.display()))?;
    Ok(Arc::new(storage))
}

fn read_script(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display())),
        _ => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .context("reading script from stdin")?;
            Ok(source)
        }
    }
}

fn print_layout(state: &WorkbenchState) {
    for pane in &state.panes {
        let focus = if pane.id == state.active_pane_id { " *" } else { "" };
        println!("[{}] {:.0}%{focus}", pane.id, pane.width_percent);
        for tab in &pane.tabs {
            let marker = if pane.active_tab_id == Some(tab.id) { '>' } else { ' ' };
            let pin = if tab.pinned { " (pinned)" } else { "" };
            println!("  {marker} {} {}{pin}", tab.label, tab.route);
        }
    }
}

fn report(update: Option<UrlUpdate>) {
    if let Some(update) = update {
        let mode = match update.mode {
            UrlMode::Push => "push",
            UrlMode::Replace => "replace",
        };
        println!("{mode} {}", update.url);
    }
}

async fn run(args: &ArgMatches) -> Result<()> {
    let config = load_config(args)?;
    let storage = open_storage(args)?;
    let source = read_script(args.get_one::<PathBuf>("script"))?;
    let steps = parse_script(&source)?;

    let space = args.get_one::<String>("space").cloned();
    let mut space_ids = referenced_spaces(&steps);
    space_ids.extend(space.clone());
    let spaces: Vec<Space> = space_ids
        .iter()
        .filter(|id| **id != config.system_space_id)
        .map(|id| Space::new(id.clone(), id.clone()))
        .collect();
    let api = spaces
        .iter()
        .cloned()
        .fold(LocalSpaces::new(&config.system_space_id), LocalSpaces::with_space);

    let mut builder = WorkspaceEngine::builder()
        .config(config)
        .storage(storage)
        .spaces_api(Arc::new(api))
        .spaces(spaces);
    if let Some(space) = space {
        builder = builder.initial_space(space);
    }
    let mut engine = builder.build()?;
    engine.load_spaces().await?;
    tracing::info!(steps = steps.len(), url = %engine.current_url(), "running script");

    for step in steps {
        let update = match step {
            Step::Open { route, force_new } => {
                let options = if force_new {
                    OpenOptions::new().force_new()
                } else {
                    OpenOptions::new()
                };
                engine.open_tab_from_route(&route, options)
            }
            Step::Close => match engine.state().active_tab().map(|t| t.id) {
                Some(id) => engine.close_tab(id),
                None => None,
            },
            Step::Split => engine.enable_split(),
            Step::Unsplit => engine.disable_split(),
            Step::Move(pane) => match engine.state().active_tab().map(|t| t.id) {
                Some(id) => engine.move_tab_to_pane(id, pane),
                None => None,
            },
            Step::Pin => match engine.state().active_tab().map(|t| t.id) {
                Some(id) => engine.toggle_pin(id),
                None => None,
            },
            Step::Back => engine.go_back(),
            Step::Forward => engine.go_forward(),
            Step::Url(url) => engine.apply_url(&url),
            Step::Switch(space_id) => engine.switch_space(&space_id).await,
            Step::Show => {
                print_layout(engine.state());
                None
            }
        };
        report(update);
    }

    println!("space {}", engine.active_space_id());
    println!("url {}", engine.current_url());
    print_layout(engine.state());
    Ok(())
}

fn inspect(args: &ArgMatches) -> Result<()> {
    let config = load_config(args)?;
    let storage = open_storage(args)?;
    let space = args
        .get_one::<String>("space")
        .cloned()
        .unwrap_or_else(|| config.system_space_id.clone());
    let codec = PersistenceCodec::new(storage, &config, Diagnostics::new());

    match codec.load_outcome(&space) {
        LoadOutcome::Missing => println!("no snapshot for {space}"),
        LoadOutcome::Loaded(state) => {
            println!("url {}", tabspace_core::derive_url(&state));
            print_layout(&state);
        }
        LoadOutcome::Discarded(reason) => println!("discarded snapshot for {space}: {reason}"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("json"));

    match matches.subcommand() {
        Some(("run", args)) => run(args).await,
        Some(("inspect", args)) => inspect(args),
        Some((other, _)) => anyhow::bail!("unknown command {other}"),
        None => anyhow::bail!("no command given"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn run_arguments_parse() {
        let matches = cli()
            .try_get_matches_from([
                "tabspace",
                "run",
                "--state-dir",
                "/tmp/tabs",
                "--space",
                "space_work",
                "session.txt",
                "--json",
            ])
            .unwrap();
        assert!(matches.get_flag("json"));
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "run");
        assert_eq!(
            args.get_one::<PathBuf>("state-dir"),
            Some(&PathBuf::from("/tmp/tabs"))
        );
        assert_eq!(args.get_one::<String>("space").map(String::as_str), Some("space_work"));
    }

    #[tokio::test]
    async fn script_runs_against_state_dir() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("session.txt");
        std::fs::write(&script, "open /page/page_1\nsplit\nmove right\nswitch space_work\n").unwrap();
        let state_dir = dir.path().join("state");

        let matches = cli()
            .try_get_matches_from([
                OsString::from("tabspace"),
                OsString::from("run"),
                OsString::from("--state-dir"),
                state_dir.clone().into_os_string(),
                script.into_os_string(),
            ])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();
        run(args).await.unwrap();

        let storage = Arc::new(FileStorage::open(&state_dir).unwrap());
        let codec = PersistenceCodec::new(storage, &WorkspaceConfig::default(), Diagnostics::new());
        let system = codec.load("space_system").unwrap();
        assert!(system.is_split());
        assert!(codec.load("space_work").is_some());
    }
}
