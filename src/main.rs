use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use openwith::{
    config::Config, registry::Associations, viewer::viewer_kind, RecordOrigin,
    ENTER_DIRECTORY_COMMAND,
};

#[derive(Parser)]
#[command(
    name = "openwith",
    about = "Resolve which external program opens or previews a file"
)]
struct Cli {
    /// Treat the environment as graphical regardless of autodetection
    #[arg(long, global = true)]
    graphical: bool,

    /// Treat the environment as non-graphical regardless of autodetection
    #[arg(long, global = true, conflicts_with = "graphical")]
    no_graphical: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the command that opens FILE
    Resolve {
        /// File name to resolve; a trailing slash marks a directory
        #[arg(value_name = "FILE")]
        file: String,
    },

    /// Print the command that previews FILE
    Viewer {
        #[arg(value_name = "FILE")]
        file: String,

        /// Also print the viewer's output kind (textual, graphical, pass-through)
        #[arg(long)]
        kind: bool,
    },

    /// Print every available preview command for FILE, one per line
    Viewers {
        #[arg(value_name = "FILE")]
        file: String,
    },

    /// Print every configured candidate for FILE, available or not
    List {
        #[arg(value_name = "FILE")]
        file: String,

        /// List viewer candidates instead of opener candidates
        #[arg(long)]
        viewers: bool,
    },

    /// Manage the openwith configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the current configuration
    Show,
    /// Print the configuration file path
    Path,
    /// Write a sample configuration to disk
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let graphical = if cli.graphical {
        true
    } else if cli.no_graphical {
        false
    } else {
        graphical_environment()
    };

    match cli.command {
        Commands::Resolve { file } => cmd_resolve(&file, graphical)?,
        Commands::Viewer { file, kind } => cmd_viewer(&file, graphical, kind)?,
        Commands::Viewers { file } => cmd_viewers(&file, graphical)?,
        Commands::List { file, viewers } => cmd_list(&file, graphical, viewers)?,
        Commands::Config { action } => cmd_config(action)?,
    }

    Ok(())
}

/// Build the registry from the configuration file, with executables checked
/// against PATH.
fn load_associations(graphical: bool) -> Result<Associations> {
    let config = Config::load()?;
    let mut assocs = Associations::new();
    assocs.set_exists_check(|name| {
        name == ENTER_DIRECTORY_COMMAND || which::which(name).is_ok()
    });
    config.apply(&mut assocs, graphical)?;
    Ok(assocs)
}

/// Append a trailing slash when `file` names a directory on disk, so that
/// directory-only patterns apply.
fn normalized_name(file: &str) -> String {
    if !file.ends_with('/') && std::path::Path::new(file).is_dir() {
        format!("{file}/")
    } else {
        file.to_string()
    }
}

fn cmd_resolve(file: &str, graphical: bool) -> Result<()> {
    let assocs = load_associations(graphical)?;
    let name = normalized_name(file);

    match assocs.program_for(&name) {
        Some(command) => println!("{command}"),
        None => bail!("No program is associated with {file:?}"),
    }
    Ok(())
}

fn cmd_viewer(file: &str, graphical: bool, show_kind: bool) -> Result<()> {
    let assocs = load_associations(graphical)?;
    let name = normalized_name(file);

    let viewer = assocs.viewer_for(&name);
    if show_kind {
        let kind = match viewer_kind(viewer.unwrap_or_default()) {
            openwith::ViewerKind::Textual => "textual",
            openwith::ViewerKind::Graphical => "graphical",
            openwith::ViewerKind::PassThrough => "pass-through",
        };
        match viewer {
            Some(command) => println!("{command}\t{kind}"),
            None => println!("{kind}"),
        }
        return Ok(());
    }

    match viewer {
        Some(command) => println!("{command}"),
        None => bail!("No viewer is associated with {file:?}"),
    }
    Ok(())
}

fn cmd_viewers(file: &str, graphical: bool) -> Result<()> {
    let assocs = load_associations(graphical)?;
    let name = normalized_name(file);

    let viewers = assocs.viewers_for(&name);
    if viewers.is_empty() {
        bail!("No viewer is associated with {file:?}");
    }
    for command in viewers {
        println!("{command}");
    }
    Ok(())
}

fn cmd_list(file: &str, graphical: bool, viewers: bool) -> Result<()> {
    let assocs = load_associations(graphical)?;
    let name = normalized_name(file);

    let records = if viewers {
        assocs.all_viewers(&name)
    } else {
        assocs.all_programs(&name)
    };
    if records.is_empty() {
        eprintln!("No candidates configured for {file:?}");
        return Ok(());
    }

    for record in &records {
        let mut line = record.command.clone();
        if !record.description.is_empty() {
            line = format!("{line}\t# {}", record.description);
        }
        if record.origin == RecordOrigin::Builtin {
            line.push_str(" (builtin)");
        }
        println!("{line}");
    }
    Ok(())
}

fn cmd_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            let pretty = toml::to_string_pretty(&config)?;
            print!("{pretty}");
        }
        ConfigAction::Path => {
            let path = Config::path()?;
            println!("{}", path.display());
        }
        ConfigAction::Init => {
            let path = Config::path()?;
            if path.exists() {
                bail!("Config already exists at {}", path.display());
            }
            let config = Config::sample();
            config.save()?;
            println!("Wrote sample config to {}", path.display());
        }
    }
    Ok(())
}

/// Whether a graphical session is reachable from this process.
fn graphical_environment() -> bool {
    let set = |var: &str| std::env::var_os(var).is_some_and(|v| !v.is_empty());
    set("DISPLAY") || set("WAYLAND_DISPLAY")
}
