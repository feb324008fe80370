//! cts-atlas CLI: import a CTS library and look up passages.

mod reader;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use cts_atlas_config::Config;
use cts_atlas_engine::{
    ArenaStore, Library, NodeStore, ResolvedPassage, Resolver, TokenizeOptions, format_tree,
    import_library, io, tokenize,
};
use cts_atlas_syntax::{Urn, UrnComponent};

#[derive(Parser)]
#[command(name = "cts-atlas", version, about = "CTS passage addressing for text libraries")]
struct Cli {
    /// Library data directory. Falls back to `data_path` in the config file.
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file pointing at a data directory.
    Init {
        /// Library data directory to store in the config.
        data_path: PathBuf,

        /// Version URN that bare references resolve against.
        #[arg(long)]
        default_version: Option<String>,
    },

    /// Import every version in the library and print node counts.
    Import,

    /// Resolve a passage URN (or a bare reference against the default version).
    Resolve {
        urn: String,

        /// Print the resolved passage as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the node tree below a URN, or every root when none is given.
    Tree {
        urn: Option<String>,

        /// Maximum depth below the starting node.
        #[arg(long)]
        depth: Option<usize>,
    },

    /// Split the text of a passage into word and punctuation tokens.
    Tokens {
        urn: String,

        /// Keep whitespace tokens in the output.
        #[arg(long)]
        whitespace: bool,
    },

    /// Page through a version in the terminal, starting at a passage.
    Read { urn: String },
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            data_path,
            default_version,
        } => init_config(&data_path, default_version.as_deref()),
        command => run(command, cli.data),
    }
}

fn run(command: Commands, cli_data: Option<PathBuf>) -> Result<()> {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };
    let data_path = data_path_or_exit(cli_data, config.as_ref());
    let default_version = config.and_then(|c| c.default_version);

    let library = Library::resolve(&data_path)?;
    let (store, summary) = import_library::<ArenaStore>(&library)?;

    match command {
        Commands::Init { .. } | Commands::Import => {
            for version in &summary.versions {
                println!(
                    "{}  {} lines, {} nodes",
                    version.version_urn, version.lines, version.descendant_count
                );
            }
            println!("{} total nodes", summary.total_nodes);
        }
        Commands::Resolve { urn, json } => {
            let urn = passage_urn(&urn, default_version.as_deref())?;
            let passage = Resolver::new(&store).resolve_urn(&urn)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&passage)?);
            } else {
                print!("{}", render_passage(&passage));
            }
        }
        Commands::Tree { urn, depth } => match urn {
            Some(urn) => {
                let node = find_node(&store, &urn)?;
                print!("{}", format_tree(&store, node, depth));
            }
            None => {
                for root in store.roots() {
                    print!("{}", format_tree(&store, *root, depth));
                }
            }
        },
        Commands::Tokens { urn, whitespace } => {
            let urn = passage_urn(&urn, default_version.as_deref())?;
            let passage = Resolver::new(&store).resolve_urn(&urn)?;
            let options = if whitespace {
                TokenizeOptions::default()
            } else {
                TokenizeOptions::without_whitespace()
            };
            for leaf in &passage.leaves {
                let line = serde_json::json!({
                    "ref": leaf.reference,
                    "tokens": tokenize(&leaf.text, options),
                });
                println!("{}", serde_json::to_string(&line)?);
            }
        }
        Commands::Read { urn } => {
            let urn = passage_urn(&urn, default_version.as_deref())?;
            reader::run(store, &urn)?;
        }
    }

    Ok(())
}

fn init_config(data_path: &Path, default_version: Option<&str>) -> Result<()> {
    if let Some(version) = default_version {
        Urn::parse(version).with_context(|| format!("Invalid default version {version}"))?;
    }
    io::validate_data_dir(data_path)?;

    let mut config = Config::new(data_path);
    config.default_version = default_version.map(str::to_string);
    config.save()?;
    println!("Wrote {}", Config::config_path().display());
    Ok(())
}

/// The data directory from `--data`, else from the config file.
fn data_path_or_exit(cli_path: Option<PathBuf>, config: Option<&Config>) -> PathBuf {
    let config_path = Config::config_path();
    let (data_path, from_config) = match (cli_path, config) {
        (Some(path), _) => (path, false),
        (None, Some(config)) => (config.data_path.clone(), true),
        (None, None) => {
            eprintln!("Error: No data path provided and no config file found");
            eprintln!("Usage: cts-atlas --data <data-dir> <command>");
            eprintln!("Or run `cts-atlas init <data-dir>` to create {}", config_path.display());
            process::exit(1);
        }
    };

    if let Err(e) = io::validate_data_dir(&data_path) {
        let source = if from_config {
            format!(" from config file '{}'", config_path.display())
        } else {
            String::new()
        };
        eprintln!(
            "Error: Data path '{}'{} is invalid: {e}",
            data_path.display(),
            source
        );
        process::exit(1);
    }

    data_path
}

/// A full URN is used as given. Anything else is a reference into the
/// default version.
fn passage_urn(arg: &str, default_version: Option<&str>) -> Result<String> {
    if arg.starts_with("urn:") {
        return Ok(arg.to_string());
    }
    let Some(version) = default_version else {
        bail!("'{arg}' is not a URN and no default_version is configured");
    };
    let version = Urn::parse(version)?;
    let level = if version.has_exemplar() {
        UrnComponent::Exemplar
    } else {
        UrnComponent::Version
    };
    Ok(format!("{}{arg}", version.up_to(level)?))
}

/// Looks a node up by URN, with or without the trailing colon.
fn find_node<S: NodeStore>(store: &S, urn: &str) -> Result<cts_atlas_engine::NodeId> {
    store
        .get_by_urn(urn)
        .or_else(|| store.get_by_urn(&format!("{urn}:")))
        .map(|node| node.id())
        .with_context(|| format!("No node with URN {urn}"))
}

fn render_passage(passage: &ResolvedPassage) -> String {
    let mut out = format!("{}\n{}\n", passage.human_readable, passage.urn);
    for ancestor in &passage.ancestors {
        out.push_str(&format!("  {} {}\n", ancestor.kind, ancestor.reference));
    }
    out.push('\n');
    for leaf in &passage.leaves {
        out.push_str(&format!("{:>8}  {}\n", leaf.reference, leaf.text));
    }
    out.push('\n');
    for (label, window) in [("previous", &passage.previous), ("next", &passage.next)] {
        if let Some(urn) = &window.urn {
            out.push_str(&format!("{label}: {urn}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    const ILIAD: &str = "urn:cts:greekLit:tlg0012.tlg001.perseus-grc2:";

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn full_urns_pass_through() {
        let urn = format!("{ILIAD}1.1-1.7");
        assert_eq!(passage_urn(&urn, None).unwrap(), urn);
    }

    #[test]
    fn bare_reference_uses_default_version() {
        assert_eq!(
            passage_urn("1.2", Some("urn:cts:greekLit:tlg0012.tlg001.perseus-grc2")).unwrap(),
            format!("{ILIAD}1.2")
        );
    }

    #[test]
    fn bare_reference_without_default_version() {
        let err = passage_urn("1.2", None).unwrap_err();
        assert!(err.to_string().contains("no default_version"));
    }
}
