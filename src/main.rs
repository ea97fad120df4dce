use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io::{self, IsTerminal, Write};

use ypath::config::{Config, OutputFormat};
use ypath::document::emit::{path_of, to_json_value, to_yaml_value};
use ypath::document::tree::NodeRef;
use ypath::file::loader::{load_yaml_file, load_yaml_from_stdin};
use ypath::ypath::execute;

/// ypath - Structural path queries over YAML documents
#[derive(Parser)]
#[command(name = "ypath")]
#[command(version)]
#[command(about = "Run a path query against a YAML document", long_about = None)]
struct Cli {
    /// Path expression, e.g. /servers/*/host
    expression: String,

    /// YAML file to query (omit or use "-" to read from stdin)
    file: Option<String>,

    /// Report aliases as aliases instead of their anchored nodes
    #[arg(long)]
    no_follow_aliases: bool,

    /// Evaluation depth limit
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,

    /// Output format for matched nodes
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Shorthand for --format json
    #[arg(long, conflicts_with = "format")]
    json: bool,

    /// Print the path of each match instead of its content
    #[arg(short, long)]
    paths: bool,

    /// Print the compiled expression tree and exit
    #[arg(long)]
    dump: bool,

    /// Read settings from this file instead of ~/.config/ypath/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<String>,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded configuration.
    fn apply(&self, config: &mut Config) {
        if self.no_follow_aliases {
            config.follow_aliases = false;
        }
        if let Some(depth) = self.max_depth {
            config.max_recursion_depth = depth;
        }
        if self.json {
            config.output_format = OutputFormat::Json;
        } else if let Some(format) = self.format {
            config.output_format = format;
        }
        if self.paths {
            config.show_paths = true;
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    cli.apply(&mut config);
    log::debug!("effective configuration: {:?}", config);

    let tree = ypath::ypath::parse(&cli.expression)
        .with_context(|| format!("Invalid path expression '{}'", cli.expression))?;

    if cli.dump {
        print!("{}", tree.dump());
        return Ok(());
    }

    let doc = match cli.file.as_deref() {
        Some("-") => load_yaml_from_stdin()?,
        Some(file_path) => load_yaml_file(file_path)?,
        None if !io::stdin().is_terminal() => load_yaml_from_stdin()?,
        None => bail!("No input: pass a YAML file or pipe a document on stdin"),
    };

    let Some(root) = doc.root() else {
        log::info!("document is empty, nothing to match");
        return Ok(());
    };

    let matches = execute(&tree, root, &config.exec_config())
        .with_context(|| format!("Failed to evaluate '{}'", cli.expression))?;
    log::debug!("{} match(es)", matches.len());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_matches(&mut out, &matches, &config)?;
    out.flush()?;

    Ok(())
}

/// Writes the matches in the configured format.
fn write_matches(out: &mut impl Write, matches: &[NodeRef<'_>], config: &Config) -> Result<()> {
    if config.show_paths {
        for node in matches {
            writeln!(out, "{}", path_of(*node))?;
        }
        return Ok(());
    }

    match config.output_format {
        OutputFormat::Json => {
            let values: Vec<_> = matches.iter().map(|node| to_json_value(*node)).collect();
            let text = serde_json::to_string_pretty(&values)?;
            writeln!(out, "{}", text)?;
        }
        OutputFormat::Yaml => {
            for node in matches {
                if matches.len() > 1 {
                    writeln!(out, "---")?;
                }
                let text = serde_yaml::to_string(&to_yaml_value(*node))?;
                write!(out, "{}", text)?;
            }
        }
    }
    Ok(())
}
