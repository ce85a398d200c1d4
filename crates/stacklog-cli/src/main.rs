use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use stacklog::{Annotations, Events, LineBuffer, SCHEMA_VERSION, StackEvent};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::fs;

#[derive(Parser)]
#[command(name = "stacklog")]
#[command(about = "Reconstruct undo/redo events from an edit-stack log", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an edit-stack log and print one line per event
    Parse {
        /// Path to the log file, or `-` for stdin
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// After the events, print the log with correlated records written back
        #[arg(long)]
        annotations: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Serialize)]
struct Report<'a> {
    schema_version: &'a str,
    events: Vec<StackEvent>,
    annotations: Annotations,
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .context("failed to read stdin")?;
        Ok(content)
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Parse {
            path,
            format,
            annotations,
        } => {
            let content = read_input(path)?;
            let mut buffer = LineBuffer::from_text(&content);
            log::debug!("read {} lines from {}", buffer.len(), path.display());

            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            let mut events = Events::new(buffer.texts());
            let mut collected = Vec::new();

            for event in events.by_ref() {
                let event = event.with_context(|| format!("while parsing {}", path.display()))?;
                match format {
                    Format::Text => writeln!(out, "{}", event.edit)?,
                    Format::Json => collected.push(event),
                }
            }
            let notes = events.into_annotations();

            match format {
                Format::Text => {
                    if *annotations {
                        notes.apply(&mut buffer);
                        for line in buffer.lines() {
                            write!(out, "{}", line.text)?;
                            if !line.text.ends_with('\n') {
                                writeln!(out)?;
                            }
                        }
                    }
                }
                Format::Json => {
                    let report = Report {
                        schema_version: SCHEMA_VERSION,
                        events: collected,
                        annotations: notes,
                    };
                    writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
                }
            }
            out.flush()?;
        }
    }
    Ok(())
}
