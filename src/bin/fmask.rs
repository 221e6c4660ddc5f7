//! fmask - Field mask CLI tool
//!
//! A command line tool for normalizing, combining and inspecting field masks,
//! and for computing full update reset masks of YAML/JSON objects.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use fieldmask::schema::{Schema, TypedMessage};
use fieldmask::{full_update_reset_mask, FieldPath, Mask};

#[derive(Parser, Debug)]
#[command(name = "fmask", author, version, about, long_about = None)]
struct Cli {
    /// Output location. Use '-' for stdout
    #[arg(short, long, global = true, default_value = "-")]
    output: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a mask in canonical form
    Normalize { mask: String },
    /// Print the union of masks
    Merge {
        #[arg(required = true)]
        masks: Vec<String>,
    },
    /// Print the intersection of two masks
    Intersect {
        /// Match wildcards only against wildcards
        #[arg(long)]
        dumb: bool,
        a: String,
        b: String,
    },
    /// Print the first mask without the second one
    Subtract {
        /// Match wildcards only against wildcards
        #[arg(long)]
        dumb: bool,
        a: String,
        b: String,
    },
    /// Check whether a field path is covered by a mask
    Match {
        #[arg(short, long)]
        mask: String,
        /// Treat the mask as a select mask instead of a reset mask
        #[arg(long)]
        select: bool,
        path: String,
    },
    /// Print a mask as a YAML tree
    Tree { mask: String },
    /// Print the full update reset mask of a YAML/JSON object
    ResetMask {
        /// Path to the schema file
        #[arg(short, long)]
        schema: PathBuf,
        /// Name of the message type in the schema to use
        #[arg(short, long)]
        type_name: Option<String>,
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_filter(EnvFilter::from_default_env()),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    debug!(command = ?cli.command, "running");

    let mut output: Box<dyn Write> = if cli.output == "-" {
        Box::new(io::stdout())
    } else {
        Box::new(
            fs::File::create(&cli.output)
                .map_err(|e| format!("Failed to create output file {:?}: {}", cli.output, e))?,
        )
    };

    match cli.command {
        Command::Normalize { mask } => {
            writeln!(output, "{}", parse_mask(&mask)?)?;
        }
        Command::Merge { masks } => {
            let mut merged = Mask::new();
            for mask in &masks {
                merged += parse_mask(mask)?;
            }
            writeln!(output, "{}", merged)?;
        }
        Command::Intersect { dumb, a, b } => {
            let (a, b) = (parse_mask(&a)?, parse_mask(&b)?);
            let result = if dumb { &a * &b } else { &a & &b };
            writeln!(output, "{}", result)?;
        }
        Command::Subtract { dumb, a, b } => {
            let (a, b) = (parse_mask(&a)?, parse_mask(&b)?);
            let result = if dumb { &a / &b } else { &a - &b };
            writeln!(output, "{}", result)?;
        }
        Command::Match { mask, select, path } => {
            let mask = parse_mask(&mask)?;
            let path = FieldPath::unmarshal(&path)
                .map_err(|e| format!("Failed to parse path: {}", e))?
                .unwrap_or_default();
            match_path(&mask, &path, select, &mut output)?;
        }
        Command::Tree { mask } => {
            let tree = parse_mask(&mask)?.to_json_value();
            write!(output, "{}", serde_yaml::to_string(&tree)?)?;
        }
        Command::ResetMask {
            schema,
            type_name,
            file,
        } => {
            reset_mask(&schema, type_name, &file, &mut output)?;
        }
    }

    Ok(())
}

fn parse_mask(text: &str) -> Result<Mask, String> {
    Mask::unmarshal(text).map_err(|e| format!("Failed to parse mask: {}", e))
}

fn match_path(
    mask: &Mask,
    path: &FieldPath,
    select: bool,
    output: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    if select {
        let (has_match, is_inner) = path.matches_select_mask_inner(Some(mask));
        writeln!(output, "selected: {}", has_match)?;
        writeln!(output, "inner: {}", is_inner)?;
    } else {
        writeln!(output, "reset: {}", path.matches_reset_mask(Some(mask)))?;
        writeln!(output, "final: {}", path.matches_reset_mask_final(Some(mask)))?;
    }
    Ok(())
}

fn reset_mask(
    schema_file: &Path,
    type_name: Option<String>,
    file: &Path,
    output: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let schema_content = fs::read_to_string(schema_file)
        .map_err(|e| format!("Failed to read schema file {:?}: {}", schema_file, e))?;
    let schema = Schema::from_yaml(&schema_content)?;

    // Determine type name
    let type_name = type_name
        .or_else(|| schema.message_names().first().map(|s| s.to_string()))
        .ok_or("No message types found in schema")?;

    let content = fs::read_to_string(file)
        .map_err(|e| format!("Failed to read file {:?}: {}", file, e))?;
    let value: serde_json::Value = serde_yaml::from_str(&content)
        .map_err(|e| format!("Failed to parse file: {}", e))?;

    let message = TypedMessage::new(&schema, &type_name, &value)?;
    writeln!(output, "{}", full_update_reset_mask(&message))?;
    Ok(())
}
