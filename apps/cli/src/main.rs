//! Convert FHIR resources between the host object graph and wire messages
//!
//! Both representations are read and written as JSON (the serde form of
//! `ferrum_models::HostComposite` and `ferrum_models::WireMessage`).
//!
//! Usage:
//!   ferrum-bridge to-wire patient.host.json > patient.wire.json
//!   ferrum-bridge to-host patient.wire.json
//!   ferrum-bridge codes http://hl7.org/fhir/ValueSet/quantity-comparator
//!   ferrum-bridge schema Observation

mod logging;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ferrum_bridge::{Converter, ConverterConfig};
use ferrum_models::{HostComposite, WireMessage};
use serde_json::{json, Value};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

use logging::LogFormat;

#[derive(Parser, Debug)]
#[command(name = "ferrum-bridge", version)]
#[command(about = "Convert FHIR resources between host and wire representations")]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[arg(long, global = true, value_enum, default_value = "compact")]
    log_format: LogFormat,

    /// Converter configuration (.yaml, .yml or .json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Host JSON -> wire JSON
    ToWire {
        /// Input file, `-` for stdin
        #[arg(default_value = "-")]
        input: PathBuf,
        #[arg(long)]
        pretty: bool,
    },
    /// Wire JSON -> host JSON
    ToHost {
        /// Input file, `-` for stdin
        #[arg(default_value = "-")]
        input: PathBuf,
        #[arg(long)]
        pretty: bool,
    },
    /// List code tables, or the rows of one table
    Codes {
        /// Value set canonical URL
        value_set: Option<String>,
    },
    /// Show the conversion schema of a type
    Schema {
        /// Host type name (e.g., Patient, Observation.ComponentComponent)
        type_name: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level, cli.log_format)?;
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let converter = load_converter(cli.config.as_deref())?;

    let output = match cli.command {
        Command::ToWire { input, pretty } => {
            let text = read_input(&input)?;
            render(&to_wire_json(&converter, &text)?, pretty)?
        }
        Command::ToHost { input, pretty } => {
            let text = read_input(&input)?;
            render(&to_host_json(&converter, &text)?, pretty)?
        }
        Command::Codes { value_set } => render(&codes_json(&converter, value_set.as_deref())?, true)?,
        Command::Schema { type_name } => render(&schema_json(&converter, &type_name)?, true)?,
    };
    println!("{output}");
    Ok(())
}

fn load_converter(config: Option<&Path>) -> Result<Converter> {
    match config {
        Some(path) => {
            let config = ConverterConfig::from_path(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?;
            info!(path = %path.display(), "configuration loaded");
            Converter::r4_with_config(config).context("building converter")
        }
        None => Ok(Converter::r4()),
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }
}

fn render(value: &Value, pretty: bool) -> Result<String> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}

fn to_wire_json(converter: &Converter, text: &str) -> Result<Value> {
    let resource: HostComposite = serde_json::from_str(text).context("parsing host resource")?;
    let wire = converter
        .to_target(&resource)
        .with_context(|| format!("converting {} to wire", resource.type_name))?;
    Ok(serde_json::to_value(wire)?)
}

fn to_host_json(converter: &Converter, text: &str) -> Result<Value> {
    let message: WireMessage = serde_json::from_str(text).context("parsing wire message")?;
    let resource = converter
        .to_source(&message)
        .with_context(|| format!("converting {} to host", message.type_name))?;
    Ok(serde_json::to_value(resource)?)
}

fn codes_json(converter: &Converter, value_set: Option<&str>) -> Result<Value> {
    let codes = converter.codes();
    match value_set {
        None => Ok(Value::Array(
            codes
                .tables()
                .into_iter()
                .map(|t| json!({ "url": t.url(), "name": t.name(), "codes": t.len() }))
                .collect(),
        )),
        Some(url) => {
            let table = codes.table(url)?;
            Ok(Value::Array(
                table
                    .entries()
                    .iter()
                    .map(|e| json!({ "code": e.code, "wire": e.wire, "host": e.host }))
                    .collect(),
            ))
        }
    }
}

fn schema_json(converter: &Converter, type_name: &str) -> Result<Value> {
    let schemas = converter.schemas();
    let Some(type_def) = schemas
        .get(type_name)
        .or_else(|| schemas.get_by_wire_name(type_name))
    else {
        bail!("no schema for type '{type_name}'");
    };
    Ok(serde_json::to_value(type_def)?)
}
