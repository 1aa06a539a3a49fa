//! hconfig command-line tool for validating and transcoding hconfig documents.
//!
//! Usage: hconfig [OPTIONS] [FILE]
//!
//! Reads FILE (or stdin when FILE is absent or `-`), decodes it from the
//! `--from` format, and writes it in the `--to` format. hconfig input is read
//! as an implicit root object unless `--root-value` is given, or as a conf
//! document with `--conf` / `--schema`.

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use hconfig::{encode, Format, ParseOptions, RootMode, Schema, Value};
use log::LevelFilter;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

mod transcode;

#[derive(Parser, Debug)]
#[command(name = "hconfig", version, about = "hconfig validator and transcoder")]
struct Cli {
    /// Input file. Omit or use '-' to read from stdin.
    input: Option<PathBuf>,

    /// Input format.
    #[arg(short, long, value_enum, value_name = "FORMAT", default_value_t = DataFormat::Hcnf)]
    from: DataFormat,

    /// Output format.
    #[arg(short, long, value_enum, value_name = "FORMAT", default_value_t = DataFormat::Json)]
    to: DataFormat,

    /// Parse the hconfig root as a single value instead of `key value` pairs.
    #[arg(short, long, conflicts_with = "conf")]
    root_value: bool,

    /// Parse hconfig input in conf mode, grouping repeated sections.
    #[arg(short, long)]
    conf: bool,

    /// Schema file (hconfig text) for conf mode. Implies --conf.
    #[arg(short, long, value_name = "FILE", conflicts_with = "root_value")]
    schema: Option<PathBuf>,

    /// Write output to FILE.
    #[arg(short, long, value_name = "FILE", conflicts_with = "write")]
    output: Option<PathBuf>,

    /// Write output next to the input file, with the output format's extension.
    #[arg(short, long)]
    write: bool,

    /// Only validate the input; prints "ok" on success.
    #[arg(long)]
    check: bool,

    /// Raise the log level (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum DataFormat {
    Hcnf,
    Json,
    #[value(alias = "yml")]
    Yaml,
    Toml,
    Cbor,
}

impl DataFormat {
    fn extension(self) -> &'static str {
        match self {
            DataFormat::Hcnf => "hcnf",
            DataFormat::Json => "json",
            DataFormat::Yaml => "yaml",
            DataFormat::Toml => "toml",
            DataFormat::Cbor => "cbor",
        }
    }
}

/// Encoded document, ready to be written.
enum Output {
    Text(String),
    Binary(Vec<u8>),
}

impl Output {
    fn as_bytes(&self) -> &[u8] {
        match self {
            Output::Text(s) => s.as_bytes(),
            Output::Binary(b) => b,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(&cli) {
        eprintln!("Error: {:#}", err);
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let input_path = cli.input.as_deref().filter(|p| *p != Path::new("-"));
    let conf_mode = cli.conf || cli.schema.is_some();

    if cli.from != DataFormat::Hcnf && (conf_mode || cli.root_value) {
        bail!("--conf, --schema and --root-value only apply to hcnf input");
    }

    let raw = read_input(input_path)?;
    let value = decode_input(cli, &raw, input_path, conf_mode)?;

    if cli.check {
        println!("ok");
        return Ok(());
    }

    let output = encode_output(&value, cli.to)?;
    write_output(cli, &output, input_path)
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => fs::read(path).with_context(|| format!("cannot read {}", path.display())),
        None => {
            let mut buffer = Vec::new();
            io::stdin()
                .read_to_end(&mut buffer)
                .context("cannot read stdin")?;
            Ok(buffer)
        }
    }
}

fn decode_input(cli: &Cli, raw: &[u8], input_path: Option<&Path>, conf_mode: bool) -> Result<Value> {
    log::info!("decoding {:?} input", cli.from);
    match cli.from {
        DataFormat::Hcnf => decode_hcnf(cli, utf8(raw)?, input_path, conf_mode),
        DataFormat::Json => transcode::json::decode(utf8(raw)?),
        DataFormat::Yaml => transcode::yaml::decode(utf8(raw)?),
        DataFormat::Toml => transcode::toml::decode(utf8(raw)?),
        DataFormat::Cbor => transcode::cbor::decode(raw),
    }
}

fn utf8(raw: &[u8]) -> Result<&str> {
    std::str::from_utf8(raw).context("input is not valid UTF-8")
}

fn decode_hcnf(cli: &Cli, text: &str, input_path: Option<&Path>, conf_mode: bool) -> Result<Value> {
    let filename = input_path.map(|p| p.display().to_string());
    let mut options = ParseOptions::new();
    if let Some(name) = filename.as_deref() {
        options = options.with_filename(name);
    }

    if conf_mode {
        let schema = cli.schema.as_deref().map(load_schema).transpose()?;
        let conf = hconfig::parse_conf_with(text, schema.as_ref(), &options)?;
        Ok(Value::Object(conf))
    } else {
        let mode = RootMode::from_root_is_value(cli.root_value);
        Ok(hconfig::parse_value_with(text, mode, &options)?)
    }
}

fn load_schema(path: &Path) -> Result<Schema> {
    let text =
        fs::read_to_string(path).with_context(|| format!("cannot read schema {}", path.display()))?;
    Schema::parse(&text).with_context(|| format!("in schema {}", path.display()))
}

fn encode_output(value: &Value, format: DataFormat) -> Result<Output> {
    log::info!("encoding {:?} output", format);
    let output = match format {
        DataFormat::Hcnf => Output::Text(encode(value, Format::Hcnf)?),
        DataFormat::Json => Output::Text(encode(value, Format::Json)?),
        DataFormat::Yaml => Output::Text(transcode::yaml::encode(value)?),
        DataFormat::Toml => Output::Text(transcode::toml::encode(value)?),
        DataFormat::Cbor => Output::Binary(transcode::cbor::encode(value)),
    };
    Ok(output)
}

fn write_output(cli: &Cli, output: &Output, input_path: Option<&Path>) -> Result<()> {
    let target = if let Some(path) = &cli.output {
        Some(path.clone())
    } else if cli.write {
        let Some(input_path) = input_path else {
            bail!("--write requires an input file");
        };
        Some(input_path.with_extension(cli.to.extension()))
    } else {
        None
    };

    let bytes = with_newline(output);
    match target {
        Some(path) => {
            log::info!("writing {}", path.display());
            fs::write(&path, bytes).with_context(|| format!("cannot write {}", path.display()))
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(&bytes).context("cannot write to stdout")
        }
    }
}

/// Text output always ends with a newline; binary output is left untouched.
fn with_newline(output: &Output) -> Vec<u8> {
    let mut bytes = output.as_bytes().to_vec();
    if matches!(output, Output::Text(_)) && !bytes.ends_with(b"\n") {
        bytes.push(b'\n');
    }
    bytes
}
