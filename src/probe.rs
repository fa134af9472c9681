//! Purpose: Implement `coding probe`: decode one value from a document and re-encode it.
//! Exports: `ProbeArgs`, `run`.
//! Role: Thin CLI over the decode/encode drivers; builds decodings from flags.
//! Invariants: Output is always `{"value": ...}`; an absent optional prints `{"value": null}`.
//! Invariants: Flag combinations are validated before any input is read.

use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Args, ValueEnum, ValueHint};
use coding::api::{Decoding, Encoding, Error, ErrorKind, JsonFormat, decode_with, encode_with};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

#[derive(Args, Debug)]
pub struct ProbeArgs {
    #[arg(long, short = 'f', help = "Read the document from a file instead of stdin", value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,
    #[arg(long, value_enum, default_value = "single", help = "How to reach the value")]
    access: Access,
    #[arg(long, help = "Field name (required with --access key)")]
    key: Option<String>,
    #[arg(long = "as", value_enum, default_value = "value", help = "Type to decode as")]
    kind: ValueKind,
    #[arg(long, help = "Treat absent or null as no value instead of an error")]
    optional: bool,
    #[arg(long, value_name = "JSON", help = "Value to use when the optional value is absent")]
    default: Option<String>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Access {
    Single,
    Unkeyed,
    Key,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum ValueKind {
    Bool,
    Int,
    Uint,
    Float,
    String,
    Value,
}

pub fn run(args: &ProbeArgs, pretty: bool) -> Result<Vec<u8>, Error> {
    validate_args(args)?;
    let document = read_input(args)?;
    let format = JsonFormat::new().with_pretty(pretty);
    debug!(access = ?args.access, kind = ?args.kind, "probing document");
    match args.kind {
        ValueKind::Bool => probe::<bool>(args, &format, &document),
        ValueKind::Int => probe::<i64>(args, &format, &document),
        ValueKind::Uint => probe::<u64>(args, &format, &document),
        ValueKind::Float => probe::<f64>(args, &format, &document),
        ValueKind::String => probe::<String>(args, &format, &document),
        ValueKind::Value => probe::<Value>(args, &format, &document),
    }
}

fn validate_args(args: &ProbeArgs) -> Result<(), Error> {
    match (args.access, args.key.is_some()) {
        (Access::Key, false) => {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("--access key requires --key")
                .with_hint("Pass the field name, e.g. `--key value`."));
        }
        (Access::Single | Access::Unkeyed, true) => {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("--key is only valid with --access key"));
        }
        _ => {}
    }
    if args.default.is_some() && !args.optional {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("--default requires --optional")
            .with_hint("A default only applies when the value may be absent."));
    }
    Ok(())
}

fn read_input(args: &ProbeArgs) -> Result<Vec<u8>, Error> {
    match &args.input {
        Some(path) => std::fs::read(path).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message(format!("failed to read {}", path.display()))
                .with_source(err)
        }),
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to read stdin")
                    .with_source(err)
            })?;
            Ok(buf)
        }
    }
}

fn probe<T>(args: &ProbeArgs, format: &JsonFormat, document: &[u8]) -> Result<Vec<u8>, Error>
where
    T: DeserializeOwned + Serialize + Clone + Send + Sync + 'static,
{
    let decoding = probe_decoding::<T>(args)?;
    let decoded = decode_with(format, document, &decoding)?;
    let encoding = match decoded {
        Some(_) => Encoding::<T>::with_key("value").optional(),
        None => Encoding::null_value_with_key("value"),
    };
    encode_with(format, &decoded, &encoding)
}

fn probe_decoding<T>(args: &ProbeArgs) -> Result<Decoding<Option<T>>, Error>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    let key = args.key.clone().unwrap_or_default();
    let decoding = match (args.access, args.optional) {
        (Access::Single, false) => Decoding::<T>::single_value().map(Some),
        (Access::Single, true) => Decoding::<Option<T>>::single_value(),
        (Access::Unkeyed, false) => Decoding::<T>::unkeyed().map(Some),
        (Access::Unkeyed, true) => Decoding::<T>::optional_unkeyed(),
        (Access::Key, false) => Decoding::<T>::with_key(key).map(Some),
        (Access::Key, true) => Decoding::<T>::optional_with_key(key),
    };
    let Some(raw) = args.default.as_deref() else {
        return Ok(decoding);
    };
    let default: T = serde_json::from_str(raw).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("--default is not a valid value for --as")
            .with_hint("Pass JSON matching the requested type, e.g. `--default 0` or `--default '\"x\"'`.")
            .with_source(err)
    })?;
    Ok(decoding.replace_nil(default).map(Some))
}
