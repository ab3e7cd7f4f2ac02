//! Resolve a dotted attribute path against an account document.
//!
//! cargo run --example account -- --path products.EndpointSecure.maxDevices
//! RUST_LOG=attr_osi=trace cargo run --example account -- --input account.json --path owner
use std::path::PathBuf;

use anyhow::{Context, Result};
use attr_osi::{AttrDict, Class, Fields, Record, Ty, Value};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// look up a field of an account document through typed attribute access
#[derive(Parser, Debug)]
struct Args {
    /// JSON account document (a built-in sample if omitted)
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// dotted attribute path, e.g. products.EndpointSecure.maxDevices
    #[arg(long, short, default_value = "products.EndpointSecure.maxDevices")]
    path: String,
}

struct Product;

impl Record for Product {
    const NAME: &'static str = "Product";
    fn declare(fields: &mut Fields) {
        fields
            .field("maxDevices", Ty::int())
            .field("provisioned", Ty::optional(Ty::bool()));
    }
}

struct Account;

impl Record for Account {
    const NAME: &'static str = "Account";
    fn declare(fields: &mut Fields) {
        fields
            .field("products", Ty::map_of(Ty::record::<Product>()))
            .field("owner", Ty::optional(Ty::str()));
    }
}

fn sample() -> serde_json::Value {
    serde_json::json!({
        "products": {
            "EndpointSecure": {"maxDevices": 5},
            "NetworkSecure": {"maxDevices": 2, "provisioned": true}
        }
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let document = match &args.input {
        None => sample(),
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&source)
                .with_context(|| format!("failed to parse JSON in {}", path.display()))?
        }
    };

    let mut account = AttrDict::from_json(Class::of::<Account>(), document)?;
    let value = account.lookup(&args.path)?;
    match value {
        Value::Dict(dict) => println!("{dict}"),
        other => println!("{}", serde_json::to_string_pretty(other)?),
    }
    Ok(())
}
