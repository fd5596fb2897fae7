//! Writes the HTTP API description as pretty-printed JSON.
//!
//! Usage:
//!   cargo run --bin generate_openapi > openapi.json
//!   cargo run --bin generate_openapi -- --output openapi.json

use std::{
    env, fs,
    io::{self, Write},
    path::PathBuf,
    process,
};

use fridge_monitor::api::handlers::ApiDoc;
use utoipa::OpenApi;

fn output_path(args: &[String]) -> Option<PathBuf> {
    args.windows(2)
        .find(|w| w[0] == "--output")
        .map(|w| PathBuf::from(&w[1]))
}

fn main() {
    let json = match ApiDoc::openapi().to_pretty_json() {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Failed to serialise OpenAPI document: {e}");
            process::exit(1);
        }
    };

    let args: Vec<String> = env::args().collect();
    let written = match output_path(&args) {
        Some(path) => fs::write(&path, &json).map(|()| {
            eprintln!("OpenAPI document written to {}", path.display());
        }),
        None => io::stdout().write_all(json.as_bytes()),
    };

    if let Err(e) = written {
        eprintln!("Failed to write OpenAPI document: {e}");
        process::exit(1);
    }
}
