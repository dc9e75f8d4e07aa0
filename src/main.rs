use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use obpath::Context;
use serde_json::Value;
use tracing::debug;

/// Evaluate a path expression against a JSON document.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path expression, e.g. ".store.book[:-2].title"
    path: String,
    /// Read the document from a file instead of stdin
    #[arg(long)]
    file: Option<PathBuf>,
    /// Write one match per line instead of a single array
    #[arg(long)]
    stream: bool,
    /// Pretty-print the output
    #[arg(long)]
    indent: bool,
}

fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut context = Context::with_builtins();
    context.allow_descendants = true;

    let path = match obpath::compile(&args.path, &context) {
        Ok(path) => path,
        Err(err) => {
            eprintln!("Error: {err}");
            process::exit(1);
        }
    };

    let json = match read_document(args.file.as_deref()) {
        Ok(json) => json,
        Err(err) => {
            eprintln!("Error: {err}");
            process::exit(1);
        }
    };
    let document: Value = match serde_json::from_str(&json) {
        Ok(value) => value,
        Err(err) => {
            eprintln!("Error: invalid JSON: {err}");
            process::exit(1);
        }
    };

    let matches = path.matches(&document);
    debug!(count = matches.len(), "evaluated path");

    if args.stream {
        for item in &matches {
            println!("{}", serde_json::to_string(item).unwrap());
        }
    } else if args.indent {
        println!("{}", serde_json::to_string_pretty(&matches).unwrap());
    } else {
        println!("{}", serde_json::to_string(&matches).unwrap());
    }
}

fn read_document(file: Option<&std::path::Path>) -> io::Result<String> {
    match file {
        Some(file) => fs::read_to_string(file),
        None => {
            let mut json = String::new();
            io::stdin().read_to_string(&mut json)?;
            Ok(json)
        }
    }
}
