//! Template Directives CLI
//!
//! Usage:
//!   tdc [OPTIONS] [FILE]
//!
//! Options:
//!   -c, --config <FILE>       Compile options (TOML, `[compile]` table)
//!       --light               Light rendering mode (rejects `ref` on `<slot>`)
//!       --preserve-comments   Treat comments as significant everywhere
//!       --json                Print the compiled template as JSON
//!       --assume <EXPR=BOOL>  Simulate a render pass and print the ref binding
//!   -v, --verbose             Debug logging on stderr
//!   -h, --help                Print help

use std::collections::HashMap;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use template_directives::{
    compile_source, outline, CompileOptions, LiveRefBinding, RenderedNode,
};

#[derive(Parser)]
#[command(name = "tdc")]
#[command(about = "Compile conditional and ref directives in HTML-like templates")]
struct Cli {
    /// Input file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Compile options file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Light rendering mode: `ref` on `<slot>` is an error
    #[arg(long)]
    light: bool,

    /// Comments are significant in every scope
    #[arg(long)]
    preserve_comments: bool,

    /// Print the compiled template as JSON instead of an outline
    #[arg(long)]
    json: bool,

    /// Expression truth value for a simulated render pass (repeatable)
    #[arg(long, value_name = "EXPR=BOOL", value_parser = parse_assumption)]
    assume: Vec<(String, bool)>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_assumption(raw: &str) -> Result<(String, bool), String> {
    let (expr, value) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected EXPR=BOOL, got '{}'", raw))?;
    let value = match value.trim() {
        "true" | "1" => true,
        "false" | "0" => false,
        other => return Err(format!("'{}' is not a boolean", other)),
    };
    Ok((expr.trim().to_string(), value))
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    // Load options, then let flags override
    let mut options = match &cli.config {
        Some(path) => match CompileOptions::from_file(path) {
            Ok(options) => options,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => CompileOptions::default(),
    };
    if cli.light {
        options.light_mode = true;
    }
    if cli.preserve_comments {
        options.preserve_comments = true;
    }

    // Read input
    let (source, filename) = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => (buffer, "<stdin>".to_string()),
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let compiled = match compile_source(&source, &options) {
        Ok(compiled) => compiled,
        Err(e) => {
            eprintln!("{}", e.format(&source, &filename));
            std::process::exit(1);
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&compiled) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing compiled template: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        print!("{}", outline::render(&compiled));
    }

    if !cli.assume.is_empty() {
        let truths: HashMap<String, bool> = cli.assume.into_iter().collect();
        let rendered = compiled
            .materialize(|expr| truths.get(expr.as_str()).copied().unwrap_or(false))
            .into_iter()
            .map(|id| RenderedNode::new(id, ()));
        let binding = LiveRefBinding::from_render(&compiled, rendered);
        println!("live refs");
        for line in outline::render_binding(binding.refs()).lines() {
            println!("  {}", line);
        }
    }
}
