//! avflow CLI
//!
//! Usage:
//!   avflow convert [FILE]                 Wiring description to ELK layout input
//!   avflow validate [FILE]                Check a wiring description
//!   avflow route [FILE] [--config FILE]   Route a laid-out graph, print JSON
//!   avflow render [FILE] [OPTIONS]        Route and render a laid-out graph to SVG
//!
//! Every command reads stdin when no file is given.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use avflow::{
    parse_json, render_with_config, route_layout, wiring, RenderConfig, RenderError,
    RoutingConfig, Stylesheet, WiringGraph,
};

#[derive(Parser)]
#[command(name = "avflow")]
#[command(about = "Wiring diagrams for AV installations with obstacle-aware cable routing")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a wiring description to ELK JSON layout input
    Convert(InputArgs),
    /// Validate a wiring description and list every problem
    Validate(InputArgs),
    /// Route the edges of a laid-out ELK JSON graph and print them as JSON
    Route {
        #[command(flatten)]
        input: InputArgs,

        /// Routing configuration (TOML, `[routing]` table)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Render a laid-out ELK JSON graph to SVG
    Render {
        #[command(flatten)]
        input: InputArgs,

        /// Stylesheet file for category and status colors (TOML format)
        #[arg(short, long)]
        stylesheet: Option<PathBuf>,

        /// Routing configuration (TOML, `[routing]` table)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Draw obstacles and port extensions, and log routing decisions
        #[arg(short, long)]
        debug: bool,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Input file (reads from stdin if not provided)
    input: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let debug = matches!(cli.command, Command::Render { debug: true, .. });
    init_tracing(debug);

    match cli.command {
        Command::Convert(args) => {
            let (source, name) = read_input(&args);
            match avflow::convert_wiring(&source) {
                Ok(graph) => print_json(&graph),
                Err(e) => fail(&e, &source, &name),
            }
        }
        Command::Validate(args) => {
            let (source, name) = read_input(&args);
            let graph: WiringGraph = match parse_json(&source) {
                Ok(graph) => graph,
                Err(e) => fail(&RenderError::Input(e), &source, &name),
            };
            match wiring::validate(&graph) {
                Ok(()) => println!("{name}: ok"),
                Err(errors) => {
                    for error in &errors {
                        println!("{name}{error}");
                    }
                    eprintln!("{} problem(s) found", errors.len());
                    process::exit(1);
                }
            }
        }
        Command::Route { input, config } => {
            let routing = load_routing(config.as_deref());
            let (source, name) = read_input(&input);
            match route_layout(&source, &routing) {
                Ok(report) => print_json(&report),
                Err(e) => fail(&e, &source, &name),
            }
        }
        Command::Render {
            input,
            stylesheet,
            config,
            debug,
        } => {
            let stylesheet = match &stylesheet {
                Some(path) => Stylesheet::from_file(path).unwrap_or_else(|e| {
                    eprintln!("Error loading stylesheet '{}': {}", path.display(), e);
                    process::exit(1);
                }),
                None => Stylesheet::default(),
            };
            let render_config = RenderConfig::new()
                .with_routing(load_routing(config.as_deref()))
                .with_stylesheet(stylesheet)
                .with_debug(debug);

            let (source, name) = read_input(&input);
            match render_with_config(&source, &render_config) {
                Ok(svg) => println!("{svg}"),
                Err(e) => fail(&e, &source, &name),
            }
        }
    }
}

/// Log to stderr; `AVFLOW_LOG` overrides the default level
fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("AVFLOW_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Read the input document and a display name for error reports
fn read_input(args: &InputArgs) -> (String, String) {
    match &args.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => (buffer, "<stdin>".to_string()),
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    process::exit(1);
                }
            }
        }
    }
}

fn load_routing(path: Option<&Path>) -> RoutingConfig {
    match path {
        Some(path) => RoutingConfig::from_file(path).unwrap_or_else(|e| {
            eprintln!("Error loading config '{}': {}", path.display(), e);
            process::exit(1);
        }),
        None => RoutingConfig::default(),
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn fail(error: &RenderError, source: &str, name: &str) -> ! {
    match error {
        RenderError::Input(e) => eprint!("{}", e.format(source, name)),
        RenderError::Wiring(errors) => {
            for e in errors {
                eprintln!("{name}{e}");
            }
        }
        other => eprintln!("Error: {}", other),
    }
    process::exit(1);
}
