use clap::{Args, Parser, Subcommand};
use sagflow::prelude::*;
use std::fs;
use std::io::{self, Read};

/// Convert SAG agent workflows between source text and editor graphs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse SAG text and print the extracted entities as JSON
    Parse(IoArgs),
    /// Parse and lay out SAG text, printing the graph JSON
    Layout(IoArgs),
    /// Generate SAG text from a graph JSON document
    Generate(IoArgs),
    /// Parse, lay out and regenerate SAG text in canonical form
    Roundtrip(IoArgs),
    /// Report diagnostics for SAG text and lint the resulting graph
    Check(IoArgs),
}

#[derive(Args, Debug)]
struct IoArgs {
    /// Input file; `-` or omitted reads standard input
    input: Option<String>,

    /// Write the result to this file instead of standard output
    #[arg(short, long)]
    output: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Parse(args) => {
            let parsed = parse(&read_input(&args));
            report(&parsed.diagnostics);
            let json = serde_json::to_string_pretty(&parsed).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to encode parse result: {}", e))
            });
            write_output(&args, &format!("{}\n", json));
        }
        Command::Layout(args) => {
            let parsed = parse(&read_input(&args));
            report(&parsed.diagnostics);
            let json = layout(&parsed)
                .to_json_pretty()
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to encode graph: {}", e)));
            write_output(&args, &format!("{}\n", json));
        }
        Command::Generate(args) => {
            let graph = WorkflowGraph::from_json(&read_input(&args))
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to load graph: {}", e)));
            report(&lint(&graph));
            write_output(&args, &generate(&graph));
        }
        Command::Roundtrip(args) => {
            let parsed = parse(&read_input(&args));
            report(&parsed.diagnostics);
            write_output(&args, &generate(&layout(&parsed)));
        }
        Command::Check(args) => {
            let parsed = parse(&read_input(&args));
            let graph = layout(&parsed);
            let diagnostics: Vec<Diagnostic> = parsed
                .diagnostics
                .into_iter()
                .chain(lint(&graph))
                .collect();

            let summary = format!(
                "{} agents, {} tools, {} events, {} diagnostics",
                parsed.agents.len(),
                parsed.tools.len(),
                parsed.events.len(),
                diagnostics.len()
            );
            let mut lines: Vec<String> = diagnostics.iter().map(ToString::to_string).collect();
            lines.push(summary);
            write_output(&args, &(lines.join("\n") + "\n"));

            if diagnostics.iter().any(Diagnostic::is_error) {
                std::process::exit(1);
            }
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();
}

fn read_input(args: &IoArgs) -> String {
    match args.input.as_deref() {
        None | Some("-") => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to read stdin: {}", e)));
            buffer
        }
        Some(path) => fs::read_to_string(path).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to read input file '{}': {}", path, e))
        }),
    }
}

fn write_output(args: &IoArgs, content: &str) {
    match &args.output {
        Some(path) => fs::write(path, content).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to write output file '{}': {}", path, e))
        }),
        None => print!("{}", content),
    }
}

/// Diagnostics go to stderr so they never mix with the command's output.
fn report(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("{}", diagnostic);
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
