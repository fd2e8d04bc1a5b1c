//! treesh: evaluate command trees.
//!
//! Reads a stream of JSON command trees from stdin and evaluates them in
//! order in this process, so `cd` and assignments carry over from one tree
//! to the next. Stops at the first `exit`/`quit`.
//!
//! See `treesh --help` for flags.

use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::Parser;
use treesh::config::Config;
use treesh::error::{self, ShellError};
use treesh::eval::{Shell, Status};
use treesh::logging;
use treesh::parse::{self, Command};

/// Exit code for an unreadable config or malformed input. clap uses the same
/// code for bad flags.
const USAGE_EXIT: i32 = 2;

#[derive(Parser, Debug)]
#[command(version, about = "Evaluate command trees read as JSON from stdin", long_about = None)]
struct Cli {
    /// Evaluate one simple command instead of reading stdin.
    #[arg(long, value_name = "LINE")]
    command: Option<String>,

    /// Overlay this file instead of ~/.config/treesh/config.toml.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the merged configuration as TOML and exit.
    #[arg(long)]
    dump_config: bool,
}

fn exit(code: i32) -> ! {
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();
    std::process::exit(code)
}

/// Evaluate trees in order until one asks the shell to stop.
fn run_all(
    shell: &Shell,
    trees: impl IntoIterator<Item = Result<Command, String>>,
) -> Result<Status, ShellError> {
    let mut last = Status::SUCCESS;
    for tree in trees {
        let tree = match tree {
            Ok(tree) => tree,
            Err(e) => {
                eprintln!("treesh: {e}");
                exit(USAGE_EXIT);
            }
        };
        last = shell.run(&tree)?;
        if last.is_terminate() {
            log::info!("terminate requested, stopping");
            break;
        }
    }
    Ok(last)
}

fn main() {
    let args = Cli::parse();

    let config = match &args.config {
        Some(path) => match Config::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("treesh: {e}");
                exit(USAGE_EXIT);
            }
        },
        None => Config::load(),
    };

    if args.dump_config {
        match config.to_toml() {
            Ok(text) => print!("{text}"),
            Err(e) => {
                eprintln!("treesh: {e}");
                exit(1);
            }
        }
        exit(0);
    }

    logging::init(&config.logging);
    let shell = Shell::from_config(&config);

    let result = match &args.command {
        Some(line) => match parse::leaf(line) {
            Ok(tree) => run_all(&shell, [Ok(tree)]),
            Err(e) => {
                error::report(&e);
                exit(USAGE_EXIT);
            }
        },
        None => {
            let mut input = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut input) {
                eprintln!("treesh: failed to read stdin: {e}");
                exit(1);
            }
            let trees = serde_json::Deserializer::from_str(&input)
                .into_iter::<Command>()
                .map(|tree| tree.map_err(|e| format!("invalid command tree: {e}")));
            run_all(&shell, trees)
        }
    };

    match result {
        Ok(Status::Terminate) => exit(0),
        Ok(status) => exit(status.exit_code()),
        Err(e) => {
            error::report(&e);
            exit(1);
        }
    }
}
