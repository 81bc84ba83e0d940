//! FIFO Paging Simulator - Main Entry Point
//!
//! Usage: fifo-paging [OPTIONS] [<frames> <pages> <reference>...]
//!
//! With positional arguments the simulation runs directly on them; without
//! any, the configuration is collected interactively (empty answers accept
//! the classroom defaults).
//!
//! Options:
//!   -d, --demo  Pause for Enter after each access (presentation pacing only)
//!   -h, --help  Print help information

use std::env;
use std::process;

use fifo_paging::io::{read_config, ConsoleReporter, SimConfig};
use fifo_paging::Simulator;

struct Args {
    config: Option<SimConfig>,
    demo: bool,
}

fn main() {
    log_init::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn print_help(program: &str) {
    eprintln!("FIFO Paging Simulator - page-fault behavior under FIFO replacement");
    eprintln!();
    eprintln!("Usage: {} [OPTIONS] [<frames> <pages> <reference>...]", program);
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  frames      - Number of physical frames (positive integer)");
    eprintln!("  pages       - Number of virtual pages (positive integer)");
    eprintln!("  reference   - Page numbers to access, in order");
    eprintln!();
    eprintln!("With no arguments the configuration is prompted for interactively.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -d, --demo  Pause for Enter after each access");
    eprintln!("  -h, --help  Print this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} 3 8 0 1 2 3 0 1 4", program);
    eprintln!("  {} --demo", program);
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().collect();
    let program = &args[0];

    let mut demo = false;
    let mut positional: Vec<&String> = Vec::new();

    for arg in &args[1..] {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help(program);
                process::exit(0);
            }
            "-d" | "--demo" => {
                demo = true;
            }
            _ if arg.starts_with('-') => {
                return Err(format!(
                    "Unknown option: {}\nUse --help for usage information.",
                    arg
                ));
            }
            _ => {
                positional.push(arg);
            }
        }
    }

    let config = match positional.len() {
        0 => None,
        1 | 2 => {
            return Err(format!(
                "Expected <frames> <pages> <reference>..., got {} argument(s).\n\
                 Use --help for usage information.",
                positional.len()
            ));
        }
        _ => {
            let num_frames = positional[0]
                .parse()
                .map_err(|_| format!("Invalid frame count: {}", positional[0]))?;
            let num_pages = positional[1]
                .parse()
                .map_err(|_| format!("Invalid page count: {}", positional[1]))?;
            let references = positional[2..].iter().map(|s| s.to_string()).collect();
            Some(SimConfig {
                num_frames,
                num_pages,
                references,
            })
        }
    };

    Ok(Args { config, demo })
}

fn run(args: Args) -> Result<(), String> {
    let config = match args.config {
        Some(config) => config,
        None => read_config().map_err(|e| e.to_string())?,
    };

    let mut sim =
        Simulator::new(config.num_frames, config.num_pages).map_err(|e| e.to_string())?;

    let mut reporter = ConsoleReporter::new(args.demo);
    let errors = sim.run(&config.references, &mut reporter);

    if !errors.is_empty() {
        eprintln!();
        eprintln!("Skipped {} invalid reference(s):", errors.len());
        for err in &errors {
            eprintln!("  {}", err);
        }
    }

    Ok(())
}
