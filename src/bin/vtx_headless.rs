//! VTx Headless Runner
//!
//! Feeds a byte stream from stdin or a file through the emulator onto an
//! in-memory screen and prints the final screen state.

use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use vtx_terminal::app::EmulatorConfig;
use vtx_terminal::core::{Screen, Snapshot};
use vtx_terminal::emulator::{Emulator, EmulatorListener};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Keeps the most recent window title
struct TitleListener(Arc<Mutex<Option<String>>>);

impl EmulatorListener for TitleListener {
    fn notify_title(&mut self, _kind: i32, title: &str) {
        if let Ok(mut slot) = self.0.lock() {
            *slot = Some(title.to_string());
        }
    }
}

#[derive(Clone, Copy)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let mut config_path: Option<PathBuf> = None;
    let mut cols: Option<usize> = None;
    let mut rows: Option<usize> = None;
    let mut input_file: Option<String> = None;
    let mut replies_file: Option<String> = None;
    let mut output_format = OutputFormat::Text;
    let mut show_help = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-c" | "--cols" => {
                i += 1;
                cols = args.get(i).and_then(|v| v.parse().ok());
            }
            "-r" | "--rows" => {
                i += 1;
                rows = args.get(i).and_then(|v| v.parse().ok());
            }
            "-f" | "--file" => {
                i += 1;
                input_file = args.get(i).cloned();
            }
            "-o" | "--replies" => {
                i += 1;
                replies_file = args.get(i).cloned();
            }
            "--config" => {
                i += 1;
                config_path = args.get(i).map(PathBuf::from);
            }
            "-j" | "--json" => output_format = OutputFormat::Json,
            "-t" | "--text" => output_format = OutputFormat::Text,
            "-h" | "--help" => show_help = true,
            arg => {
                // Treat as input file if no flag
                if input_file.is_none() && !arg.starts_with('-') {
                    input_file = Some(arg.to_string());
                }
            }
        }
        i += 1;
    }

    if show_help {
        print_help();
        return ExitCode::SUCCESS;
    }

    let mut config = match &config_path {
        Some(path) => match EmulatorConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => EmulatorConfig::load_or_default(),
    };
    if let Some(cols) = cols {
        config.columns = cols;
    }
    if let Some(rows) = rows {
        config.rows = rows;
    }
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let input: Box<dyn Read> = match &input_file {
        Some(path) => match File::open(path) {
            Ok(file) => Box::new(file),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => Box::new(io::stdin()),
    };

    let replies: Box<dyn Write + Send> = match &replies_file {
        Some(path) => match File::create(path) {
            Ok(file) => Box::new(file),
            Err(e) => {
                eprintln!("Error creating '{}': {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => Box::new(io::sink()),
    };

    let screen = Screen::new(config.columns, config.rows);
    let mut emulator = match Emulator::with_config(screen, BufReader::new(input), replies, &config) {
        Ok(emulator) => emulator,
        Err(e) => {
            eprintln!("Error creating emulator: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let title = Arc::new(Mutex::new(None));
    emulator.add_listener(Box::new(TitleListener(Arc::clone(&title))));
    emulator.start();

    let screen = emulator.into_terminal();
    let snapshot = Snapshot::from_screen(&screen);

    match output_format {
        OutputFormat::Text => {
            println!("Terminal State ({}x{}):", snapshot.cols, snapshot.rows);
            println!("Cursor: ({}, {})", snapshot.cursor.row, snapshot.cursor.col);
            if let Some(title) = title.lock().ok().and_then(|t| t.clone()) {
                println!("Title: {}", title);
            }
            println!("---");
            print!("{}", snapshot.to_text());
            println!("---");
        }
        OutputFormat::Json => match snapshot.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing snapshot: {}", e);
                return ExitCode::FAILURE;
            }
        },
    }

    ExitCode::SUCCESS
}

fn print_help() {
    println!("VTx Headless Runner");
    println!();
    println!("Usage: vtx-headless [OPTIONS] [INPUT_FILE]");
    println!();
    println!("Options:");
    println!("  -c, --cols <N>         Set terminal width (default: 80)");
    println!("  -r, --rows <N>         Set terminal height (default: 24)");
    println!("  -f, --file <PATH>      Read input from file");
    println!("  -o, --replies <PATH>   Write terminal replies to a file");
    println!("      --config <PATH>    Load configuration from a JSON file");
    println!("  -j, --json             Output snapshot as JSON");
    println!("  -t, --text             Output snapshot as text (default)");
    println!("  -h, --help             Show this help message");
    println!();
    println!("If no input file is specified, reads from stdin.");
    println!();
    println!("Examples:");
    println!("  printf 'Hello\\x1b[31mWorld\\x1b[0m' | vtx-headless");
    println!("  vtx-headless -c 120 -r 40 input.txt");
    println!("  vtx-headless --json < session.bin > snapshot.json");
}
