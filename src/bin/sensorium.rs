//! Sensorium CLI - replay and inspect recorded sensor event streams
//!
//! Commands:
//! - replay: drive an engine with an NDJSON event stream and emit snapshots
//! - validate: schema-check an NDJSON event stream

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use sensorium::schema::RawSensorEvent;
use sensorium::{SensorEngine, UngatedHost, ENGINE_VERSION, SCHEMA_VERSION};

/// Sensorium - sensor acquisition engine for live device dashboards
#[derive(Parser)]
#[command(name = "sensorium")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Replay device sensor event streams through the acquisition engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive an engine with an NDJSON event stream and emit snapshots
    Replay {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// When to emit snapshots
        #[arg(long, default_value = "final")]
        emit: EmitMode,

        /// Chart history capacity
        #[arg(long, default_value = "30")]
        history_capacity: usize,
    },

    /// Schema-check an NDJSON event stream
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EmitMode {
    /// One snapshot line per event
    Every,
    /// A single snapshot after the last event
    Final,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Replay {
            input,
            output,
            emit,
            history_capacity,
        } => run_replay(&input, &output, emit, history_capacity),
        Commands::Validate { input, json } => run_validate(&input, json),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn read_lines(input: &Path) -> io::Result<Vec<String>> {
    if input.as_os_str() == "-" {
        if atty::is(atty::Stream::Stdin) {
            eprintln!("reading events from stdin; pipe an NDJSON stream or pass --input <file>");
        }
        io::stdin().lock().lines().collect()
    } else {
        Ok(fs::read_to_string(input)?
            .lines()
            .map(|l| l.to_string())
            .collect())
    }
}

fn open_output(output: &Path) -> io::Result<Box<dyn Write>> {
    if output.as_os_str() == "-" {
        Ok(Box::new(io::stdout().lock()))
    } else {
        Ok(Box::new(fs::File::create(output)?))
    }
}

fn run_replay(
    input: &Path,
    output: &Path,
    emit: EmitMode,
    history_capacity: usize,
) -> io::Result<ExitCode> {
    let lines = read_lines(input)?;
    let mut out = open_output(output)?;

    let mut host = UngatedHost;
    let mut engine = SensorEngine::with_history_capacity(&mut host, history_capacity);

    let mut skipped = 0usize;
    for line in lines.iter().filter(|l| !l.trim().is_empty()) {
        match RawSensorEvent::from_json(line) {
            Ok(event) => {
                engine.handle_event(&event);
                if matches!(emit, EmitMode::Every) {
                    write_snapshot(&mut out, &engine)?;
                }
            }
            Err(e) => {
                skipped += 1;
                eprintln!("skipping malformed line: {}", e);
            }
        }
    }

    if matches!(emit, EmitMode::Final) {
        write_snapshot(&mut out, &engine)?;
    }

    if skipped > 0 {
        eprintln!("{} line(s) skipped", skipped);
    }
    Ok(ExitCode::SUCCESS)
}

fn write_snapshot(out: &mut dyn Write, engine: &SensorEngine) -> io::Result<()> {
    let json = serde_json::to_string(&engine.snapshot_now())
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    writeln!(out, "{}", json)
}

fn run_validate(input: &Path, as_json: bool) -> io::Result<ExitCode> {
    let lines = read_lines(input)?;

    let mut valid = 0usize;
    let mut errors: Vec<(usize, String)> = Vec::new();

    for (number, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match RawSensorEvent::from_json(line) {
            Ok(_) => valid += 1,
            Err(e) => errors.push((number + 1, e.to_string())),
        }
    }

    if as_json {
        let report = serde_json::json!({
            "schema_version": SCHEMA_VERSION,
            "valid": valid,
            "invalid": errors.len(),
            "errors": errors
                .iter()
                .map(|(line, message)| serde_json::json!({ "line": line, "message": message }))
                .collect::<Vec<_>>(),
        });
        println!("{}", report);
    } else {
        println!("{} valid, {} invalid ({})", valid, errors.len(), SCHEMA_VERSION);
        for (line, message) in &errors {
            eprintln!("line {}: {}", line, message);
        }
    }

    if errors.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
