//! XP CLI - Command-line interface for Synheart XP
//!
//! Commands:
//! - allocate: Allocate XP for individual activities
//! - session: Process workout sessions into XP reports
//! - cap: Apply the daily cap to a new allocation
//! - validate: Validate activity input
//! - doctor: Diagnose configuration and ledger files
//! - schema: Print input/output schema information

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use synheart_xp::adapter::{
    parse_activities_array, parse_activities_ndjson, to_activity, validate_activities,
};
use synheart_xp::daily_cap::evaluate_daily_cap;
use synheart_xp::ledger::DEFAULT_LEDGER_WINDOW;
use synheart_xp::types::XpAllocation;
use synheart_xp::{XpConfig, XpEngine, PRODUCER_NAME, XP_VERSION};

/// XP - On-device XP allocation engine for gamified training
#[derive(Parser)]
#[command(name = "xp")]
#[command(author = "Synheart AI Inc")]
#[command(version = XP_VERSION)]
#[command(about = "Turn logged workouts into STR/STA/AGI experience points", long_about = None)]
struct Cli {
    /// Engine configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the global XP multiplier
    #[arg(long, global = true)]
    base_multiplier: Option<f64>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Allocate XP for each activity in the input
    Allocate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Bodyweight for activities that omit it
        #[arg(long)]
        bodyweight_kg: Option<f64>,

        /// Also print the session total
        #[arg(long)]
        total: bool,
    },

    /// Process workout sessions (one JSON session per line) into XP reports
    Session {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Ledger window in days. Overrides the window stored in a loaded
        /// ledger; otherwise defaults to 7 for a fresh ledger
        #[arg(long)]
        ledger_days: Option<usize>,

        /// Load the day ledger from file
        #[arg(long)]
        load_ledger: Option<PathBuf>,

        /// Save the day ledger to file after processing
        #[arg(long)]
        save_ledger: Option<PathBuf>,

        /// Flush output after each report
        #[arg(long, default_value = "true")]
        flush: bool,
    },

    /// Apply the daily cap to a new allocation
    Cap {
        /// JSON array of the day's prior allocations
        #[arg(long)]
        daily: PathBuf,

        /// JSON allocation about to be recorded
        #[arg(long)]
        current: PathBuf,
    },

    /// Validate activity input
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Bodyweight for activities that omit it
        #[arg(long)]
        bodyweight_kg: Option<f64>,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and ledger files
    Doctor {
        /// Check ledger file
        #[arg(long)]
        ledger: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one activity per line)
    Ndjson,
    /// JSON array of activities
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one allocation per line)
    Ndjson,
    /// JSON array of allocations
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Activity and session input
    Input,
    /// XP report output
    Output,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), XpCliError> {
    let config = load_config(cli.config.as_deref(), cli.base_multiplier)?;

    match cli.command {
        Commands::Allocate {
            input,
            input_format,
            output_format,
            bodyweight_kg,
            total,
        } => cmd_allocate(
            &config,
            &input,
            input_format,
            output_format,
            bodyweight_kg,
            total,
        ),

        Commands::Session {
            input,
            output,
            ledger_days,
            load_ledger,
            save_ledger,
            flush,
        } => cmd_session(
            config,
            &input,
            &output,
            ledger_days,
            load_ledger.as_deref(),
            save_ledger.as_deref(),
            flush,
        ),

        Commands::Cap { daily, current } => cmd_cap(&config, &daily, &current),

        Commands::Validate {
            input,
            input_format,
            bodyweight_kg,
            json,
        } => cmd_validate(&input, input_format, bodyweight_kg, json),

        Commands::Doctor { ledger, json } => {
            cmd_doctor(cli.config.as_deref(), ledger.as_deref(), json)
        }

        Commands::Schema { schema_type } => cmd_schema(schema_type),
    }
}

fn load_config(path: Option<&Path>, base_multiplier: Option<f64>) -> Result<XpConfig, XpCliError> {
    let mut config = match path {
        Some(path) => XpConfig::from_json(&fs::read_to_string(path)?)?,
        None => XpConfig::default(),
    };

    if let Some(multiplier) = base_multiplier {
        config.base_xp_multiplier = multiplier;
    }

    config.validate()?;
    debug!(base_xp_multiplier = config.base_xp_multiplier, "configuration loaded");
    Ok(config)
}

fn read_input(input: &Path) -> Result<String, XpCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn cmd_allocate(
    config: &XpConfig,
    input: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    bodyweight_kg: Option<f64>,
    total: bool,
) -> Result<(), XpCliError> {
    let input_data = read_input(input)?;

    let raw_activities = match input_format {
        InputFormat::Ndjson => parse_activities_ndjson(&input_data)?,
        InputFormat::Json => parse_activities_array(&input_data)?,
    };

    if raw_activities.is_empty() {
        return Err(XpCliError::NoActivities);
    }

    let engine = XpEngine::with_config(config.clone())?;
    let mut activities = Vec::with_capacity(raw_activities.len());
    for raw in &raw_activities {
        activities.push(to_activity(raw, bodyweight_kg)?);
    }

    let mut allocations: Vec<XpAllocation> =
        activities.iter().map(|a| engine.allocate(a)).collect();

    if total {
        allocations.push(engine.allocate_session(&activities));
    }

    print!("{}", format_output(&allocations, &output_format)?);
    Ok(())
}

fn cmd_session(
    config: XpConfig,
    input: &Path,
    output: &Path,
    ledger_days: Option<usize>,
    load_ledger: Option<&Path>,
    save_ledger: Option<&Path>,
    flush: bool,
) -> Result<(), XpCliError> {
    let window_days = ledger_days.unwrap_or(DEFAULT_LEDGER_WINDOW);
    let mut engine = XpEngine::with_ledger_window(config, window_days)?;

    if let Some(ledger_path) = load_ledger {
        let ledger_json = fs::read_to_string(ledger_path)?;
        engine.load_ledger(&ledger_json)?;
        // An explicit window wins over the one stored in the file
        if let Some(days) = ledger_days {
            engine.set_ledger_window(days);
        }
        debug!(
            window_days = engine.ledger().window_days(),
            days = engine.ledger().day_count(),
            "ledger loaded"
        );
    }

    let reader: Box<dyn BufRead> = if input.to_string_lossy() == "-" {
        Box::new(io::BufReader::new(io::stdin()))
    } else {
        Box::new(io::BufReader::new(fs::File::open(input)?))
    };

    let mut writer: Box<dyn Write> = if output.to_string_lossy() == "-" {
        Box::new(io::stdout())
    } else {
        Box::new(fs::File::create(output)?)
    };

    let mut processed = 0usize;
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        let report = engine.process_session(trimmed)?;
        // Reports are pretty-printed by the engine; keep one per line here
        let value: serde_json::Value = serde_json::from_str(&report)?;
        writeln!(writer, "{}", serde_json::to_string(&value)?)?;
        if flush {
            writer.flush()?;
        }
        processed += 1;
    }

    if processed == 0 {
        return Err(XpCliError::NoActivities);
    }
    writer.flush()?;
    info!(sessions = processed, "sessions processed");

    if let Some(ledger_path) = save_ledger {
        let ledger_json = engine.save_ledger()?;
        fs::write(ledger_path, ledger_json)?;
    }

    Ok(())
}

fn cmd_cap(config: &XpConfig, daily: &Path, current: &Path) -> Result<(), XpCliError> {
    let daily: Vec<XpAllocation> = serde_json::from_str(&read_input(daily)?)?;
    let current: XpAllocation = serde_json::from_str(&read_input(current)?)?;

    let outcome = evaluate_daily_cap(&daily, current, &config.daily_cap);
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn cmd_validate(
    input: &Path,
    input_format: InputFormat,
    bodyweight_kg: Option<f64>,
    json: bool,
) -> Result<(), XpCliError> {
    let input_data = read_input(input)?;

    let activities = match input_format {
        InputFormat::Ndjson => parse_activities_ndjson(&input_data)?,
        InputFormat::Json => parse_activities_array(&input_data)?,
    };

    let failures = validate_activities(&activities, bodyweight_kg);

    let report = ValidationReport {
        total_activities: activities.len(),
        valid_activities: activities.len() - failures.len(),
        invalid_activities: failures.len(),
        errors: failures
            .iter()
            .map(|f| ValidationErrorDetail {
                index: f.index,
                activity_id: f.activity_id.clone(),
                error: f.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total activities:   {}", report.total_activities);
        println!("Valid activities:   {}", report.valid_activities);
        println!("Invalid activities: {}", report.invalid_activities);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!(
                    "  - Activity {} (index {}): {}",
                    err.activity_id.as_deref().unwrap_or("unnamed"),
                    err.index,
                    err.error
                );
            }
        }
    }

    if report.invalid_activities > 0 {
        Err(XpCliError::ValidationFailed(report.invalid_activities))
    } else {
        Ok(())
    }
}

fn cmd_doctor(config: Option<&Path>, ledger: Option<&Path>, json: bool) -> Result<(), XpCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "xp_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("XP version {}", XP_VERSION),
    });

    if let Some(config_path) = config {
        checks.push(check_file(config_path, "config", |content| {
            XpConfig::from_json(content)
                .map(|c| format!("Config valid (base multiplier {})", c.base_xp_multiplier))
                .map_err(|e| format!("Invalid config: {}", e))
        }));
    }

    if let Some(ledger_path) = ledger {
        checks.push(check_file(ledger_path, "ledger", |content| {
            synheart_xp::DailyLedger::from_json(content)
                .map(|l| format!("Ledger valid ({} days recorded)", l.day_count()))
                .map_err(|e| format!("Invalid ledger JSON: {}", e))
        }));
    }

    // Check stdin is available (for session streaming)
    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (streaming mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: XP_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("XP Doctor Report");
        println!("================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(XpCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn check_file(
    path: &Path,
    name: &str,
    inspect: impl Fn(&str) -> Result<String, String>,
) -> DoctorCheck {
    if !path.exists() {
        return DoctorCheck {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: format!("{} file does not exist", name),
        };
    }

    let (status, message) = match fs::read_to_string(path) {
        Ok(content) => match inspect(&content) {
            Ok(message) => (CheckStatus::Ok, message),
            Err(message) => (CheckStatus::Error, message),
        },
        Err(e) => (
            CheckStatus::Error,
            format!("Cannot read {} file: {}", name, e),
        ),
    };

    DoctorCheck {
        name: name.to_string(),
        status,
        message,
    }
}

fn cmd_schema(schema_type: SchemaType) -> Result<(), XpCliError> {
    match schema_type {
        SchemaType::Input => {
            println!("Activity input");
            println!();
            println!("- movement_type: resistance | cardio | skill (required)");
            println!("- bodyweight_kg: number > 0 (required, or --bodyweight-kg / session bodyweight_kg)");
            println!("- rpe (or RPE): number, nominally 1-10 (required)");
            println!("- sets, reps: integers (resistance)");
            println!("- load_kg: number (resistance, defaults to bodyweight)");
            println!("- minutes: number (cardio/skill work and duration signal)");
            println!("- interval_seconds: number (work-burst length)");
            println!("- average_hr_pct (or average_HR_pct): % of max heart rate");
            println!();
            println!("Session input (xp session, one per line)");
            println!();
            println!("- session_id, user_id?, performed_at (RFC 3339), bodyweight_kg?, activities[]");
        }
        SchemaType::Output => {
            println!("XP report");
            println!();
            println!("- report_version: Schema version (1.0.0)");
            println!("- producer: {{ name, version, instance_id }}");
            println!("- provenance: {{ session_id, user_id, performed_at_utc, computed_at_utc }}");
            println!("- session:");
            println!("  - date");
            println!("  - allocation: {{ xp_total, xp_str, xp_sta, xp_agi, energy_code }}");
            println!("  - activities: per-activity work units, signal, multiplier, allocation");
            println!("  - daily_cap: {{ day_total_xp, aerobic_fraction, applied, allocation_before_cap }}");
        }
    }

    Ok(())
}

fn format_output(
    allocations: &[XpAllocation],
    format: &OutputFormat,
) -> Result<String, XpCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for allocation in allocations {
                lines.push(serde_json::to_string(allocation)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(allocations)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(allocations)?),
    }
}

// Error types

#[derive(Debug)]
enum XpCliError {
    Io(io::Error),
    Compute(synheart_xp::ComputeError),
    Json(serde_json::Error),
    NoActivities,
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for XpCliError {
    fn from(e: io::Error) -> Self {
        XpCliError::Io(e)
    }
}

impl From<synheart_xp::ComputeError> for XpCliError {
    fn from(e: synheart_xp::ComputeError) -> Self {
        XpCliError::Compute(e)
    }
}

impl From<serde_json::Error> for XpCliError {
    fn from(e: serde_json::Error) -> Self {
        XpCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<XpCliError> for CliError {
    fn from(e: XpCliError) -> Self {
        match e {
            XpCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            XpCliError::Compute(e) => CliError {
                code: "COMPUTE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'xp validate' or 'xp schema input' for details".to_string()),
            },
            XpCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            XpCliError::NoActivities => CliError {
                code: "NO_ACTIVITIES".to_string(),
                message: "No activities found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            XpCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} activities failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            XpCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_activities: usize,
    valid_activities: usize,
    invalid_activities: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    activity_id: Option<String>,
    error: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
