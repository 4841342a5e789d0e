//! BoardGraph CLI - load, check and export board stages from the command line.

use boardgraph::drc::DesignRuleChecker;
use boardgraph::{BoardCheck, CheckOptions, CheckResult, Issue, Severity};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process;
use tracing::Level;

#[derive(Parser)]
#[command(name = "boardgraph")]
#[command(about = "Grid circuit board stage checker and netlist exporter", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run design-rule checks on a stage file
    Check {
        /// Path to a stage .json file
        #[arg(value_name = "STAGE")]
        stage: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Exit with error code if issues found at this severity or higher
        #[arg(long, value_enum, default_value = "error")]
        fail_on: FailOnSeverity,

        /// Also run strict-only rules
        #[arg(long)]
        strict: bool,

        /// Only run the named rules (repeatable)
        #[arg(long = "rule", value_name = "RULE_ID")]
        rules: Vec<String>,
    },

    /// Print the SPICE-style netlist of a stage
    Netlist {
        #[arg(value_name = "STAGE")]
        stage: PathBuf,

        /// Emit the element list as JSON instead
        #[arg(long)]
        json: bool,
    },

    /// Print component, net and trace counts of a stage
    Stats {
        #[arg(value_name = "STAGE")]
        stage: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// List available design rules
    Rules {
        /// Show rule descriptions
        #[arg(short, long)]
        detailed: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for CI/CD
    Json,
    /// GitHub Actions format
    Github,
}

#[derive(Clone, ValueEnum)]
enum FailOnSeverity {
    Error,
    Warning,
    Never,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match cli.command {
        Commands::Check {
            stage,
            format,
            fail_on,
            strict,
            rules,
        } => handle_check(&stage, format, fail_on, CheckOptions { strict, rules }),
        Commands::Netlist { stage, json } => handle_netlist(&stage, json),
        Commands::Stats { stage, json } => handle_stats(&stage, json),
        Commands::Rules { detailed } => {
            handle_rules(detailed);
            0
        }
    };

    process::exit(exit_code);
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn handle_check(stage: &Path, format: OutputFormat, fail_on: FailOnSeverity, options: CheckOptions) -> i32 {
    match BoardCheck::check_stage(stage, &options) {
        Ok(result) => {
            if let Err(e) = output_result(&result, &format) {
                eprintln!("Error: {}", e);
                return 1;
            }
            if should_fail(&result, &fail_on) {
                1
            } else {
                0
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn should_fail(result: &CheckResult, severity: &FailOnSeverity) -> bool {
    match severity {
        FailOnSeverity::Error => !result.passed(),
        FailOnSeverity::Warning => result.has_warnings_or_errors(),
        FailOnSeverity::Never => false,
    }
}

fn output_result(result: &CheckResult, format: &OutputFormat) -> Result<(), serde_json::Error> {
    match format {
        OutputFormat::Human => output_human(result),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
        OutputFormat::Github => output_github(result),
    }
    Ok(())
}

fn output_human(result: &CheckResult) {
    match &result.file {
        Some(file) => println!("\nStage: {} ({})", result.stage, file.display()),
        None => println!("\nStage: {}", result.stage),
    }
    println!("{}", "─".repeat(60));

    if result.issues.is_empty() {
        println!("  No issues found");
        return;
    }

    for (severity, heading) in [
        (Severity::Error, "ERRORS"),
        (Severity::Warning, "WARNINGS"),
        (Severity::Info, "INFO"),
    ] {
        let issues: Vec<&Issue> = result.issues.iter().filter(|i| i.severity == severity).collect();
        if issues.is_empty() {
            continue;
        }
        println!("\n  {}:", heading);
        for issue in issues {
            println!("    - [{}] {}", issue.rule_id, issue.message);
            if let Some(ref suggestion) = issue.suggestion {
                println!("      Suggestion: {}", suggestion);
            }
        }
    }

    println!("\n  Summary:");
    println!("    Errors:   {}", result.stats.errors);
    println!("    Warnings: {}", result.stats.warnings);
    println!("    Info:     {}", result.stats.info);
}

fn severity_to_github(issue: &Issue) -> &'static str {
    match issue.severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "notice",
    }
}

fn output_github(result: &CheckResult) {
    let file = result
        .file
        .as_ref()
        .map(|f| f.display().to_string())
        .unwrap_or_else(|| result.stage.clone());
    for issue in &result.issues {
        println!(
            "::{} file={}::{}",
            severity_to_github(issue),
            file,
            issue.message.replace('\n', " ")
        );
    }
}

fn handle_netlist(stage: &Path, json: bool) -> i32 {
    match BoardCheck::stage_netlist(stage) {
        Ok((name, netlist)) => {
            if json {
                match serde_json::to_string_pretty(&netlist) {
                    Ok(out) => println!("{}", out),
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        return 1;
                    }
                }
            } else {
                print!("{}", netlist.to_spice(&name));
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn handle_stats(stage: &Path, json: bool) -> i32 {
    let board = match BoardCheck::load(stage) {
        Ok(board) => board,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let stats = board.stats();
    let bounds = board.compute_content_bounds();

    if json {
        let output = serde_json::json!({
            "stats": stats,
            "content_bounds": bounds,
        });
        match serde_json::to_string_pretty(&output) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        }
    } else {
        println!("Components: {} ({} fixed)", stats.component_count, stats.fixed_component_count);
        println!("Nets:       {}", stats.net_count);
        println!("Traces:     {}", stats.trace_count);
        println!(
            "Pins:       {} connected, {} unconnected",
            stats.connected_pin_count, stats.unconnected_pin_count
        );
        println!("Bounds:     {}", bounds);
    }
    0
}

fn handle_rules(detailed: bool) {
    println!("Available design rules:\n");

    for rule in DesignRuleChecker::with_default_rules().rules() {
        if rule.strict_only() {
            println!("  {} (strict)", rule.id());
        } else {
            println!("  {}", rule.id());
        }
        if detailed {
            println!("    {}", rule.description());
        }
        println!();
    }
}
