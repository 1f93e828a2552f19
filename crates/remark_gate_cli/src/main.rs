use clap::{Parser as ClapParser, Subcommand};
use colored::Colorize;
use dotenv::dotenv;
use log::{debug, info};
use std::fs::OpenOptions;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use std::time::Instant;
use walkdir::WalkDir;

use remark_gate::{Classification, Gate, GateConfig, HookInput, Verdict};

const EXIT_ACCEPT: i32 = 0;
const EXIT_INVALID_INPUT: i32 = 1;
const EXIT_BLOCK: i32 = 2;

#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Config file (defaults to remark-gate/config.toml in the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Analyzer executable to run
    #[arg(long, global = true)]
    analyzer: Option<String>,

    /// Seconds to wait for the analyzer
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Skip the analyzer and classify with the keyword heuristic
    #[arg(long, global = true, default_value_t = false)]
    heuristic_only: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read a PreToolUse payload from stdin (the default)
    Hook,

    /// Run files on disk through the gate as if they were being written
    Check {
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Ignore specific directories (comma-separated)
        #[arg(long, default_value = "venv,node_modules,.git,__pycache__,target")]
        ignore: String,

        /// Output results in JSON format
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Debug, serde::Serialize)]
struct JsonFileResult {
    path: String,
    blocked: bool,
    redundant_comments: Vec<Classification>,
}

#[derive(Debug, serde::Serialize)]
struct JsonOutput {
    total_files: usize,
    files_blocked: usize,
    total_redundant_comments: usize,
    results: Vec<JsonFileResult>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv().ok();
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(EXIT_INVALID_INPUT);
        }
    };
    init_logging(&config);

    let gate = Gate::new(config);
    let code = match args.command.unwrap_or(Command::Hook) {
        Command::Hook => run_hook(&gate, io::stdin().lock()).await,
        Command::Check { paths, ignore, json } => {
            let ignore_dirs: Vec<&str> = ignore.split(',').collect();
            run_check(&gate, &paths, &ignore_dirs, json).await
        }
    };
    process::exit(code);
}

fn load_config(args: &Args) -> Result<GateConfig, remark_gate::ConfigError> {
    let mut config = GateConfig::load(args.config.as_deref())?;
    if let Some(analyzer) = &args.analyzer {
        config.analyzer_command = analyzer.clone();
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    if args.heuristic_only {
        config.heuristic_only = true;
    }
    Ok(config)
}

// Hook stderr is reserved for the block message, so a log file takes everything when set.
fn init_logging(config: &GateConfig) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(path) = &config.log_file {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => eprintln!("Warning: cannot open log file {}: {}", path.display(), e),
        }
    }
    builder.init();
}

async fn run_hook<R: Read>(gate: &Gate, reader: R) -> i32 {
    let input = match HookInput::from_reader(reader) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_INVALID_INPUT;
        }
    };
    debug!("Hook input for {}", input.tool_name);

    let verdict = match gate.review_hook(&input).await {
        Ok(verdict) => verdict,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_INVALID_INPUT;
        }
    };
    if let Some(message) = verdict.message() {
        eprintln!("{}", message);
    }
    exit_code(&verdict)
}

fn exit_code(verdict: &Verdict) -> i32 {
    if verdict.blocked {
        EXIT_BLOCK
    } else {
        EXIT_ACCEPT
    }
}

async fn run_check(gate: &Gate, paths: &[PathBuf], ignore_dirs: &[&str], json: bool) -> i32 {
    let start_time = Instant::now();
    let files = collect_files(paths, ignore_dirs, gate.config());
    debug!("Found {} files to check", files.len());

    let mut results = Vec::with_capacity(files.len());
    for (index, file) in files.iter().enumerate() {
        let source = match std::fs::read_to_string(file) {
            Ok(source) => source,
            Err(e) => {
                debug!("Skipping {}: {}", file.display(), e);
                continue;
            }
        };
        info!("Progress: [{}/{}] {}", index + 1, files.len(), file.display());
        results.push((file.clone(), gate.review_text(&source).await));
    }

    info!("Check completed in {:.2} seconds", start_time.elapsed().as_secs_f64());
    print_summary(&results, json);

    if results.iter().any(|(_, verdict)| verdict.blocked) {
        EXIT_BLOCK
    } else {
        EXIT_ACCEPT
    }
}

fn collect_files(paths: &[PathBuf], ignore_dirs: &[&str], config: &GateConfig) -> Vec<PathBuf> {
    paths
        .iter()
        .flat_map(|path| {
            WalkDir::new(path)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| !is_ignored(e, ignore_dirs))
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .filter(|file| !config.is_exempt(&file.to_string_lossy()))
        })
        .collect()
}

fn is_ignored(entry: &walkdir::DirEntry, ignore_dirs: &[&str]) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && ignore_dirs
            .iter()
            .any(|dir| entry.file_name().to_str().map_or(false, |s| s == *dir))
}

fn print_summary(results: &[(PathBuf, Verdict)], json_output: bool) {
    let files_blocked = results.iter().filter(|(_, verdict)| verdict.blocked).count();
    let total_redundant: usize = results
        .iter()
        .map(|(_, verdict)| verdict.blocking_comments.len())
        .sum();

    if json_output {
        let output = JsonOutput {
            total_files: results.len(),
            files_blocked,
            total_redundant_comments: total_redundant,
            results: results
                .iter()
                .map(|(path, verdict)| JsonFileResult {
                    path: path.display().to_string(),
                    blocked: verdict.blocked,
                    redundant_comments: verdict.blocking_comments.clone(),
                })
                .collect(),
        };
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error: failed to serialize results: {}", e),
        }
        return;
    }

    println!("\n{}", "Check Summary:".bold());
    println!("--------------");
    println!("Total files checked: {}", results.len());
    println!("Files that would be blocked: {}", files_blocked);
    println!("Total redundant comments found: {}", total_redundant);

    if total_redundant > 0 {
        println!("\nResults by file:");
        for (path, verdict) in results.iter().filter(|(_, verdict)| verdict.blocked) {
            println!("  {}:", path.display().to_string().red());
            for comment in &verdict.blocking_comments {
                println!(
                    "    Line {}: {} {}",
                    comment.line,
                    comment.comment_text.yellow(),
                    format!("({})", comment.reason).dimmed()
                );
            }
        }
    }
}
