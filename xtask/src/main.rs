use std::path::Path;
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the dispatch simulation workspace",
    long_about = "A unified CLI for running comparisons, sweeps, benchmarks,\n\
                  and CI checks in the dispatch simulation workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the standard comparison (100 responders, 4 operators)
    Run,
    /// Run the large comparison (2 000 responders, 12 operators)
    RunLarge,
    /// Run the staffing sweep experiment
    Sweep,
    /// Run Criterion benchmarks
    Bench,
    /// Compare benchmarks: stash changes, create baseline, restore, compare
    BenchCompare,
    /// Run CI checks (fmt, clippy, tests, examples, benchmarks)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
    /// Run load tests (ignored tests in dispatch_core)
    LoadTest,
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy, and tests
    Check,
    /// Build and run example scenarios
    Examples,
    /// Run benchmarks
    Bench,
    /// Run check + examples + bench
    All,
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn git(args: &[&str]) -> ExitStatus {
    eprintln!("+ git {}", args.join(" "));
    Command::new("git")
        .args(args)
        .status()
        .expect("failed to execute git")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn run_git(args: &[&str]) {
    let status = git(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);

    step("Test dispatch_core");
    run_cargo(&["test", "-p", "dispatch_core"]);

    step("Test dispatch_experiments");
    run_cargo(&["test", "-p", "dispatch_experiments"]);
}

fn ci_examples() {
    step("Run comparison_run (100 responders, 4 operators)");
    run_cargo(&[
        "run",
        "-p",
        "dispatch_core",
        "--example",
        "comparison_run",
        "--release",
    ]);

    step("Run comparison_run_large (2K responders, 12 operators)");
    run_cargo(&[
        "run",
        "-p",
        "dispatch_core",
        "--example",
        "comparison_run_large",
        "--release",
    ]);
}

fn ci_bench() {
    step("Run benchmarks");
    run_cargo(&[
        "bench",
        "--package",
        "dispatch_core",
        "--bench",
        "performance",
    ]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            run_cargo(&[
                "run",
                "-p",
                "dispatch_core",
                "--example",
                "comparison_run",
                "--release",
            ]);
        }
        Commands::RunLarge => {
            run_cargo(&[
                "run",
                "-p",
                "dispatch_core",
                "--example",
                "comparison_run_large",
                "--release",
            ]);
        }
        Commands::Sweep => {
            run_cargo(&[
                "run",
                "-p",
                "dispatch_experiments",
                "--example",
                "staffing_sweep",
            ]);
        }
        Commands::Bench => {
            run_cargo(&[
                "bench",
                "--package",
                "dispatch_core",
                "--bench",
                "performance",
            ]);
        }
        Commands::BenchCompare => {
            let baseline_dir = Path::new("target/criterion");
            if baseline_dir.exists() {
                step("Removing existing benchmark data");
                std::fs::remove_dir_all(baseline_dir).expect("failed to remove target/criterion");
            }

            step("Stashing current changes");
            run_git(&[
                "stash",
                "push",
                "-m",
                "Temporary stash for benchmark comparison",
            ]);

            step("Running benchmark to create baseline");
            run_cargo(&[
                "bench",
                "--package",
                "dispatch_core",
                "--bench",
                "performance",
                "--",
                "--save-baseline",
                "main",
            ]);

            step("Reapplying changes");
            run_git(&["stash", "pop"]);

            step("Running benchmark comparing against baseline");
            run_cargo(&[
                "bench",
                "--package",
                "dispatch_core",
                "--bench",
                "performance",
                "--",
                "--baseline",
                "main",
            ]);

            eprintln!("\nDone! Check the output above to see performance comparison.");
        }
        Commands::Ci { job } => {
            match job {
                CiJob::Check => ci_check(),
                CiJob::Examples => ci_examples(),
                CiJob::Bench => ci_bench(),
                CiJob::All => {
                    ci_check();
                    ci_examples();
                    ci_bench();
                }
            }
            eprintln!("\nCI job passed.");
        }
        Commands::LoadTest => {
            run_cargo(&[
                "test",
                "-p",
                "dispatch_core",
                "--test",
                "load_tests",
                "--",
                "--ignored",
            ]);
        }
    }
}
