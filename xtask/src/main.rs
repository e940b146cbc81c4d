use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for tileview")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// fmt, clippy and tests, stopping at the first failure
    Check,
    /// cargo fmt --check on all crates
    Fmt,
    /// clippy on all targets with warnings denied
    Clippy,
    /// All workspace tests
    Test,
    /// rustdoc for the workspace crates
    Doc,
    /// Model reconcile benchmarks
    Bench,
    /// Render one headless frame of the sample world through the CLI
    Smoke {
        #[arg(short, long, default_value = "16")]
        resolution: u32,
    },
}

/// One cargo invocation of a task.
struct Step {
    label: &'static str,
    args: Vec<String>,
}

impl Step {
    fn new(label: &'static str, args: &[&str]) -> Self {
        Self {
            label,
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn run(&self) -> Result<()> {
        println!("==> {}: cargo {}", self.label, self.args.join(" "));
        let status = Command::new("cargo").args(&self.args).status()?;
        if !status.success() {
            anyhow::bail!("{} failed ({status})", self.label);
        }
        Ok(())
    }
}

fn fmt() -> Step {
    Step::new("fmt", &["fmt", "--all", "--", "--check"])
}

fn clippy() -> Step {
    Step::new(
        "clippy",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
    )
}

fn test() -> Step {
    Step::new("test", &["test", "--workspace"])
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let steps = match cli.command {
        Commands::Check => vec![fmt(), clippy(), test()],
        Commands::Fmt => vec![fmt()],
        Commands::Clippy => vec![clippy()],
        Commands::Test => vec![test()],
        Commands::Doc => vec![Step::new("doc", &["doc", "--workspace", "--no-deps"])],
        Commands::Bench => vec![Step::new(
            "bench",
            &["bench", "-p", "tileview-stream", "--bench", "bench_reconcile"],
        )],
        Commands::Smoke { resolution } => {
            let resolution = resolution.to_string();
            vec![Step::new(
                "smoke",
                &["run", "-p", "tileview-cli", "--", "-r", resolution.as_str(), "render"],
            )]
        }
    };
    for step in &steps {
        step.run()?;
    }
    Ok(())
}
