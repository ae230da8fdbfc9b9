mod archive;
mod config;
mod converter;
mod discovery;
mod driver;
mod error;
mod interrupt;
mod maven;
mod pipeline;
mod select;

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;

use crate::config::RunConfig;
use crate::interrupt::Interrupt;
use crate::select::{FirstChoice, LinePrompt, Prompt};

#[derive(Parser, Debug)]
#[command(
    name = "jdoc2md",
    about = "Convert a Java library's javadoc into a Markdown directory tree"
)]
pub struct Cli {
    /// Maven groupId
    #[arg(long)]
    pub group: Option<String>,

    /// Maven artifactId (without --group: search Maven Central and pick)
    #[arg(long)]
    pub artifact: Option<String>,

    /// Maven version (latest if omitted)
    #[arg(long)]
    pub version: Option<String>,

    /// Output directory path
    #[arg(short, long)]
    pub output: PathBuf,

    /// Path to a local javadoc jar (skips download)
    #[arg(short = 'i', long, conflicts_with = "group")]
    pub input_jar: Option<PathBuf>,

    /// Take the first search match instead of prompting
    #[arg(long)]
    pub non_interactive: bool,

    /// Maven repository base URL
    #[arg(long, env = "JDOC2MD_REPOSITORY_URL", default_value = maven::DEFAULT_REPOSITORY_URL)]
    pub repository_url: String,

    /// Maven Central search endpoint
    #[arg(long, env = "JDOC2MD_SEARCH_URL", default_value = maven::DEFAULT_SEARCH_URL)]
    pub search_url: String,

    /// Directory for the downloaded jar and extracted pages (system temp dir if omitted)
    #[arg(long, env = "JDOC2MD_SCRATCH_DIR")]
    pub scratch_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let config = match RunConfig::from_cli(Cli::parse()) {
        Ok(config) => config,
        Err(e) => e.exit(),
    };

    let interrupt = Interrupt::default();
    interrupt.listen_for_ctrl_c();

    let mut prompt: Box<dyn Prompt> = if config.interactive {
        Box::new(LinePrompt::stdio())
    } else {
        Box::new(FirstChoice)
    };

    let summary = pipeline::run(&config, prompt.as_mut(), &interrupt).await?;
    println!(
        "Created Markdown documentation directory: {}",
        summary.output_dir.display()
    );
    println!("Total files converted: {}", summary.converted);

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
