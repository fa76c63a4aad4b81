use clap::{Parser, Subcommand, ValueEnum};
use logging::LogMode;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "dock-docs",
    version,
    about = "Generate documentation from a Dockerfile",
    long_about = "Documents ARG, ENV, LABEL and EXPOSE instructions from `# @tag: value` comments \
                  and optionally enriches the output with container image analysis \
                  (docker/podman, syft, grype, dive)."
)]
pub struct DockDocsCli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to Dockerfile
    #[arg(short = 'f', long = "file", default_value = "./Dockerfile")]
    pub dockerfile: PathBuf,

    /// Path to output file
    #[arg(short, long, default_value = config::DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Print to stdout instead of writing to file
    #[arg(long)]
    pub dry_run: bool,

    /// Container image tag to analyze (e.g. my-app:latest)
    #[arg(long, value_name = "TAG")]
    pub image: Option<String>,

    /// Path to a dock-docs.yaml config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Built-in template to render with (see --list-templates)
    #[arg(long, value_name = "NAME")]
    pub template: Option<String>,

    /// List the built-in templates and exit
    #[arg(long)]
    pub list_templates: bool,

    /// Print a built-in template's name, format and description, then exit
    #[arg(long, value_name = "NAME")]
    pub describe_template: Option<String>,

    /// Plain text instead of emoji in rendered output
    #[arg(long)]
    pub no_moji: bool,

    /// Base URL of a shields-compatible badge service
    #[arg(long, value_name = "URL")]
    pub badge_base_url: Option<String>,

    /// Render with partial results when image analysis fails
    #[arg(long)]
    pub ignore_errors: bool,

    /// Overall deadline for image analysis, in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Report which analysis tools are installed and exit
    #[arg(long)]
    pub check: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Log line format on stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl DockDocsCli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install syft, grype and dive into the dock-docs tool cache
    Setup {
        /// Only report which tools are installed
        #[arg(long)]
        check: bool,

        /// Install directory (default: ~/.dock-docs/bin)
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,

        /// Reinstall tools that are already in the cache
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl From<LogFormat> for LogMode {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Text => LogMode::Cli,
            LogFormat::Json => LogMode::Json,
        }
    }
}
