mod cli;
mod commands;
mod utils;

use crate::cli::{Commands, DockDocsCli};
use analysis::tools::ToolLocator;
use analysis::{AnalysisConfig, Analyzer};
use anyhow::Result;
use commands::config_mode::ConfigArgs;
use commands::generate::GenerateArgs;
use renderer::RenderOptions;
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DockDocsCli::parse_args();
    let _guards = logging::init(cli.log_format.into(), cli.verbose)?;

    if let Some(Commands::Setup { check, dir, force }) = cli.command {
        return commands::setup::run(commands::setup::SetupArgs { check, dir, force }).await;
    }
    if cli.list_templates {
        return commands::templates::list();
    }
    if let Some(name) = cli.describe_template.as_deref() {
        return commands::templates::describe(name);
    }
    if cli.check {
        return commands::check::run();
    }

    let locator = ToolLocator::from_env();
    let analyzer = Analyzer::with_default_runners(&locator, AnalysisConfig::default());
    debug!(runners = analyzer.runners().len(), "analyzer ready");
    let cancel = utils::cancellation_token(cli.timeout);

    if let Some(config) = cli.config {
        let args = ConfigArgs {
            config,
            template: cli.template,
            no_moji: cli.no_moji,
            badge_base_url: cli.badge_base_url,
            dry_run: cli.dry_run,
            ignore_errors: cli.ignore_errors,
        };
        return commands::config_mode::run(args, &analyzer, &cancel).await;
    }

    let template = utils::resolve_template(cli.template.as_deref(), None)?;
    let args = GenerateArgs {
        dockerfile: cli.dockerfile,
        output: cli.output,
        dry_run: cli.dry_run,
        image: cli.image,
        template,
        options: RenderOptions {
            no_moji: cli.no_moji,
            badge_base_url: cli.badge_base_url,
        },
        ignore_errors: cli.ignore_errors,
    };
    commands::generate::run(args, &analyzer, &cancel).await
}
