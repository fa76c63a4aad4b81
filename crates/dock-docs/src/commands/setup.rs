use crate::commands::check;
use analysis::tools::ToolLocator;
use anyhow::{Context, Result};
use installer::{InstallOutcome, Installer, Platform, RELEASES};
use std::path::PathBuf;
use tracing::info;

pub struct SetupArgs {
    pub check: bool,
    pub dir: Option<PathBuf>,
    pub force: bool,
}

pub async fn run(args: SetupArgs) -> Result<()> {
    let installer = match args.dir {
        Some(dir) => Installer::new(dir)?,
        None => Installer::with_default_dir()?,
    };
    let locator = ToolLocator::new(
        std::env::var_os("PATH"),
        Some(installer.install_dir().to_path_buf()),
    );

    if args.check {
        check::print_status(&locator);
        return Ok(());
    }

    let platform = Platform::current()?;
    info!(dir = %installer.install_dir().display(), os = platform.os, arch = platform.arch, "installing analysis tools");

    for release in &RELEASES {
        let outcome = installer
            .install(release, platform, args.force)
            .await
            .with_context(|| format!("failed to install {}", release.name))?;
        match outcome {
            InstallOutcome::Installed { path, version } => {
                println!("Installed {} {} to {}", release.name, version, path.display());
            }
            InstallOutcome::AlreadyPresent { path } => {
                println!(
                    "{} already installed at {} (use --force to reinstall)",
                    release.name,
                    path.display()
                );
            }
        }
    }

    println!();
    check::print_status(&locator);
    Ok(())
}
