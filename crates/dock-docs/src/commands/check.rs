use analysis::tools::{SCANNER_TOOLS, ToolLocator, tool_status};
use anyhow::Result;

pub fn run() -> Result<()> {
    print_status(&ToolLocator::from_env());
    Ok(())
}

/// Printed to stdout, not through tracing
pub fn print_status(locator: &ToolLocator) {
    println!("Tool Status:");
    let mut installable_missing = false;
    for status in tool_status(locator) {
        match status.location {
            Some(location) => println!(
                "  [OK] {} (source: {}, {})",
                status.name,
                location.source,
                location.path.display()
            ),
            None => {
                installable_missing |= SCANNER_TOOLS.contains(&status.name.as_str());
                println!("  [MISSING] {}", status.name);
            }
        }
    }
    if installable_missing {
        println!();
        println!("Run 'dock-docs setup' to install the missing scanners.");
    }
}
