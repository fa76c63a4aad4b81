use anyhow::Result;
use renderer::{Template, list_builtin};

pub fn list() -> Result<()> {
    println!("Available built-in templates:");
    for template in list_builtin() {
        println!(
            "  {:<10}  [{}]  {}",
            template.name, template.format, template.description
        );
    }
    println!();
    println!("Usage:");
    println!("  dock-docs --template <name>");
    println!("  dock-docs --describe-template <name>");
    Ok(())
}

/// Built-ins are compiled in, so there is no template source to print.
pub fn describe(name: &str) -> Result<()> {
    let template = Template::from_name(name)?;
    println!("name: {template}");
    println!("format: {}", template.format());
    println!("description: {}", template.description());
    Ok(())
}
