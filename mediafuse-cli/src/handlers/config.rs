//! Config command handler

use crate::args::{ConfigArgs, OutputFormat};
use crate::context::MediaFuseCliContext;
use crate::output::*;
use mediafuse::FusionError;
use std::fs;

pub fn handle_config_command(
    args: ConfigArgs,
    ctx: &MediaFuseCliContext,
    output_format: OutputFormat,
) -> mediafuse::Result<()> {
    let rendered = serde_json::to_string_pretty(&ctx.config)?;

    if let Some(path) = args.write {
        fs::write(&path, &rendered).map_err(|e| {
            FusionError::Other(format!(
                "Failed to write configuration to {}: {}",
                path.display(),
                e
            ))
        })?;
        if output_format == OutputFormat::Table {
            println!(
                "{}",
                format_success(&format!("Configuration written to {}", path.display()))
            );
        }
        return Ok(());
    }

    match output_format {
        OutputFormat::Json => println!("{}", rendered),
        OutputFormat::Table => {
            print_config(&ctx.config);
            println!();
            if ctx.config_files.is_empty() {
                println!("{}", format_info("No configuration file found, using defaults and environment."));
            } else {
                for path in &ctx.config_files {
                    println!("{}", format_info(&format!("Loaded from {}", path.display())));
                }
            }
        }
    }
    Ok(())
}
