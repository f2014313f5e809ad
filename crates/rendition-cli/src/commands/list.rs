//! `rendition list`: List the report templates in the catalog.

use clap::Args;

use super::GlobalArgs;

/// Arguments for the `list` command.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print the catalog as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Executes the `list` command.
///
/// # Errors
///
/// Returns an error if the catalog cannot be built.
pub fn execute(global: &GlobalArgs, args: ListArgs) -> anyhow::Result<()> {
    let reports = global.with_service(|service| Ok(service.list_reports()?))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    if reports.is_empty() {
        println!("No report templates found.");
        return Ok(());
    }

    println!("{:<30} {:<30} {:<6} DESCRIPTION", "TEMPLATE", "TITLE", "PARAMS");
    for report in &reports {
        println!(
            "{:<30} {:<30} {:<6} {}",
            report.file_name,
            report.title,
            report.parameters.len(),
            report.description
        );
    }
    Ok(())
}
