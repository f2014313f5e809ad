//! `rendition params`: Describe the parameters of one template.

use clap::Args;

use super::GlobalArgs;
use crate::output::{format_choices, or_dash};

/// Arguments for the `params` command.
#[derive(Args, Debug)]
pub struct ParamsArgs {
    /// Template file name, e.g. `sales.rpt`.
    pub template: String,

    /// Print the catalog entry as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Executes the `params` command.
///
/// # Errors
///
/// Returns an error if the catalog cannot be built or the template is unknown.
pub fn execute(global: &GlobalArgs, args: ParamsArgs) -> anyhow::Result<()> {
    let entry = global.with_service(|service| Ok(service.report(&args.template)?))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
        return Ok(());
    }

    println!("{}: {}", entry.title, entry.description);
    if entry.parameters.is_empty() {
        println!("No parameters.");
        return Ok(());
    }

    println!(
        "{:<20} {:<10} {:<13} {:<12} {:<12} CHOICES",
        "NAME", "TYPE", "CONTROL", "GROUP", "DEFAULT"
    );
    for p in &entry.parameters {
        println!(
            "{:<20} {:<10} {:<13} {:<12} {:<12} {}",
            p.name(),
            p.data_type.to_string(),
            p.display_kind.to_string(),
            or_dash(p.group_name.as_deref()),
            or_dash(p.default_value.as_deref()),
            format_choices(p.selection_list.as_deref())
        );
        if let Some(help) = p.help_text.as_deref().or(p.prompt_text.as_deref()) {
            println!("    {help}");
        }
    }
    Ok(())
}
