//! `rendition render`: Run a template into a persisted document.

use clap::Args;
use rendition_service::pipeline::RenderRequest;

use super::GlobalArgs;
use crate::output::{assignments, parse_assignment};

/// Arguments for the `render` command.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Template file name, e.g. `sales.rpt`.
    pub template: String,

    /// Parameter value as NAME=VALUE; repeatable.
    #[arg(short = 'p', long = "param", value_parser = parse_assignment)]
    pub parameters: Vec<(String, String)>,
}

/// Executes the `render` command and prints the document path.
///
/// # Errors
///
/// Returns an error if the catalog cannot be built, a parameter is invalid,
/// or the engine fails.
pub fn execute(global: &GlobalArgs, args: RenderArgs) -> anyhow::Result<()> {
    let request = RenderRequest {
        template: args.template,
        parameters: assignments(args.parameters),
    };
    let path = global.with_service(|service| {
        let artifact = service.render(&request)?;
        Ok(service.output_path(&artifact))
    })?;
    println!("{}", path.display());
    Ok(())
}
