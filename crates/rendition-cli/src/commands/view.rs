//! `rendition view`: Render a persisted document as HTML or PDF.

use clap::Args;
use rendition_common::types::{BoundParameters, OutputFormat, ParameterValue};
use rendition_service::pipeline::ViewRequest;

use super::GlobalArgs;
use crate::output::parse_assignment;

/// Arguments for the `view` command.
#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Template file name; it must have been rendered first.
    pub template: String,

    /// Output format: `html` or `pdf`.
    #[arg(short, long, default_value = "html")]
    pub format: OutputFormat,

    /// Parameter value as NAME=VALUE, passed through as text; repeatable.
    #[arg(short = 'p', long = "param", value_parser = parse_assignment)]
    pub parameters: Vec<(String, String)>,
}

/// Executes the `view` command and prints the output path.
///
/// # Errors
///
/// Returns an error if the catalog cannot be built, the document is missing,
/// or the engine fails.
pub fn execute(global: &GlobalArgs, args: ViewArgs) -> anyhow::Result<()> {
    let parameters: BoundParameters = args
        .parameters
        .into_iter()
        .map(|(name, value)| (name, ParameterValue::String(value)))
        .collect();
    let request = ViewRequest {
        template: args.template,
        format: args.format,
        parameters,
        image_base_url: None,
    };
    let path = global.with_service(|service| {
        let artifact = service.view(&request)?;
        Ok(service.output_path(&artifact))
    })?;
    println!("{}", path.display());
    Ok(())
}
