//! `rendition init`: Scaffold a data directory.

use std::path::Path;

use anyhow::Context;
use clap::Args;
use rendition_common::constants::ENGINE_HOME_DIR;
use rendition_engine::descriptor::write_descriptor;

use super::GlobalArgs;

/// File name of the scaffolded sample template.
pub const SAMPLE_TEMPLATE: &str = "sample.rpt";

const SAMPLE_DESCRIPTOR: &str = r#"{
  "title": "Regional sales",
  "description": "Sales per city for one year",
  "parameters": [
    { "name": "year", "type": "decimal", "default_value": "2024",
      "prompt_text": "Fiscal year" },
    { "name": "audited", "control": "check-box", "type": "boolean", "default_value": "false" },
    { "group": "place", "cascading": true,
      "members": [
        { "name": "country", "control": "list-box", "default_value": "FR" },
        { "name": "city", "control": "list-box", "default_value": "Paris" }
      ],
      "rows": [["FR", "Paris"], ["FR", "Lyon"], ["DE", "Berlin"], ["DE", "Hamburg"]] }
  ],
  "body": [
    "Regional sales ${year}",
    "Country: ${country}",
    "City: ${city}",
    "Audited: ${audited}",
    "\f",
    "Prepared for ${recipient}"
  ]
}
"#;

/// Arguments for the `init` command.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing sample template.
    #[arg(long)]
    pub force: bool,
}

/// Executes the `init` command.
///
/// # Errors
///
/// Returns an error if the directories or the sample cannot be written.
pub fn execute(global: &GlobalArgs, args: InitArgs) -> anyhow::Result<()> {
    let data_dir = global.data_dir();
    scaffold(&data_dir, args.force)?;
    println!("Initialized {}", data_dir.display());
    Ok(())
}

fn scaffold(data_dir: &Path, force: bool) -> anyhow::Result<()> {
    let engine_home = data_dir.join(ENGINE_HOME_DIR);
    std::fs::create_dir_all(&engine_home)
        .with_context(|| format!("creating {}", engine_home.display()))?;

    if data_dir.join(SAMPLE_TEMPLATE).exists() && !force {
        tracing::info!(template = SAMPLE_TEMPLATE, "sample template exists, keeping it");
        return Ok(());
    }
    let path = write_descriptor(data_dir, SAMPLE_TEMPLATE, SAMPLE_DESCRIPTOR)?;
    tracing::info!(path = %path.display(), "sample template written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use rendition_common::types::{OutputFormat, ParameterValue};
    use rendition_service::pipeline::{RenderRequest, ViewRequest};

    use super::*;

    fn global(dir: &Path) -> GlobalArgs {
        GlobalArgs {
            data_dir: Some(dir.to_path_buf()),
            config: None,
            image_base_url: None,
            skip_invalid: false,
        }
    }

    #[test]
    fn scaffold_keeps_existing_sample_unless_forced() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(SAMPLE_TEMPLATE), "{}").expect("write");

        scaffold(dir.path(), false).expect("scaffold");
        assert_eq!(
            std::fs::read_to_string(dir.path().join(SAMPLE_TEMPLATE)).expect("read"),
            "{}"
        );
        assert!(dir.path().join(ENGINE_HOME_DIR).is_dir());

        scaffold(dir.path(), true).expect("scaffold");
        assert!(
            std::fs::read_to_string(dir.path().join(SAMPLE_TEMPLATE))
                .expect("read")
                .contains("Regional sales")
        );
    }

    #[test]
    fn scaffolded_sample_renders_end_to_end() {
        let dir = tempfile::tempdir().expect("tempdir");
        scaffold(dir.path(), false).expect("scaffold");
        let global = global(dir.path());

        let (listed, document, pdf, html) = global
            .with_service(|service| {
                let listed = service.list_reports()?;
                let document = service.render(
                    &RenderRequest::new(SAMPLE_TEMPLATE)
                        .with_parameter("year", "2025")
                        .with_parameter("city", "Lyon"),
                )?;
                let pdf = service.view(&ViewRequest::new(SAMPLE_TEMPLATE, OutputFormat::Pdf))?;
                let html = service.view(
                    &ViewRequest::new(SAMPLE_TEMPLATE, OutputFormat::Html)
                        .with_parameter("recipient", ParameterValue::String("Board".into())),
                )?;
                Ok((listed, document, pdf, html))
            })
            .expect("session");

        assert_eq!(listed.len(), 1);
        let entry = &listed[0];
        assert_eq!(entry.title, "Regional sales");
        let city = entry.parameter("city").expect("city");
        assert_eq!(city.group_name.as_deref(), Some("place"));
        let cities: Vec<&str> = city
            .selection_list
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|c| c.value.as_str())
            .collect();
        assert_eq!(cities, vec!["Paris", "Lyon"]);

        let output = dir.path().join("output");
        assert_eq!(document, "sample.rpt.rptdoc");
        assert!(output.join(&document).is_file());
        assert_eq!(pdf, "sample.pdf");
        assert!(
            std::fs::read(output.join(&pdf))
                .expect("pdf")
                .starts_with(b"%PDF-")
        );
        assert_eq!(html, "sample.html");
        let page = std::fs::read_to_string(output.join(&html)).expect("html");
        assert!(page.contains("Regional sales 2025"));
        assert!(page.contains("City: Lyon"));
        assert!(page.contains("Prepared for Board"));
    }
}
