//! Parameter metadata extraction.
//!
//! Walks the engine's definition list for a compiled template and produces
//! the ordered [`ParameterSchema`] sequence stored in the catalog. Selection
//! lists are requested only for list-backed controls. Members of a cascading
//! group are keyed by the declared defaults of the members before them.

use std::collections::HashSet;

use rendition_common::error::{ReportError, Result};
use rendition_common::types::{DataType, DisplayKind, ParameterSchema, TemplateCatalogEntry};
use rendition_engine::definition::{
    ControlType, GroupDefinition, ParameterDefinition, ScalarDefinition, ScalarType,
};
use rendition_engine::engine::ReportEngine;

/// Maps an engine control type onto a display kind.
#[must_use]
pub const fn display_kind(control: ControlType) -> DisplayKind {
    match control {
        ControlType::ListBox => DisplayKind::Listbox,
        ControlType::RadioButton => DisplayKind::RadioButton,
        ControlType::CheckBox => DisplayKind::Checkbox,
        ControlType::TextBox | ControlType::Unrecognized => DisplayKind::Textbox,
    }
}

/// Maps an engine scalar type onto a data type.
#[must_use]
pub const fn data_type(scalar: ScalarType) -> DataType {
    match scalar {
        ScalarType::String => DataType::String,
        ScalarType::Float | ScalarType::Decimal => DataType::Number,
        ScalarType::Date | ScalarType::DateTime => DataType::DateTime,
        ScalarType::Boolean => DataType::Boolean,
        ScalarType::Any | ScalarType::Integer | ScalarType::Time | ScalarType::Unrecognized => {
            DataType::Any
        }
    }
}

/// Where a scalar sits, which decides how its selection list is fetched.
enum Placement<'a> {
    Standalone,
    Group(&'a GroupDefinition),
    Cascading {
        group: &'a GroupDefinition,
        position: usize,
    },
}

/// Extracts parameter schemas from compiled templates.
pub struct ParameterMetadataExtractor<'a, E: ReportEngine> {
    engine: &'a E,
}

impl<'a, E: ReportEngine> ParameterMetadataExtractor<'a, E> {
    /// Creates an extractor over `engine`.
    pub const fn new(engine: &'a E) -> Self {
        Self { engine }
    }

    /// Builds the catalog entry of a compiled template.
    ///
    /// # Errors
    ///
    /// Returns an error if parameter extraction fails.
    pub fn catalog_entry(
        &self,
        file_name: &str,
        template: &E::Template,
    ) -> Result<TemplateCatalogEntry> {
        let mut entry = TemplateCatalogEntry::new(file_name);
        if let Some(title) = self.engine.title(template) {
            entry.title = title;
        }
        if let Some(description) = self.engine.description(template) {
            entry.description = description;
        }
        entry.parameters = self.extract(file_name, template)?;
        Ok(entry)
    }

    /// Returns the template's parameters in declaration order, group members
    /// in group order.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Engine`] if the engine cannot describe the
    /// template or a selection list, and [`ReportError::Extraction`] if a
    /// parameter name is declared twice.
    pub fn extract(&self, file_name: &str, template: &E::Template) -> Result<Vec<ParameterSchema>> {
        let definitions = self
            .engine
            .parameter_definitions(template)
            .map_err(|source| ReportError::Engine {
                operation: "describe parameters of",
                template: file_name.to_string(),
                source,
            })?;

        let mut schemas = Vec::new();
        let mut seen = HashSet::new();
        for definition in &definitions {
            match definition {
                ParameterDefinition::Scalar(scalar) => {
                    let schema = self.scalar(file_name, template, scalar, &Placement::Standalone)?;
                    push_unique(file_name, &mut seen, &mut schemas, schema)?;
                }
                ParameterDefinition::Group(group) => {
                    for (position, member) in group.members.iter().enumerate() {
                        let placement = if group.cascading {
                            Placement::Cascading { group, position }
                        } else {
                            Placement::Group(group)
                        };
                        let schema = self.scalar(file_name, template, member, &placement)?;
                        push_unique(file_name, &mut seen, &mut schemas, schema)?;
                    }
                }
            }
        }
        Ok(schemas)
    }

    fn scalar(
        &self,
        file_name: &str,
        template: &E::Template,
        scalar: &ScalarDefinition,
        placement: &Placement<'_>,
    ) -> Result<ParameterSchema> {
        let mut schema = ParameterSchema::new(
            scalar.name.clone(),
            display_kind(scalar.control),
            data_type(scalar.data_type),
        );
        schema.help_text.clone_from(&scalar.help_text);
        schema.prompt_text.clone_from(&scalar.prompt_text);
        schema.display_name.clone_from(&scalar.display_name);
        schema.display_format.clone_from(&scalar.display_format);
        schema.default_value.clone_from(&scalar.default_value);
        schema.hidden = scalar.hidden;
        schema.allow_blank = scalar.allow_blank;
        schema.allow_null = scalar.allow_null;
        schema.concealed = scalar.concealed;

        schema.group_name = match placement {
            Placement::Standalone => None,
            Placement::Group(group) | Placement::Cascading { group, .. } => {
                Some(group.name.clone())
            }
        };

        if schema.display_kind != DisplayKind::Textbox {
            let listed = match placement {
                Placement::Standalone | Placement::Group(_) => {
                    self.engine.selection_list(template, &scalar.name)
                }
                Placement::Cascading { group, position } => {
                    let key: Vec<Option<String>> = group.members[..*position]
                        .iter()
                        .map(|m| m.default_value.clone())
                        .collect();
                    self.engine.cascading_selection_list(template, &group.name, &key)
                }
            };
            schema.selection_list = listed.map_err(|source| ReportError::Engine {
                operation: "list choices of",
                template: file_name.to_string(),
                source,
            })?;
        }

        tracing::debug!(
            template = file_name,
            parameter = schema.name(),
            display_kind = %schema.display_kind,
            data_type = %schema.data_type,
            group = schema.group_name.as_deref(),
            default_value = schema.default_value.as_deref(),
            hidden = schema.hidden,
            allow_blank = schema.allow_blank,
            allow_null = schema.allow_null,
            concealed = schema.concealed,
            choices = schema.selection_list.as_ref().map_or(0, Vec::len),
            "parameter extracted"
        );
        Ok(schema)
    }
}

fn push_unique(
    file_name: &str,
    seen: &mut HashSet<String>,
    schemas: &mut Vec<ParameterSchema>,
    schema: ParameterSchema,
) -> Result<()> {
    if !seen.insert(schema.name().to_string()) {
        return Err(ReportError::Extraction {
            template: file_name.to_string(),
            message: format!("parameter {} is declared more than once", schema.name()),
        });
    }
    schemas.push(schema);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Mutex;

    use rendition_common::error::{EngineError, EngineResult};
    use rendition_common::types::{BoundParameters, SelectionItem};
    use rendition_engine::context::ExecutionContext;
    use rendition_engine::options::RenderOptions;

    use super::*;

    /// Engine whose only template is the definition list it was built with.
    #[derive(Default)]
    struct FixedEngine {
        definitions: Vec<ParameterDefinition>,
        title: Option<String>,
        fail_lists: bool,
        keyless: Mutex<Vec<String>>,
        cascading: Mutex<Vec<(String, Vec<Option<String>>)>>,
    }

    impl ReportEngine for FixedEngine {
        type Template = ();
        type Document = ();

        fn startup(&self, _home: &Path) -> EngineResult<()> {
            Ok(())
        }

        fn shutdown(&self) {}

        fn compile(&self, _path: &Path) -> EngineResult<()> {
            Ok(())
        }

        fn title(&self, _template: &()) -> Option<String> {
            self.title.clone()
        }

        fn description(&self, _template: &()) -> Option<String> {
            None
        }

        fn parameter_definitions(&self, _template: &()) -> EngineResult<Vec<ParameterDefinition>> {
            Ok(self.definitions.clone())
        }

        fn selection_list(
            &self,
            _template: &(),
            parameter: &str,
        ) -> EngineResult<Option<Vec<SelectionItem>>> {
            if self.fail_lists {
                return Err(EngineError::Parameter {
                    name: parameter.into(),
                    message: "query failed".into(),
                });
            }
            self.keyless.lock().unwrap().push(parameter.to_string());
            Ok(Some(vec![SelectionItem::new("v", parameter)]))
        }

        fn cascading_selection_list(
            &self,
            _template: &(),
            group: &str,
            key: &[Option<String>],
        ) -> EngineResult<Option<Vec<SelectionItem>>> {
            self.cascading
                .lock()
                .unwrap()
                .push((group.to_string(), key.to_vec()));
            Ok(Some(vec![SelectionItem::new(key.len().to_string(), group)]))
        }

        fn execute(
            &self,
            _template: &(),
            _context: &ExecutionContext,
            _parameters: &BoundParameters,
            _document_path: &Path,
        ) -> EngineResult<()> {
            Ok(())
        }

        fn open_document(&self, _path: &Path) -> EngineResult<()> {
            Ok(())
        }

        fn render_document(
            &self,
            _document: &(),
            _context: &ExecutionContext,
            _parameters: &BoundParameters,
            _options: &RenderOptions,
        ) -> EngineResult<()> {
            Ok(())
        }
    }

    fn listbox(name: &str, default: &str) -> ScalarDefinition {
        ScalarDefinition::new(name, ControlType::ListBox, ScalarType::String).with_default(default)
    }

    #[test]
    fn type_mappings_fall_back_closed() {
        assert_eq!(display_kind(ControlType::Unrecognized), DisplayKind::Textbox);
        assert_eq!(display_kind(ControlType::RadioButton), DisplayKind::RadioButton);
        assert_eq!(data_type(ScalarType::Decimal), DataType::Number);
        assert_eq!(data_type(ScalarType::Date), DataType::DateTime);
        assert_eq!(data_type(ScalarType::Integer), DataType::Any);
        assert_eq!(data_type(ScalarType::Time), DataType::Any);
        assert_eq!(data_type(ScalarType::Unrecognized), DataType::Any);
    }

    #[test]
    fn textbox_scalars_get_no_selection_list() {
        let mut scalar = ScalarDefinition::new("note", ControlType::TextBox, ScalarType::String);
        scalar.help_text = Some("free text".into());
        scalar.concealed = true;
        let engine = FixedEngine {
            definitions: vec![ParameterDefinition::Scalar(scalar)],
            ..FixedEngine::default()
        };

        let schemas = ParameterMetadataExtractor::new(&engine)
            .extract("t.rpt", &())
            .expect("extract");
        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas[0].name(), "note");
        assert_eq!(schemas[0].help_text.as_deref(), Some("free text"));
        assert!(schemas[0].concealed);
        assert!(schemas[0].selection_list.is_none());
        assert!(engine.keyless.lock().unwrap().is_empty());
    }

    #[test]
    fn cascading_members_are_keyed_by_preceding_defaults() {
        let engine = FixedEngine {
            definitions: vec![ParameterDefinition::Group(GroupDefinition {
                name: "geo".into(),
                cascading: true,
                members: vec![listbox("A", "EU"), listbox("B", "FR"), listbox("C", "Paris")],
            })],
            ..FixedEngine::default()
        };

        let schemas = ParameterMetadataExtractor::new(&engine)
            .extract("t.rpt", &())
            .expect("extract");
        let keys = engine.cascading.lock().unwrap().clone();
        assert_eq!(
            keys,
            vec![
                ("geo".to_string(), vec![]),
                ("geo".to_string(), vec![Some("EU".to_string())]),
                (
                    "geo".to_string(),
                    vec![Some("EU".to_string()), Some("FR".to_string())]
                ),
            ]
        );
        assert!(schemas.iter().all(|s| s.group_name.as_deref() == Some("geo")));
        assert!(engine.keyless.lock().unwrap().is_empty());
    }

    #[test]
    fn plain_group_members_use_keyless_lists() {
        let engine = FixedEngine {
            definitions: vec![ParameterDefinition::Group(GroupDefinition {
                name: "filters".into(),
                cascading: false,
                members: vec![listbox("x", "1"), listbox("y", "2")],
            })],
            ..FixedEngine::default()
        };

        let schemas = ParameterMetadataExtractor::new(&engine)
            .extract("t.rpt", &())
            .expect("extract");
        assert_eq!(*engine.keyless.lock().unwrap(), vec!["x", "y"]);
        assert_eq!(schemas[1].group_name.as_deref(), Some("filters"));
        assert!(engine.cascading.lock().unwrap().is_empty());
    }

    #[test]
    fn extraction_is_idempotent() {
        let engine = FixedEngine {
            definitions: vec![
                ParameterDefinition::Scalar(listbox("region", "EU")),
                ParameterDefinition::Scalar(ScalarDefinition::new(
                    "from",
                    ControlType::TextBox,
                    ScalarType::Date,
                )),
            ],
            ..FixedEngine::default()
        };
        let extractor = ParameterMetadataExtractor::new(&engine);
        let first = extractor.extract("t.rpt", &()).expect("first");
        let second = extractor.extract("t.rpt", &()).expect("second");
        assert_eq!(first, second);
    }

    #[test]
    fn duplicate_names_abort_extraction() {
        let engine = FixedEngine {
            definitions: vec![
                ParameterDefinition::Scalar(listbox("region", "EU")),
                ParameterDefinition::Group(GroupDefinition {
                    name: "g".into(),
                    cascading: false,
                    members: vec![listbox("region", "US")],
                }),
            ],
            ..FixedEngine::default()
        };
        assert!(matches!(
            ParameterMetadataExtractor::new(&engine).extract("t.rpt", &()),
            Err(ReportError::Extraction { .. })
        ));
    }

    #[test]
    fn selection_list_errors_propagate() {
        let engine = FixedEngine {
            definitions: vec![ParameterDefinition::Scalar(listbox("region", "EU"))],
            fail_lists: true,
            ..FixedEngine::default()
        };
        assert!(matches!(
            ParameterMetadataExtractor::new(&engine).extract("t.rpt", &()),
            Err(ReportError::Engine { source: EngineError::Parameter { .. }, .. })
        ));
    }

    #[test]
    fn catalog_entry_defaults_missing_metadata() {
        let engine = FixedEngine {
            title: Some("Sales".into()),
            ..FixedEngine::default()
        };
        let entry = ParameterMetadataExtractor::new(&engine)
            .catalog_entry("sales.rpt", &())
            .expect("entry");
        assert_eq!(entry.file_name, "sales.rpt");
        assert_eq!(entry.title, "Sales");
        assert_eq!(entry.description, "No description");
        assert!(entry.parameters.is_empty());
    }
}
