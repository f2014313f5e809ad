//! JSON template descriptors and the documents they run into.

use std::collections::BTreeMap;
use std::path::PathBuf;

use rendition_common::error::{EngineError, EngineResult};
use rendition_common::types::{BoundParameters, SelectionItem};
use serde::{Deserialize, Serialize};

use crate::definition::{GroupDefinition, ParameterDefinition, ScalarDefinition};

/// Line marking an explicit page break in a template body.
pub const PAGE_BREAK: &str = "\u{c}";

/// Line prefix embedding an image by file name.
pub const IMAGE_PREFIX: &str = "image:";

/// On-disk template descriptor.
///
/// ```json
/// {
///   "title": "Sales",
///   "parameters": [
///     { "name": "year", "type": "integer", "default_value": "2024" },
///     { "group": "place", "cascading": true,
///       "members": [
///         { "name": "country", "control": "list-box" },
///         { "name": "city", "control": "list-box" }
///       ],
///       "rows": [["FR", "Paris"], ["FR", "Lyon"], ["DE", "Berlin"]] }
///   ],
///   "body": ["Sales for ${city} in ${year}"]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TemplateDescriptor {
    /// Report title.
    pub title: Option<String>,
    /// Report description.
    pub description: Option<String>,
    /// Parameters in declaration order.
    pub parameters: Vec<DescriptorEntry>,
    /// Body lines with `${name}` placeholders.
    pub body: Vec<String>,
}

/// A parameter entry of a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DescriptorEntry {
    /// A parameter group.
    Group(GroupDescriptor),
    /// A standalone scalar.
    Scalar(ScalarDescriptor),
}

/// A scalar parameter with an optional static selection list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScalarDescriptor {
    /// Engine-level definition.
    #[serde(flatten)]
    pub definition: ScalarDefinition,
    /// Static choices.
    #[serde(default)]
    pub choices: Vec<SelectionItem>,
}

/// A parameter group; cascading groups draw choices from `rows`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GroupDescriptor {
    /// Group name.
    pub group: String,
    /// Whether member choices cascade.
    #[serde(default)]
    pub cascading: bool,
    /// Members in declaration order.
    pub members: Vec<ScalarDescriptor>,
    /// Data rows, one column per member.
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

/// A template compiled by the descriptor engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledDescriptor {
    /// Source file.
    pub path: PathBuf,
    /// Parsed descriptor.
    pub descriptor: TemplateDescriptor,
}

impl CompiledDescriptor {
    /// Parses descriptor JSON read from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is not a valid descriptor.
    pub fn parse(path: PathBuf, content: &str) -> EngineResult<Self> {
        let descriptor = serde_json::from_str(content).map_err(|e| EngineError::Compile {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(Self { path, descriptor })
    }

    /// Converts the declared parameters to engine definitions.
    #[must_use]
    pub fn definitions(&self) -> Vec<ParameterDefinition> {
        self.descriptor
            .parameters
            .iter()
            .map(|entry| match entry {
                DescriptorEntry::Scalar(s) => ParameterDefinition::Scalar(s.definition.clone()),
                DescriptorEntry::Group(g) => ParameterDefinition::Group(GroupDefinition {
                    name: g.group.clone(),
                    cascading: g.cascading,
                    members: g.members.iter().map(|m| m.definition.clone()).collect(),
                }),
            })
            .collect()
    }

    fn scalars(&self) -> impl Iterator<Item = &ScalarDescriptor> {
        self.descriptor.parameters.iter().flat_map(|entry| match entry {
            DescriptorEntry::Scalar(s) => std::slice::from_ref(s).iter(),
            DescriptorEntry::Group(g) => g.members.iter(),
        })
    }

    /// Static choices of a parameter; `None` when it declares none.
    ///
    /// # Errors
    ///
    /// Returns an error if no parameter has that name.
    pub fn choices(&self, name: &str) -> EngineResult<Option<Vec<SelectionItem>>> {
        let scalar = self
            .scalars()
            .find(|s| s.definition.name == name)
            .ok_or_else(|| EngineError::Parameter {
                name: name.to_string(),
                message: "not declared by template".into(),
            })?;
        Ok((!scalar.choices.is_empty()).then(|| scalar.choices.clone()))
    }

    /// Distinct values of the column following `key` among rows matching it.
    ///
    /// A `None` key element matches every row.
    ///
    /// # Errors
    ///
    /// Returns an error if the group does not exist or the key is longer
    /// than the group allows.
    pub fn cascading_choices(
        &self,
        group: &str,
        key: &[Option<String>],
    ) -> EngineResult<Vec<SelectionItem>> {
        let entry = self
            .descriptor
            .parameters
            .iter()
            .find_map(|entry| match entry {
                DescriptorEntry::Group(g) if g.group == group => Some(g),
                _ => None,
            })
            .ok_or_else(|| EngineError::Parameter {
                name: group.to_string(),
                message: "no such parameter group".into(),
            })?;

        let column = key.len();
        if column >= entry.members.len() {
            return Err(EngineError::Parameter {
                name: group.to_string(),
                message: format!(
                    "key of length {column} exceeds group of {} members",
                    entry.members.len()
                ),
            });
        }

        let mut values: Vec<&str> = Vec::new();
        for row in &entry.rows {
            let matches = key.iter().enumerate().all(|(i, k)| {
                k.as_deref()
                    .is_none_or(|expected| row.get(i).map(String::as_str) == Some(expected))
            });
            if let Some(value) = row.get(column).filter(|_| matches) {
                if !values.contains(&value.as_str()) {
                    values.push(value);
                }
            }
        }
        Ok(values
            .into_iter()
            .map(|v| SelectionItem::new(v, v))
            .collect())
    }

    fn default_value(&self, name: &str) -> Option<String> {
        self.scalars()
            .find(|s| s.definition.name == name)
            .and_then(|s| s.definition.default_value.clone())
    }

    /// Runs the descriptor: placeholders are filled from `parameters`, then
    /// from declared defaults; anything else is left for the render phase.
    #[must_use]
    pub fn run(&self, parameters: &BoundParameters) -> DocumentArtifact {
        let lookup = |name: &str| {
            parameters
                .get(name)
                .map(ToString::to_string)
                .or_else(|| self.default_value(name))
        };
        DocumentArtifact {
            template: self.path.clone(),
            title: self.descriptor.title.clone().unwrap_or_default(),
            lines: self
                .descriptor
                .body
                .iter()
                .map(|line| substitute(line, &lookup))
                .collect(),
            parameters: parameters
                .iter()
                .map(|(k, v)| (k.clone(), v.to_string()))
                .collect(),
        }
    }
}

/// A document persisted by a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentArtifact {
    /// Template the document was produced from.
    pub template: PathBuf,
    /// Report title.
    pub title: String,
    /// Resolved body lines.
    pub lines: Vec<String>,
    /// Canonical encodings of the values bound at run time.
    pub parameters: BTreeMap<String, String>,
}

impl DocumentArtifact {
    /// Fills placeholders left open at run time from view-time `parameters`.
    #[must_use]
    pub fn resolve_lines(&self, parameters: &BoundParameters) -> Vec<String> {
        self.lines
            .iter()
            .map(|line| substitute(line, |name| parameters.get(name).map(ToString::to_string)))
            .collect()
    }
}

/// Replaces `${name}` placeholders for which `lookup` yields a value.
pub fn substitute(line: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let name = &after[..end];
        match lookup(name) {
            Some(value) => out.push_str(&value),
            None => out.push_str(&rest[start..start + 2 + end + 1]),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use rendition_common::types::ParameterValue;

    use super::*;

    const SAMPLE: &str = r#"{
        "title": "Sales",
        "parameters": [
            { "name": "year", "type": "integer", "default_value": "2024" },
            { "name": "unit", "control": "list-box",
              "choices": [ { "value": "eur", "label": "Euro" } ] },
            { "group": "place", "cascading": true,
              "members": [
                { "name": "country", "control": "list-box", "default_value": "FR" },
                { "name": "city", "control": "list-box" }
              ],
              "rows": [["FR", "Paris"], ["FR", "Lyon"], ["DE", "Berlin"], ["FR", "Paris"]] }
        ],
        "body": ["Sales for ${city} in ${year}", "Unit ${unit}"]
    }"#;

    fn sample() -> CompiledDescriptor {
        CompiledDescriptor::parse(PathBuf::from("sales.rpt"), SAMPLE).expect("parse")
    }

    #[test]
    fn definitions_keep_declaration_order_and_groups() {
        let defs = sample().definitions();
        assert_eq!(defs.len(), 3);
        assert!(matches!(&defs[0], ParameterDefinition::Scalar(s) if s.name == "year"));
        let ParameterDefinition::Group(g) = &defs[2] else {
            unreachable!("third entry is the place group");
        };
        assert!(g.cascading);
        assert_eq!(g.members.len(), 2);
        assert_eq!(g.members[0].default_value.as_deref(), Some("FR"));
    }

    #[test]
    fn static_choices_are_returned_for_listed_parameters() {
        let compiled = sample();
        let choices = compiled.choices("unit").expect("choices").expect("some");
        assert_eq!(choices, vec![SelectionItem::new("eur", "Euro")]);
        assert_eq!(compiled.choices("year").expect("choices"), None);
        assert!(compiled.choices("missing").is_err());
    }

    #[test]
    fn cascading_choices_filter_by_key_and_dedupe() {
        let compiled = sample();
        let countries = compiled.cascading_choices("place", &[]).expect("countries");
        assert_eq!(
            countries.iter().map(|c| c.value.as_str()).collect::<Vec<_>>(),
            vec!["FR", "DE"]
        );
        let cities = compiled
            .cascading_choices("place", &[Some("FR".into())])
            .expect("cities");
        assert_eq!(
            cities.iter().map(|c| c.value.as_str()).collect::<Vec<_>>(),
            vec!["Paris", "Lyon"]
        );
        let any_city = compiled.cascading_choices("place", &[None]).expect("all");
        assert_eq!(any_city.len(), 3);
    }

    #[test]
    fn cascading_choices_reject_overlong_key() {
        let compiled = sample();
        let key = [Some("FR".into()), Some("Paris".into())];
        assert!(compiled.cascading_choices("place", &key).is_err());
        assert!(compiled.cascading_choices("nope", &[]).is_err());
    }

    #[test]
    fn run_fills_values_then_defaults() {
        let mut params = BoundParameters::new();
        let _ = params.insert("city".into(), ParameterValue::String("Lyon".into()));
        let doc = sample().run(&params);
        assert_eq!(doc.title, "Sales");
        assert_eq!(doc.lines[0], "Sales for Lyon in 2024");
        assert_eq!(doc.lines[1], "Unit ${unit}");
        assert_eq!(doc.parameters.get("city").map(String::as_str), Some("Lyon"));
    }

    #[test]
    fn render_phase_fills_remaining_placeholders() {
        let doc = sample().run(&BoundParameters::new());
        let mut params = BoundParameters::new();
        let _ = params.insert("unit".into(), ParameterValue::String("eur".into()));
        let lines = doc.resolve_lines(&params);
        assert_eq!(lines[1], "Unit eur");
    }

    #[test]
    fn substitute_keeps_unknown_and_unterminated_placeholders() {
        let out = substitute("a ${x} b ${y} c ${z", |n| (n == "x").then(|| "1".to_string()));
        assert_eq!(out, "a 1 b ${y} c ${z");
    }

    #[test]
    fn invalid_json_is_a_compile_error() {
        let err = CompiledDescriptor::parse(PathBuf::from("bad.rpt"), "{").unwrap_err();
        assert!(matches!(err, EngineError::Compile { .. }));
    }
}
