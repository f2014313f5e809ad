//! Domain primitive types used across the Rendition workspace.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::{NO_DESCRIPTION, NO_TITLE};

/// Calendar-date format accepted and produced for `DateTime` parameters.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A typed value bound to a report parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ParameterValue {
    /// Free text, passed through unchanged.
    String(String),
    /// A 64-bit signed integer.
    Number(i64),
    /// A calendar date without time of day or zone.
    DateTime(NaiveDate),
    /// A boolean flag.
    Boolean(bool),
}

/// Canonical string encoding: strings verbatim, numbers in decimal,
/// dates as `YYYY-MM-DD`, booleans as `true`/`false`.
impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::DateTime(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Self::Boolean(b) => write!(f, "{b}"),
        }
    }
}

/// Parameter values bound to one engine call, keyed by parameter name.
pub type BoundParameters = BTreeMap<String, ParameterValue>;

/// How a parameter is presented to the person filling it in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayKind {
    /// Free-form text entry.
    Textbox,
    /// Drop-down list backed by a selection list.
    Listbox,
    /// Radio buttons backed by a selection list.
    RadioButton,
    /// Check box.
    Checkbox,
}

impl fmt::Display for DisplayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Textbox => write!(f, "textbox"),
            Self::Listbox => write!(f, "listbox"),
            Self::RadioButton => write!(f, "radio_button"),
            Self::Checkbox => write!(f, "checkbox"),
        }
    }
}

/// Declared data type of a parameter; decides how raw input is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Text.
    String,
    /// Integer input (engine decimal and float types narrow to this).
    Number,
    /// Calendar date (engine date and date-time types map here).
    DateTime,
    /// Boolean flag.
    Boolean,
    /// Anything else; raw input passes through.
    Any,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Number => write!(f, "number"),
            Self::DateTime => write!(f, "datetime"),
            Self::Boolean => write!(f, "boolean"),
            Self::Any => write!(f, "any"),
        }
    }
}

/// One `(value, label)` choice offered by a selection list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionItem {
    /// Value bound when this choice is picked.
    pub value: String,
    /// Human-readable label.
    pub label: String,
}

impl SelectionItem {
    /// Creates a selection item.
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Declared metadata for one report input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSchema {
    name: String,
    /// Presentation control.
    pub display_kind: DisplayKind,
    /// Declared data type.
    pub data_type: DataType,
    /// Help text shown next to the input.
    pub help_text: Option<String>,
    /// Prompt text shown as the input's caption.
    pub prompt_text: Option<String>,
    /// Display name declared by the template author.
    pub display_name: Option<String>,
    /// Engine display format code (e.g. `>` for upper case).
    pub display_format: Option<String>,
    /// Engine-declared default value, in its raw form.
    pub default_value: Option<String>,
    /// Ordered choices for list-backed controls.
    pub selection_list: Option<Vec<SelectionItem>>,
    /// Name of the parameter group this parameter belongs to.
    pub group_name: Option<String>,
    /// Whether the parameter is hidden from prompts.
    pub hidden: bool,
    /// Whether an empty string is accepted.
    pub allow_blank: bool,
    /// Whether a null value is accepted.
    pub allow_null: bool,
    /// Whether entry should be concealed (passwords and similar).
    pub concealed: bool,
}

impl ParameterSchema {
    /// Creates a schema with the given name and types and no optional attributes.
    #[must_use]
    pub fn new(name: impl Into<String>, display_kind: DisplayKind, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            display_kind,
            data_type,
            help_text: None,
            prompt_text: None,
            display_name: None,
            display_format: None,
            default_value: None,
            selection_list: None,
            group_name: None,
            hidden: false,
            allow_blank: false,
            allow_null: false,
            concealed: false,
        }
    }

    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Catalog record describing one discovered template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateCatalogEntry {
    /// Template file name; primary key of the catalog.
    pub file_name: String,
    /// Report title.
    pub title: String,
    /// Report description.
    pub description: String,
    /// Parameters in extraction order.
    pub parameters: Vec<ParameterSchema>,
}

impl TemplateCatalogEntry {
    /// Creates an entry with default title and description and no parameters.
    #[must_use]
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            title: NO_TITLE.to_string(),
            description: NO_DESCRIPTION.to_string(),
            parameters: Vec::new(),
        }
    }

    /// Looks up a parameter schema by name.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&ParameterSchema> {
        self.parameters.iter().find(|p| p.name() == name)
    }
}

/// Lifecycle state of the report catalog service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    /// Constructed, catalog not yet built.
    #[default]
    Uninitialized,
    /// Catalog built; render and view are available.
    Created,
    /// Started; render and view are available.
    Started,
    /// Stopped; new calls are rejected.
    Stopped,
    /// Engine released; terminal.
    Destroyed,
}

impl ServiceState {
    /// Returns whether catalog reads, render, and view are permitted.
    #[must_use]
    pub const fn is_serving(self) -> bool {
        matches!(self, Self::Created | Self::Started)
    }

    /// Returns whether the lifecycle has arrived at `target` or moved past it.
    /// Variants are declared in lifecycle order.
    #[must_use]
    pub const fn has_reached(self, target: Self) -> bool {
        self as u8 >= target as u8
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Created => write!(f, "created"),
            Self::Started => write!(f, "started"),
            Self::Stopped => write!(f, "stopped"),
            Self::Destroyed => write!(f, "destroyed"),
        }
    }
}

/// Target format of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Single HTML page.
    Html,
    /// PDF document.
    Pdf,
}

impl OutputFormat {
    /// File extension of artifacts in this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Pdf => "pdf",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "pdf" => Ok(Self::Pdf),
            other => Err(format!("unsupported output format: {other}")),
        }
    }
}
