//! Engine-level parameter definitions.
//!
//! These mirror what an engine declares for a compiled template. The catalog
//! service maps them onto [`ParameterSchema`](rendition_common::types::ParameterSchema).

use serde::{Deserialize, Serialize};

/// Presentation control declared by the engine for a scalar parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlType {
    /// Free-form text entry.
    #[default]
    TextBox,
    /// Drop-down list.
    ListBox,
    /// Radio button group.
    RadioButton,
    /// Check box.
    CheckBox,
    /// A control code this crate does not know.
    #[serde(other)]
    Unrecognized,
}

/// Data type declared by the engine for a scalar parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScalarType {
    /// Untyped.
    Any,
    /// Text.
    #[default]
    String,
    /// Floating-point number.
    Float,
    /// Fixed-point decimal.
    Decimal,
    /// Date with time of day.
    DateTime,
    /// Boolean.
    Boolean,
    /// Integer.
    Integer,
    /// Date only.
    Date,
    /// Time of day only.
    Time,
    /// A data-type code this crate does not know.
    #[serde(other)]
    Unrecognized,
}

/// A single scalar parameter as declared by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalarDefinition {
    /// Parameter name.
    pub name: String,
    /// Presentation control.
    pub control: ControlType,
    /// Declared data type.
    #[serde(rename = "type")]
    pub data_type: ScalarType,
    /// Help text.
    pub help_text: Option<String>,
    /// Prompt text.
    pub prompt_text: Option<String>,
    /// Display name.
    pub display_name: Option<String>,
    /// Display format code.
    pub display_format: Option<String>,
    /// Default value in raw form.
    pub default_value: Option<String>,
    /// Hidden from prompts.
    pub hidden: bool,
    /// Accepts an empty string.
    pub allow_blank: bool,
    /// Accepts a null value.
    pub allow_null: bool,
    /// Entry is concealed.
    pub concealed: bool,
}

impl ScalarDefinition {
    /// Creates a definition with the given name, control, and data type.
    #[must_use]
    pub fn new(name: impl Into<String>, control: ControlType, data_type: ScalarType) -> Self {
        Self {
            name: name.into(),
            control,
            data_type,
            ..Self::default()
        }
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

/// A named group of scalar parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDefinition {
    /// Group name.
    pub name: String,
    /// Whether later members' choices depend on earlier members' values.
    pub cascading: bool,
    /// Members in declaration order.
    pub members: Vec<ScalarDefinition>,
}

/// One entry of a template's flat parameter definition list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterDefinition {
    /// A standalone scalar.
    Scalar(ScalarDefinition),
    /// A group of scalars.
    Group(GroupDefinition),
}
