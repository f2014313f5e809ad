//! Conversion of raw string input into typed parameter values.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rendition_common::error::{ReportError, Result};
use rendition_common::types::{
    BoundParameters, DATE_FORMAT, DataType, ParameterSchema, ParameterValue, TemplateCatalogEntry,
};

/// Parses `raw` according to the schema's declared data type.
///
/// # Errors
///
/// Returns [`ReportError::Coercion`] if `raw` is not a valid literal of the
/// declared type.
pub fn coerce(schema: &ParameterSchema, raw: &str) -> Result<ParameterValue> {
    let failed = |reason: String| ReportError::Coercion {
        name: schema.name().to_string(),
        value: raw.to_string(),
        expected: schema.data_type,
        reason,
    };

    match schema.data_type {
        DataType::String | DataType::Any => Ok(ParameterValue::String(raw.to_string())),
        DataType::Number => raw
            .parse::<i64>()
            .map(ParameterValue::Number)
            .map_err(|e| failed(e.to_string())),
        DataType::DateTime => NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map(ParameterValue::DateTime)
            .map_err(|e| failed(e.to_string())),
        DataType::Boolean => {
            if raw.eq_ignore_ascii_case("true") {
                Ok(ParameterValue::Boolean(true))
            } else if raw.eq_ignore_ascii_case("false") {
                Ok(ParameterValue::Boolean(false))
            } else {
                Err(failed("expected true or false".into()))
            }
        }
    }
}

/// Coerces every supplied value against the template's declared parameters.
///
/// Parameters the caller did not supply stay absent.
///
/// # Errors
///
/// Returns [`ReportError::UnknownParameter`] for a name the template does not
/// declare, or the first coercion failure.
pub fn coerce_all(
    entry: &TemplateCatalogEntry,
    raw: &BTreeMap<String, String>,
) -> Result<BoundParameters> {
    raw.iter()
        .map(|(name, value)| {
            let schema = entry
                .parameter(name)
                .ok_or_else(|| ReportError::UnknownParameter {
                    template: entry.file_name.clone(),
                    name: name.clone(),
                })?;
            Ok((name.clone(), coerce(schema, value)?))
        })
        .collect()
}
