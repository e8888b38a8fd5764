//! GraphQL name formatting.
//!
//! Synthesized names are derived by joining their parts with `_` and converting the result
//! to the target case, so `PostFields` + `repeaterTest` becomes `PostFieldsRepeaterTest`.

use apollo_compiler::Name;
use heck::ToLowerCamelCase;
use heck::ToUpperCamelCase;

use crate::error::CompileError;

/// Formats a type name: `post fields` -> `PostFields`.
pub fn format_type_name(raw: &str) -> String {
    raw.to_upper_camel_case()
}

/// Formats a field name: `repeater_test` -> `repeaterTest`.
pub fn format_field_name(raw: &str) -> String {
    raw.to_lower_camel_case()
}

/// Formats the name of a type nested inside `owner`, such as a repeater row type.
pub fn nested_type_name(owner: &str, field: &str) -> String {
    format_type_name(&format!("{owner}_{field}"))
}

/// Formats `raw` as a type name and checks it against the GraphQL name grammar.
pub fn type_name(raw: &str) -> Result<Name, CompileError> {
    to_name(raw, format_type_name(raw))
}

/// Formats `raw` as a field name and checks it against the GraphQL name grammar.
pub fn field_name(raw: &str) -> Result<Name, CompileError> {
    to_name(raw, format_field_name(raw))
}

/// Checks a configured name, such as a support type name, without reformatting it.
pub fn exact_name(raw: &str) -> Result<Name, CompileError> {
    to_name(raw, raw.to_string())
}

fn to_name(raw: &str, formatted: String) -> Result<Name, CompileError> {
    Name::new(&formatted).map_err(|_| CompileError::InvalidName {
        raw: raw.to_string(),
    })
}
