#![forbid(unsafe_code)]

//! Cross-product expansion of templated field names.
//!
//! A field named `"{SIZE}Label"` whose `SIZE` parameter references an
//! enum constant with options `S`, `M`, `L` denotes three concrete
//! fields: `SLabel`, `MLabel`, `LLabel`. Multiple placeholders expand
//! as a cross product in placeholder order. Resolution is soft: a
//! placeholder that cannot expand (missing constant, non-enum constant,
//! non-constant parameter type) yields zero possibilities rather than
//! an error, because the user may simply not have finished typing.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use wording_schema::{enum_options, extract_placeholders, Constant, ParamDef};

/// Substitute every `{...}` whose trimmed body equals `name`.
///
/// Reuses the extraction scanner's rules, so `{ SIZE }` and `{SIZE}`
/// both match a placeholder named `SIZE`.
fn substitute(text: &str, name: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut capture: Option<String> = None;
    for ch in text.chars() {
        match ch {
            '{' => {
                if let Some(body) = capture.take() {
                    // Restarted capture: the abandoned prefix is literal.
                    out.push('{');
                    out.push_str(&body);
                }
                capture = Some(String::new());
            }
            '}' => match capture.take() {
                Some(body) if body.trim() == name => out.push_str(replacement),
                Some(body) => {
                    out.push('{');
                    out.push_str(&body);
                    out.push('}');
                }
                None => out.push('}'),
            },
            _ => match capture.as_mut() {
                Some(buf) => buf.push(ch),
                None => out.push(ch),
            },
        }
    }
    if let Some(body) = capture {
        out.push('{');
        out.push_str(&body);
    }
    out
}

/// Expand a (possibly templated) field name into its concrete
/// possibilities.
///
/// A plain name expands to itself. Each placeholder with a matching
/// constant-typed parameter multiplies the result set by the referenced
/// enum's options; any unexpandable placeholder collapses the whole
/// expansion to zero possibilities.
#[must_use]
pub fn expand_field_name(
    template: &str,
    params: Option<&BTreeMap<String, ParamDef>>,
    constants: &[Constant],
) -> Vec<String> {
    let placeholders = extract_placeholders(template);
    if placeholders.is_empty() {
        return vec![template.to_string()];
    }
    let Some(params) = params else {
        debug!(
            target: "wording.expand",
            template,
            "templated name has no derived params yet"
        );
        return Vec::new();
    };

    let mut results = vec![template.to_string()];
    for placeholder in &placeholders {
        let options: &[String] = match params.get(placeholder) {
            Some(ParamDef::Constant { name }) => match enum_options(constants, name) {
                Some(options) => options,
                None => {
                    debug!(
                        target: "wording.expand",
                        template,
                        placeholder = %placeholder,
                        constant = %name,
                        "constant missing or not an enum, zero possibilities"
                    );
                    return Vec::new();
                }
            },
            Some(other) => {
                warn!(
                    target: "wording.expand",
                    template,
                    placeholder = %placeholder,
                    param_type = ?other,
                    "non-constant parameter in a field name cannot expand"
                );
                return Vec::new();
            }
            None => {
                debug!(
                    target: "wording.expand",
                    template,
                    placeholder = %placeholder,
                    "placeholder has no parameter definition"
                );
                return Vec::new();
            }
        };

        results = results
            .iter()
            .flat_map(|text| {
                options
                    .iter()
                    .map(|option| substitute(text, placeholder, option))
            })
            .collect();
    }
    results
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
