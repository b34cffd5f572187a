#![forbid(unsafe_code)]

//! Serde bridge between typed schema values and store value trees.
//!
//! The store holds untyped [`Value`] trees; the schema crate defines the
//! typed shapes. Encoding goes through `serde_json::Value` so every
//! serde attribute (tags, renames, skipped fields) applies unchanged on
//! both sides.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use wording_store::Value;

use crate::error::StudioError;

/// Encode a typed value into a store value tree.
pub fn encode<T: Serialize>(value: &T) -> Result<Value, StudioError> {
    Ok(Value::from_json(serde_json::to_value(value)?))
}

/// Decode a store value tree into a typed value.
pub fn decode<T: DeserializeOwned>(value: &Value) -> Result<T, StudioError> {
    Ok(serde_json::from_value(value.to_json())?)
}

/// Decode, degrading to `None` on failure with a warning naming the
/// location. Used on read paths where a transiently inconsistent tree
/// must not take the editor down.
#[must_use]
pub fn decode_soft<T: DeserializeOwned>(value: &Value, context: &str) -> Option<T> {
    match decode(value) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            warn!(
                target: "wording.studio",
                context = %context,
                error = %err,
                "undecodable store value, treating as absent"
            );
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use wording_schema::ParamDef;

    #[test]
    fn typed_round_trip_preserves_tags() {
        let params = BTreeMap::from([
            ("count".to_string(), ParamDef::Number),
            (
                "SIZE".to_string(),
                ParamDef::Constant {
                    name: "SIZE".to_string(),
                },
            ),
        ]);
        let value = encode(&params).unwrap();
        assert_eq!(
            value.to_json(),
            serde_json::json!({
                "SIZE": { "type": "constant", "name": "SIZE" },
                "count": { "type": "number" }
            })
        );
        let back: BTreeMap<String, ParamDef> = decode(&value).unwrap();
        assert_eq!(back, params);
    }

    #[test]
    fn soft_decode_degrades_to_none() {
        let value = Value::from("not a map");
        let decoded: Option<BTreeMap<String, ParamDef>> = decode_soft(&value, "test");
        assert!(decoded.is_none());
    }
}
