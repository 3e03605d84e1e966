// GraphQL envelope types
//
// The analytics endpoint answers with `{ "data": ..., "errors": [...] }`.
// Both members are optional and may co-exist: a failing alias leaves an
// entry in `errors` while sibling aliases still populate `data`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Outbound request body.
#[derive(Debug, Serialize)]
pub struct GraphqlRequest<'a, V: Serialize> {
    pub query: &'a str,
    pub variables: &'a V,
}

/// Parsed response envelope.
///
/// `data` stays loosely typed: the section parsers in `flarestat-core`
/// walk it by candidate field paths, since names drift across schema revisions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphqlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, deserialize_with = "lenient_errors")]
    pub errors: Vec<GraphqlError>,
}

impl GraphqlResponse {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// `data` if present and not an empty object.
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref().filter(|d| match d {
            Value::Object(map) => !map.is_empty(),
            Value::Null => false,
            _ => true,
        })
    }

    /// The `data.viewer.zones[0]` root that every aliased sub-query hangs off.
    pub fn first_zone(&self) -> Option<&Value> {
        self.data()?
            .get("viewer")?
            .get("zones")?
            .as_array()?
            .first()
    }

    /// Error messages joined for a single log line.
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// One entry of the upstream `errors` list.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct GraphqlError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub path: Vec<Value>,
    #[serde(default)]
    pub extensions: Option<Value>,
}

impl std::fmt::Display for GraphqlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            return f.write_str(&self.message);
        }
        let path = self
            .path
            .iter()
            .map(|seg| match seg {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{} (at {path})", self.message)
    }
}

/// Accept `null`, a list of objects, a list of bare strings, or a single
/// object. Anything that isn't recognizable still becomes a message so it
/// shows up in logs instead of failing the whole envelope.
fn lenient_errors<'de, D>(deserializer: D) -> Result<Vec<GraphqlError>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let items = match raw {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => vec![other],
    };

    Ok(items
        .into_iter()
        .map(|item| match item {
            Value::String(message) => GraphqlError {
                message,
                ..GraphqlError::default()
            },
            Value::Object(_) => {
                serde_json::from_value(item.clone()).unwrap_or_else(|_| GraphqlError {
                    message: item.to_string(),
                    ..GraphqlError::default()
                })
            }
            other => GraphqlError {
                message: other.to_string(),
                ..GraphqlError::default()
            },
        })
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn null_errors_deserialize_to_empty() {
        let resp: GraphqlResponse =
            serde_json::from_value(json!({ "data": { "viewer": {} }, "errors": null })).unwrap();
        assert!(!resp.has_errors());
        assert!(resp.data().is_some());
    }

    #[test]
    fn string_errors_become_messages() {
        let resp: GraphqlResponse =
            serde_json::from_value(json!({ "errors": ["quota exceeded"] })).unwrap();
        assert_eq!(resp.errors.len(), 1);
        assert_eq!(resp.errors[0].message, "quota exceeded");
        assert!(resp.data().is_none());
    }

    #[test]
    fn error_display_includes_path() {
        let err = GraphqlError {
            message: "not authorized".into(),
            path: vec![json!("viewer"), json!("zones"), json!(0), json!("webToday")],
            extensions: None,
        };
        assert_eq!(err.to_string(), "not authorized (at viewer.zones.0.webToday)");
    }

    #[test]
    fn first_zone_walks_viewer_zones() {
        let resp: GraphqlResponse = serde_json::from_value(json!({
            "data": { "viewer": { "zones": [{ "countryToday": [] }] } }
        }))
        .unwrap();
        assert!(resp.first_zone().unwrap().get("countryToday").is_some());
    }

    #[test]
    fn first_zone_is_none_for_empty_zone_list() {
        let resp: GraphqlResponse =
            serde_json::from_value(json!({ "data": { "viewer": { "zones": [] } } })).unwrap();
        assert!(resp.first_zone().is_none());
    }

    #[test]
    fn empty_data_object_counts_as_absent() {
        let resp: GraphqlResponse = serde_json::from_value(json!({ "data": {} })).unwrap();
        assert!(resp.data().is_none());
    }
}
