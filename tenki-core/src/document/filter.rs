//! Declarative keep/drop filters applied while a document is parsed

use std::collections::BTreeMap;

use serde_json::Value;

/// Filter node shaped like the document it is applied to
///
/// Built from filter JSON text: `true` keeps a value with its whole subtree,
/// `false` drops it, an object lists the keys to keep and an array holds the
/// filter applied to every element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterSpec {
    /// Keep the value and everything below it
    Keep,
    /// Drop the value
    Drop,
    /// Keep only the listed keys of an object
    Object(BTreeMap<String, FilterSpec>),
    /// Apply the inner filter to every element of an array
    Array(Box<FilterSpec>),
}

static DROP: FilterSpec = FilterSpec::Drop;
static KEEP: FilterSpec = FilterSpec::Keep;

/// Errors building a filter from JSON text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("filter is not valid JSON: {0}")]
    Syntax(String),
    #[error("unsupported filter node at {0}")]
    Unsupported(String),
}

impl FilterSpec {
    /// Build a filter from its JSON text
    pub fn from_json(text: &str) -> Result<Self, FilterError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| FilterError::Syntax(e.to_string()))?;
        Self::from_value(&value, "$")
    }

    fn from_value(value: &Value, at: &str) -> Result<Self, FilterError> {
        match value {
            Value::Bool(true) => Ok(FilterSpec::Keep),
            Value::Bool(false) => Ok(FilterSpec::Drop),
            Value::Object(map) => {
                let mut fields = BTreeMap::new();
                for (key, node) in map {
                    let child = Self::from_value(node, &format!("{at}.{key}"))?;
                    fields.insert(key.clone(), child);
                }
                Ok(FilterSpec::Object(fields))
            }
            // Only the first element of an array filter is meaningful
            Value::Array(items) => match items.first() {
                Some(first) => Ok(FilterSpec::Array(Box::new(Self::from_value(
                    first,
                    &format!("{at}[0]"),
                )?))),
                None => Ok(FilterSpec::Drop),
            },
            _ => Err(FilterError::Unsupported(at.to_owned())),
        }
    }

    /// Filter keeping exactly one top-level key
    pub fn keep_key(key: &str) -> Self {
        Self::keep_keys([key])
    }

    /// Filter keeping the given top-level keys
    pub fn keep_keys<'k>(keys: impl IntoIterator<Item = &'k str>) -> Self {
        FilterSpec::Object(
            keys.into_iter()
                .map(|key| (key.to_owned(), FilterSpec::Keep))
                .collect(),
        )
    }

    /// Filter to apply to the value stored under `key`
    pub fn field(&self, key: &str) -> &FilterSpec {
        match self {
            FilterSpec::Keep => &KEEP,
            FilterSpec::Object(fields) => fields.get(key).unwrap_or(&DROP),
            FilterSpec::Drop | FilterSpec::Array(_) => &DROP,
        }
    }

    /// Filter to apply to each array element
    pub fn element(&self) -> &FilterSpec {
        match self {
            FilterSpec::Keep => &KEEP,
            FilterSpec::Array(inner) => inner,
            FilterSpec::Drop | FilterSpec::Object(_) => &DROP,
        }
    }

    /// Check if the filter drops everything
    pub fn is_drop(&self) -> bool {
        matches!(self, FilterSpec::Drop)
    }

    /// Check if the filter keeps scalar values
    pub fn keeps_scalars(&self) -> bool {
        matches!(self, FilterSpec::Keep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_shapes() {
        let filter = FilterSpec::from_json(r#"[{"a":true,"b":{"c":false}}]"#).unwrap();
        let element = filter.element();
        assert_eq!(element.field("a"), &FilterSpec::Keep);
        assert!(element.field("b").field("c").is_drop());
        assert!(element.field("zzz").is_drop());
    }

    #[test]
    fn test_keep_key() {
        let filter = FilterSpec::keep_key("100");
        assert_eq!(filter.field("100"), &FilterSpec::Keep);
        assert!(filter.field("101").is_drop());
    }

    #[test]
    fn test_empty_array_filter_drops() {
        assert_eq!(FilterSpec::from_json("[]").unwrap(), FilterSpec::Drop);
    }

    #[test]
    fn test_rejects_scalar_nodes() {
        assert_eq!(
            FilterSpec::from_json(r#"{"a":1}"#),
            Err(FilterError::Unsupported("$.a".into()))
        );
        assert!(matches!(
            FilterSpec::from_json("{"),
            Err(FilterError::Syntax(_))
        ));
    }

    #[test]
    fn test_keep_propagates() {
        assert_eq!(FilterSpec::Keep.field("x"), &FilterSpec::Keep);
        assert_eq!(FilterSpec::Keep.element(), &FilterSpec::Keep);
    }
}
