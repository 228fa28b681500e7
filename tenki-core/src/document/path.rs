//! Schema paths into a parsed document
//!
//! A path is a sequence of `key`, `.key` and `[index]` segments, for example
//! `[0].timeSeries[0].areas[0].weatherCodes[0]`.

use serde_json::Value;

/// One step of a schema path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'p> {
    /// Object member
    Key(&'p str),
    /// Array element
    Index(usize),
}

/// A path segment that could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("field `{path}` missing at `{segment}`")]
pub struct MissingField {
    /// Full path that was requested
    pub path: String,
    /// Path prefix up to and including the failing segment
    pub segment: String,
}

/// Iterator over the segments of a path
///
/// Yields `Err(offset)` at the first malformed segment.
pub struct Segments<'p> {
    path: &'p str,
    offset: usize,
    failed: bool,
}

impl<'p> Segments<'p> {
    pub fn new(path: &'p str) -> Self {
        Self {
            path,
            offset: 0,
            failed: false,
        }
    }
}

impl<'p> Iterator for Segments<'p> {
    type Item = Result<(Segment<'p>, usize), usize>;

    /// Returns the segment and the offset just past it
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.path.len() {
            return None;
        }
        let start = self.offset;
        let rest = &self.path[start..];

        let parsed = if let Some(inner) = rest.strip_prefix('[') {
            inner.find(']').and_then(|close| {
                inner[..close]
                    .parse::<usize>()
                    .ok()
                    .map(|index| (Segment::Index(index), start + close + 2))
            })
        } else {
            let (body, skip) = match rest.strip_prefix('.') {
                Some(body) => (body, 1),
                None if start == 0 => (rest, 0),
                None => ("", 0),
            };
            let end = body.find(['.', '[']).unwrap_or(body.len());
            (end > 0).then(|| (Segment::Key(&body[..end]), start + skip + end))
        };

        match parsed {
            Some((segment, next)) => {
                self.offset = next;
                Some(Ok((segment, next)))
            }
            None => {
                self.failed = true;
                Some(Err(start))
            }
        }
    }
}

/// Walk `path` from `root`
pub fn extract<'d>(root: &'d Value, path: &str) -> Result<FieldValue<'d>, MissingField> {
    let missing = |end: usize| MissingField {
        path: path.to_owned(),
        segment: path[..end.max(1).min(path.len())].to_owned(),
    };

    let mut node = root;
    for step in Segments::new(path) {
        let (segment, end) = step.map_err(|at| missing(at + 1))?;
        let next = match segment {
            Segment::Key(key) => node.get(key),
            Segment::Index(index) => node.get(index),
        };
        node = next.ok_or_else(|| missing(end))?;
    }
    Ok(FieldValue(node))
}

/// A resolved value with lenient coercions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldValue<'d>(&'d Value);

impl<'d> FieldValue<'d> {
    /// Underlying JSON value
    pub fn raw(&self) -> &'d Value {
        self.0
    }

    /// Borrow as text if the value is a JSON string
    pub fn as_str(&self) -> Option<&'d str> {
        self.0.as_str()
    }

    /// Text form of a scalar
    ///
    /// Strings are returned as-is, numbers and booleans in their JSON
    /// spelling. `null` and containers become empty text.
    pub fn as_text(&self) -> String {
        match self.0 {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
        }
    }

    /// Numeric form of a number or numeric text
    ///
    /// Anything unparseable or non-finite yields `0.0`.
    pub fn as_f32(&self) -> f32 {
        let value = match self.0 {
            // Parse the shortest spelling directly so readings round-trip exactly
            Value::Number(n) => n.to_string().parse::<f32>().ok(),
            Value::String(s) => s.trim().parse::<f32>().ok(),
            _ => None,
        };
        value.filter(|v| v.is_finite()).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn forecast() -> Value {
        json!([{
            "publishingOffice": "大阪管区気象台",
            "timeSeries": [{
                "areas": [{
                    "area": {"name": "大阪府", "code": "270000"},
                    "weatherCodes": ["100", "201"]
                }]
            }]
        }])
    }

    #[test]
    fn test_segments() {
        let segments: Vec<_> = Segments::new("[0].timeSeries[2].name")
            .map(|s| s.unwrap().0)
            .collect();
        assert_eq!(
            segments,
            [
                Segment::Index(0),
                Segment::Key("timeSeries"),
                Segment::Index(2),
                Segment::Key("name"),
            ]
        );
        let bare: Vec<_> = Segments::new("field1").map(|s| s.unwrap().0).collect();
        assert_eq!(bare, [Segment::Key("field1")]);
    }

    #[test]
    fn test_malformed_segments() {
        assert!(Segments::new("[x]").next().unwrap().is_err());
        assert!(Segments::new("a..b").nth(1).unwrap().is_err());
        assert!(Segments::new("[0").next().unwrap().is_err());
    }

    #[test]
    fn test_extract_nested() {
        let doc = forecast();
        let code = extract(&doc, "[0].timeSeries[0].areas[0].weatherCodes[1]").unwrap();
        assert_eq!(code.as_text(), "201");
        let name = extract(&doc, "[0].timeSeries[0].areas[0].area.name").unwrap();
        assert_eq!(name.as_str(), Some("大阪府"));
    }

    #[test]
    fn test_missing_reports_segment() {
        let doc = forecast();
        let err = extract(&doc, "[0].timeSeries[1].areas[0]").unwrap_err();
        assert_eq!(err.path, "[0].timeSeries[1].areas[0]");
        assert_eq!(err.segment, "[0].timeSeries[1]");

        let err = extract(&doc, "[0].timeSeries[").unwrap_err();
        assert_eq!(err.segment, "[0].timeSeries[");
    }

    #[test]
    fn test_numeric_coercion() {
        let doc = json!({"t": "25.4", "h": 61, "bad": "n/a", "inf": "inf", "n": null, "pad": " 7 "});
        assert_eq!(extract(&doc, "t").unwrap().as_f32(), 25.4);
        assert_eq!(extract(&doc, "h").unwrap().as_f32(), 61.0);
        assert_eq!(extract(&doc, "bad").unwrap().as_f32(), 0.0);
        assert_eq!(extract(&doc, "inf").unwrap().as_f32(), 0.0);
        assert_eq!(extract(&doc, "n").unwrap().as_f32(), 0.0);
        assert_eq!(extract(&doc, "pad").unwrap().as_f32(), 7.0);
    }

    #[test]
    fn test_text_coercion() {
        let doc = json!({"s": "x", "n": 1.5, "b": true, "z": null});
        assert_eq!(extract(&doc, "s").unwrap().as_text(), "x");
        assert_eq!(extract(&doc, "n").unwrap().as_text(), "1.5");
        assert_eq!(extract(&doc, "b").unwrap().as_text(), "true");
        assert_eq!(extract(&doc, "z").unwrap().as_text(), "");
    }
}
