//! DOM-backed convenience wrappers (`dom` feature).
//!
//! These glue the scanner to `serde_json` for callers that want validated,
//! re-serialized text instead of raw slices:
//!
//! - [`get_by_path_string`] runs the on-demand scanner, re-parses each
//!   matched slice, and serializes the result.
//! - [`get_by_path_dom`] parses the whole document first and walks the path
//!   over the tree; useful as a reference for the on-demand variant and for
//!   callers that already need the full parse.
//!
//! Both produce the same text for the same matches: JSON `null` matches are
//! dropped; no surviving match serializes as `null`; a single string match
//! is emitted as its unquoted content; anything else single is serialized
//! verbatim; multiple matches are emitted as a JSON array.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use serde_json::Value;

use crate::error::{Error, ErrorKind};
use crate::path::{JsonPath, Segment};

/// Evaluate the textual `path` against `json` on demand and serialize the
/// matches.
///
/// # Errors
///
/// Path compilation and scan errors propagate unchanged; a matched slice
/// that fails re-parsing (possible under the lenient number rule) reports
/// [`ErrorKind::InvalidChar`] at the slice's offset.
pub fn get_by_path_string(json: &str, path: &str) -> Result<String, Error> {
    let path = JsonPath::compile(path)?;
    let data = json.as_bytes();
    let raw = crate::get_by_path(data, &path)?;
    let mut values = Vec::with_capacity(raw.len());
    for slice in raw {
        let offset = slice.as_ptr() as usize - data.as_ptr() as usize;
        let value: Value = serde_json::from_slice(slice)
            .map_err(|_| Error::new(ErrorKind::InvalidChar, offset))?;
        values.push(value);
    }
    Ok(serialize_matches(values.iter()))
}

/// Parse `json` into a tree, walk the textual `path` over it, and serialize
/// the matches.
///
/// # Errors
///
/// [`ErrorKind::InvalidChar`] if the document does not parse; otherwise the
/// same kinds the on-demand driver reports, without byte offsets.
pub fn get_by_path_dom(json: &str, path: &str) -> Result<String, Error> {
    let path = JsonPath::compile(path)?;
    let doc: Value =
        serde_json::from_str(json).map_err(|_| Error::new(ErrorKind::InvalidChar, 0))?;
    let mut nodes = Vec::new();
    walk(&doc, &path.segments()[1..], &mut nodes).map_err(|kind| Error::new(kind, 0))?;
    Ok(serialize_matches(nodes.into_iter()))
}

fn walk<'v>(
    value: &'v Value,
    segments: &[Segment],
    out: &mut Vec<&'v Value>,
) -> Result<(), ErrorKind> {
    let Some((segment, rest)) = segments.split_first() else {
        out.push(value);
        return Ok(());
    };
    match segment {
        Segment::Key(name) => match value {
            Value::Object(map) => match map.get(name.as_ref()) {
                Some(member) => walk(member, rest, out),
                None => Err(ErrorKind::UnknownObjKey),
            },
            _ => Err(ErrorKind::MismatchType),
        },
        Segment::Index(index) => match value {
            Value::Array(elems) => match elems.get(*index) {
                Some(elem) => walk(elem, rest, out),
                None => Err(ErrorKind::ArrayIndexOutOfRange),
            },
            _ => Err(ErrorKind::MismatchType),
        },
        Segment::Wildcard => match value {
            Value::Object(map) => {
                for member in map.values() {
                    walk(member, rest, out)?;
                }
                Ok(())
            }
            Value::Array(elems) => {
                for elem in elems {
                    walk(elem, rest, out)?;
                }
                Ok(())
            }
            _ => Err(ErrorKind::UnmatchedTypeInJsonPath),
        },
        Segment::Root => Err(ErrorKind::UnsupportedJsonPath),
    }
}

/// Serialize matches: drop nulls, `null` when nothing survives, unquote a
/// single string, array-wrap multiple matches.
fn serialize_matches<'v>(nodes: impl Iterator<Item = &'v Value>) -> String {
    let survivors: Vec<&Value> = nodes.filter(|v| !v.is_null()).collect();
    match survivors.as_slice() {
        [] => String::from("null"),
        [Value::String(s)] => s.clone(),
        [single] => single.to_string(),
        many => {
            let mut out = String::from("[");
            for (i, node) in many.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&node.to_string());
            }
            out.push(']');
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{"a": {"b": [10, 20, 30]}, "s": "text", "n": null, "m": [1, 2]}"#;

    #[test]
    fn both_wrappers_agree_on_lookups() {
        for path in ["$", "$.a", "$.a.b[2]", "$.m.*", "$.a.*[1]"] {
            assert_eq!(
                get_by_path_string(DOC, path).unwrap(),
                get_by_path_dom(DOC, path).unwrap(),
                "{path}"
            );
        }
    }

    #[test]
    fn single_string_match_is_unquoted() {
        assert_eq!(get_by_path_string(DOC, "$.s").unwrap(), "text");
        assert_eq!(get_by_path_dom(DOC, "$.s").unwrap(), "text");
    }

    #[test]
    fn null_matches_are_dropped() {
        assert_eq!(get_by_path_string(DOC, "$.n").unwrap(), "null");
    }

    #[test]
    fn multiple_matches_wrap_in_an_array() {
        assert_eq!(get_by_path_string(DOC, "$.m.*").unwrap(), "[1,2]");
        assert_eq!(
            get_by_path_string(DOC, "$.a.b[1]").unwrap(),
            get_by_path_dom(DOC, "$.a.b[1]").unwrap()
        );
        assert_eq!(get_by_path_string(DOC, "$.a.b[1]").unwrap(), "20");
    }

    #[test]
    fn errors_match_the_scanner_kinds() {
        assert_eq!(
            get_by_path_dom(DOC, "$.missing").unwrap_err().kind(),
            ErrorKind::UnknownObjKey
        );
        assert_eq!(
            get_by_path_string(DOC, "$.missing").unwrap_err().kind(),
            ErrorKind::UnknownObjKey
        );
        assert_eq!(
            get_by_path_dom(DOC, "$.m[9]").unwrap_err().kind(),
            ErrorKind::ArrayIndexOutOfRange
        );
        assert_eq!(
            get_by_path_dom(DOC, "$.s.x").unwrap_err().kind(),
            ErrorKind::MismatchType
        );
        assert_eq!(
            get_by_path_dom(DOC, "$.s.*").unwrap_err().kind(),
            ErrorKind::UnmatchedTypeInJsonPath
        );
        assert_eq!(
            get_by_path_dom("not json", "$.a").unwrap_err().kind(),
            ErrorKind::InvalidChar
        );
    }

    #[test]
    fn whole_document_round_trip() {
        let doc: Value = serde_json::from_str(DOC).unwrap();
        let echoed: Value =
            serde_json::from_str(&get_by_path_string(DOC, "$").unwrap()).unwrap();
        assert_eq!(doc, echoed);
    }
}
