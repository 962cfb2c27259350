//! On-demand JSON-path evaluation over raw JSON bytes.
//!
//! Given a byte buffer and a compiled [`JsonPath`], [`get_by_path`] locates
//! every matching sub-value and returns each as a slice borrowing from the
//! input — no document tree is built. The scanner validates just enough
//! structure to find value boundaries: sibling values are skipped with
//! block-parallel (SIMD) primitives, object keys are compared raw and only
//! unescaped when an escape sequence forces it, and number content is passed
//! through leniently for the caller (or the `dom` wrappers) to validate.
//!
//! ```
//! use jsonpluck::{get_by_path, JsonPath};
//!
//! let json = br#"{"a": {"b": [10, 20, 30]}}"#;
//! let path = JsonPath::compile("$.a.b[1]").unwrap();
//! let matches = get_by_path(json, &path).unwrap();
//! assert_eq!(matches, [b"20"]);
//! ```
//!
//! Wildcard segments (`$.*`, `$[*]`) fan out over every member or element
//! and produce matches in document order:
//!
//! ```
//! use jsonpluck::{get_by_path, JsonPath};
//!
//! let json = br#"{"a": 1, "b": 2, "c": 3}"#;
//! let path = JsonPath::compile("$.*").unwrap();
//! let matches = get_by_path(json, &path).unwrap();
//! assert_eq!(matches, [b"1", b"2", b"3"]);
//! ```
//!
//! For repeated queries over the same document, [`PaddedJson`] copies the
//! input once into a buffer with trailing padding, unlocking the scanner's
//! unchecked whitespace fast path via [`get_by_path_padded`].
//!
//! With the `dom` feature, `get_by_path_string` and `get_by_path_dom` glue
//! the scanner to `serde_json` for callers that want re-validated,
//! re-serialized text instead of raw slices.

#![no_std]

extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

mod buffer;
mod error;
mod ondemand;
mod path;
mod scan;
mod simd;
mod unescape;

#[cfg(feature = "dom")]
mod dom;

pub use buffer::PaddedJson;
pub use error::{Error, ErrorKind};
pub use ondemand::{get_by_path, get_by_path_padded};
pub use path::{JsonPath, Segment};

#[cfg(feature = "dom")]
pub use dom::{get_by_path_dom, get_by_path_string};
