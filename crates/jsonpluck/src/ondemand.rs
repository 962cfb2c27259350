//! The path driver: walk a compiled path over raw bytes and collect the
//! matching slices.
//!
//! Each segment repositions the scanner — member lookup for [`Segment::Key`],
//! element skipping for [`Segment::Index`], full traversal for
//! [`Segment::Wildcard`] — and the step past the last segment captures the
//! value with a single [`skip_one`](crate::scan::SkipScanner::skip_one).
//!
//! Inside a wildcard traversal the driver runs in *complete* mode: after a
//! nested match is extracted, the remainder of the enclosing container is
//! drained so the sibling iteration can read the next `,` or the terminator.
//! Outside wildcards the driver abandons a container as soon as the match is
//! out, which is what makes lookups cheap on large documents.
//!
//! Wildcard matches are produced in document order. On error the driver
//! reports the sticky error alone; accumulated results are never exposed.

use alloc::vec::Vec;

use crate::buffer::PaddedJson;
use crate::error::{Error, ErrorKind};
use crate::path::{JsonPath, Segment};
use crate::scan::SkipScanner;

/// Evaluate `path` against `json`, returning the raw bytes of every match.
///
/// Matched slices borrow from `json`. Each slice starts at the value's
/// first byte; whitespace inside a match is preserved verbatim, and a number
/// slice runs to its terminating delimiter, so it may carry trailing
/// whitespace (the lenient number rule — numbers are not validated here).
/// For a path of plain keys and indices the result has exactly one entry;
/// wildcards fan out in document order.
///
/// # Errors
///
/// The first error the scanner hits, with its byte offset. No partial
/// results are returned.
pub fn get_by_path<'a>(json: &'a [u8], path: &JsonPath) -> Result<Vec<&'a [u8]>, Error> {
    evaluate(SkipScanner::new(json), path)
}

/// [`get_by_path`] over a [`PaddedJson`], which lets the scanner use its
/// block-at-a-time whitespace fast path instead of clamping every load at
/// the buffer end.
pub fn get_by_path_padded<'a>(
    json: &'a PaddedJson,
    path: &JsonPath,
) -> Result<Vec<&'a [u8]>, Error> {
    evaluate(SkipScanner::new_padded(json.as_bytes()), path)
}

fn evaluate<'a>(mut scanner: SkipScanner<'a>, path: &JsonPath) -> Result<Vec<&'a [u8]>, Error> {
    let mut results = Vec::new();
    if path.is_root_only() {
        // `$` alone selects the whole input, untouched.
        results.push(scanner.data());
        return Ok(results);
    }
    descend(&mut scanner, &path.segments()[1..], &mut results, false);
    match scanner.error() {
        Some(err) => Err(err),
        None => Ok(results),
    }
}

/// Apply the remaining `segments` at the scanner's current position.
///
/// `complete` marks calls made from inside a wildcard traversal: those must
/// consume the rest of any container they descend into so the caller's
/// sibling iteration stays aligned.
fn descend<'a>(
    scanner: &mut SkipScanner<'a>,
    segments: &[Segment],
    results: &mut Vec<&'a [u8]>,
    complete: bool,
) {
    let Some((segment, rest)) = segments.split_first() else {
        if let Some(value) = scanner.get_one() {
            results.push(value);
        }
        return;
    };
    let c = scanner.advance();
    match segment {
        Segment::Key(name) => {
            if c != b'{' {
                scanner.set_error(ErrorKind::MismatchType);
                return;
            }
            if !advance_key(scanner, name.as_bytes()) {
                return;
            }
            descend(scanner, rest, results, complete);
            if complete && !scanner.has_error() {
                skip_object_remainder(scanner);
            }
        }
        Segment::Index(index) => {
            if c != b'[' {
                scanner.set_error(ErrorKind::MismatchType);
                return;
            }
            if !scanner.get_array_elem(*index) {
                return;
            }
            descend(scanner, rest, results, complete);
            if complete && !scanner.has_error() {
                skip_array_remainder(scanner);
            }
        }
        Segment::Wildcard => match c {
            b'{' => traverse_object(scanner, rest, results),
            b'[' => traverse_array(scanner, rest, results),
            _ => scanner.set_error(ErrorKind::UnmatchedTypeInJsonPath),
        },
        // A compiled path carries `Root` only at the front, which
        // `evaluate` already stripped.
        Segment::Root => scanner.set_error(ErrorKind::UnsupportedJsonPath),
    }
}

/// Walk the members of the object the cursor sits in (just past its `{`)
/// until one named `name` is found, leaving the cursor just before its
/// value. Non-matching values are skipped, not descended into.
fn advance_key(scanner: &mut SkipScanner<'_>, name: &[u8]) -> bool {
    let mut c = scanner.advance();
    while c != b'}' {
        if c != b'"' {
            scanner.set_error(ErrorKind::InvalidChar);
            return false;
        }
        let matched = scanner.match_key(name);
        if scanner.has_error() {
            return false;
        }
        if !scanner.consume(b':') {
            return false;
        }
        if matched {
            return true;
        }
        if scanner.skip_one().is_none() {
            return false;
        }
        c = scanner.advance();
        if c == b',' {
            c = scanner.advance();
        } else if c != b'}' {
            scanner.set_error(ErrorKind::InvalidChar);
            return false;
        }
    }
    scanner.set_error(ErrorKind::UnknownObjKey);
    false
}

/// Wildcard over an object: apply `segments` to every member value, in
/// document order. Consumes the whole object.
fn traverse_object<'a>(
    scanner: &mut SkipScanner<'a>,
    segments: &[Segment],
    results: &mut Vec<&'a [u8]>,
) {
    let mut c = scanner.advance();
    while c != b'}' {
        if c != b'"' {
            scanner.set_error(ErrorKind::InvalidChar);
            return;
        }
        if !scanner.skip_key() {
            return;
        }
        if !scanner.consume(b':') {
            return;
        }
        descend(scanner, segments, results, true);
        if scanner.has_error() {
            return;
        }
        c = scanner.advance();
        if c == b',' {
            c = scanner.advance();
        } else if c != b'}' {
            scanner.set_error(ErrorKind::InvalidChar);
            return;
        }
    }
}

/// Wildcard over an array: apply `segments` to every element, in index
/// order. Consumes the whole array.
fn traverse_array<'a>(
    scanner: &mut SkipScanner<'a>,
    segments: &[Segment],
    results: &mut Vec<&'a [u8]>,
) {
    if scanner.peek() == b']' {
        scanner.advance();
        return;
    }
    loop {
        descend(scanner, segments, results, true);
        if scanner.has_error() {
            return;
        }
        match scanner.advance() {
            b',' => {}
            b']' => return,
            _ => {
                scanner.set_error(ErrorKind::InvalidChar);
                return;
            }
        }
    }
}

/// Complete mode: consume `", key": value` pairs until the object closes.
fn skip_object_remainder(scanner: &mut SkipScanner<'_>) {
    loop {
        let c = scanner.advance();
        if c == b'}' {
            return;
        }
        if c != b',' {
            scanner.set_error(ErrorKind::InvalidChar);
            return;
        }
        if scanner.advance() != b'"' {
            scanner.set_error(ErrorKind::InvalidChar);
            return;
        }
        if !scanner.skip_key() {
            return;
        }
        if !scanner.consume(b':') {
            return;
        }
        if scanner.skip_one().is_none() {
            return;
        }
    }
}

/// Complete mode: consume `, value` tails until the array closes.
fn skip_array_remainder(scanner: &mut SkipScanner<'_>) {
    loop {
        let c = scanner.advance();
        if c == b']' {
            return;
        }
        if c != b',' {
            scanner.set_error(ErrorKind::InvalidChar);
            return;
        }
        if scanner.skip_one().is_none() {
            return;
        }
    }
}
