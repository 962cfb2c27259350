#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use jsonpluck::{get_by_path, get_by_path_padded, JsonPath, PaddedJson};
use libfuzzer_sys::fuzz_target;
use serde_json::{Map, Value};

#[derive(Debug)]
struct ArbitraryValue(Value);

impl<'a> Arbitrary<'a> for ArbitraryValue {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        let node_type = u.choose_index(21)?;
        let value = match node_type {
            0 => Value::Null,
            1 => Value::Bool(u.arbitrary()?),
            2 => {
                let n: f64 = u.arbitrary()?;
                Value::Number(
                    serde_json::Number::from_f64(n).ok_or(arbitrary::Error::IncorrectFormat)?,
                )
            }
            3..=10 => Value::String(u.arbitrary()?),
            11..=15 => {
                let elems: Vec<ArbitraryValue> = u.arbitrary()?;
                Value::Array(elems.into_iter().map(|v| v.0).collect())
            }
            16..=20 => {
                let members: Vec<(String, ArbitraryValue)> = u.arbitrary()?;
                Value::Object(Map::from_iter(members.into_iter().map(|(k, v)| (k, v.0))))
            }
            _ => Err(arbitrary::Error::IncorrectFormat)?,
        };
        Ok(ArbitraryValue(value))
    }
}

/// Derive a path that provably addresses a node of `doc`, plus that node.
fn pick_path<'v>(doc: &'v Value, choices: &[u8]) -> (JsonPath, &'v Value) {
    let mut node = doc;
    let mut path = JsonPath::root();
    for &choice in choices {
        match node {
            Value::Object(map) if !map.is_empty() => {
                let key = map.keys().nth(choice as usize % map.len()).unwrap();
                path = path.key(key);
                node = &map[key];
            }
            Value::Array(elems) if !elems.is_empty() => {
                let index = choice as usize % elems.len();
                path = path.index(index);
                node = &elems[index];
            }
            _ => break,
        }
    }
    (path, node)
}

fn structured(data: &[u8]) {
    let mut u = Unstructured::new(data);
    let Ok(doc) = ArbitraryValue::arbitrary(&mut u) else {
        return;
    };
    let Ok(choices) = <Vec<u8>>::arbitrary_take_rest(u) else {
        return;
    };
    let (path, expected) = pick_path(&doc.0, &choices);

    let json = serde_json::to_string(&doc.0).expect("serialize");
    let matches = get_by_path(json.as_bytes(), &path).expect("existing path resolves");
    assert_eq!(matches.len(), 1);
    // serde_json enforces a recursion limit the scanner does not have; only
    // compare when the slice is shallow enough for the oracle.
    if let Ok(reparsed) = serde_json::from_slice::<Value>(matches[0]) {
        assert_eq!(&reparsed, expected);
    }

    let padded = PaddedJson::new(json.as_bytes());
    assert_eq!(get_by_path_padded(&padded, &path).expect("padded"), matches);
}

/// The scanner must never panic or read out of bounds, whatever the bytes.
fn raw(data: &[u8]) {
    for path in ["$", "$.a", "$[0]", "$.*", "$[*].k"] {
        let path = JsonPath::compile(path).expect("static path");
        if let Ok(matches) = get_by_path(data, &path) {
            for m in matches {
                // Any match the scanner reports lies inside the input.
                assert!(m.len() <= data.len());
            }
        }
    }
}

fuzz_target!(|data: &[u8]| {
    structured(data);
    raw(data);
});
