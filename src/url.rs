use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::{Map, Number, Value};

/// Characters left alone by JavaScript's `encodeURIComponent`; everything else is escaped.
const URI_COMPONENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Merge the QUERY section into `base`.
///
/// Pairs are emitted in the map's insertion order. An existing `?` in `base` switches the
/// joining character to `&`.
pub(crate) fn build(base: &str, query: &Map<String, Value>) -> String {
    if query.is_empty() {
        return base.to_owned();
    }

    let serialized = query
        .iter()
        .map(|(key, value)| format!("{}={}", encode(key), encode(&coerce(value))))
        .collect::<Vec<_>>()
        .join("&");
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}{serialized}")
}

/// Render a JSON value as the plain text used in query strings and header values.
///
/// - strings are taken verbatim
/// - numbers print like JavaScript: `1e3` -> `1000`, `1.0` -> `1`, `-0` -> `0`, `1e23` -> `1e+23`
/// - booleans become `true` / `false`, `null` becomes `null`
/// - arrays coerce each element and join them with `,`
/// - objects become `[object Object]`
///
/// This matches JavaScript's `String(value)`.
pub(crate) fn coerce(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_owned(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => coerce_number(n),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                // String([null]) yields an empty element
                Value::Null => String::new(),
                other => coerce(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_owned(),
    }
}

fn coerce_number(n: &Number) -> String {
    let Some(f) = n.as_f64().filter(|_| n.is_f64()) else {
        return n.to_string();
    };
    if f == 0.0 {
        return "0".to_owned();
    }
    // f64 Display never uses exponents; JavaScript does outside [1e-6, 1e21)
    if (1e-6..1e21).contains(&f.abs()) {
        format!("{f}")
    } else if f.abs() >= 1e21 {
        format!("{f:e}").replacen('e', "e+", 1)
    } else {
        format!("{f:e}")
    }
}

fn encode(s: &str) -> String {
    utf8_percent_encode(s, URI_COMPONENT_ENCODE_SET).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("query fixture must be an object"),
        }
    }

    #[test]
    fn empty_query_should_keep_base_url() {
        assert_eq!(build("http://x/y", &Map::new()), "http://x/y");
        assert_eq!(build("http://x/y?a=1", &Map::new()), "http://x/y?a=1");
    }

    #[test]
    fn query_should_append_in_insertion_order() {
        let q = query(json!({ "b": "2", "a": "1" }));
        assert_eq!(build("http://x/y", &q), "http://x/y?b=2&a=1");
    }

    #[test]
    fn existing_query_string_should_join_with_ampersand() {
        let q = query(json!({ "a": "1", "b": "2" }));
        assert_eq!(build("http://x/y?z=0", &q), "http://x/y?z=0&a=1&b=2");
    }

    #[test]
    fn keys_and_values_should_be_percent_encoded() {
        let q = query(json!({ "full name": "Jane Doe", "filter": "a&b=c/d", "mark": "it's (ok)!" }));
        assert_eq!(
            build("http://x", &q),
            "http://x?full%20name=Jane%20Doe&filter=a%26b%3Dc%2Fd&mark=it's%20(ok)!"
        );
    }

    #[test]
    fn non_ascii_should_be_utf8_percent_encoded() {
        let q = query(json!({ "city": "Zürich" }));
        assert_eq!(build("http://x", &q), "http://x?city=Z%C3%BCrich");
    }

    #[test]
    fn non_string_values_should_be_coerced() {
        let q = query(json!({ "n": 42, "f": 2.5, "t": true, "z": null, "l": [1, "a", null], "o": { "k": 1 } }));
        assert_eq!(
            build("http://x", &q),
            "http://x?n=42&f=2.5&t=true&z=null&l=1%2Ca%2C&o=%5Bobject%20Object%5D"
        );
    }

    #[test]
    fn numbers_should_print_like_javascript() -> Result<(), serde_json::Error> {
        let cases = [
            ("1e3", "1000"),
            ("1E2", "100"),
            ("1.0", "1"),
            ("-0", "0"),
            ("-0.0", "0"),
            ("2.5", "2.5"),
            ("-7", "-7"),
            ("18446744073709551615", "18446744073709551615"),
            ("100000000000000000000000", "1e+23"),
            ("1.5e-7", "1.5e-7"),
            ("0.000001", "0.000001"),
        ];
        for (literal, expected) in cases {
            let value: Value = serde_json::from_str(literal)?;
            assert_eq!(coerce(&value), expected, "literal {literal}");
        }
        Ok(())
    }

    #[test]
    fn float_query_values_should_not_gain_a_fraction() {
        let q: Map<String, Value> = serde_json::from_str(r#"{"n": 1e3, "z": -0}"#).unwrap();
        assert_eq!(build("http://x", &q), "http://x?n=1000&z=0");
    }

    #[test]
    fn coerce_should_flatten_nested_arrays() {
        assert_eq!(coerce(&json!([[1, 2], [3]])), "1,2,3");
        assert_eq!(coerce(&json!([])), "");
    }
}
