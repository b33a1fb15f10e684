//! Attribute marshalling.
//!
//! Pure functions converting between domain [`Value`]s and [`WireValue`]s,
//! driven by the declared [`SemanticType`] of each field. These are testable
//! in isolation without store access.

use crate::schema::{EntitySchema, SemanticType};

use super::{CodecError, Item, Number, Result, Value, ValueMap, WireTag, WireValue};

/// Wire tag used for a semantic type. Unrecognised types are carried as strings.
pub fn wire_tag(semantic_type: &SemanticType) -> WireTag {
    match semantic_type {
        SemanticType::String | SemanticType::Other(_) => WireTag::S,
        SemanticType::Boolean => WireTag::Bool,
        SemanticType::Number => WireTag::N,
        SemanticType::Null => WireTag::Null,
        SemanticType::Binary => WireTag::B,
    }
}

/// Marshals a value using the declared semantic type of its field.
///
/// The value is coerced to the declared type: numbers become decimal
/// strings (text is read up to its first non-numeric character), anything
/// marshalled as a boolean is reduced to its truthiness. Only non-finite
/// numbers fail.
/// A null input always marshals to [`WireValue::Null`].
pub fn marshal(value: &Value, semantic_type: &SemanticType) -> Result<WireValue> {
    if value.is_null() {
        return Ok(WireValue::Null);
    }

    match wire_tag(semantic_type) {
        WireTag::S => Ok(WireValue::Str(to_text(value))),
        WireTag::N => to_number(value).map(|n| WireValue::Num(n.to_string())),
        WireTag::Bool => Ok(WireValue::Bool(truthy(value))),
        WireTag::Null => Ok(WireValue::Null),
        WireTag::B => Ok(WireValue::Binary(to_bytes(value))),
    }
}

/// Inverse of [`marshal`]. `Null` unmarshals to an absent value.
pub fn unmarshal(wire: &WireValue) -> Result<Option<Value>> {
    match wire {
        WireValue::Str(s) => Ok(Some(Value::String(s.clone()))),
        WireValue::Num(s) => Number::parse(s)
            .map(|n| Some(Value::Number(n)))
            .ok_or_else(|| CodecError::InvalidNumber { value: s.clone() }),
        WireValue::Bool(b) => Ok(Some(Value::Bool(*b))),
        WireValue::Null => Ok(None),
        WireValue::Binary(b) => Ok(Some(Value::Binary(b.clone()))),
    }
}

/// Marshals every declared field present in `values`.
///
/// Items are sparse: absent or empty values are omitted, except for number
/// fields where zero and the empty string are meaningful. Values for fields
/// the schema does not declare are ignored.
pub fn marshal_item(values: &ValueMap, schema: &EntitySchema) -> Result<Item> {
    let mut item = Item::new();

    for field in schema.fields() {
        let Some(value) = values.get(field.name()) else {
            continue;
        };
        if is_omitted(value, field.semantic_type()) {
            continue;
        }
        item.insert(
            field.name().to_string(),
            marshal(value, field.semantic_type())?,
        );
    }

    Ok(item)
}

/// Unmarshals a whole item. Null attributes are dropped.
pub fn unmarshal_item(item: &Item) -> Result<ValueMap> {
    let mut values = ValueMap::new();

    for (name, wire) in item {
        if let Some(value) = unmarshal(wire)? {
            values.insert(name.clone(), value);
        }
    }

    Ok(values)
}

/// Whether a sparse item leaves `value` out.
pub(super) fn is_omitted(value: &Value, semantic_type: &SemanticType) -> bool {
    match semantic_type {
        SemanticType::Number => value.is_null(),
        _ => value.is_empty(),
    }
}

fn to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Binary(b) => String::from_utf8_lossy(b).into_owned(),
    }
}

fn to_number(value: &Value) -> Result<Number> {
    match value {
        Value::Number(n) if n.is_finite() => Ok(n.clone()),
        Value::Number(n) => Err(CodecError::InvalidNumber {
            value: n.to_string(),
        }),
        Value::Bool(b) => Ok(Number::Int(i64::from(*b))),
        Value::String(s) => Ok(leading_number(s)),
        Value::Binary(b) => Ok(leading_number(&String::from_utf8_lossy(b))),
        Value::Null => Ok(Number::Int(0)),
    }
}

/// Reads the longest numeric prefix of `text`. Text without one reads as zero.
fn leading_number(text: &str) -> Number {
    let text = text.trim();
    (1..=text.len())
        .rev()
        .filter(|&end| text.is_char_boundary(end))
        .find_map(|end| Number::parse(&text[..end]))
        .unwrap_or(Number::Int(0))
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => !n.is_zero(),
        Value::String(s) => {
            let s = s.trim();
            !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false"))
        }
        Value::Binary(b) => !b.is_empty(),
    }
}

fn to_bytes(value: &Value) -> Vec<u8> {
    match value {
        Value::Binary(b) => b.clone(),
        other => to_text(other).into_bytes(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_schema() -> EntitySchema {
        EntitySchema::builder("oauth_users")
            .hash_key("username", SemanticType::String)
            .field("created_at", SemanticType::from_name("datetime"))
            .field("email", SemanticType::String)
            .field("email_verified", SemanticType::Boolean)
            .field("age", SemanticType::Number)
            .build()
            .unwrap()
    }

    fn values(pairs: &[(&str, Value)]) -> ValueMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_wire_tag_mapping() {
        assert_eq!(wire_tag(&SemanticType::String), WireTag::S);
        assert_eq!(wire_tag(&SemanticType::Boolean), WireTag::Bool);
        assert_eq!(wire_tag(&SemanticType::Number), WireTag::N);
        assert_eq!(wire_tag(&SemanticType::Null), WireTag::Null);
        assert_eq!(wire_tag(&SemanticType::Binary), WireTag::B);
        assert_eq!(wire_tag(&SemanticType::from_name("dummy")), WireTag::S);
    }

    #[test]
    fn test_number_marshals_as_decimal_string() {
        assert_eq!(
            marshal(&Value::from(12.12), &SemanticType::Number).unwrap(),
            WireValue::Num("12.12".to_string())
        );
        assert_eq!(
            marshal(&Value::from(22), &SemanticType::Number).unwrap(),
            WireValue::Num("22".to_string())
        );
        assert_eq!(
            marshal(&Value::from("30"), &SemanticType::Number).unwrap(),
            WireValue::Num("30".to_string())
        );
        assert_eq!(
            marshal(&Value::from(""), &SemanticType::Number).unwrap(),
            WireValue::Num("0".to_string())
        );
    }

    #[test]
    fn test_numeric_text_is_coerced() {
        let marshal_number = |v: Value| marshal(&v, &SemanticType::Number).unwrap();
        let num = |s: &str| WireValue::Num(s.to_string());

        assert_eq!(marshal_number(Value::from("abc")), num("0"));
        assert_eq!(marshal_number(Value::from("12abc")), num("12"));
        assert_eq!(marshal_number(Value::from(" 1.5e2x")), num("150"));
        assert_eq!(marshal_number(Value::from(true)), num("1"));
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        assert_eq!(
            marshal(&Value::from(f64::NAN), &SemanticType::Number).unwrap_err(),
            CodecError::InvalidNumber {
                value: "NaN".to_string()
            }
        );
        let infinite = marshal(&Value::from(f64::INFINITY), &SemanticType::Number);
        assert!(infinite.is_err());
        assert!(unmarshal(&WireValue::Num("x".to_string())).is_err());
    }

    #[test]
    fn test_large_numbers_survive_read_then_write() {
        for text in ["12345678901234567890", "-0.1234567890123456789", "1e400"] {
            let wire = WireValue::Num(text.to_string());
            let value = unmarshal(&wire).unwrap().unwrap();
            assert_eq!(marshal(&value, &SemanticType::Number).unwrap(), wire);
        }

        let long = format!("{}x", "7".repeat(320));
        assert_eq!(
            marshal(&Value::from(long.as_str()), &SemanticType::Number).unwrap(),
            WireValue::Num("7".repeat(320))
        );
    }

    #[test]
    fn test_boolean_coercion() {
        let marshal_bool = |v: Value| marshal(&v, &SemanticType::Boolean).unwrap();

        assert_eq!(marshal_bool(Value::from(true)), WireValue::Bool(true));
        assert_eq!(marshal_bool(Value::from(0)), WireValue::Bool(false));
        assert_eq!(marshal_bool(Value::from(2)), WireValue::Bool(true));
        assert_eq!(marshal_bool(Value::from("")), WireValue::Bool(false));
        assert_eq!(marshal_bool(Value::from("0")), WireValue::Bool(false));
        assert_eq!(marshal_bool(Value::from("false")), WireValue::Bool(false));
        assert_eq!(marshal_bool(Value::from("yes")), WireValue::Bool(true));
    }

    #[test]
    fn test_string_and_fallback_types() {
        assert_eq!(
            marshal(&Value::from(42), &SemanticType::String).unwrap(),
            WireValue::Str("42".to_string())
        );
        assert_eq!(
            marshal(
                &Value::from("2015-09-28"),
                &SemanticType::from_name("datetime")
            )
            .unwrap(),
            WireValue::Str("2015-09-28".to_string())
        );
        assert_eq!(
            marshal(&Value::Null, &SemanticType::String).unwrap(),
            WireValue::Null
        );
        assert_eq!(
            marshal(&Value::from("raw"), &SemanticType::Binary).unwrap(),
            WireValue::Binary(b"raw".to_vec())
        );
    }

    #[test]
    fn test_round_trip_per_type() {
        let cases = [
            (Value::from("john"), SemanticType::String),
            (Value::from(true), SemanticType::Boolean),
            (Value::from(false), SemanticType::Boolean),
            (Value::from(22), SemanticType::Number),
            (Value::from(12.12), SemanticType::Number),
            (Value::from(-0.5), SemanticType::Number),
            (Value::Binary(vec![0, 159, 146, 150]), SemanticType::Binary),
        ];

        for (value, semantic_type) in cases {
            let wire = marshal(&value, &semantic_type).unwrap();
            assert_eq!(unmarshal(&wire).unwrap(), Some(value), "{semantic_type}");
        }

        let wire = marshal(&Value::Null, &SemanticType::Null).unwrap();
        assert_eq!(unmarshal(&wire).unwrap(), None);
    }

    #[test]
    fn test_marshal_item_is_sparse() {
        let schema = user_schema();
        let input = values(&[
            ("username", Value::from("muriel")),
            ("email", Value::from("")),
            ("email_verified", Value::from(false)),
            ("age", Value::from(0)),
            ("created_at", Value::Null),
            ("nickname", Value::from("undeclared")),
        ]);

        let item = marshal_item(&input, &schema).unwrap();

        assert_eq!(item.len(), 3);
        assert_eq!(item["username"], WireValue::Str("muriel".to_string()));
        assert_eq!(item["email_verified"], WireValue::Bool(false));
        assert_eq!(item["age"], WireValue::Num("0".to_string()));
        assert!(!item.contains_key("email"));
        assert!(!item.contains_key("nickname"));
    }

    #[test]
    fn test_number_empty_string_is_kept() {
        let schema = user_schema();
        let input = values(&[
            ("username", Value::from("pierre")),
            ("age", Value::from("")),
        ]);

        let item = marshal_item(&input, &schema).unwrap();

        assert_eq!(item["age"], WireValue::Num("0".to_string()));
    }

    #[test]
    fn test_item_round_trip() {
        let schema = user_schema();
        let input = values(&[
            ("username", Value::from("muriel")),
            ("email", Value::from("muriel.vandenheede@eoko.fr")),
            ("email_verified", Value::from(false)),
            ("age", Value::from(12.12)),
        ]);

        let item = marshal_item(&input, &schema).unwrap();
        let output = unmarshal_item(&item).unwrap();

        assert_eq!(output, input);
    }

    #[test]
    fn test_unmarshal_item_drops_nulls() {
        let mut item = Item::new();
        item.insert("username".to_string(), WireValue::Str("john".to_string()));
        item.insert("nothing".to_string(), WireValue::Null);

        let output = unmarshal_item(&item).unwrap();

        assert_eq!(output, values(&[("username", Value::from("john"))]));
    }
}
