// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use avro_normalize::{
    AvroValue, Encoding, Schema, ToAvro, decode::decode_with_known_schemata, decode_binary,
    decode_json, encode_as, encode_binary, encode_json, error::DecodeError, normalize,
    schema::Parser,
};
use hex_literal::hex;
use pretty_assertions::assert_eq;
use serde_bytes::ByteBuf;
use serde_json::json;
use std::collections::HashMap;

type TestResult = anyhow::Result<()>;

const KITCHEN_SINK: &str = r#"
{
    "name": "A",
    "type": "record",
    "fields": [
        {"name": "a", "type": "int"},
        {"name": "b", "type": {"name": "B", "type": "enum", "symbols": ["opt1", "opt2"]}},
        {"name": "c", "type": "long", "default": 1},
        {"name": "d", "type": {"type": "map", "values": "bytes"}},
        {"name": "f", "type": "string"},
        {"name": "g", "type": ["string", "int"]},
        {"name": "h", "type": "bytes", "default": "ÿ"},
        {"name": "i", "type": "float"}
    ]
}
"#;

const LINKED_LIST: &str = r#"
{
    "type": "record",
    "name": "Node",
    "fields": [
        {"name": "value", "type": "long"},
        {"name": "next", "type": ["null", "Node"], "default": null}
    ]
}
"#;

fn entries(pairs: Vec<(&str, AvroValue)>) -> HashMap<String, AvroValue> {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

#[test]
fn binary_encoding_fills_defaults_and_picks_union_options() -> TestResult {
    let schema = Schema::parse_str(KITCHEN_SINK)?;
    let value = json!({
        "a": 64,
        "b": "opt1",
        "d": {"e": "ab"},
        "f": "\na",
        "g": {"int": 2},
        "i": 0.0,
    });

    let bytes = encode_as(&value, &schema, Encoding::Binary)?;
    assert_eq!(
        bytes,
        hex!(
            "8001" // a
            "00" // b
            "02" // c
            "02 02 65 04 6162 00" // d
            "04 0a61" // f
            "02 04" // g
            "02 ff" // h
            "00000000" // i
        )
    );

    let decoded = decode_binary(&bytes, &schema)?;
    assert_eq!(decoded, normalize(&value, &schema)?);
    assert_eq!(decoded.field("g").and_then(AvroValue::as_int), Some(2));
    assert_eq!(decoded.field("h").and_then(AvroValue::as_bytes), Some(vec![0xff]));
    Ok(())
}

#[test]
fn json_encoding_escapes_strings_and_writes_bytes_per_character() -> TestResult {
    let schema = Schema::parse_str(KITCHEN_SINK)?;
    let d = entries(vec![("e", ByteBuf::from(vec![0xff]).to_avro())]);
    let value = entries(vec![
        ("a", 1_i32.to_avro()),
        ("b", "opt1".to_avro()),
        ("d", d.to_avro()),
        ("f", "\na\"\\".to_avro()),
        ("g", entries(vec![("int", 2_i32.to_avro())]).to_avro()),
        ("i", 5.0_f64.to_avro()),
    ]);

    let normalized = normalize(&value, &schema)?;
    let json = encode_json(&normalized)?;
    assert_eq!(
        String::from_utf8(json.clone())?,
        r#"{"a":1,"b":"opt1","c":1,"d":{"e":"ÿ"},"f":"\u000Aa\"\\","g":{"int":2},"h":"ÿ","i":5.0}"#
    );

    let decoded = decode_json(&json, &schema)?;
    assert_eq!(
        decoded
            .field("d")
            .and_then(AvroValue::as_map)
            .and_then(|d| d.get("e").and_then(|e| e.as_bytes())),
        Some(vec![0xff])
    );
    assert_eq!(decoded, normalized);
    Ok(())
}

#[test]
fn decode_record_ignores_trailing_input() -> TestResult {
    let schema = Schema::parse_str(
        r#"{"type": "record", "name": "test", "fields": [{"name": "x", "type": "int"}, {"name": "y", "type": "int"}]}"#,
    )?;
    let value = decode_binary(&hex!("04 96de8703 cdcc4c40 96de8703"), &schema)?;
    let fields = value.as_map().unwrap_or_default();
    assert_eq!(fields.get("x").and_then(|x| x.as_int()), Some(2));
    assert_eq!(fields.get("y").and_then(|y| y.as_int()), Some(3209099));
    Ok(())
}

#[test]
fn decode_primitives() -> TestResult {
    let decode = |bytes: &[u8], schema: &str| -> anyhow::Result<AvroValue> {
        Ok(decode_binary(bytes, &Schema::parse_str(schema)?)?)
    };

    assert_eq!(
        decode(&hex!("06666f6f"), r#"{ "type" : "string" }"#)?.as_string(),
        Some("foo".to_string())
    );
    assert_eq!(
        decode(&hex!("06666f6f"), r#"{ "type" : "bytes" }"#)?.as_bytes(),
        Some(b"foo".to_vec())
    );
    assert_eq!(decode(&hex!("96de8703"), r#""int""#)?.as_int(), Some(3209099));
    assert_eq!(decode(&hex!("96de8703"), r#""long""#)?.as_long(), Some(3209099));
    assert_eq!(decode(&hex!("c3f54840"), r#""float""#)?.as_float(), Some(3.14));
    assert_eq!(
        decode(&hex!("1f85eb51b81e0940"), r#""double""#)?.as_double(),
        Some(3.14)
    );
    assert_eq!(decode(&hex!("01"), r#""boolean""#)?.as_boolean(), Some(true));
    assert_eq!(decode(&hex!("00"), r#""boolean""#)?.as_boolean(), Some(false));
    assert_eq!(
        decode(&hex!("020261"), r#"{"type" : ["null","string"] }"#)?.as_string(),
        Some("a".to_string())
    );
    Ok(())
}

#[test]
fn decode_containers() -> TestResult {
    let longs = Schema::parse_str(r#"{ "type" : "array", "items" : "long" }"#)?;
    let expected = AvroValue::Array(Schema::Long, vec![AvroValue::Long(3), AvroValue::Long(27)]);
    assert_eq!(decode_binary(&hex!("04 06 36 00"), &longs)?, expected);
    // a negative count is followed by the block size in bytes
    assert_eq!(decode_binary(&hex!("03 04 06 36 00"), &longs)?, expected);

    let map = Schema::parse_str(r#"{ "type" : "map", "values" : "long" }"#)?;
    let value = decode_binary(&hex!("02 06666f6f 36 00"), &map)?;
    let entries = value.as_map().unwrap_or_default();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries.get("foo").and_then(|v| v.as_long()), Some(27));
    Ok(())
}

#[test]
fn decode_enum_index() -> TestResult {
    let schema = Schema::parse_str(
        r#"{ "type": "enum", "name": "ChannelKey", "doc": "Enum of valid channel keys.", "symbols":
            ["CityIphone", "CityMobileWeb", "GiltAndroid", "GiltcityCom", "GiltCom", "GiltIpad", "GiltIpadSafari", "GiltIphone", "GiltMobileWeb", "NoChannel" ]
        }"#,
    )?;
    match decode_binary(&hex!("12"), &schema)? {
        AvroValue::Enum(_, index, symbol) => {
            assert_eq!(index, 9);
            assert_eq!(symbol, "NoChannel");
        }
        other => panic!("Expected an enum, got {other}"),
    }
    assert!(matches!(
        decode_binary(&hex!("14"), &schema),
        Err(DecodeError::EnumMismatch {
            index: 10,
            nsymbols: 10
        })
    ));
    Ok(())
}

#[test]
fn recursive_schema_round_trip() -> TestResult {
    let schema = Schema::parse_str(LINKED_LIST)?;
    let value = normalize(
        &json!({"value": 1, "next": {"Node": {"value": 2, "next": null}}}),
        &schema,
    )?;

    let bytes = encode_binary(&value)?;
    assert_eq!(bytes, hex!("02 02 04 00"));
    assert_eq!(decode_binary(&bytes, &schema)?, value);

    let json = encode_json(&value)?;
    assert_eq!(json, br#"{"value":1,"next":{"Node":{"value":2,"next":null}}}"#);
    assert_eq!(decode_json(&json, &schema)?, value);
    Ok(())
}

#[test]
fn known_schemata_are_used_for_references() -> TestResult {
    let mut parser = Parser::default();
    parser.parse_str(r#"{"type": "fixed", "name": "Hash", "size": 2}"#)?;
    let schema = parser.parse_str(r#"{"type": "array", "items": "Hash"}"#)?;
    let names = parser.into_names();

    assert!(matches!(
        decode_binary(&hex!("02 beef 00"), &schema),
        Err(DecodeError::UnresolvedName(name)) if name == "Hash"
    ));

    let value = decode_with_known_schemata(&hex!("02 beef 00"), &schema, &names, Encoding::Binary)?;
    let items = value.as_array().unwrap_or_default();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].as_bytes(), Some(vec![0xbe, 0xef]));

    let json = encode_json(&value)?;
    assert_eq!(String::from_utf8(json.clone())?, "[\"\u{be}\u{ef}\"]");
    assert_eq!(
        decode_with_known_schemata(&json, &schema, &names, Encoding::Json)?,
        value
    );
    Ok(())
}

#[test]
fn malformed_input_is_rejected() -> TestResult {
    let nullable = Schema::parse_str(r#"["null", "string"]"#)?;
    assert!(matches!(
        decode_binary(&hex!("04"), &nullable),
        Err(DecodeError::UnionSizeMismatch {
            index: 2,
            num_variants: 2
        })
    ));
    assert!(matches!(
        decode_binary(&hex!("02 0661"), &nullable),
        Err(DecodeError::SchemaMismatch(_))
    ));
    assert!(matches!(
        decode_binary(&hex!("02 06"), &Schema::array(Schema::Long)),
        Err(DecodeError::ArraySizeMismatch)
    ));
    assert!(matches!(
        decode_json(br#"{"long": 1}"#, &nullable),
        Err(DecodeError::UnionKeyMismatch(keys)) if keys == ["long"]
    ));
    assert!(matches!(
        decode_json(b"[1", &nullable),
        Err(DecodeError::Json(_))
    ));
    Ok(())
}
