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
    AvroValue, Schema,
    error::{SchemaError, ValidationError},
    schema::{Formatter, Parser, RecordField, UnionSchema},
};
use md5::Md5;
use pretty_assertions::{assert_eq, assert_ne};
use sha2::Sha256;

type TestResult = anyhow::Result<()>;

const ADD_TO_CART: &str = r#"
{
    "type" : "record",
    "name" : "AddToCartActionEvent",
    "doc" : "This event is fired when a user taps on the add to cart button.",
    "fields" : [
        { "name" : "lookId", "type" : "long" },
        { "name" : "productId", "type" : "long" },
        { "name" : "quantity", "type" : "int" },
        { "name" : "saleId", "type" : [ "null", "long" ], "default" : null },
        { "name" : "skuId", "type" : "long" }
    ]
}
"#;

const STORE_PAGE_VIEWED: &str = r#"
{
    "type": "record",
    "name": "StorePageViewedEvent",
    "namespace": "com.gilt.mobile.tapstream.v1",
    "doc": "This event is fired when a store is displayed.",
    "fields": [
        {"name": "uuid", "type": {"type": "fixed", "name": "UUID", "namespace": "gfc.avro", "size": 16}},
        {"name": "base", "type": {
            "type": "record",
            "name": "MobileEvent",
            "fields": [
                {"name": "eventTs", "type": "long"},
                {"name": "batchGuid", "type": "gfc.avro.UUID", "default": "\u0000\u0000\u0000\u0000\u0000\u0000\u0000\u0000\u0000\u0000\u0000\u0000\u0000\u0000\u0000\u0000"},
                {"name": "channelKey", "type": {"type": "enum", "name": "ChannelKey", "symbols": ["CityIphone", "GiltCom", "NoChannel"]}},
                {"name": "headers", "type": {"type": "map", "values": "string"}, "default": {"a": "b"}},
                {"name": "ipAddress", "type": "string", "default": "0.0.0.0"},
                {"name": "userGuid", "type": ["null", "gfc.avro.UUID"], "default": null},
                {"name": "visitorGuid", "type": "gfc.avro.UUID"}
            ]
        }},
        {"name": "storeKey", "type": {"type": "enum", "name": "StoreKey", "symbols": ["Children", "City", "NoStore"]}}
    ]
}
"#;

fn assert_schemas_differ(one: &str, two: &str) -> TestResult {
    assert_eq!(Schema::parse_str(one)?, Schema::parse_str(one)?);
    assert_ne!(Schema::parse_str(one)?, Schema::parse_str(two)?);
    Ok(())
}

#[test]
fn parse_primitives_and_containers() -> TestResult {
    assert_eq!(Schema::parse_str(r#"{ "type" : "long"}"#)?, Schema::Long);
    assert_eq!(Schema::parse_str(r#""string""#)?, Schema::String);
    assert_eq!(
        Schema::parse_str(r#"{ "type" : "array", "items": { "type" : "map", "values" : "int" } }"#)?,
        Schema::array(Schema::map(Schema::Int))
    );
    assert_eq!(
        Schema::parse_str(r#"{ "type" : [ "double", "int", "long", "float" ] }"#)?,
        Schema::union(vec![Schema::Double, Schema::Int, Schema::Long, Schema::Float])
    );
    assert_eq!(
        Schema::parse_str(r#"[{"type": "map", "values": "int"}, {"type": "map", "values": "double"}]"#)?,
        Schema::union(vec![Schema::map(Schema::Int), Schema::map(Schema::Double)])
    );
    Ok(())
}

#[test]
fn parse_record_with_nullable_default() -> TestResult {
    let schema = Schema::parse_str(ADD_TO_CART)?;
    let Schema::Record(record) = &schema else {
        panic!("Expected a record, got {schema:?}");
    };
    assert_eq!(record.name.fullname(), "AddToCartActionEvent");
    assert_eq!(
        schema.doc().map(String::as_str),
        Some("This event is fired when a user taps on the add to cart button.")
    );

    let names: Vec<&str> = record.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["lookId", "productId", "quantity", "saleId", "skuId"]);

    let sale_id = record.field("saleId").map(|f| f.default.clone());
    let nullable = vec![Schema::Null, Schema::Long];
    assert_eq!(
        sale_id,
        Some(Some(AvroValue::Union(nullable, 0, Box::new(AvroValue::Null))))
    );
    assert!(record.fields.iter().filter(|f| f.name != "saleId").all(|f| f.default.is_none()));
    Ok(())
}

#[test]
fn schemas_differing_in_one_detail_are_not_equal() -> TestResult {
    assert_schemas_differ(
        r#"{ "type" : "map", "values" : "bytes" }"#,
        r#"{ "type" : "map", "values" : "string" }"#,
    )?;
    assert_schemas_differ(
        r#"{ "type" : "array", "items" : { "type" : "map", "values" : "int" } }"#,
        r#"{ "type" : "array", "items" : { "type" : "map", "values" : "long" } }"#,
    )?;
    assert_schemas_differ(
        r#"[ "double", "int", "long", "float" ]"#,
        r#"[ "double", "float", "int", "long" ]"#,
    )?;
    assert_schemas_differ(
        ADD_TO_CART,
        &ADD_TO_CART.replace(r#"[ "null", "long" ]"#, r#"[ "null", "float" ]"#),
    )?;
    assert_schemas_differ(
        r#"{"type": "enum", "name": "ChannelKey", "symbols": ["CityIphone", "GiltCom"]}"#,
        r#"{"type": "enum", "name": "ChanelKey", "symbols": ["CityIphone", "GiltCom"]}"#,
    )?;
    assert_schemas_differ(
        r#"{"type": "enum", "name": "ChannelKey", "symbols": ["CityIphone", "GiltCom"]}"#,
        r#"{"type": "enum", "name": "ChannelKey", "symbols": ["CityIphone", "GilCom"]}"#,
    )?;
    assert_schemas_differ(
        r#"{ "type": "fixed", "name": "Uuid", "size": 16 }"#,
        r#"{ "type": "fixed", "name": "id", "size": 16 }"#,
    )?;
    assert_schemas_differ(
        r#"{ "type": "fixed", "name": "Uuid", "size": 16 }"#,
        r#"{ "type": "fixed", "name": "Uuid", "size": 10 }"#,
    )?;
    Ok(())
}

#[test]
fn documentation_does_not_affect_equality() -> TestResult {
    let documented = Schema::parse_str(ADD_TO_CART)?;
    let plain = Schema::parse_str(&ADD_TO_CART.replace(
        r#""doc" : "This event is fired when a user taps on the add to cart button.","#,
        "",
    ))?;
    assert_eq!(documented, plain);
    Ok(())
}

#[test]
fn canonical_form_of_nested_named_types() -> TestResult {
    let schema = Schema::parse_str(STORE_PAGE_VIEWED)?;
    let canonical = schema.canonical_form()?;

    assert!(canonical.starts_with(
        r#"{"name":"com.gilt.mobile.tapstream.v1.StorePageViewedEvent","type":"record","fields":[{"name":"uuid","type":{"name":"gfc.avro.UUID","type":"fixed","size":16}}"#
    ));
    assert!(canonical.contains(r#"{"name":"batchGuid","type":"gfc.avro.UUID","default":"\u0000"#));
    assert!(canonical.contains(r#"{"name":"headers","type":{"type":"map","values":"string"},"default":{"a":"b"}}"#));
    assert!(canonical.contains(r#"{"name":"userGuid","type":["null","gfc.avro.UUID"],"default":null}"#));
    assert_eq!(canonical.matches(r#""type":"fixed""#).count(), 1);

    let reparsed = Schema::parse_str(&canonical)?;
    assert_eq!(reparsed.canonical_form()?, canonical);
    assert_eq!(reparsed, schema);
    Ok(())
}

#[test]
fn fingerprints_follow_the_canonical_form() -> TestResult {
    let schema = Schema::parse_str(STORE_PAGE_VIEWED)?;
    let reparsed = Schema::parse_str(&schema.canonical_form()?)?;

    assert_eq!(
        schema.fingerprint::<Sha256>()?.to_string(),
        reparsed.fingerprint::<Sha256>()?.to_string()
    );
    assert_eq!(schema.fingerprint::<Md5>()?.bytes.len(), 16);
    assert_ne!(
        schema.fingerprint::<Md5>()?.to_string(),
        Schema::parse_str(ADD_TO_CART)?.fingerprint::<Md5>()?.to_string()
    );
    Ok(())
}

#[test]
fn formatter_shares_definitions_between_documents() -> TestResult {
    let mut parser = Parser::default();
    let uuid = parser.parse_str(r#"{"type": "fixed", "name": "UUID", "namespace": "gfc.avro", "size": 16}"#)?;
    let event = parser.parse_str(
        r#"{"type": "record", "name": "Event", "namespace": "gfc.avro", "fields": [{"name": "id", "type": "UUID"}]}"#,
    )?;

    let mut formatter = Formatter::new();
    assert_eq!(
        formatter.json_string(&uuid)?,
        r#"{"namespace":"gfc.avro","name":"UUID","type":"fixed","size":16}"#
    );
    let formatted = formatter.json_string(&event)?;
    assert!(formatted.contains(r#"{"name":"id","type":"UUID"}"#));

    let reparsed = Parser::with_names(parser.into_names()).parse_str(&formatted)?;
    assert_eq!(reparsed, event);
    Ok(())
}

#[test]
fn validation_reports_the_offending_location() -> TestResult {
    let schema = Schema::parse_str(
        r#"{
            "type": "record",
            "name": "Outer",
            "fields": [
                {"name": "ok", "type": "int"},
                {"name": "choice", "type": ["int", "long", "int"]}
            ]
        }"#,
    )?;
    match schema.validate() {
        Err(ValidationError::NotUnique(duplicates, path)) => {
            assert_eq!(duplicates, vec!["int".to_string()]);
            assert_eq!(path.to_string(), "Outer > choice");
        }
        other => panic!("Expected NotUnique, got {other:?}"),
    }

    let schema = Schema::parse_str(r#"{"type": "enum", "name": "E", "symbols": []}"#)?;
    assert!(matches!(schema.validate(), Err(ValidationError::Empty(_))));

    assert!(Schema::parse_str(ADD_TO_CART)?.validate().is_ok());
    Ok(())
}

#[test]
fn parse_errors() {
    assert!(matches!(
        Schema::parse_str("{"),
        Err(SchemaError::ParseSchemaJson(_))
    ));
    assert!(matches!(
        Schema::parse_str(r#"{"type": "record", "name": "R"}"#),
        Err(SchemaError::MissingField { field: "fields", .. })
    ));
    assert!(matches!(
        Schema::parse_str(r#"{"type": "array", "items": "Nope"}"#),
        Err(SchemaError::UnknownType { name, .. }) if name == "Nope"
    ));
}

#[test]
fn programmatic_schemas_match_parsed_ones() -> TestResult {
    let built = Schema::Record(
        avro_normalize::schema::RecordSchema::builder()
            .name("AddToCartActionEvent")
            .fields(vec![
                RecordField::builder().name("lookId").schema(Schema::Long).build(),
                RecordField::builder().name("productId").schema(Schema::Long).build(),
                RecordField::builder().name("quantity").schema(Schema::Int).build(),
                RecordField::builder()
                    .name("saleId")
                    .schema(Schema::Union(UnionSchema::new(vec![Schema::Null, Schema::Long])))
                    .default(AvroValue::Union(
                        vec![Schema::Null, Schema::Long],
                        0,
                        Box::new(AvroValue::Null),
                    ))
                    .build(),
                RecordField::builder().name("skuId").schema(Schema::Long).build(),
            ])
            .build(),
    );
    assert_eq!(built, Schema::parse_str(ADD_TO_CART)?);
    Ok(())
}
