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

//! Schema-driven **[Apache Avro](https://avro.apache.org/)** values.
//!
//! A [`Schema`] is parsed from its JSON description, checked with
//! [`Schema::validate`] and can be printed back in a canonical form. Values of
//! any shape are turned into [`AvroValue`](types::AvroValue)s that conform to
//! a schema by [`normalize`], which widens numbers, fills record defaults and
//! resolves unions. Normalized values are written with [`encode_binary`] (the
//! Avro binary encoding) or [`encode_json`] (a compact JSON rendering), and read
//! back with [`decode_binary`] and [`decode_json`].
//!
//! ```
//! use avro_normalize::{AvroResult, decode_binary, encode_binary, normalize, parse_schema};
//! use serde_json::json;
//!
//! fn main() -> AvroResult<()> {
//!     let schema = parse_schema(r#"
//!         {
//!             "type": "record",
//!             "name": "test",
//!             "fields": [
//!                 {"name": "a", "type": "long", "default": 42},
//!                 {"name": "b", "type": ["null", "string"]}
//!             ]
//!         }
//!     "#)?;
//!     schema.validate()?;
//!
//!     let value = normalize(&json!({"b": "foo"}), &schema)?;
//!     let bytes = encode_binary(&value)?;
//!     assert_eq!(bytes, [0x54, 0x02, 0x06, b'f', b'o', b'o']);
//!     assert_eq!(decode_binary(&bytes, &schema)?, value);
//!     Ok(())
//! }
//! ```
//!
//! # MSRV
//!
//! The current MSRV is 1.88.0.

pub mod decode;
pub mod encode;
pub mod error;
pub mod normalize;
pub mod schema;
pub mod schema_equality;
pub mod types;
pub mod util;
pub mod validator;

pub use decode::decode;
pub use encode::{Encoding, encode, encode_as};
pub use error::Error;
pub use normalize::Normalizer;
pub use schema::Schema;
pub use types::{AvroValue, ToAvro};

use error::{ConversionError, DecodeError, EncodeError, SchemaError};

/// A convenience type alias for `Result`s with `Error`s.
pub type AvroResult<T> = Result<T, Error>;

/// Parse a schema from its JSON text.
pub fn parse_schema(input: &str) -> Result<Schema, SchemaError> {
    Schema::parse_str(input)
}

/// Convert `value` into a value that conforms to `schema`.
///
/// Use a [`Normalizer`] to normalize many values against the same schema.
pub fn normalize(value: impl ToAvro, schema: &Schema) -> Result<AvroValue, ConversionError> {
    Normalizer::new(schema).normalize(value)
}

/// Write `value` in the Avro binary encoding.
pub fn encode_binary(value: &AvroValue) -> Result<Vec<u8>, EncodeError> {
    encode(value, Encoding::Binary)
}

/// Write `value` as compact JSON.
///
/// Unions are written as `{"<type name>": value}`, or `null` when they hold
/// `null`. Bytes and fixed values become strings with one character per byte.
pub fn encode_json(value: &AvroValue) -> Result<Vec<u8>, EncodeError> {
    encode(value, Encoding::Json)
}

/// Read a value of `schema` from the Avro binary encoding.
pub fn decode_binary(bytes: &[u8], schema: &Schema) -> Result<AvroValue, DecodeError> {
    decode(bytes, schema, Encoding::Binary)
}

/// Read a value of `schema` from its compact JSON form.
///
/// The decoded value is normalized against `schema`.
pub fn decode_json(bytes: &[u8], schema: &Schema) -> Result<AvroValue, DecodeError> {
    decode(bytes, schema, Encoding::Json)
}
