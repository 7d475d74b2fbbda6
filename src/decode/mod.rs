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

//! Reading [`AvroValue`]s back from the binary and JSON encodings.

mod binary;
pub(crate) mod json;

use crate::{
    encode::Encoding,
    error::DecodeError,
    schema::{Names, Schema},
    types::AvroValue,
};

/// Read a value of `schema` from `bytes` in the given encoding.
///
/// Bytes left over after the value are ignored.
pub fn decode(bytes: &[u8], schema: &Schema, encoding: Encoding) -> Result<AvroValue, DecodeError> {
    decode_with_known_schemata(bytes, schema, &Names::new(), encoding)
}

/// Like [`decode`], for a schema that refers to named types defined in other
/// documents.
pub fn decode_with_known_schemata(
    bytes: &[u8],
    schema: &Schema,
    known_schemata: &Names,
    encoding: Encoding,
) -> Result<AvroValue, DecodeError> {
    match encoding {
        Encoding::Binary => binary::decode(bytes, schema, known_schemata),
        Encoding::Json => json::decode(bytes, schema, known_schemata),
    }
}
