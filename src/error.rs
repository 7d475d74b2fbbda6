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

//! Error kinds returned by the schema parser, the schema validator, the
//! normalization engine and the codecs.
//!
//! Every operation returns its own error kind. [`Error`] wraps all of them for
//! callers that chain several operations with `?`.

use crate::{
    schema::{SchemaKind, SchemaPath},
    types::ValueKind,
};
use std::{error::Error as _, fmt};

/// Errors encountered by this crate.
///
/// To inspect the details of the error use [`details`](Self::details) or
/// [`into_details`](Self::into_details).
#[derive(thiserror::Error, Debug)]
#[repr(transparent)]
#[error(transparent)]
pub struct Error {
    details: Box<Details>,
}

impl Error {
    pub fn new(details: Details) -> Self {
        Self {
            details: Box::new(details),
        }
    }

    pub fn details(&self) -> &Details {
        &self.details
    }

    pub fn into_details(self) -> Details {
        *self.details
    }
}

impl From<Details> for Error {
    fn from(details: Details) -> Self {
        Self::new(details)
    }
}

macro_rules! impl_from_kind {
    ($($kind:ident),+) => {
        $(
            impl From<$kind> for Error {
                fn from(error: $kind) -> Self {
                    Self::new(Details::from(error))
                }
            }
        )+
    };
}

impl_from_kind!(
    SchemaError,
    ValidationError,
    ConversionError,
    EncodeError,
    DecodeError
);

#[derive(thiserror::Error)]
pub enum Details {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Failures while turning JSON schema text into a [`Schema`](crate::Schema).
#[derive(thiserror::Error)]
pub enum SchemaError {
    #[error("Failed to parse schema from JSON")]
    ParseSchemaJson(#[source] serde_json::Error),

    #[error("Schema document must be a JSON object, array or string")]
    NotAnObject,

    #[error("Missing required field `{field}` at {path}")]
    MissingField { field: &'static str, path: SchemaPath },

    #[error("Unexpected JSON type at {0}")]
    TypeMismatch(SchemaPath),

    #[error("Unknown type `{name}` at {path}")]
    UnknownType { name: String, path: SchemaPath },

    #[error("Default value of field `{field}` cannot be written at {path}")]
    InvalidDefault {
        field: String,
        path: SchemaPath,
        #[source]
        source: EncodeError,
    },
}

/// A violation found by [`Schema::validate`](crate::Schema::validate).
#[derive(thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid name `{0}` at {1}")]
    InvalidName(String, SchemaPath),

    #[error("Invalid namespace `{namespace}` (offending part `{part}`) at {path}")]
    InvalidNamespace {
        namespace: String,
        part: String,
        path: SchemaPath,
    },

    #[error("Fixed size must be positive, got {0} at {1}")]
    InvalidFixedSize(usize, SchemaPath),

    #[error("Placeholder type `unknown` is not allowed at {0}")]
    InvalidType(SchemaPath),

    #[error("Type may not be empty at {0}")]
    Empty(SchemaPath),

    #[error("Duplicate entries {0:?} at {1}")]
    NotUnique(Vec<String>, SchemaPath),
}

impl ValidationError {
    /// The location of the violation inside the schema.
    pub fn path(&self) -> &SchemaPath {
        match self {
            ValidationError::InvalidName(_, path)
            | ValidationError::InvalidNamespace { path, .. }
            | ValidationError::InvalidFixedSize(_, path)
            | ValidationError::InvalidType(path)
            | ValidationError::Empty(path)
            | ValidationError::NotUnique(_, path) => path,
        }
    }
}

/// Failures of the normalization engine.
#[derive(thiserror::Error)]
pub enum ConversionError {
    #[error("Value of kind {value} cannot be converted to schema `{schema}`")]
    Mismatch { value: ValueKind, schema: String },

    #[error("Floating point value {0} is not finite in the target type")]
    InvalidDouble(f64),

    #[error("Bytes are not valid UTF-8")]
    ConversionFailed(#[source] std::string::FromUtf8Error),

    #[error("Fixed schema expects {expected} bytes, got {actual}")]
    InvalidFixedCount { expected: usize, actual: usize },

    #[error("Enum symbol `{symbol}` not found in {symbols:?}")]
    EnumSymbolNotFound {
        symbol: String,
        symbols: Vec<String>,
    },

    #[error("Record field `{0}` is missing and has no default")]
    FieldNotFound(String),

    #[error("Value of kind {value} matches none of the union options {options:?}")]
    SchemaMismatch {
        value: ValueKind,
        options: Vec<String>,
    },

    #[error("Named type `{0}` is not defined in the schema")]
    UnresolvedName(String),
}

/// Failures while writing an [`AvroValue`](crate::types::AvroValue).
#[derive(thiserror::Error)]
pub enum EncodeError {
    #[error("Record value carries a schema of kind {0}")]
    RecordSchemaMismatch(SchemaKind),

    #[error("Union index {index} is out of range for {num_variants} options")]
    UnionIndexOutOfRange { index: usize, num_variants: usize },

    #[error("Record value has no entry for field `{0}`")]
    MissingField(String),
}

/// Failures of the binary and JSON decoders.
#[derive(thiserror::Error)]
pub enum DecodeError {
    #[error("Cannot read a value of kind {0} from the remaining input")]
    SchemaMismatch(SchemaKind),

    #[error("Union index {index} is out of range for {num_variants} options")]
    UnionSizeMismatch { index: i64, num_variants: usize },

    #[error("Union object must have exactly one key naming an option, got {0:?}")]
    UnionKeyMismatch(Vec<String>),

    #[error("Fixed value needs {expected} bytes, only {remaining} left")]
    FixedSizeMismatch { expected: usize, remaining: usize },

    #[error("Enum index {index} is out of range for {nsymbols} symbols")]
    EnumMismatch { index: i64, nsymbols: usize },

    #[error("Array ended without a terminating block")]
    ArraySizeMismatch,

    #[error("Map ended without a terminating block")]
    MapSizeMismatch,

    #[error("Map key could not be decoded")]
    MapKeyTypeMismatch,

    #[error("Negative length {0} for bytes or string")]
    NegativeLength(i64),

    #[error("Variable length integer is longer than 10 bytes")]
    IntegerOverflow,

    #[error("Decoded long {1} does not fit in an int")]
    ZagI32(#[source] std::num::TryFromIntError, i64),

    #[error("String is not valid UTF-8")]
    ConvertToUtf8(#[source] std::string::FromUtf8Error),

    #[error("Unable to allocate {desired} bytes (maximum allowed: {maximum})")]
    MemoryAllocation { desired: usize, maximum: usize },

    #[error("Failed to parse JSON input")]
    Json(#[source] serde_json::Error),

    #[error("JSON {found} cannot be read as schema kind {schema}")]
    UnexpectedJson {
        found: &'static str,
        schema: SchemaKind,
    },

    #[error("Named type `{0}` is not defined in the schema")]
    UnresolvedName(String),

    #[error("Decoded value does not conform to the schema")]
    Conversion(#[from] ConversionError),
}

macro_rules! debug_with_source {
    ($($kind:ident),+) => {
        $(
            impl fmt::Debug for $kind {
                fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                    let mut msg = self.to_string();
                    if let Some(e) = self.source() {
                        msg.extend([": ", &e.to_string()]);
                    }
                    write!(f, "{msg}")
                }
            }
        )+
    };
}

debug_with_source!(
    Details,
    SchemaError,
    ValidationError,
    ConversionError,
    EncodeError,
    DecodeError
);
