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

//! # Custom name validation
//!
//! By default, [`Schema::validate`](crate::Schema::validate) follows the rules specified in the
//! [Avro specification](https://avro.apache.org/docs/++version++/specification/#names): every
//! name, namespace component, enum symbol and field name must match `[A-Za-z_][A-Za-z0-9_]*`.
//!
//! Some producers are more flexible in their naming. For interoperability with those, the
//! validators can be replaced once per process, before the first schema is validated.
//!
//! ```
//! # use avro_normalize::validator::{SchemaNameValidator, set_schema_name_validator};
//! # use regex_lite::Regex;
//! # use std::sync::OnceLock;
//! struct AllowDashes;
//!
//! impl SchemaNameValidator for AllowDashes {
//!     fn regex(&self) -> &'static Regex {
//!         static SCHEMA_NAME_ONCE: OnceLock<Regex> = OnceLock::new();
//!         SCHEMA_NAME_ONCE.get_or_init(|| {
//!             Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").expect("Regex is valid")
//!         })
//!     }
//! }
//!
//! if set_schema_name_validator(Box::new(AllowDashes)).is_err() {
//!     panic!("There was already a schema validator configured")
//! }
//! ```
//!
//! **Note**: a validator can be set only once per application lifetime! If the application
//! validates schemas before setting one, the default validator is registered and used.

use crate::{error::ValidationError, schema::SchemaPath};
use log::debug;
use regex_lite::Regex;
use std::sync::OnceLock;

fn avro_name_regex() -> &'static Regex {
    static AVRO_NAME_ONCE: OnceLock<Regex> = OnceLock::new();
    AVRO_NAME_ONCE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Regex is valid"))
}

/// A validator that validates names and namespaces according to the Avro specification.
struct SpecificationValidator;

/// A trait that validates the simple name of a record, enum or fixed.
///
/// To register a custom one use [`set_schema_name_validator`].
pub trait SchemaNameValidator: Send + Sync {
    /// The regex used to validate the schema name.
    fn regex(&self) -> &'static Regex {
        avro_name_regex()
    }

    fn validate(&self, name: &str) -> bool {
        SchemaNameValidator::regex(self).is_match(name)
    }
}

impl SchemaNameValidator for SpecificationValidator {}

static NAME_VALIDATOR_ONCE: OnceLock<Box<dyn SchemaNameValidator>> = OnceLock::new();

/// Sets a custom schema name validator.
///
/// Returns `Err(validator)` if a validator is already configured.
pub fn set_schema_name_validator(
    validator: Box<dyn SchemaNameValidator>,
) -> Result<(), Box<dyn SchemaNameValidator>> {
    debug!("Setting a custom schema name validator.");
    NAME_VALIDATOR_ONCE.set(validator)
}

pub(crate) fn validate_schema_name(name: &str, path: &SchemaPath) -> Result<(), ValidationError> {
    let valid = NAME_VALIDATOR_ONCE
        .get_or_init(|| {
            debug!("Going to use the default name validator.");
            Box::new(SpecificationValidator)
        })
        .validate(name);
    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidName(name.to_string(), path.clone()))
    }
}

/// A trait that validates schema namespaces.
///
/// To register a custom one use [`set_schema_namespace_validator`].
pub trait SchemaNamespaceValidator: Send + Sync {
    /// The regex every dot separated part of a namespace must match.
    fn regex(&self) -> &'static Regex {
        avro_name_regex()
    }

    /// Returns the first part of `namespace` that is invalid, if any.
    fn invalid_part<'a>(&self, namespace: &'a str) -> Option<&'a str> {
        let regex = SchemaNamespaceValidator::regex(self);
        namespace.split('.').find(|part| !regex.is_match(part))
    }
}

impl SchemaNamespaceValidator for SpecificationValidator {}

static NAMESPACE_VALIDATOR_ONCE: OnceLock<Box<dyn SchemaNamespaceValidator>> = OnceLock::new();

/// Sets a custom schema namespace validator.
///
/// Returns `Err(validator)` if a validator is already configured.
pub fn set_schema_namespace_validator(
    validator: Box<dyn SchemaNamespaceValidator>,
) -> Result<(), Box<dyn SchemaNamespaceValidator>> {
    debug!("Setting a custom schema namespace validator.");
    NAMESPACE_VALIDATOR_ONCE.set(validator)
}

/// An empty namespace is valid.
pub(crate) fn validate_namespace(namespace: &str, path: &SchemaPath) -> Result<(), ValidationError> {
    if namespace.is_empty() {
        return Ok(());
    }
    let invalid = NAMESPACE_VALIDATOR_ONCE
        .get_or_init(|| {
            debug!("Going to use the default namespace validator.");
            Box::new(SpecificationValidator)
        })
        .invalid_part(namespace);
    match invalid {
        Some(part) => Err(ValidationError::InvalidNamespace {
            namespace: namespace.to_string(),
            part: part.to_string(),
            path: path.clone(),
        }),
        None => Ok(()),
    }
}

/// A trait that validates enum symbol names.
///
/// To register a custom one use [`set_enum_symbol_name_validator`].
pub trait EnumSymbolNameValidator: Send + Sync {
    /// The regex used to validate the symbols of enums.
    fn regex(&self) -> &'static Regex {
        avro_name_regex()
    }

    fn validate(&self, symbol: &str) -> bool {
        EnumSymbolNameValidator::regex(self).is_match(symbol)
    }
}

impl EnumSymbolNameValidator for SpecificationValidator {}

static ENUM_SYMBOL_NAME_VALIDATOR_ONCE: OnceLock<Box<dyn EnumSymbolNameValidator>> =
    OnceLock::new();

/// Sets a custom enum symbol name validator.
///
/// Returns `Err(validator)` if a validator is already configured.
pub fn set_enum_symbol_name_validator(
    validator: Box<dyn EnumSymbolNameValidator>,
) -> Result<(), Box<dyn EnumSymbolNameValidator>> {
    debug!("Setting a custom enum symbol name validator.");
    ENUM_SYMBOL_NAME_VALIDATOR_ONCE.set(validator)
}

pub(crate) fn validate_enum_symbol_name(
    symbol: &str,
    path: &SchemaPath,
) -> Result<(), ValidationError> {
    let valid = ENUM_SYMBOL_NAME_VALIDATOR_ONCE
        .get_or_init(|| {
            debug!("Going to use the default enum symbol name validator.");
            Box::new(SpecificationValidator)
        })
        .validate(symbol);
    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidName(symbol.to_string(), path.clone()))
    }
}

/// A trait that validates record field names.
///
/// To register a custom one use [`set_record_field_name_validator`].
pub trait RecordFieldNameValidator: Send + Sync {
    /// The regex used to validate the record field names.
    fn regex(&self) -> &'static Regex {
        avro_name_regex()
    }

    fn validate(&self, field_name: &str) -> bool {
        RecordFieldNameValidator::regex(self).is_match(field_name)
    }
}

impl RecordFieldNameValidator for SpecificationValidator {}

static RECORD_FIELD_NAME_VALIDATOR_ONCE: OnceLock<Box<dyn RecordFieldNameValidator>> =
    OnceLock::new();

/// Sets a custom record field name validator.
///
/// Returns `Err(validator)` if a validator is already configured.
pub fn set_record_field_name_validator(
    validator: Box<dyn RecordFieldNameValidator>,
) -> Result<(), Box<dyn RecordFieldNameValidator>> {
    debug!("Setting a custom record field name validator.");
    RECORD_FIELD_NAME_VALIDATOR_ONCE.set(validator)
}

pub(crate) fn validate_record_field_name(
    field_name: &str,
    path: &SchemaPath,
) -> Result<(), ValidationError> {
    let valid = RECORD_FIELD_NAME_VALIDATOR_ONCE
        .get_or_init(|| {
            debug!("Going to use the default record field name validator.");
            Box::new(SpecificationValidator)
        })
        .validate(field_name);
    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidName(
            field_name.to_string(),
            path.clone(),
        ))
    }
}
