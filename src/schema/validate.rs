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

use crate::{
    error::ValidationError,
    schema::{
        ArraySchema, EnumSchema, FixedSchema, MapSchema, Name, RecordSchema, Schema, SchemaPath,
    },
    validator::{
        validate_enum_symbol_name, validate_namespace, validate_record_field_name,
        validate_schema_name,
    },
};
use std::collections::HashSet;

impl Schema {
    /// Validates this schema according to the Avro specification.
    ///
    /// Returns the first violation found. Its [`SchemaPath`] names the enclosing
    /// types, fields and union options. References are not followed, every named
    /// type is checked where it is defined.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_in(&SchemaPath::default())
    }

    fn validate_in(&self, path: &SchemaPath) -> Result<(), ValidationError> {
        match self {
            Schema::Array(ArraySchema { items }) => items.validate_in(&path.nested_in("array")),
            Schema::Map(MapSchema { types }) => types.validate_in(&path.nested_in("map")),
            Schema::Union(union) => {
                let options = union.variants();
                validate_not_empty(options.len(), path)?;
                validate_unique(options.iter().map(Schema::type_name), path)?;
                options.iter().enumerate().try_for_each(|(i, option)| {
                    option.validate_in(&path.nested_in(format!("union[{i}]")))
                })
            }
            Schema::Enum(EnumSchema { name, symbols, .. }) => {
                validate_fullname(name, &path.nested_in("enum"))?;
                let path = path.nested_in(name.fullname());
                validate_not_empty(symbols.len(), &path)?;
                validate_unique(symbols.iter().map(String::as_str), &path)?;
                symbols
                    .iter()
                    .try_for_each(|symbol| validate_enum_symbol_name(symbol, &path))
            }
            Schema::Fixed(FixedSchema { name, size, .. }) => {
                validate_fullname(name, &path.nested_in("fixed"))?;
                if *size == 0 {
                    return Err(ValidationError::InvalidFixedSize(
                        *size,
                        path.nested_in(name.fullname()),
                    ));
                }
                Ok(())
            }
            Schema::Record(RecordSchema { name, fields, .. }) => {
                validate_fullname(name, &path.nested_in("record"))?;
                let path = path.nested_in(name.fullname());
                validate_not_empty(fields.len(), &path)?;
                for field in fields {
                    validate_record_field_name(&field.name, &path)?;
                    field
                        .schema
                        .validate_in(&path.nested_in(field.name.as_str()))?;
                }
                validate_unique(fields.iter().map(|field| field.name.as_str()), &path)
            }
            Schema::Unknown => Err(ValidationError::InvalidType(path.clone())),
            _ => Ok(()),
        }
    }
}

fn validate_fullname(name: &Name, path: &SchemaPath) -> Result<(), ValidationError> {
    if name.fullname().is_empty() {
        return Err(ValidationError::InvalidName(String::new(), path.clone()));
    }
    validate_schema_name(name.name(), path)?;
    validate_namespace(name.namespace().unwrap_or_default(), path)
}

fn validate_not_empty(count: usize, path: &SchemaPath) -> Result<(), ValidationError> {
    if count == 0 {
        Err(ValidationError::Empty(path.clone()))
    } else {
        Ok(())
    }
}

/// Every repeated value is reported once, in order of its first repetition.
fn validate_unique<'a>(
    values: impl Iterator<Item = &'a str>,
    path: &SchemaPath,
) -> Result<(), ValidationError> {
    let mut unique = HashSet::new();
    let mut duplicates: Vec<String> = Vec::new();
    for value in values {
        if !unique.insert(value) && !duplicates.iter().any(|d| d == value) {
            duplicates.push(value.to_string());
        }
    }
    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::NotUnique(duplicates, path.clone()))
    }
}
