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

//! Equality and hashing of [`Schema`]s.
//!
//! Named types may refer to themselves. Both the comparison and the hash keep
//! the set of names already visited and treat a repeated name as a leaf.

use crate::{
    Schema,
    schema::{
        ArraySchema, EnumSchema, FixedSchema, MapSchema, RecordField, RecordSchema, SchemaKind,
        UnionSchema,
    },
};
use log::debug;
use std::{
    collections::HashSet,
    fmt::Debug,
    hash::{Hash, Hasher},
    sync::OnceLock,
};

/// A trait that compares two schemata for equality.
/// To register a custom one use [set_schemata_equality_comparator].
pub trait SchemataEq: Debug + Send + Sync {
    /// Compares two schemata for equality.
    fn compare(&self, schema_one: &Schema, schema_two: &Schema) -> bool;
}

/// Compares two schemas by their canonical strings.
///
/// Schemas that cannot be rendered (they contain `unknown`) are compared
/// structurally instead.
#[derive(Debug)]
pub struct SpecificationEq;
impl SchemataEq for SpecificationEq {
    fn compare(&self, schema_one: &Schema, schema_two: &Schema) -> bool {
        match (schema_one.canonical_form(), schema_two.canonical_form()) {
            (Ok(one), Ok(two)) => one == two,
            (Err(_), Err(_)) => StructFieldEq {
                include_defaults: false,
            }
            .compare(schema_one, schema_two),
            _ => false,
        }
    }
}

/// Compares two schemas for equality field by field.
#[derive(Debug)]
pub struct StructFieldEq {
    /// Whether to compare the default values of record fields.
    pub include_defaults: bool,
}

impl SchemataEq for StructFieldEq {
    fn compare(&self, schema_one: &Schema, schema_two: &Schema) -> bool {
        self.compare_in(schema_one, schema_two, &mut HashSet::new())
    }
}

impl StructFieldEq {
    #[rustfmt::skip]
    fn compare_in(&self, schema_one: &Schema, schema_two: &Schema, seen: &mut HashSet<String>) -> bool {
        if schema_one.is_named() || schema_two.is_named() {
            return match (schema_one.name(), schema_two.name()) {
                (Some(name_one), Some(name_two)) if name_one == name_two => {
                    let fullname = name_one.fullname();
                    if seen.contains(fullname) {
                        return true;
                    }
                    if matches!(schema_one, Schema::Ref { .. }) || matches!(schema_two, Schema::Ref { .. }) {
                        return matches!((schema_one, schema_two), (Schema::Ref { .. }, Schema::Ref { .. }));
                    }
                    seen.insert(fullname.to_string());
                    self.compare_named_bodies(schema_one, schema_two, seen)
                }
                _ => false,
            };
        }

        match (schema_one, schema_two) {
            (Schema::Null, Schema::Null) => true,
            (Schema::Null, _) => false,
            (Schema::Boolean, Schema::Boolean) => true,
            (Schema::Boolean, _) => false,
            (Schema::Int, Schema::Int) => true,
            (Schema::Int, _) => false,
            (Schema::Long, Schema::Long) => true,
            (Schema::Long, _) => false,
            (Schema::Float, Schema::Float) => true,
            (Schema::Float, _) => false,
            (Schema::Double, Schema::Double) => true,
            (Schema::Double, _) => false,
            (Schema::Bytes, Schema::Bytes) => true,
            (Schema::Bytes, _) => false,
            (Schema::String, Schema::String) => true,
            (Schema::String, _) => false,
            (Schema::Unknown, Schema::Unknown) => true,
            (Schema::Unknown, _) => false,
            (
                Schema::Union(UnionSchema { schemas: schemas_one, ..}),
                Schema::Union(UnionSchema { schemas: schemas_two, .. })
            ) => {
                schemas_one.len() == schemas_two.len()
                    && schemas_one
                    .iter()
                    .zip(schemas_two.iter())
                    .all(|(s1, s2)| self.compare_in(s1, s2, seen))
            }
            (Schema::Union(_), _) => false,
            (
                Schema::Array(ArraySchema { items: items_one }),
                Schema::Array(ArraySchema { items: items_two })
            ) => {
                self.compare_in(items_one, items_two, seen)
            }
            (Schema::Array(_), _) => false,
            (
                Schema::Map(MapSchema { types: types_one }),
                Schema::Map(MapSchema { types: types_two })
            ) => {
                self.compare_in(types_one, types_two, seen)
            }
            (Schema::Map(_), _) => false,
            // named types are handled above
            (Schema::Record(_) | Schema::Enum(_) | Schema::Fixed(_) | Schema::Ref { .. }, _) => false,
        }
    }

    #[rustfmt::skip]
    fn compare_named_bodies(
        &self,
        schema_one: &Schema,
        schema_two: &Schema,
        seen: &mut HashSet<String>,
    ) -> bool {
        match (schema_one, schema_two) {
            (
                Schema::Record(RecordSchema {
                    fields: fields_one, ..
                }),
                Schema::Record(RecordSchema {
                    fields: fields_two, ..
                }),
            ) => self.compare_fields(fields_one, fields_two, seen),
            (
                Schema::Enum(EnumSchema {
                    symbols: symbols_one,
                    ..
                }),
                Schema::Enum(EnumSchema {
                    symbols: symbols_two,
                    ..
                }),
            ) => symbols_one == symbols_two,
            (
                Schema::Fixed(FixedSchema { size: size_one, .. }),
                Schema::Fixed(FixedSchema { size: size_two, .. }),
            ) => size_one == size_two,
            _ => false,
        }
    }

    fn compare_fields(
        &self,
        fields_one: &[RecordField],
        fields_two: &[RecordField],
        seen: &mut HashSet<String>,
    ) -> bool {
        fields_one.len() == fields_two.len()
            && fields_one.iter().zip(fields_two.iter()).all(|(f1, f2)| {
                f1.name == f2.name
                    && self.compare_in(&f1.schema, &f2.schema, seen)
                    && (!self.include_defaults || f1.default == f2.default)
            })
    }
}

static SCHEMATA_COMPARATOR_ONCE: OnceLock<Box<dyn SchemataEq>> = OnceLock::new();

/// Sets a custom schemata equality comparator.
///
/// Returns a unit if the registration was successful or the already
/// registered comparator if the registration failed.
///
/// **Note**: This function must be called before comparing any schema because this will
/// register the default comparator and the registration is one time only!
pub fn set_schemata_equality_comparator(
    comparator: Box<dyn SchemataEq>,
) -> Result<(), Box<dyn SchemataEq>> {
    debug!("Setting a custom schemata equality comparator: {comparator:?}.");
    SCHEMATA_COMPARATOR_ONCE.set(comparator)
}

pub(crate) fn compare_schemata(schema_one: &Schema, schema_two: &Schema) -> bool {
    SCHEMATA_COMPARATOR_ONCE
        .get_or_init(|| {
            debug!("Going to use the default schemata equality comparator: StructFieldEq.",);
            Box::new(StructFieldEq {
                include_defaults: true,
            })
        })
        .compare(schema_one, schema_two)
}

/// Feeds `schema` into `state`.
///
/// References and repeated definitions hash as their name only and defaults are
/// left out, so schemas equal under either comparator hash alike.
pub(crate) fn hash_schema<H: Hasher>(schema: &Schema, state: &mut H) {
    hash_in(schema, state, &mut HashSet::new())
}

fn hash_in<H: Hasher>(schema: &Schema, state: &mut H, seen: &mut HashSet<String>) {
    if let Some(name) = schema.name()
        && (matches!(schema, Schema::Ref { .. }) || !seen.insert(name.fullname().to_string()))
    {
        SchemaKind::Ref.hash(state);
        name.hash(state);
        return;
    }

    SchemaKind::from(schema).hash(state);
    match schema {
        Schema::Array(ArraySchema { items }) => hash_in(items, state, seen),
        Schema::Map(MapSchema { types }) => hash_in(types, state, seen),
        Schema::Union(union) => {
            union.variants().len().hash(state);
            for option in union.variants() {
                hash_in(option, state, seen);
            }
        }
        Schema::Record(RecordSchema { name, fields, .. }) => {
            name.hash(state);
            fields.len().hash(state);
            for field in fields {
                field.name.hash(state);
                hash_in(&field.schema, state, seen);
            }
        }
        Schema::Enum(EnumSchema { name, symbols, .. }) => {
            name.hash(state);
            symbols.hash(state);
        }
        Schema::Fixed(FixedSchema { name, size, .. }) => {
            name.hash(state);
            size.hash(state);
        }
        _ => (),
    }
}
