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

use crate::schema::{
    ArraySchema, EnumSchema, FixedSchema, MapSchema, Names, NamesRef, RecordSchema, Schema,
    UnionSchema,
};

/// A schema together with the named types it can refer to.
///
/// The table is built by walking the schema once; references are not followed.
/// Definitions inside the schema take precedence over known ones.
#[derive(Debug)]
pub struct ResolvedSchema<'s> {
    names_ref: NamesRef<'s>,
    root: &'s Schema,
}

impl<'s> From<&'s Schema> for ResolvedSchema<'s> {
    fn from(schema: &'s Schema) -> Self {
        let mut names_ref = NamesRef::new();
        resolve_names(schema, &mut names_ref);
        ResolvedSchema {
            names_ref,
            root: schema,
        }
    }
}

impl<'s> ResolvedSchema<'s> {
    /// Creates `ResolvedSchema` with some already known schemas.
    ///
    /// Those schemata would be used to resolve references if needed.
    pub fn new_with_known_schemata(schema: &'s Schema, known_schemata: &'s Names) -> Self {
        let mut names_ref = NamesRef::new();
        resolve_names(schema, &mut names_ref);
        for (name, known) in known_schemata {
            names_ref.entry(name.clone()).or_insert(known);
        }
        ResolvedSchema {
            names_ref,
            root: schema,
        }
    }

    pub fn get_root(&self) -> &'s Schema {
        self.root
    }

    /// Follows `schema` to its definition if it is a [`Schema::Ref`].
    ///
    /// Returns `None` for a reference to a name that is not known.
    pub fn resolve(&self, schema: &'s Schema) -> Option<&'s Schema> {
        match schema {
            Schema::Ref { name } => self.names_ref.get(name).copied(),
            _ => Some(schema),
        }
    }
}

/// Collect every named type defined in `schema` into `names`.
///
/// The first definition of a name wins.
pub(crate) fn resolve_names<'s>(schema: &'s Schema, names: &mut NamesRef<'s>) {
    match schema {
        Schema::Array(ArraySchema { items }) => resolve_names(items, names),
        Schema::Map(MapSchema { types }) => resolve_names(types, names),
        Schema::Union(UnionSchema { schemas, .. }) => {
            for schema in schemas {
                resolve_names(schema, names)
            }
        }
        Schema::Enum(EnumSchema { name, .. }) | Schema::Fixed(FixedSchema { name, .. }) => {
            names.entry(name.clone()).or_insert(schema);
        }
        Schema::Record(RecordSchema { name, fields, .. }) => {
            names.entry(name.clone()).or_insert(schema);
            for field in fields {
                resolve_names(&field.schema, names)
            }
        }
        _ => (),
    }
}
