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

use crate::schema::{Documentation, Name, RecordField};
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};

/// A description of a Record schema.
#[derive(bon::Builder, Clone)]
pub struct RecordSchema {
    /// The name of the schema
    #[builder(into)]
    pub name: Name,
    /// The documentation of the schema
    #[builder(default)]
    pub doc: Documentation,
    /// The set of fields of the schema
    #[builder(default)]
    pub fields: Vec<RecordField>,
    /// The `lookup` table maps field names to their position in the `Vec`
    /// of `fields`.
    #[builder(skip = calculate_lookup_table(&fields))]
    pub lookup: BTreeMap<String, usize>,
}

impl RecordSchema {
    /// The field called `name`, if the record declares one.
    pub fn field(&self, name: &str) -> Option<&RecordField> {
        self.lookup.get(name).and_then(|&index| self.fields.get(index))
    }
}

impl Debug for RecordSchema {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("RecordSchema");
        debug.field("name", &self.name);
        if let Some(doc) = &self.doc {
            debug.field("doc", doc);
        }
        debug.field("fields", &self.fields);
        if self.doc.is_none() {
            debug.finish_non_exhaustive()
        } else {
            debug.finish()
        }
    }
}

/// Calculate the lookup table for the given fields.
///
/// The first field wins when names repeat, duplicates are reported by validation.
fn calculate_lookup_table(fields: &[RecordField]) -> BTreeMap<String, usize> {
    let mut lookup = BTreeMap::new();
    for (i, field) in fields.iter().enumerate() {
        lookup.entry(field.name.clone()).or_insert(i);
    }
    lookup
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Schema;
    use pretty_assertions::assert_eq;

    #[test]
    fn record_schema_builder_no_fields() {
        let record_schema = RecordSchema::builder().name("TestRecord").build();

        assert_eq!(record_schema.name, Name::new("TestRecord"));
        assert_eq!(record_schema.doc, None);
        assert_eq!(record_schema.fields.len(), 0);
        assert_eq!(record_schema.lookup.len(), 0);
    }

    #[test]
    fn record_schema_builder_computes_lookup() {
        let record_schema = RecordSchema::builder()
            .name("ns.TestRecord")
            .fields(vec![
                RecordField::builder().name("a").schema(Schema::Int).build(),
                RecordField::builder().name("b").schema(Schema::String).build(),
            ])
            .build();

        assert_eq!(record_schema.lookup.get("b"), Some(&1));
        assert_eq!(
            record_schema.field("a").map(|field| &field.schema),
            Some(&Schema::Int)
        );
        assert!(record_schema.field("c").is_none());
    }
}
