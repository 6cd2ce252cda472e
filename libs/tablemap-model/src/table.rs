// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::{
    arena::SerializableSlabIndex, entity_type::EntityTypeId, foreign_key::ForeignKeyId,
    property::PropertyId, store_object::StoreObjectIdentifier,
};

pub type TableId = SerializableSlabIndex<Table>;

/// Upper bound on the number of entity types mapped onto a single table.
pub const MAX_ENTITY_TYPES_SHARING_TABLE: usize = 128;

/// One source of values for a column.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub entity_type: EntityTypeId,
    /// `None` for a JSON container column, which is mapped from the owned entity type as a whole.
    pub property: Option<PropertyId>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Column {
    pub name: String,
    pub store_type: String,
    pub nullable: bool,
    pub mappings: Vec<ColumnMapping>,
}

impl Column {
    /// Whether more than one property is mapped onto this column.
    pub fn is_shared(&self) -> bool {
        self.mappings.len() > 1
    }
}

/// A table or view, with every entity type and property mapped onto it.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Table {
    pub store_object: StoreObjectIdentifier,
    pub columns: IndexMap<String, Column>,
    /// Entity types with at least one column on this table, in mapping order.
    pub entity_type_mappings: Vec<EntityTypeId>,
    /// Foreign keys linking two entity types that live in the same row of this table.
    pub row_internal_foreign_keys: Vec<ForeignKeyId>,
    pub(crate) property_columns: IndexMap<PropertyId, String>,
    pub(crate) principal_closures: IndexMap<EntityTypeId, IndexSet<EntityTypeId>>,
}

impl Table {
    pub(crate) fn new(store_object: StoreObjectIdentifier) -> Self {
        Self {
            store_object,
            columns: IndexMap::new(),
            entity_type_mappings: vec![],
            row_internal_foreign_keys: vec![],
            property_columns: IndexMap::new(),
            principal_closures: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.store_object.name
    }

    pub fn schema(&self) -> Option<&str> {
        self.store_object.schema.as_deref()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// The column `property` is mapped onto in this table, if any.
    pub fn column_for(&self, property: PropertyId) -> Option<&Column> {
        self.property_columns
            .get(&property)
            .and_then(|name| self.columns.get(name))
    }

    pub fn hosts(&self, entity_type: EntityTypeId) -> bool {
        self.entity_type_mappings.contains(&entity_type)
    }

    pub(crate) fn add_entity_type(&mut self, entity_type: EntityTypeId) {
        if !self.hosts(entity_type) {
            self.entity_type_mappings.push(entity_type);
        }
    }

    /// Map a value source onto a column, creating the column on first use.
    pub(crate) fn map_column(
        &mut self,
        name: &str,
        store_type: &str,
        nullable: bool,
        mapping: ColumnMapping,
    ) {
        self.add_entity_type(mapping.entity_type);
        if let Some(property) = mapping.property {
            self.property_columns.insert(property, name.to_string());
        }

        let column = self
            .columns
            .entry(name.to_string())
            .or_insert_with(|| Column {
                name: name.to_string(),
                store_type: store_type.to_string(),
                nullable,
                mappings: vec![],
            });
        column.nullable |= nullable;
        if !column.mappings.contains(&mapping) {
            column.mappings.push(mapping);
        }
    }
}
