// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{
    fmt::{Display, Formatter},
    sync::Arc,
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    arena::SerializableSlabIndex,
    foreign_key::ForeignKeyId,
    fragment::{MappingFragment, PropertyFilter},
    property::PropertyId,
    shape::{MappingShape, UnmappedReason},
    store_object::StoreObjectIdentifier,
    table::TableId,
    type_mapping::TypeMapping,
};

pub type EntityTypeId = SerializableSlabIndex<EntityType>;

/// Mapping annotations that can be set on an entity type. Changes to these are reported to the
/// annotation-changed conventions.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationName {
    TableName,
    Schema,
    ViewName,
    SqlQuery,
    JsonColumnName,
    DiscriminatorValue,
}

impl Display for AnnotationName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AnnotationName::TableName => "Relational:TableName",
            AnnotationName::Schema => "Relational:Schema",
            AnnotationName::ViewName => "Relational:ViewName",
            AnnotationName::SqlQuery => "Relational:SqlQuery",
            AnnotationName::JsonColumnName => "Relational:JsonColumnName",
            AnnotationName::DiscriminatorValue => "DiscriminatorValue",
        };
        f.write_str(name)
    }
}

/// The discriminator of a hierarchy. Only ever set on the root.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Discriminator {
    pub property: PropertyId,
    /// When false, the table may hold rows with discriminator values unknown to the model, so
    /// even a query against the root must filter by the known values.
    pub mapping_complete: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EntityType {
    pub name: String,
    pub base_type: Option<EntityTypeId>,
    pub is_abstract: bool,
    pub declared_properties: Vec<PropertyId>,
    /// Declared on the hierarchy root and inherited by derived types. `None` for keyless types.
    pub primary_key: Option<Vec<PropertyId>>,
    /// Foreign keys declared by this type (as the dependent).
    pub declared_foreign_keys: Vec<ForeignKeyId>,
    /// Foreign keys whose principal is exactly this type.
    pub referencing_foreign_keys: Vec<ForeignKeyId>,
    pub annotations: IndexMap<AnnotationName, String>,
    /// Attached by the JSON mapping convention while a JSON column name is set.
    pub json_column_type_mapping: Option<Arc<TypeMapping>>,
    pub mapping_fragments: Vec<MappingFragment>,
    pub discriminator: Option<Discriminator>,
    pub query_filter: Option<Vec<PropertyFilter>>,

    // Resolved during finalization
    pub derived_types: Vec<EntityTypeId>,
    /// Self and inherited properties, root first.
    pub properties: Vec<PropertyId>,
    pub store_object: Option<StoreObjectIdentifier>,
    /// The primary table first, then fragment tables.
    pub tables: Vec<TableId>,
    pub shape: MappingShape,
}

impl EntityType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_type: None,
            is_abstract: false,
            declared_properties: vec![],
            primary_key: None,
            declared_foreign_keys: vec![],
            referencing_foreign_keys: vec![],
            annotations: IndexMap::new(),
            json_column_type_mapping: None,
            mapping_fragments: vec![],
            discriminator: None,
            query_filter: None,
            derived_types: vec![],
            properties: vec![],
            store_object: None,
            tables: vec![],
            shape: MappingShape::Unmapped {
                reason: UnmappedReason::NoStoreObject,
            },
        }
    }

    pub fn annotation(&self, name: AnnotationName) -> Option<&str> {
        self.annotations.get(&name).map(|value| value.as_str())
    }

    /// The JSON column this type is serialized into, if any. An empty name counts as unset.
    pub fn json_column_name(&self) -> Option<&str> {
        self.annotation(AnnotationName::JsonColumnName)
            .filter(|name| !name.is_empty())
    }

    pub fn is_mapped_to_json(&self) -> bool {
        self.json_column_name().is_some()
    }

    pub fn discriminator_value(&self) -> &str {
        self.annotation(AnnotationName::DiscriminatorValue)
            .unwrap_or(&self.name)
    }

    pub fn is_keyless(&self) -> bool {
        self.primary_key.is_none()
    }

    pub fn primary_table(&self) -> Option<TableId> {
        self.tables.first().copied()
    }
}
