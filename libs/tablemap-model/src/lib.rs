// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Entity model and its relational mapping.
//!
//! A [`Model`] is declared through a [`ModelBuilder`] and finalized once. Finalization resolves
//! the tables and columns every entity type maps onto, the row-sharing relationships between
//! entity types that live in the same row of a table, and the [`MappingShape`] of each entity
//! type. The finalized model is immutable and can be shared freely between translators.

mod arena;
pub mod builder;
mod entity_type;
mod error;
mod foreign_key;
mod fragment;
mod model;
mod ownership;
mod property;
mod row_sharing;
mod shape;
mod store_object;
mod table;
mod type_mapping;
mod value;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use arena::{MappedArena, SerializableSlab, SerializableSlabIndex};
pub use builder::{
    ModelBuilder,
    convention::{ConventionSet, EntityTypeAnnotationChangedConvention, ModelFinalizingConvention},
    json_convention::JsonMappingConvention,
};
pub use entity_type::{AnnotationName, Discriminator, EntityType, EntityTypeId};
pub use error::ModelBuildingError;
pub use foreign_key::{ForeignKey, ForeignKeyId, ForeignKeySpec};
pub use fragment::{ComparisonOp, MappingFragment, PropertyFilter};
pub use model::Model;
pub use property::{Property, PropertyId};
pub use shape::{DiscriminatorScope, MappingShape, UnmappedReason};
pub use store_object::{StoreObjectIdentifier, StoreObjectType};
pub use table::{Column, ColumnMapping, MAX_ENTITY_TYPES_SHARING_TABLE, Table, TableId};
pub use type_mapping::{
    DatabaseProvider, RelationalTypeMappingSource, TypeMapping, TypeMappingSource,
};
pub use value::{ConfigurationSource, EnumDefinition, LiteralValue, ValueConversion, ValueType};
