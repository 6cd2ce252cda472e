// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde::{Deserialize, Serialize};

use crate::{
    entity_type::EntityTypeId, fragment::PropertyFilter, property::PropertyId, table::TableId,
};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmappedReason {
    /// Mapped onto a raw SQL query, which cannot be written to.
    QuerySource,
    /// Not mapped onto any store object.
    NoStoreObject,
}

/// Which discriminator values select the rows of an entity type.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum DiscriminatorScope {
    /// Every row of the table belongs to the type (hierarchy root with a complete mapping).
    Unrestricted,
    /// The values of all concrete types in the subtree, in hierarchy order.
    Values(Vec<String>),
    /// No concrete type, so no row can ever match.
    Unsatisfiable,
}

/// How an entity type is laid out in the store, resolved once at finalization.
///
/// `RowSharing` and `FilteredFragment` wrap the shape they refine, so a split entity type in a
/// hierarchy is a `FilteredFragment` around a `DiscriminatedHierarchy`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum MappingShape {
    Unmapped {
        reason: UnmappedReason,
    },
    JsonMapped {
        owner: EntityTypeId,
    },
    SingleTable {
        table: TableId,
    },
    DiscriminatedHierarchy {
        table: TableId,
        discriminator: PropertyId,
        scope: DiscriminatorScope,
    },
    /// Shares rows of `table` with its transitive principals.
    RowSharing {
        base: Box<MappingShape>,
        table: TableId,
        principals: Vec<EntityTypeId>,
        /// The dependent row may be absent for a principal row.
        optional_dependent: bool,
    },
    /// Part of the properties live on `fragment_table`, restricted by `condition`.
    FilteredFragment {
        base: Box<MappingShape>,
        fragment_table: TableId,
        condition: Vec<PropertyFilter>,
    },
}

impl MappingShape {
    /// The table holding the type's primary mapping.
    pub fn primary_table(&self) -> Option<TableId> {
        match self {
            MappingShape::Unmapped { .. } | MappingShape::JsonMapped { .. } => None,
            MappingShape::SingleTable { table }
            | MappingShape::DiscriminatedHierarchy { table, .. } => Some(*table),
            MappingShape::RowSharing { base, .. } | MappingShape::FilteredFragment { base, .. } => {
                base.primary_table()
            }
        }
    }

    pub fn is_row_sharing(&self) -> bool {
        match self {
            MappingShape::RowSharing { .. } => true,
            MappingShape::FilteredFragment { base, .. } => base.is_row_sharing(),
            _ => false,
        }
    }

    /// Whether part of the type is mapped onto another table.
    pub fn is_split(&self) -> bool {
        match self {
            MappingShape::FilteredFragment { .. } => true,
            MappingShape::RowSharing { base, .. } => base.is_split(),
            _ => false,
        }
    }
}
