// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Discovery of entity types that share rows of a table.
//!
//! A foreign key is row-internal in a store object when the dependent's key is the foreign key
//! itself, the principal side is a primary key, and both entity types are mapped onto that
//! store object. A dependent row and its principal row are then the same physical row.

use std::collections::HashSet;

use indexmap::IndexSet;

use crate::{
    entity_type::EntityTypeId,
    error::ModelBuildingError,
    foreign_key::{ForeignKey, ForeignKeyId},
    model::Model,
    store_object::StoreObjectIdentifier,
    table::{Table, TableId},
};

impl Model {
    /// Row-internal foreign keys in `store_object` whose principal is exactly `principal`.
    ///
    /// JSON-mapped types never share rows, so nothing is returned for them. Enumeration stops at
    /// the first dependent without a primary key.
    pub fn find_declared_referencing_row_internal_foreign_keys(
        &self,
        principal: EntityTypeId,
        store_object: &StoreObjectIdentifier,
    ) -> Vec<ForeignKeyId> {
        let principal_type = &self.entity_types[principal];
        if principal_type.is_mapped_to_json() {
            return vec![];
        }

        let mut foreign_keys = vec![];
        for fk_id in &principal_type.referencing_foreign_keys {
            let fk = &self.foreign_keys[*fk_id];
            let Some(dependent_key) = self.primary_key(fk.dependent) else {
                break;
            };

            if !fk.principal_key_is_primary
                || self.is_assignable_from(fk.principal, fk.dependent)
                || fk.properties != dependent_key
                || !self.is_mapped_to(fk.principal, store_object)
                || !self.is_mapped_to(fk.dependent, store_object)
            {
                continue;
            }

            foreign_keys.push(*fk_id);
        }
        foreign_keys
    }

    /// Row-internal foreign keys of `table` whose dependent is `dependent` or one of its base
    /// types.
    pub fn row_internal_foreign_keys(
        &self,
        table: TableId,
        dependent: EntityTypeId,
    ) -> Vec<ForeignKeyId> {
        self.row_internal_foreign_keys_of(&self.tables[table], dependent)
            .map(|(id, _)| id)
            .collect()
    }

    /// The transitive row-sharing principals of `entity_type` in `table`. `None` if the entity
    /// type is not mapped onto the table.
    pub fn principal_closure(
        &self,
        table: TableId,
        entity_type: EntityTypeId,
    ) -> Option<&IndexSet<EntityTypeId>> {
        self.tables[table].principal_closures.get(&entity_type)
    }

    /// Whether rows of `entity_type` in `table` are shared with another entity type, as either
    /// the dependent or the principal of a row-internal foreign key.
    pub fn shares_rows(&self, table: TableId, entity_type: EntityTypeId) -> bool {
        let related = |other: EntityTypeId| {
            self.is_assignable_from(other, entity_type)
                || self.is_assignable_from(entity_type, other)
        };

        self.tables[table]
            .row_internal_foreign_keys
            .iter()
            .map(|id| &self.foreign_keys[*id])
            .any(|fk| related(fk.dependent) || related(fk.principal))
    }

    pub(crate) fn is_row_internal(
        &self,
        fk: &ForeignKey,
        store_object: &StoreObjectIdentifier,
    ) -> bool {
        let Some(dependent_key) = self.primary_key(fk.dependent) else {
            return false;
        };

        fk.principal_key_is_primary
            && !self.is_assignable_from(fk.principal, fk.dependent)
            && fk.properties == dependent_key
            && !self.entity_types[fk.dependent].is_mapped_to_json()
            && !self.entity_types[fk.principal].is_mapped_to_json()
            && self.is_mapped_to(fk.principal, store_object)
            && self.is_mapped_to(fk.dependent, store_object)
    }

    fn row_internal_foreign_keys_of<'a>(
        &'a self,
        table: &'a Table,
        dependent: EntityTypeId,
    ) -> impl Iterator<Item = (ForeignKeyId, &'a ForeignKey)> + 'a {
        table
            .row_internal_foreign_keys
            .iter()
            .map(|id| (*id, &self.foreign_keys[*id]))
            .filter(move |(_, fk)| self.is_assignable_from(fk.dependent, dependent))
    }

    /// Compute the principal closure of `entity_type` in `table`.
    ///
    /// Depth first over row-internal edges. Reaching a type that is still on the traversal stack
    /// is a cycle; reaching one that was already completed (a diamond) is not.
    pub(crate) fn compute_principal_closure(
        &self,
        table: &Table,
        entity_type: EntityTypeId,
    ) -> Result<IndexSet<EntityTypeId>, ModelBuildingError> {
        let mut closure = IndexSet::new();
        let mut visiting = HashSet::new();
        self.visit_principals(table, entity_type, &mut visiting, &mut closure)?;
        Ok(closure)
    }

    fn visit_principals(
        &self,
        table: &Table,
        entity_type: EntityTypeId,
        visiting: &mut HashSet<EntityTypeId>,
        closure: &mut IndexSet<EntityTypeId>,
    ) -> Result<(), ModelBuildingError> {
        visiting.insert(entity_type);

        let principals: Vec<_> = self
            .row_internal_foreign_keys_of(table, entity_type)
            .map(|(_, fk)| fk.principal)
            .collect();

        for principal in principals {
            if visiting.contains(&principal) {
                return Err(ModelBuildingError::RowSharingCycle {
                    table: table.store_object.to_string(),
                    entity_type: self.entity_types[principal].name.clone(),
                });
            }

            if closure.insert(principal) {
                self.visit_principals(table, principal, visiting, closure)?;
            }
        }

        visiting.remove(&entity_type);
        Ok(())
    }
}
