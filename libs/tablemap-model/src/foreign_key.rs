// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde::{Deserialize, Serialize};

use crate::{arena::SerializableSlabIndex, entity_type::EntityTypeId, property::PropertyId};

pub type ForeignKeyId = SerializableSlabIndex<ForeignKey>;

/// A relationship from a dependent entity type to a principal entity type.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ForeignKey {
    pub dependent: EntityTypeId,
    pub principal: EntityTypeId,
    /// Properties of the dependent, in the same order as `principal_key`.
    pub properties: Vec<PropertyId>,
    pub principal_key: Vec<PropertyId>,
    /// Resolved during finalization.
    pub principal_key_is_primary: bool,
    /// A dependent row exists for every principal row.
    pub is_required_dependent: bool,
    /// The dependent is owned by the principal and has no identity of its own.
    pub is_ownership: bool,
}

impl ForeignKey {
    /// Pairs of (dependent property, principal key property).
    pub fn property_pairs(&self) -> impl Iterator<Item = (PropertyId, PropertyId)> + '_ {
        self.properties
            .iter()
            .copied()
            .zip(self.principal_key.iter().copied())
    }
}

/// A foreign key as declared through the builder, by property name.
#[derive(Debug, Clone)]
pub struct ForeignKeySpec<'a> {
    pub dependent: EntityTypeId,
    pub principal: EntityTypeId,
    pub properties: &'a [&'a str],
    /// Defaults to the principal's primary key.
    pub principal_key: Option<&'a [&'a str]>,
    pub is_required_dependent: bool,
    pub is_ownership: bool,
}

impl<'a> ForeignKeySpec<'a> {
    pub fn new(
        dependent: EntityTypeId,
        principal: EntityTypeId,
        properties: &'a [&'a str],
    ) -> Self {
        Self {
            dependent,
            principal,
            properties,
            principal_key: None,
            is_required_dependent: false,
            is_ownership: false,
        }
    }

    pub fn principal_key(mut self, principal_key: &'a [&'a str]) -> Self {
        self.principal_key = Some(principal_key);
        self
    }

    pub fn required_dependent(mut self) -> Self {
        self.is_required_dependent = true;
        self
    }

    pub fn ownership(mut self) -> Self {
        self.is_ownership = true;
        self
    }
}
