// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde::{Deserialize, Serialize};

use crate::{property::PropertyId, store_object::StoreObjectIdentifier, value::LiteralValue};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

/// `property <op> value`. Used for fragment conditions and global query filters.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PropertyFilter {
    pub property: PropertyId,
    pub op: ComparisonOp,
    pub value: LiteralValue,
}

impl PropertyFilter {
    pub fn new(property: PropertyId, op: ComparisonOp, value: impl Into<LiteralValue>) -> Self {
        Self {
            property,
            op,
            value: value.into(),
        }
    }

    pub fn equals(property: PropertyId, value: impl Into<LiteralValue>) -> Self {
        Self::new(property, ComparisonOp::Eq, value)
    }
}

/// Part of an entity type mapped onto a store object other than its primary one (entity
/// splitting). Key properties are mapped onto every fragment implicitly.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MappingFragment {
    pub store_object: StoreObjectIdentifier,
    pub properties: Vec<PropertyId>,
    /// Restricts the rows of `store_object` this fragment applies to. Empty means all rows.
    pub condition: Vec<PropertyFilter>,
}
