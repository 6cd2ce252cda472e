// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use tablemap_model::{EntityTypeId, PropertyId};

use super::{operand::Operand, predicate::AbstractPredicate};

#[derive(Debug, Clone)]
pub struct Assignment {
    pub property: PropertyId,
    /// A constant, a parameter, `Null` or another property of the same row.
    pub value: Operand,
}

impl Assignment {
    pub fn new(property: PropertyId, value: Operand) -> Self {
        Self { property, value }
    }
}

/// Set `assignments` on every entity of `entity_type` (including derived types) matching
/// `predicate`.
#[derive(Debug, Clone)]
pub struct AbstractBulkUpdate {
    pub entity_type: EntityTypeId,
    pub predicate: AbstractPredicate,
    pub assignments: Vec<Assignment>,
}
