// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use tablemap_model::EntityTypeId;

use super::predicate::AbstractPredicate;

/// Delete every entity of `entity_type` (including derived types) matching `predicate`.
#[derive(Debug, Clone)]
pub struct AbstractBulkDelete {
    pub entity_type: EntityTypeId,
    pub predicate: AbstractPredicate,
}
