// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use tablemap_model::EntityTypeId;

use super::{delete::AbstractBulkDelete, update::AbstractBulkUpdate};

#[derive(Debug, Clone)]
pub enum AbstractBulkOperation {
    Delete(AbstractBulkDelete),
    Update(AbstractBulkUpdate),
}

impl AbstractBulkOperation {
    pub fn entity_type(&self) -> EntityTypeId {
        match self {
            AbstractBulkOperation::Delete(delete) => delete.entity_type,
            AbstractBulkOperation::Update(update) => update.entity_type,
        }
    }
}
