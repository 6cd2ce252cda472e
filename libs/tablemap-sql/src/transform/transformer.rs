// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.
use crate::{
    asql::{
        abstract_operation::AbstractBulkOperation, delete::AbstractBulkDelete,
        update::AbstractBulkUpdate,
    },
    sql::statement::BulkOperation,
    translation_error::TranslationError,
};

use super::bulk_transformer::BulkTransformer;

pub trait OperationTransformer {
    fn to_bulk_operation(
        &self,
        abstract_operation: &AbstractBulkOperation,
    ) -> Result<BulkOperation, TranslationError>;
}

impl OperationTransformer for BulkTransformer<'_> {
    fn to_bulk_operation(
        &self,
        abstract_operation: &AbstractBulkOperation,
    ) -> Result<BulkOperation, TranslationError> {
        match abstract_operation {
            AbstractBulkOperation::Delete(delete) => {
                DeleteTransformer::to_bulk_operation(self, delete)
            }
            AbstractBulkOperation::Update(update) => {
                UpdateTransformer::to_bulk_operation(self, update)
            }
        }
    }
}

pub trait DeleteTransformer {
    fn to_bulk_operation(
        &self,
        abstract_delete: &AbstractBulkDelete,
    ) -> Result<BulkOperation, TranslationError>;
}

pub trait UpdateTransformer {
    fn to_bulk_operation(
        &self,
        abstract_update: &AbstractBulkUpdate,
    ) -> Result<BulkOperation, TranslationError>;
}
