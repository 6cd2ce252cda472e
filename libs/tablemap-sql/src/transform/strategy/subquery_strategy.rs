// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.
use tablemap_model::Model;

use crate::{
    sql::{dialect::Dialect, statement::BulkOperation},
    transform::{bulk_transformer::BulkTransformer, predicate_transformer::NavigationMode},
    translation_error::TranslationError,
};

use super::bulk_strategy::{BulkRequest, BulkStrategy, render_request};

/// Target a single table and read navigations through `IN (SELECT ...)` subqueries. Works in
/// every dialect and is the only option for SQLite.
pub(crate) struct SubqueryStrategy {}

impl BulkStrategy for SubqueryStrategy {
    fn id(&self) -> &'static str {
        "SubqueryStrategy"
    }

    fn suitable(&self, _request: &BulkRequest, _model: &Model, _dialect: Dialect) -> bool {
        true
    }

    fn to_operation(
        &self,
        request: &BulkRequest,
        transformer: &BulkTransformer,
    ) -> Result<BulkOperation, TranslationError> {
        render_request(request, transformer, NavigationMode::Subquery)
    }
}
