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

/// Join the principal tables read by navigations to the target, with `FROM`/`INNER JOIN` on SQL
/// Server and `USING` (delete) or `FROM` (update) on Postgres. An inner join drops the rows
/// without a principal, so navigations under `OR`/`NOT` or through optional foreign keys are
/// left to [`super::subquery_strategy::SubqueryStrategy`].
pub(crate) struct JoinStrategy {}

impl BulkStrategy for JoinStrategy {
    fn id(&self) -> &'static str {
        "JoinStrategy"
    }

    fn suitable(&self, request: &BulkRequest, model: &Model, dialect: Dialect) -> bool {
        dialect.supports_dml_join()
            && request.has_navigations()
            && request.navigations_joinable(model)
    }

    fn to_operation(
        &self,
        request: &BulkRequest,
        transformer: &BulkTransformer,
    ) -> Result<BulkOperation, TranslationError> {
        render_request(request, transformer, NavigationMode::Join)
    }
}
