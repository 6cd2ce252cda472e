// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.
use tracing::debug;

use crate::{
    sql::statement::BulkOperation, transform::bulk_transformer::BulkTransformer,
    translation_error::TranslationError,
};

use super::{
    bulk_strategy::{BulkRequest, BulkStrategy},
    join_strategy::JoinStrategy,
    subquery_strategy::SubqueryStrategy,
};

pub(crate) struct BulkStrategyChain<'s> {
    strategies: Vec<&'s dyn BulkStrategy>,
}

impl<'s> BulkStrategyChain<'s> {
    pub fn new(strategies: Vec<&'s dyn BulkStrategy>) -> Self {
        Self { strategies }
    }

    /// Render the request with the first suitable strategy.
    pub fn to_operation(
        &self,
        request: &BulkRequest,
        transformer: &BulkTransformer,
    ) -> Result<BulkOperation, TranslationError> {
        let model = transformer.model();
        let dialect = transformer.config().dialect;

        let strategy = self
            .strategies
            .iter()
            .find(|s| s.suitable(request, model, dialect))
            .ok_or_else(|| TranslationError::NoSuitableStrategy(format!("{dialect:?}")))?;

        debug!("Using bulk strategy: {}", strategy.id());

        strategy.to_operation(request, transformer)
    }
}

impl Default for BulkStrategyChain<'_> {
    fn default() -> Self {
        Self::new(vec![&JoinStrategy {}, &SubqueryStrategy {}])
    }
}
