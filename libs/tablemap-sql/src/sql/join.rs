// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::{ExpressionBuilder, SQLBuilder, predicate::ConcretePredicate, table::TableReference};

/// A table joined to the target of a DELETE or UPDATE.
#[derive(Debug, PartialEq, Clone)]
pub struct InnerJoin {
    /// The joined table such as `[Countries] AS [c]`.
    pub table: TableReference,
    /// The join predicate such as `[a].[CountryId] = [c].[Id]`.
    pub predicate: ConcretePredicate,
}

impl ExpressionBuilder for InnerJoin {
    /// Build expression of the form `INNER JOIN <table> ON <predicate>`.
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_str("INNER JOIN ");
        self.table.build(builder);
        builder.push_str(" ON ");
        self.predicate.build(builder);
    }
}
