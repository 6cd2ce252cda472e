// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::{
    ExpressionBuilder, SQLBuilder, column::Column, predicate::ConcretePredicate,
    table::TableReference,
};

#[derive(Debug, PartialEq, Clone)]
pub enum Projection {
    CountStar,
    Columns(Vec<Column>),
}

/// A subquery used inside a predicate: a correlated count or the key list of an `IN`.
#[derive(Debug, PartialEq, Clone)]
pub struct Select {
    pub projection: Projection,
    pub table: TableReference,
    pub predicate: ConcretePredicate,
}

impl ExpressionBuilder for Select {
    /// Build a select statement of the form `SELECT <projection> FROM <table> WHERE <predicate>`,
    /// one clause per line. The `WHERE` is omitted if the predicate is `True`.
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_str("SELECT ");
        match &self.projection {
            Projection::CountStar => builder.push_str("COUNT(*)"),
            Projection::Columns(columns) => builder.push_elems(columns, ", "),
        }

        builder.push_newline();
        builder.push_str("FROM ");
        self.table.build(builder);

        if self.predicate != ConcretePredicate::True {
            builder.push_newline();
            builder.push_str("WHERE ");
            self.predicate.build(builder);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::dialect::Dialect;

    #[test]
    fn correlated_count() {
        let select = Select {
            projection: Projection::CountStar,
            table: TableReference {
                name: "Animals".to_string(),
                schema: None,
                alias: "a".to_string(),
            },
            predicate: ConcretePredicate::eq(
                Column::physical("c", "Id"),
                Column::physical("a", "CountryId"),
            ),
        };
        let predicate = ConcretePredicate::Gt(
            Column::SubSelect(Box::new(select)),
            Column::Literal(0.into()),
        );

        assert_eq!(
            predicate.to_sql(Dialect::SqlServer).0,
            "(\n    SELECT COUNT(*)\n    FROM [Animals] AS [a]\n    WHERE [c].[Id] = [a].[CountryId]) > 0"
        );
    }
}
