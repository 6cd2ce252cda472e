// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use maybe_owned::MaybeOwned;

use super::{
    ExpressionBuilder, SQLBuilder, join::InnerJoin, predicate::ConcretePredicate,
    table::TableReference,
};

#[derive(Debug)]
pub struct Delete<'a> {
    /// The table to delete from.
    pub table: TableReference,
    /// Tables joined to the target to evaluate the predicate.
    pub joins: Vec<InnerJoin>,
    /// The predicate to filter rows by.
    pub predicate: MaybeOwned<'a, ConcretePredicate>,
}

impl ExpressionBuilder for Delete<'_> {
    /// Build a delete statement. SQL Server names the alias as the target and declares the table
    /// (and any joins) in a `FROM` clause; the other dialects alias the table inline and join
    /// through `USING`, moving the join predicates into the `WHERE` clause. The `WHERE` clause is
    /// omitted if the predicate is `True`.
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_str("DELETE FROM ");

        if builder.dialect().targets_dml_by_alias() {
            builder.push_identifier(&self.table.alias);
            builder.push_newline();
            builder.push_str("FROM ");
            self.table.build(builder);
            for join in &self.joins {
                builder.push_newline();
                join.build(builder);
            }
            build_where(self.predicate.as_ref(), builder);
        } else {
            self.table.build(builder);
            if !self.joins.is_empty() {
                builder.push_newline();
                builder.push_str("USING ");
                builder.push_iter(self.joins.iter(), ", ", |builder, join| {
                    join.table.build(builder)
                });
            }
            build_where(&inline_join_predicates(&self.joins, &self.predicate), builder);
        }
    }
}

/// Conjunction of the join predicates followed by `predicate`, for dialects that list joined
/// tables without `ON` clauses.
pub(super) fn inline_join_predicates(
    joins: &[InnerJoin],
    predicate: &ConcretePredicate,
) -> ConcretePredicate {
    ConcretePredicate::and_all(
        joins
            .iter()
            .map(|join| join.predicate.clone())
            .chain(std::iter::once(predicate.clone())),
    )
}

pub(super) fn build_where(predicate: &ConcretePredicate, builder: &mut SQLBuilder) {
    if predicate != &ConcretePredicate::True {
        builder.push_newline();
        builder.push_str("WHERE ");
        predicate.build(builder);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::{column::Column, dialect::Dialect};

    fn animals() -> TableReference {
        TableReference {
            name: "Animals".to_string(),
            schema: None,
            alias: "a".to_string(),
        }
    }

    fn name_is_kiwi() -> ConcretePredicate {
        ConcretePredicate::eq(Column::physical("a", "Name"), Column::Literal("Kiwi".into()))
    }

    #[test]
    fn sql_server_layout() {
        let delete = Delete {
            table: animals(),
            joins: vec![],
            predicate: name_is_kiwi().into(),
        };

        assert_eq!(
            delete.to_sql(Dialect::SqlServer).0,
            "DELETE FROM [a]\nFROM [Animals] AS [a]\nWHERE [a].[Name] = N'Kiwi'"
        );
    }

    #[test]
    fn inline_layout_without_predicate() {
        let delete = Delete {
            table: animals(),
            joins: vec![],
            predicate: ConcretePredicate::True.into(),
        };

        assert_eq!(delete.to_sql(Dialect::Sqlite).0, r#"DELETE FROM "Animals" AS "a""#);
    }

    #[test]
    fn postgres_using() {
        let delete = Delete {
            table: animals(),
            joins: vec![InnerJoin {
                table: TableReference {
                    name: "Countries".to_string(),
                    schema: None,
                    alias: "c".to_string(),
                },
                predicate: ConcretePredicate::eq(
                    Column::physical("a", "CountryId"),
                    Column::physical("c", "Id"),
                ),
            }],
            predicate: name_is_kiwi().into(),
        };

        assert_eq!(
            delete.to_sql(Dialect::Postgres).0,
            "DELETE FROM \"Animals\" AS \"a\"\nUSING \"Countries\" AS \"c\"\nWHERE \"a\".\"CountryId\" = \"c\".\"Id\" AND \"a\".\"Name\" = 'Kiwi'"
        );
    }
}
