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
    ExpressionBuilder, SQLBuilder,
    column::Column,
    delete::{build_where, inline_join_predicates},
    join::InnerJoin,
    predicate::ConcretePredicate,
    table::TableReference,
};

#[derive(Debug)]
pub struct Update<'a> {
    /// The table to update.
    pub table: TableReference,
    /// Tables joined to the target to evaluate the predicate.
    pub joins: Vec<InnerJoin>,
    /// The column names to update and their values.
    pub column_values: Vec<(String, MaybeOwned<'a, Column>)>,
    /// The predicate to filter rows to update.
    pub predicate: MaybeOwned<'a, ConcretePredicate>,
}

impl ExpressionBuilder for Update<'_> {
    /// Build the update statement with the `SET` clause on its own indented line. SQL Server
    /// updates the alias and declares the table in a `FROM` clause, qualifying the assigned
    /// columns. The other dialects alias the table inline, assign unqualified columns and list
    /// joined tables in a `FROM` clause. The `WHERE` is omitted if the predicate is `True`.
    fn build(&self, builder: &mut SQLBuilder) {
        let by_alias = builder.dialect().targets_dml_by_alias();

        builder.push_str("UPDATE ");
        if by_alias {
            builder.push_identifier(&self.table.alias);
        } else {
            self.table.build(builder);
        }

        builder.indented(|builder| {
            builder.push_newline();
            builder.push_str("SET ");
            builder.push_iter(
                self.column_values.iter(),
                ",\n        ",
                |builder, (column, value)| {
                    if by_alias {
                        builder.push_column(&self.table.alias, column);
                    } else {
                        builder.without_fully_qualified_column_names(|builder| {
                            builder.push_column(&self.table.alias, column)
                        });
                    }
                    builder.push_str(" = ");
                    value.build(builder);
                },
            );
        });

        if by_alias {
            builder.push_newline();
            builder.push_str("FROM ");
            self.table.build(builder);
            for join in &self.joins {
                builder.push_newline();
                join.build(builder);
            }
            build_where(self.predicate.as_ref(), builder);
        } else {
            if !self.joins.is_empty() {
                builder.push_newline();
                builder.push_str("FROM ");
                builder.push_iter(self.joins.iter(), ", ", |builder, join| {
                    join.table.build(builder)
                });
            }
            build_where(&inline_join_predicates(&self.joins, &self.predicate), builder);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::dialect::Dialect;

    fn rename(predicate: ConcretePredicate) -> Update<'static> {
        Update {
            table: TableReference {
                name: "Animals".to_string(),
                schema: None,
                alias: "a".to_string(),
            },
            joins: vec![],
            column_values: vec![
                ("Name".to_string(), Column::Literal("Animal".into()).into()),
                ("CountryId".to_string(), Column::Param(3.into()).into()),
            ],
            predicate: predicate.into(),
        }
    }

    #[test]
    fn sql_server_layout() {
        let (sql, params) = rename(ConcretePredicate::True).to_sql(Dialect::SqlServer);
        assert_eq!(
            sql,
            "UPDATE [a]\n    SET [a].[Name] = N'Animal',\n        [a].[CountryId] = @p0\nFROM [Animals] AS [a]"
        );
        assert_eq!(params, vec![3.into()]);
    }

    #[test]
    fn inline_layout() {
        let predicate =
            ConcretePredicate::eq(Column::physical("a", "Id"), Column::Literal(1.into()));
        assert_eq!(
            rename(predicate).to_sql(Dialect::Sqlite).0,
            "UPDATE \"Animals\" AS \"a\"\n    SET \"Name\" = 'Animal',\n        \"CountryId\" = @p0\nWHERE \"a\".\"Id\" = 1"
        );
    }
}
