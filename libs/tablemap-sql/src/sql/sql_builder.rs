// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use tablemap_model::LiteralValue;

use super::{ExpressionBuilder, dialect::Dialect};

const INDENT: usize = 4;

pub struct SQLBuilder {
    /// The SQL being built with placeholders for each parameter
    sql: String,
    /// The list of parameters
    params: Vec<LiteralValue>,
    dialect: Dialect,
    /// Indicates if column name should be rendered with the table alias i.e. "a"."col"  instead
    /// of "col" (needed for the SET clause of UPDATE statements on some dialects)
    fully_qualify_column_names: bool,
    /// Indentation applied after each [`SQLBuilder::push_newline`]
    indent: usize,
}

impl SQLBuilder {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            sql: String::new(),
            params: Vec::new(),
            dialect,
            fully_qualify_column_names: true,
            indent: 0,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Push a string
    pub fn push_str<T: AsRef<str>>(&mut self, s: T) {
        self.sql.push_str(s.as_ref());
    }

    /// Push a character
    pub fn push(&mut self, c: char) {
        self.sql.push(c);
    }

    /// Push an identifier such as a table name, column name or alias, quoted the way the dialect
    /// expects.
    pub fn push_identifier<T: AsRef<str>>(&mut self, s: T) {
        self.dialect.quote_identifier(s.as_ref(), &mut self.sql);
    }

    /// Push a column. Push `<table_alias>.<column_name>` if in fully_qualify_column_names mode,
    /// otherwise just `<column_name>`.
    pub fn push_column<T: AsRef<str>>(&mut self, table_alias: T, column_name: T) {
        if self.fully_qualify_column_names {
            self.push_identifier(table_alias);
            self.push('.');
        }
        self.push_identifier(column_name);
    }

    /// Push a space. This is a common operation, so it is provided as a separate method.
    pub fn push_space(&mut self) {
        self.sql.push(' ');
    }

    /// Start a new line at the current indentation.
    pub fn push_newline(&mut self) {
        self.sql.push('\n');
        for _ in 0..self.indent {
            self.sql.push(' ');
        }
    }

    /// Push a literal value inline.
    pub fn push_literal(&mut self, value: &LiteralValue) {
        match value {
            LiteralValue::Null => self.push_str("NULL"),
            LiteralValue::Bool(value) => self.push_str(self.dialect.bool_literal(*value)),
            LiteralValue::Int(value) => self.push_str(value.to_string()),
            LiteralValue::String(value) | LiteralValue::Enum(value) => {
                let literal = self.dialect.string_literal(value);
                self.push_str(literal)
            }
        }
    }

    /// Push a parameter, which will be replaced with a placeholder in the SQL string
    /// and the parameter will be added to the list of parameters.
    pub fn push_param(&mut self, param: LiteralValue) {
        self.params.push(param);
        let placeholder = self.dialect.placeholder(self.params.len());
        self.push_str(placeholder);
    }

    /// Push elements of an iterator, separated by `sep`. The `push_elem` function provides
    /// the flexibility to map the elements (compared to [`SQLBuilder::push_elems`], which assumes that
    /// the elements implement [`ExpressionBuilder`] and [`build`](ExpressionBuilder::build) is all you need to call).
    pub fn push_iter<T>(
        &mut self,
        iter: impl ExactSizeIterator<Item = T>,
        sep: &str,
        push_elem: impl Fn(&mut Self, T),
    ) {
        let len = iter.len();
        for (i, item) in iter.enumerate() {
            push_elem(self, item);

            if i < len - 1 {
                self.sql.push_str(sep);
            }
        }
    }

    /// Push elements of a slice, separated by `sep`. The elements must themselves implement
    /// `ExpressionBuilder`.
    pub fn push_elems<T: ExpressionBuilder>(&mut self, elems: &[T], sep: &str) {
        self.push_iter(elems.iter(), sep, |builder, elem| {
            elem.build(builder);
        });
    }

    /// Get the SQL string and the list of parameters. Calling this method should be the final step
    /// in building an SQL expression, and thus this builder consumes the `self`.
    pub fn into_sql(self) -> (String, Vec<LiteralValue>) {
        (self.sql, self.params)
    }

    /// Execute the given function with the [`Self::fully_qualify_column_names`] flag set to false.
    /// This takes a closure, so that we can restore the original value of the flag after
    /// executing the function.
    pub fn without_fully_qualified_column_names<F, R>(&mut self, func: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        let cur_fully_qualify_column_names = self.fully_qualify_column_names;
        self.fully_qualify_column_names = false;
        let ret = func(self);
        self.fully_qualify_column_names = cur_fully_qualify_column_names;
        ret
    }

    /// Execute the given function with one more level of indentation.
    pub fn indented<F, R>(&mut self, func: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        self.indent += INDENT;
        let ret = func(self);
        self.indent -= INDENT;
        ret
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_use_dialect_placeholders() {
        let mut builder = SQLBuilder::new(Dialect::Postgres);
        builder.push_param(LiteralValue::Int(1));
        builder.push_str(", ");
        builder.push_param(LiteralValue::from("x"));

        let (sql, params) = builder.into_sql();
        assert_eq!(sql, "$1, $2");
        assert_eq!(params, vec![LiteralValue::Int(1), LiteralValue::from("x")]);
    }

    #[test]
    fn unqualified_columns() {
        let mut builder = SQLBuilder::new(Dialect::SqlServer);
        builder.push_column("a", "Name");
        builder.push_space();
        builder.without_fully_qualified_column_names(|builder| builder.push_column("a", "Name"));

        assert_eq!(builder.into_sql().0, "[a].[Name] [Name]");
    }

    #[test]
    fn indentation() {
        let mut builder = SQLBuilder::new(Dialect::Sqlite);
        builder.push('(');
        builder.indented(|builder| {
            builder.push_newline();
            builder.push_str("SELECT 1");
        });
        builder.push_newline();
        builder.push(')');

        assert_eq!(builder.into_sql().0, "(\n    SELECT 1\n)");
    }
}
