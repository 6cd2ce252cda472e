// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use tablemap_model::ComparisonOp;

use super::{ExpressionBuilder, SQLBuilder, column::Column};

/// A predicate is a boolean expression that can be used in a WHERE clause.
#[derive(Debug, PartialEq, Clone)]
pub enum Predicate<C>
where
    C: PartialEq + ParamEquality,
{
    True,
    False,
    Eq(C, C),
    Neq(C, C),
    Lt(C, C),
    Lte(C, C),
    Gt(C, C),
    Gte(C, C),
    In(C, C),

    // Prefer Predicate::and(), which simplifies the clause
    And(Box<Predicate<C>>, Box<Predicate<C>>),
    // Prefer Predicate::or(), which simplifies the clause
    Or(Box<Predicate<C>>, Box<Predicate<C>>),
    // Prefer !predicate, which simplifies the clause
    Not(Box<Predicate<C>>),
}

pub type ConcretePredicate = Predicate<Column>;

impl<C> Predicate<C>
where
    C: PartialEq + ParamEquality,
{
    /// Compare two columns and reduce to a simpler predicate if possible.
    pub fn eq(lhs: C, rhs: C) -> Predicate<C> {
        if lhs == rhs {
            Predicate::True
        } else {
            // For literal columns, we can check for Predicate::False directly
            match lhs.param_eq(&rhs) {
                Some(false) => Predicate::False, // We don't need to check for `Some(true)`, since the above `lhs == rhs` check would have taken care of that
                _ => Predicate::Eq(lhs, rhs),
            }
        }
    }

    /// Compare two columns and reduce to a simpler predicate if possible
    pub fn neq(lhs: C, rhs: C) -> Predicate<C> {
        !Self::eq(lhs, rhs)
    }

    pub fn compare(op: ComparisonOp, lhs: C, rhs: C) -> Predicate<C> {
        match op {
            ComparisonOp::Eq => Self::eq(lhs, rhs),
            ComparisonOp::Neq => Self::neq(lhs, rhs),
            ComparisonOp::Lt => Predicate::Lt(lhs, rhs),
            ComparisonOp::Lte => Predicate::Lte(lhs, rhs),
            ComparisonOp::Gt => Predicate::Gt(lhs, rhs),
            ComparisonOp::Gte => Predicate::Gte(lhs, rhs),
        }
    }

    /// Logical and of two predicates, reducing to a simpler predicate if possible.
    pub fn and(lhs: Predicate<C>, rhs: Predicate<C>) -> Predicate<C> {
        match (lhs, rhs) {
            (Predicate::False, _) | (_, Predicate::False) => Predicate::False,
            (Predicate::True, rhs) => rhs,
            (lhs, Predicate::True) => lhs,
            (lhs, rhs) if lhs == rhs => lhs,
            (lhs, rhs) => Predicate::And(Box::new(lhs), Box::new(rhs)),
        }
    }

    /// Logical or of two predicates, reducing to a simpler predicate if possible.
    pub fn or(lhs: Predicate<C>, rhs: Predicate<C>) -> Predicate<C> {
        match (lhs, rhs) {
            (Predicate::True, _) | (_, Predicate::True) => Predicate::True,
            (Predicate::False, rhs) => rhs,
            (lhs, Predicate::False) => lhs,
            (lhs, rhs) if lhs == rhs => lhs,
            (lhs, rhs) => Predicate::Or(Box::new(lhs), Box::new(rhs)),
        }
    }

    /// Conjunction of all predicates, in order.
    pub fn and_all(predicates: impl IntoIterator<Item = Predicate<C>>) -> Predicate<C> {
        predicates.into_iter().fold(Predicate::True, Predicate::and)
    }

    /// Disjunction of all predicates, in order.
    pub fn or_all(predicates: impl IntoIterator<Item = Predicate<C>>) -> Predicate<C> {
        predicates.into_iter().fold(Predicate::False, Predicate::or)
    }

    /// Whether any operand of a comparison satisfies `f`.
    pub fn any_operand(&self, f: &impl Fn(&C) -> bool) -> bool {
        match self {
            Predicate::True | Predicate::False => false,
            Predicate::Eq(l, r)
            | Predicate::Neq(l, r)
            | Predicate::Lt(l, r)
            | Predicate::Lte(l, r)
            | Predicate::Gt(l, r)
            | Predicate::Gte(l, r)
            | Predicate::In(l, r) => f(l) || f(r),
            Predicate::And(l, r) | Predicate::Or(l, r) => l.any_operand(f) || r.any_operand(f),
            Predicate::Not(p) => p.any_operand(f),
        }
    }
}

impl<C> From<bool> for Predicate<C>
where
    C: PartialEq + ParamEquality,
{
    fn from(b: bool) -> Predicate<C> {
        if b { Predicate::True } else { Predicate::False }
    }
}

impl<C> std::ops::Not for Predicate<C>
where
    C: PartialEq + ParamEquality,
{
    type Output = Predicate<C>;

    fn not(self) -> Self::Output {
        match self {
            // Reduced to a simpler form when possible, else fall back to Predicate::Not
            Predicate::True => Predicate::False,
            Predicate::False => Predicate::True,
            Predicate::Eq(lhs, rhs) => Predicate::Neq(lhs, rhs),
            Predicate::Neq(lhs, rhs) => Predicate::Eq(lhs, rhs),
            Predicate::Lt(lhs, rhs) => Predicate::Gte(lhs, rhs),
            Predicate::Lte(lhs, rhs) => Predicate::Gt(lhs, rhs),
            Predicate::Gt(lhs, rhs) => Predicate::Lte(lhs, rhs),
            Predicate::Gte(lhs, rhs) => Predicate::Lt(lhs, rhs),
            Predicate::Not(predicate) => *predicate,
            predicate => Predicate::Not(Box::new(predicate)),
        }
    }
}

/// Compare two operands so that we can reduce a predicate to a boolean before rendering it. For
/// example, `Predicate::Eq(Column::Literal(1), Column::Literal(2))` can be reduced to false.
pub trait ParamEquality {
    /// Returns `None` if one of the operands is not a constant, otherwise returns `Some(true)` if
    /// the constants are equal, and `Some(false)` if they are not.
    fn param_eq(&self, other: &Self) -> Option<bool>;
}

impl ParamEquality for Column {
    fn param_eq(&self, other: &Self) -> Option<bool> {
        match (self, other) {
            (Column::Param(v1), Column::Param(v2)) | (Column::Literal(v1), Column::Literal(v2)) => {
                Some(v1 == v2)
            }
            _ => None,
        }
    }
}

impl ExpressionBuilder for ConcretePredicate {
    /// Build a predicate into a SQL string. Chains of the same logical operator are rendered
    /// flat; a nested chain of the other operator is parenthesized.
    fn build(&self, builder: &mut SQLBuilder) {
        match &self {
            ConcretePredicate::True => {
                let sql = builder.dialect().constant_predicate(true);
                builder.push_str(sql)
            }
            ConcretePredicate::False => {
                let sql = builder.dialect().constant_predicate(false);
                builder.push_str(sql)
            }
            ConcretePredicate::Eq(column1, column2) => {
                if column2 == &Column::Null {
                    column1.build(builder);
                    builder.push_str(" IS NULL");
                } else {
                    relational_combine(column1, column2, "=", builder)
                }
            }
            ConcretePredicate::Neq(column1, column2) => {
                if column2 == &Column::Null {
                    column1.build(builder);
                    builder.push_str(" IS NOT NULL");
                } else {
                    relational_combine(column1, column2, "<>", builder)
                }
            }
            ConcretePredicate::Lt(column1, column2) => {
                relational_combine(column1, column2, "<", builder)
            }
            ConcretePredicate::Lte(column1, column2) => {
                relational_combine(column1, column2, "<=", builder)
            }
            ConcretePredicate::Gt(column1, column2) => {
                relational_combine(column1, column2, ">", builder)
            }
            ConcretePredicate::Gte(column1, column2) => {
                relational_combine(column1, column2, ">=", builder)
            }
            ConcretePredicate::In(column1, column2) => {
                relational_combine(column1, column2, "IN", builder)
            }
            ConcretePredicate::And(predicate1, predicate2) => {
                logical_combine(predicate1, predicate2, LogicalOp::And, builder)
            }
            ConcretePredicate::Or(predicate1, predicate2) => {
                logical_combine(predicate1, predicate2, LogicalOp::Or, builder)
            }
            ConcretePredicate::Not(predicate) => {
                builder.push_str("NOT (");
                predicate.build(builder);
                builder.push(')');
            }
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    fn keyword(self) -> &'static str {
        match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
        }
    }

    fn of(predicate: &ConcretePredicate) -> Option<LogicalOp> {
        match predicate {
            ConcretePredicate::And(..) => Some(LogicalOp::And),
            ConcretePredicate::Or(..) => Some(LogicalOp::Or),
            _ => None,
        }
    }
}

/// Combine two expressions with a relational operator.
fn relational_combine<E1: ExpressionBuilder, E2: ExpressionBuilder>(
    left: &E1,
    right: &E2,
    op: &'static str,
    builder: &mut SQLBuilder,
) {
    left.build(builder);
    builder.push_space();
    builder.push_str(op);
    builder.push_space();
    right.build(builder);
}

/// Combine two predicates with a logical binary operator.
fn logical_combine(
    left: &ConcretePredicate,
    right: &ConcretePredicate,
    op: LogicalOp,
    builder: &mut SQLBuilder,
) {
    logical_operand(left, op, builder);
    builder.push_space();
    builder.push_str(op.keyword());
    builder.push_space();
    logical_operand(right, op, builder);
}

fn logical_operand(operand: &ConcretePredicate, parent: LogicalOp, builder: &mut SQLBuilder) {
    match LogicalOp::of(operand) {
        Some(op) if op != parent => {
            builder.push('(');
            operand.build(builder);
            builder.push(')');
        }
        _ => operand.build(builder),
    }
}
