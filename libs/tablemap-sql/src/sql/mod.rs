// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The SQL expression tree and its rendering.

pub mod column;
pub mod delete;
pub mod dialect;
pub mod join;
pub mod predicate;
pub mod select;
pub mod statement;
pub mod table;
pub mod update;

mod expression_builder;
mod sql_builder;

pub use expression_builder::ExpressionBuilder;
pub use sql_builder::SQLBuilder;
