// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.
//! Translation of abstract bulk operations into dialect-specific statements.

#[macro_use]
mod test_util;

mod alias;
mod bulk_transformer;
mod delete_transformer;
mod predicate_transformer;
mod scope;
mod strategy;
mod transformer;
mod update_transformer;

pub use bulk_transformer::BulkTransformer;
pub use scope::ScopeResolver;
pub use transformer::{DeleteTransformer, OperationTransformer, UpdateTransformer};
