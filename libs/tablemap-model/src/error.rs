// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use thiserror::Error;

/// Errors raised while building or finalizing a model. All of these are fatal: a model that
/// fails to finalize is never handed to a translator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelBuildingError {
    #[error("Entity type '{0}' is not part of the model")]
    UnknownEntityType(String),

    #[error("Entity type '{0}' is already part of the model")]
    DuplicateEntityType(String),

    #[error("Property '{property}' is already declared on '{entity_type}' or one of its base types")]
    DuplicateProperty {
        entity_type: String,
        property: String,
    },

    #[error("Setting '{base_type}' as the base type of '{entity_type}' would create an inheritance cycle")]
    InheritanceCycle {
        entity_type: String,
        base_type: String,
    },

    #[error("Invalid foreign key from '{dependent}' to '{principal}': {message}")]
    InvalidForeignKey {
        dependent: String,
        principal: String,
        message: String,
    },

    #[error("Invalid discriminator configuration for '{entity_type}': {message}")]
    InvalidDiscriminator {
        entity_type: String,
        message: String,
    },

    #[error(
        "Row-sharing cycle detected in table '{table}': '{entity_type}' is its own transitive principal"
    )]
    RowSharingCycle { table: String, entity_type: String },

    #[error("Table '{table}' is shared by {count} entity types, but at most {limit} are supported")]
    TooManySharingEntityTypes {
        table: String,
        count: usize,
        limit: usize,
    },

    #[error(
        "Entity type '{entity_type}' shares table '{table}' with its principal '{principal}' but has no primary key"
    )]
    KeylessRowSharingDependent {
        entity_type: String,
        principal: String,
        table: String,
    },

    #[error("{0}")]
    Generic(String),
}
