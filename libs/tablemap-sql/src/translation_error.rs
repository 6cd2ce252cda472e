// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use tablemap_model::ModelBuildingError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    #[error("Property '{property}' of '{entity_type}' is not owned by it in table '{table}'")]
    ColumnNotOwned {
        entity_type: String,
        property: String,
        table: String,
    },

    #[error("Cannot delete '{entity_type}': its rows in '{table}' are shared with other entity types or split across tables")]
    SharedRowDelete { entity_type: String, table: String },

    #[error("Assignments to '{entity_type}' span the tables '{first}' and '{second}'")]
    AssignmentsSpanTables {
        entity_type: String,
        first: String,
        second: String,
    },

    #[error("Bulk update of '{0}' has no assignments")]
    EmptyAssignments(String),

    #[error("Property '{property}' is not mapped onto table '{table}'")]
    UnmappedProperty { property: String, table: String },

    #[error("Invalid navigation from '{entity_type}': {message}")]
    InvalidNavigation {
        entity_type: String,
        message: String,
    },

    #[error("'{value}' is not a variant of enum '{enum_name}'")]
    InvalidEnumValue { enum_name: String, value: String },

    #[error("No bulk strategy can render the operation for {0}")]
    NoSuitableStrategy(String),

    #[error("{0}")]
    Model(#[from] ModelBuildingError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finalize_then_translate() -> Result<(), TranslationError> {
        let finalized: Result<(), ModelBuildingError> =
            Err(ModelBuildingError::UnknownEntityType("Kiwi".to_string()));
        finalized?;
        Ok(())
    }

    #[test]
    fn model_errors_convert() {
        assert_eq!(
            finalize_then_translate(),
            Err(TranslationError::Model(ModelBuildingError::UnknownEntityType(
                "Kiwi".to_string()
            )))
        );
    }
}
