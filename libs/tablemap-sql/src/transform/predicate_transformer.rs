// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::HashMap;

use tablemap_model::{
    EntityTypeId, ForeignKey, ForeignKeyId, LiteralValue, Model, PropertyId, TableId, ValueType,
};

use crate::{
    asql::{
        operand::{Operand, PropertyPath, RelatedCount},
        predicate::{AbstractPredicate, filters_predicate},
        update::Assignment,
    },
    sql::{
        column::Column,
        join::InnerJoin,
        predicate::{ConcretePredicate, ParamEquality, Predicate},
        select::{Projection, Select},
        table::TableReference,
    },
    translation_error::TranslationError,
};

use super::{alias::AliasGenerator, scope::ScopeResolver};

/// How a predicate reads properties of referenced (principal) entity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NavigationMode {
    /// Join the principal's table to the statement target.
    Join,
    /// Compare the foreign key against the keys selected by an `IN (SELECT ...)` subquery.
    Subquery,
}

/// One aliased occurrence of a table in the statement being built, read as `entity_type`.
#[derive(Debug, Clone)]
pub(crate) struct TableSource {
    pub alias: String,
    pub entity_type: EntityTypeId,
    pub table: TableId,
}

#[derive(Debug, Clone, Copy)]
enum Relation {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
}

impl Relation {
    fn apply<C: PartialEq + ParamEquality>(self, lhs: C, rhs: C) -> Predicate<C> {
        match self {
            Relation::Eq => Predicate::eq(lhs, rhs),
            Relation::Neq => Predicate::neq(lhs, rhs),
            Relation::Lt => Predicate::Lt(lhs, rhs),
            Relation::Lte => Predicate::Lte(lhs, rhs),
            Relation::Gt => Predicate::Gt(lhs, rhs),
            Relation::Gte => Predicate::Gte(lhs, rhs),
            Relation::In => Predicate::In(lhs, rhs),
        }
    }
}

/// Turns predicates over the entity model into predicates over aliased tables, for a single
/// statement. Aliases are unique across the statement, including its subqueries.
pub(crate) struct PredicateTransformer<'a> {
    model: &'a Model,
    scopes: &'a ScopeResolver<'a>,
    mode: NavigationMode,
    aliases: AliasGenerator,
    joins: Vec<InnerJoin>,
    /// Joined principals by (dependent alias, foreign key), so a path is joined once.
    joined: HashMap<(String, ForeignKeyId), TableSource>,
    /// Inside an odd number of `NOT`s of the predicate being transformed.
    negated: bool,
}

impl<'a> PredicateTransformer<'a> {
    pub(crate) fn new(scopes: &'a ScopeResolver<'a>, mode: NavigationMode) -> Self {
        Self {
            model: scopes.model(),
            scopes,
            mode,
            aliases: AliasGenerator::default(),
            joins: vec![],
            joined: HashMap::new(),
            negated: false,
        }
    }

    /// Allocate a new aliased occurrence of `table`.
    pub(crate) fn source(&mut self, entity_type: EntityTypeId, table: TableId) -> TableSource {
        TableSource {
            alias: self.aliases.next(self.model.table(table).name()),
            entity_type,
            table,
        }
    }

    /// Joins created while transforming predicates in [`NavigationMode::Join`].
    pub(crate) fn into_joins(self) -> Vec<InnerJoin> {
        self.joins
    }

    pub(crate) fn to_predicate(
        &mut self,
        predicate: &AbstractPredicate,
        source: &TableSource,
    ) -> Result<ConcretePredicate, TranslationError> {
        Ok(match predicate {
            AbstractPredicate::True => ConcretePredicate::True,
            AbstractPredicate::False => ConcretePredicate::False,
            AbstractPredicate::Eq(l, r) => self.comparison(Relation::Eq, l, r, source)?,
            AbstractPredicate::Neq(l, r) => self.comparison(Relation::Neq, l, r, source)?,
            AbstractPredicate::Lt(l, r) => self.comparison(Relation::Lt, l, r, source)?,
            AbstractPredicate::Lte(l, r) => self.comparison(Relation::Lte, l, r, source)?,
            AbstractPredicate::Gt(l, r) => self.comparison(Relation::Gt, l, r, source)?,
            AbstractPredicate::Gte(l, r) => self.comparison(Relation::Gte, l, r, source)?,
            AbstractPredicate::In(l, r) => self.comparison(Relation::In, l, r, source)?,
            AbstractPredicate::And(l, r) => ConcretePredicate::and(
                self.to_predicate(l, source)?,
                self.to_predicate(r, source)?,
            ),
            AbstractPredicate::Or(l, r) => ConcretePredicate::or(
                self.to_predicate(l, source)?,
                self.to_predicate(r, source)?,
            ),
            AbstractPredicate::Not(p) => {
                self.negated = !self.negated;
                let predicate = self.to_predicate(p, source);
                self.negated = !self.negated;
                !predicate?
            }
        })
    }

    /// Transform a predicate of its own statement or subquery, outside any enclosing `NOT`.
    fn unnegated<T>(&mut self, transform: impl FnOnce(&mut Self) -> T) -> T {
        let negated = std::mem::replace(&mut self.negated, false);
        let result = transform(self);
        self.negated = negated;
        result
    }

    /// The scope of the source's entity type in the source's table.
    pub(crate) fn scope_predicate(
        &mut self,
        source: &TableSource,
    ) -> Result<ConcretePredicate, TranslationError> {
        let scopes = self.scopes;
        match scopes.scope(source.entity_type, source.table) {
            Some(scope) => self.to_predicate(scope, source),
            None => Ok(ConcretePredicate::True),
        }
    }

    /// The global query filter of the source's hierarchy.
    pub(crate) fn query_filter_predicate(
        &mut self,
        source: &TableSource,
    ) -> Result<ConcretePredicate, TranslationError> {
        let model = self.model;
        match model.query_filter(source.entity_type) {
            Some(filters) => self.to_predicate(&filters_predicate(filters), source),
            None => Ok(ConcretePredicate::True),
        }
    }

    /// The column and value of an assignment to a property of `target`.
    pub(crate) fn assignment(
        &mut self,
        assignment: &Assignment,
        target: &TableSource,
    ) -> Result<(String, Column), TranslationError> {
        let model = self.model;
        let column = self.column_name(target, assignment.property)?;

        if assignment.value.is_navigation() || matches!(assignment.value, Operand::Count(_)) {
            return Err(TranslationError::InvalidNavigation {
                entity_type: model.entity_type(target.entity_type).name.clone(),
                message: format!(
                    "the value assigned to '{}' must not read other tables",
                    model.property(assignment.property).name
                ),
            });
        }

        let value = self.to_column(&assignment.value, Some(assignment.property), target)?;
        Ok((column, value))
    }

    fn comparison(
        &mut self,
        relation: Relation,
        lhs: &Operand,
        rhs: &Operand,
        source: &TableSource,
    ) -> Result<ConcretePredicate, TranslationError> {
        if self.mode == NavigationMode::Subquery && (lhs.is_navigation() || rhs.is_navigation()) {
            return self.navigation_subquery(relation, lhs, rhs, source);
        }

        let lhs_column = self.to_column(lhs, rhs.read_property(), source)?;
        let rhs_column = self.to_column(rhs, lhs.read_property(), source)?;
        Ok(relation.apply(lhs_column, rhs_column))
    }

    /// `hint` is the property the operand is compared with or assigned to, which decides how
    /// enum values are stored.
    fn to_column(
        &mut self,
        operand: &Operand,
        hint: Option<PropertyId>,
        source: &TableSource,
    ) -> Result<Column, TranslationError> {
        Ok(match operand {
            Operand::Property(path) => {
                let target = self.navigate(source, &path.navigations)?;
                self.property_column(&target, path.property)?
            }
            Operand::Literal(LiteralValue::Null) | Operand::Param(LiteralValue::Null) => {
                Column::Null
            }
            Operand::Literal(value) => Column::Literal(self.store_value(value, hint)?),
            Operand::Param(value) => Column::Param(self.store_value(value, hint)?),
            Operand::Null => Column::Null,
            Operand::List(values) => Column::List(
                values
                    .iter()
                    .map(|value| self.store_value(value, hint).map(Column::Literal))
                    .collect::<Result<_, _>>()?,
            ),
            Operand::Count(related) => self.count_subquery(related, source)?,
        })
    }

    fn property_column(
        &self,
        source: &TableSource,
        property: PropertyId,
    ) -> Result<Column, TranslationError> {
        let name = self.column_name(source, property)?;
        Ok(Column::physical(&source.alias, name))
    }

    fn column_name(
        &self,
        source: &TableSource,
        property: PropertyId,
    ) -> Result<String, TranslationError> {
        let table = self.model.table(source.table);

        match table.column_for(property) {
            Some(column) => Ok(column.name.clone()),
            None => Err(TranslationError::UnmappedProperty {
                property: self.qualified_name(property),
                table: table.store_object.to_string(),
            }),
        }
    }

    fn qualified_name(&self, property: PropertyId) -> String {
        let property = self.model.property(property);
        format!(
            "{}.{}",
            self.model.entity_type(property.declaring_entity_type).name,
            property.name
        )
    }

    /// The value as stored in the column of `hint`: enum variants become their name or ordinal.
    fn store_value(
        &self,
        value: &LiteralValue,
        hint: Option<PropertyId>,
    ) -> Result<LiteralValue, TranslationError> {
        let LiteralValue::Enum(variant) = value else {
            return Ok(value.clone());
        };

        let Some(property) = hint.map(|hint| self.model.property(hint)) else {
            return Ok(LiteralValue::String(variant.clone()));
        };

        match &property.value_type {
            ValueType::Enum(definition) => {
                let ordinal =
                    definition
                        .ordinal(variant)
                        .ok_or_else(|| TranslationError::InvalidEnumValue {
                            enum_name: definition.name.clone(),
                            value: variant.clone(),
                        })?;

                if property.stores_enum_as_string() {
                    Ok(LiteralValue::String(variant.clone()))
                } else {
                    Ok(LiteralValue::Int(ordinal as i64))
                }
            }
            _ => Ok(LiteralValue::String(variant.clone())),
        }
    }

    /// Follow reference navigations by joining the principal tables (once per path prefix).
    fn navigate(
        &mut self,
        source: &TableSource,
        navigations: &[ForeignKeyId],
    ) -> Result<TableSource, TranslationError> {
        let mut current = source.clone();

        for foreign_key in navigations {
            if self.mode == NavigationMode::Subquery {
                return Err(self.invalid_navigation(
                    &current,
                    "navigations cannot be joined inside a subquery",
                ));
            }
            current = self.join(&current, *foreign_key)?;
        }

        Ok(current)
    }

    fn join(
        &mut self,
        dependent: &TableSource,
        foreign_key_id: ForeignKeyId,
    ) -> Result<TableSource, TranslationError> {
        let key = (dependent.alias.clone(), foreign_key_id);
        if let Some(joined) = self.joined.get(&key) {
            return Ok(joined.clone());
        }

        let model = self.model;
        let foreign_key = model.foreign_key(foreign_key_id);
        self.check_dependent(dependent, foreign_key)?;

        let table = self.mapped_table(dependent, foreign_key.principal)?;
        let principal = self.source(foreign_key.principal, table);

        let correlation = key_correlation(foreign_key, dependent, &principal, self)?;
        let scope = self.scope_predicate(&principal)?;
        let filter = self.query_filter_predicate(&principal)?;

        self.joins.push(InnerJoin {
            table: TableReference::new(model.table(table), &principal.alias),
            predicate: ConcretePredicate::and_all([correlation, scope, filter]),
        });
        self.joined.insert(key, principal.clone());

        Ok(principal)
    }

    /// `dependent.fk IN (SELECT principal.key FROM principal WHERE ...)`, recursing into the
    /// rest of the path. Under `NOT`, a nullable foreign key is also checked for `IS NOT NULL`,
    /// so rows without a principal are kept by the negation.
    fn navigation_subquery(
        &mut self,
        relation: Relation,
        lhs: &Operand,
        rhs: &Operand,
        source: &TableSource,
    ) -> Result<ConcretePredicate, TranslationError> {
        let (path, other, path_on_left) = match (lhs, rhs) {
            (Operand::Property(path), other) if !path.navigations.is_empty() => {
                (path, other, true)
            }
            (other, Operand::Property(path)) => (path, other, false),
            _ => return Err(self.invalid_navigation(source, "expected a navigation")),
        };

        if other.read_property().is_some() || matches!(other, Operand::Count(_)) {
            return Err(self.invalid_navigation(
                source,
                "a navigated property can only be compared with a value",
            ));
        }

        let model = self.model;
        let Some((first, rest)) = path.navigations.split_first() else {
            return Err(self.invalid_navigation(source, "expected a navigation"));
        };
        let foreign_key = model.foreign_key(*first);
        self.check_dependent(source, foreign_key)?;

        let ([dependent_property], [principal_property]) = (
            foreign_key.properties.as_slice(),
            foreign_key.principal_key.as_slice(),
        ) else {
            return Err(self.invalid_navigation(
                source,
                "composite foreign keys cannot be navigated through a subquery",
            ));
        };

        let table = self.mapped_table(source, foreign_key.principal)?;
        let principal = self.source(foreign_key.principal, table);

        let inner_path = Operand::Property(PropertyPath::through(rest.to_vec(), path.property));
        let inner = if path_on_left {
            relation.apply(inner_path, other.clone())
        } else {
            relation.apply(other.clone(), inner_path)
        };

        let predicate = self.unnegated(|transformer| {
            Ok::<_, TranslationError>(ConcretePredicate::and_all([
                transformer.query_filter_predicate(&principal)?,
                transformer.scope_predicate(&principal)?,
                transformer.to_predicate(&inner, &principal)?,
            ]))
        })?;

        let select = Select {
            projection: Projection::Columns(vec![
                self.property_column(&principal, *principal_property)?,
            ]),
            table: TableReference::new(model.table(table), &principal.alias),
            predicate,
        };

        let dependent_column = self.property_column(source, *dependent_property)?;
        let membership =
            ConcretePredicate::In(dependent_column.clone(), Column::SubSelect(Box::new(select)));

        if self.negated && model.property(*dependent_property).nullable {
            Ok(ConcretePredicate::and(
                ConcretePredicate::neq(dependent_column, Column::Null),
                membership,
            ))
        } else {
            Ok(membership)
        }
    }

    /// `(SELECT COUNT(*) FROM dependent WHERE filter AND correlation AND scope AND predicate)`
    fn count_subquery(
        &mut self,
        related: &RelatedCount,
        outer: &TableSource,
    ) -> Result<Column, TranslationError> {
        let model = self.model;
        let foreign_key = model.foreign_key(related.foreign_key);

        if !model.is_assignable_from(foreign_key.principal, outer.entity_type) {
            return Err(self.invalid_navigation(
                outer,
                &format!(
                    "'{}' is not the principal of the counted relationship",
                    model.entity_type(outer.entity_type).name
                ),
            ));
        }
        if !model.is_assignable_from(foreign_key.dependent, related.entity_type) {
            return Err(self.invalid_navigation(
                outer,
                &format!(
                    "'{}' is not the dependent of the counted relationship",
                    model.entity_type(related.entity_type).name
                ),
            ));
        }

        let table = self.mapped_table(outer, related.entity_type)?;
        let inner = self.source(related.entity_type, table);

        let mode = std::mem::replace(&mut self.mode, NavigationMode::Subquery);
        let predicate = self.unnegated(|transformer| {
            transformer.count_predicate(related, foreign_key, outer, &inner)
        });
        self.mode = mode;

        Ok(Column::SubSelect(Box::new(Select {
            projection: Projection::CountStar,
            table: TableReference::new(model.table(table), &inner.alias),
            predicate: predicate?,
        })))
    }

    fn count_predicate(
        &mut self,
        related: &RelatedCount,
        foreign_key: &ForeignKey,
        outer: &TableSource,
        inner: &TableSource,
    ) -> Result<ConcretePredicate, TranslationError> {
        let filter = self.query_filter_predicate(inner)?;
        let correlation = key_correlation(foreign_key, inner, outer, self)?;
        let scope = self.scope_predicate(inner)?;
        let predicate = self.to_predicate(&related.predicate, inner)?;

        Ok(ConcretePredicate::and_all([
            filter,
            correlation,
            scope,
            predicate,
        ]))
    }

    fn check_dependent(
        &self,
        source: &TableSource,
        foreign_key: &ForeignKey,
    ) -> Result<(), TranslationError> {
        if self
            .model
            .is_assignable_from(foreign_key.dependent, source.entity_type)
        {
            Ok(())
        } else {
            Err(self.invalid_navigation(
                source,
                &format!(
                    "the navigation is declared on '{}'",
                    self.model.entity_type(foreign_key.dependent).name
                ),
            ))
        }
    }

    fn mapped_table(
        &self,
        from: &TableSource,
        entity_type: EntityTypeId,
    ) -> Result<TableId, TranslationError> {
        self.model
            .mapping_shape(entity_type)
            .primary_table()
            .ok_or_else(|| {
                self.invalid_navigation(
                    from,
                    &format!(
                        "'{}' is not mapped onto a table",
                        self.model.entity_type(entity_type).name
                    ),
                )
            })
    }

    fn invalid_navigation(&self, source: &TableSource, message: &str) -> TranslationError {
        TranslationError::InvalidNavigation {
            entity_type: self.model.entity_type(source.entity_type).name.clone(),
            message: message.to_string(),
        }
    }
}

/// Equality of the principal key of `principal` with the foreign key columns of `dependent`,
/// the principal side first.
fn key_correlation(
    foreign_key: &ForeignKey,
    dependent: &TableSource,
    principal: &TableSource,
    transformer: &PredicateTransformer<'_>,
) -> Result<ConcretePredicate, TranslationError> {
    foreign_key
        .property_pairs()
        .map(|(dependent_property, principal_property)| {
            Ok(ConcretePredicate::eq(
                transformer.property_column(principal, principal_property)?,
                transformer.property_column(dependent, dependent_property)?,
            ))
        })
        .collect::<Result<Vec<_>, TranslationError>>()
        .map(ConcretePredicate::and_all)
}

#[cfg(test)]
mod tests {
    use tablemap_model::{
        DatabaseProvider, StoreObjectIdentifier,
        testing::{AnimalsOptions, animals_model, customers_model, entity, property},
    };

    use super::*;
    use crate::sql::{ExpressionBuilder, dialect::Dialect};

    fn table(model: &Model, name: &str) -> TableId {
        model
            .table_id(&StoreObjectIdentifier::table(name, None))
            .unwrap()
    }

    #[test]
    fn enums_are_stored_by_ordinal_unless_converted() {
        let model = animals_model(DatabaseProvider::Postgres, AnimalsOptions::default());
        let scopes = ScopeResolver::new(&model);
        let mut transformer = PredicateTransformer::new(&scopes, NavigationMode::Join);
        let kiwis = transformer.source(entity(&model, "Kiwi"), table(&model, "Animals"));

        let predicate = AbstractPredicate::eq(
            Operand::property(property(&model, "Kiwi", "FoundOn")),
            Operand::Literal(LiteralValue::Enum("South".to_string())),
        );
        assert_eq!(
            transformer
                .to_predicate(&predicate, &kiwis)
                .unwrap()
                .to_sql(Dialect::Postgres)
                .0,
            r#""a"."FoundOn" = 1"#
        );

        let unknown = AbstractPredicate::eq(
            Operand::property(property(&model, "Kiwi", "FoundOn")),
            Operand::Literal(LiteralValue::Enum("Stewart".to_string())),
        );
        assert_eq!(
            transformer.to_predicate(&unknown, &kiwis),
            Err(TranslationError::InvalidEnumValue {
                enum_name: "Island".to_string(),
                value: "Stewart".to_string(),
            })
        );
    }

    #[test]
    fn properties_off_the_table_are_rejected() {
        let model = customers_model(DatabaseProvider::Sqlite);
        let scopes = ScopeResolver::new(&model);
        let mut transformer = PredicateTransformer::new(&scopes, NavigationMode::Subquery);
        let customers = transformer.source(entity(&model, "Customer"), table(&model, "Customers"));

        let predicate = AbstractPredicate::eq(
            Operand::property(property(&model, "Customer", "Phone")),
            Operand::literal("555"),
        );
        assert_eq!(
            transformer.to_predicate(&predicate, &customers),
            Err(TranslationError::UnmappedProperty {
                property: "Customer.Phone".to_string(),
                table: "Customers".to_string(),
            })
        );
    }

    #[test]
    fn null_literals_compare_with_is_null() {
        let model = animals_model(DatabaseProvider::SqlServer, AnimalsOptions::default());
        let scopes = ScopeResolver::new(&model);
        let mut transformer = PredicateTransformer::new(&scopes, NavigationMode::Join);
        let birds = transformer.source(entity(&model, "Bird"), table(&model, "Animals"));

        let predicate = AbstractPredicate::eq(
            Operand::property(property(&model, "Bird", "EagleId")),
            Operand::literal(LiteralValue::Null),
        );
        assert_eq!(
            transformer
                .to_predicate(&predicate, &birds)
                .unwrap()
                .to_sql(Dialect::SqlServer)
                .0,
            "[a].[EagleId] IS NULL"
        );
    }
}
