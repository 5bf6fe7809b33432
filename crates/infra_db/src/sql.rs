//! Criteria to SQL translation
//!
//! Builds parameterised statements with [`QueryBuilder`]. Values are always
//! bound; only column and table names, which are checked against the entity's
//! `Entity::FIELDS`, are written into the SQL text.
//!
//! Negation treats an unknown (null) comparison as false before negating, so
//! `Not(Eq(description, 'x'))` matches rows whose description is null, as it
//! does in memory.

use core_kernel::{Criteria, DataError, FieldValue, Predicate, SortDirection, SortOrder};
use sqlx::{Postgres, QueryBuilder};

use crate::mapping::PgEntity;

/// Escape character used in LIKE patterns
const LIKE_ESCAPE: char = '\\';

/// `SELECT id, <columns> FROM <table> WHERE .. ORDER BY .. LIMIT .. OFFSET ..`
pub fn select<E: PgEntity>(criteria: &Criteria) -> Result<QueryBuilder<'static, Postgres>, DataError> {
    criteria.check_fields::<E>()?;

    let mut qb = QueryBuilder::new(format!("SELECT {} FROM {}", column_list::<E>(), E::TABLE));
    push_where(&mut qb, &criteria.predicates);
    push_order(&mut qb, &criteria.effective_order::<E>());
    if let Some(limit) = criteria.limit {
        qb.push(" LIMIT ").push_bind(to_i64(limit));
    }
    if let Some(offset) = criteria.offset {
        qb.push(" OFFSET ").push_bind(to_i64(offset));
    }
    Ok(qb)
}

/// `SELECT COUNT(*) FROM <table> WHERE ..`
pub fn count<E: PgEntity>(criteria: &Criteria) -> Result<QueryBuilder<'static, Postgres>, DataError> {
    criteria.check_fields::<E>()?;

    let mut qb = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", E::TABLE));
    push_where(&mut qb, &criteria.predicates);
    Ok(qb)
}

/// `INSERT .. ON CONFLICT (id) DO UPDATE .. RETURNING id, <columns>`
pub fn upsert<E: PgEntity>(id: uuid::Uuid, entity: &E) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "INSERT INTO {} (id, {}) VALUES (",
        E::TABLE,
        E::FIELDS.join(", ")
    ));
    {
        let mut values = qb.separated(", ");
        values.push_bind(id);
        entity.push_values(&mut values);
    }
    let assignments: Vec<String> = E::FIELDS
        .iter()
        .map(|c| format!("{c} = EXCLUDED.{c}"))
        .collect();
    qb.push(format!(
        ") ON CONFLICT (id) DO UPDATE SET {} RETURNING {}",
        assignments.join(", "),
        column_list::<E>()
    ));
    qb
}

/// `DELETE FROM <table> WHERE id = $1`
pub fn delete<E: PgEntity>(id: uuid::Uuid) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("DELETE FROM {} WHERE id = ", E::TABLE));
    qb.push_bind(id);
    qb
}

fn column_list<E: PgEntity>() -> String {
    std::iter::once(core_kernel::ID_FIELD)
        .chain(E::FIELDS.iter().copied())
        .collect::<Vec<_>>()
        .join(", ")
}

fn push_where(qb: &mut QueryBuilder<'static, Postgres>, predicates: &[Predicate]) {
    if predicates.is_empty() {
        return;
    }
    qb.push(" WHERE ");
    for (i, predicate) in predicates.iter().enumerate() {
        if i > 0 {
            qb.push(" AND ");
        }
        push_predicate(qb, predicate);
    }
}

fn push_predicate(qb: &mut QueryBuilder<'static, Postgres>, predicate: &Predicate) {
    match predicate {
        Predicate::Eq { field, value: FieldValue::Null } => {
            qb.push(format!("{field} IS NULL"));
        }
        Predicate::Eq { field, value } => {
            qb.push(format!("{field} = "));
            push_value(qb, value);
        }
        Predicate::StartsWith { field, prefix, ignore_case } => {
            let operator = if *ignore_case { "ILIKE" } else { "LIKE" };
            qb.push(format!("{field} {operator} "))
                .push_bind(like_prefix(prefix))
                .push(format!(" ESCAPE '{LIKE_ESCAPE}'"));
        }
        Predicate::Not(inner) => {
            qb.push("NOT COALESCE((");
            push_predicate(qb, inner);
            qb.push("), FALSE)");
        }
        Predicate::And(predicates) => push_group(qb, predicates, " AND ", "TRUE"),
        Predicate::Or(predicates) => push_group(qb, predicates, " OR ", "FALSE"),
    }
}

fn push_group(
    qb: &mut QueryBuilder<'static, Postgres>,
    predicates: &[Predicate],
    separator: &str,
    empty: &str,
) {
    if predicates.is_empty() {
        qb.push(empty);
        return;
    }
    qb.push("(");
    for (i, predicate) in predicates.iter().enumerate() {
        if i > 0 {
            qb.push(separator);
        }
        push_predicate(qb, predicate);
    }
    qb.push(")");
}

fn push_value(qb: &mut QueryBuilder<'static, Postgres>, value: &FieldValue) {
    match value.clone() {
        FieldValue::Null => qb.push("NULL"),
        FieldValue::Bool(v) => qb.push_bind(v),
        FieldValue::Int(v) => qb.push_bind(v),
        FieldValue::Decimal(v) => qb.push_bind(v),
        FieldValue::Text(v) => qb.push_bind(v),
        FieldValue::Uuid(v) => qb.push_bind(v),
        FieldValue::Timestamp(v) => qb.push_bind(v),
    };
}

fn push_order(qb: &mut QueryBuilder<'static, Postgres>, order: &[SortOrder]) {
    if order.is_empty() {
        return;
    }
    let terms: Vec<String> = order
        .iter()
        .map(|o| {
            let column = if o.ignore_case {
                format!("lower({})", o.field)
            } else {
                o.field.to_string()
            };
            let direction = match o.direction {
                SortDirection::Ascending => "ASC",
                SortDirection::Descending => "DESC",
            };
            format!("{column} {direction}")
        })
        .collect();
    qb.push(" ORDER BY ").push(terms.join(", "));
}

/// Escapes LIKE wildcards in the prefix and appends `%`
fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '%' | '_') || c == LIKE_ESCAPE {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
