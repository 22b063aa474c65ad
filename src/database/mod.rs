//! # Database
//!
//! MySQL-backed stores over a WordPress schema.
//!
//! - [`connection`] - pool setup and health checks
//! - [`options`] - the options table and the status store kept in it
//! - [`wpml_source`] - read-only access to the WPML tables
//! - [`polylang_target`] - writes to the term tables in Polylang's layout

pub mod connection;
pub mod options;
pub mod polylang_target;
pub mod wpml_source;

pub use connection::DatabaseConnection;
pub use options::{OptionsTable, SqlxStatusStore};
pub use polylang_target::SqlxTargetStore;
pub use wpml_source::SqlxSourceStore;

use sqlx::mysql::MySql;
use sqlx::{Encode, QueryBuilder, Type};

/// Rows per multi-row `INSERT` or `IN (...)` list.
pub(crate) const INSERT_CHUNK_SIZE: usize = 500;

/// Push `(?, ?, ...)` binding every value. Callers guard against empty input.
pub(crate) fn push_in_list<'a, T>(
    builder: &mut QueryBuilder<'a, MySql>,
    values: impl IntoIterator<Item = T>,
) where
    T: 'a + Encode<'a, MySql> + Type<MySql> + Send,
{
    builder.push("(");
    let mut separated = builder.separated(", ");
    for value in values {
        separated.push_bind(value);
    }
    separated.push_unseparated(")");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_in_list_binds_each_value() {
        let mut builder = QueryBuilder::<MySql>::new("SELECT 1 WHERE x IN ");
        push_in_list(&mut builder, [1_i64, 2, 3]);
        assert_eq!(builder.sql(), "SELECT 1 WHERE x IN (?, ?, ?)");
    }
}
