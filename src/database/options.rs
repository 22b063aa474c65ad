//! The WordPress options table and the status store built on it.

use crate::codec::php::PhpValue;
use crate::constants::options::MIGRATION_STATUS;
use crate::error::MigrationResult;
use crate::status::{MigrationStatusRecord, StatusStore};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::mysql::MySqlPool;

/// `<prefix>options` key-value access
#[derive(Debug, Clone)]
pub struct OptionsTable {
    pool: MySqlPool,
    table: String,
}

impl OptionsTable {
    pub fn new(pool: MySqlPool, table_prefix: &str) -> Self {
        Self {
            pool,
            table: format!("{table_prefix}options"),
        }
    }

    pub async fn get(&self, name: &str) -> MigrationResult<Option<String>> {
        let sql = format!(
            "SELECT option_value FROM {} WHERE option_name = ? LIMIT 1",
            self.table
        );
        Ok(sqlx::query_scalar::<_, String>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Insert or replace in one statement.
    pub async fn set(&self, name: &str, value: &str) -> MigrationResult<()> {
        let sql = format!(
            "INSERT INTO {} (option_name, option_value, autoload) VALUES (?, ?, 'no') \
             ON DUPLICATE KEY UPDATE option_value = VALUES(option_value)",
            self.table
        );
        sqlx::query(&sql)
            .bind(name)
            .bind(value)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, name: &str) -> MigrationResult<()> {
        let sql = format!("DELETE FROM {} WHERE option_name = ?", self.table);
        sqlx::query(&sql).bind(name).execute(&self.pool).await?;
        Ok(())
    }

    /// A PHP-serialized option decoded to JSON. Plain scalars come back as
    /// JSON strings.
    pub async fn get_serialized(&self, name: &str) -> MigrationResult<Option<JsonValue>> {
        match self.get(name).await? {
            Some(raw) if raw.is_empty() => Ok(None),
            Some(raw) => Ok(Some(decode_option(&raw)?)),
            None => Ok(None),
        }
    }

    pub async fn set_serialized(&self, name: &str, value: &JsonValue) -> MigrationResult<()> {
        self.set(name, &PhpValue::from_json(value).encode()).await
    }
}

/// WordPress stores scalars unserialized and arrays serialized.
fn decode_option(raw: &str) -> MigrationResult<JsonValue> {
    let looks_serialized = matches!(
        raw.as_bytes().get(..2),
        Some(b"a:" | b"s:" | b"i:" | b"b:" | b"d:" | b"N;")
    );
    if looks_serialized {
        Ok(PhpValue::decode(raw)?.to_json())
    } else {
        Ok(JsonValue::String(raw.to_string()))
    }
}

/// Status record kept as a JSON string option.
#[derive(Debug, Clone)]
pub struct SqlxStatusStore {
    options: OptionsTable,
}

impl SqlxStatusStore {
    pub fn new(pool: MySqlPool, table_prefix: &str) -> Self {
        Self {
            options: OptionsTable::new(pool, table_prefix),
        }
    }
}

#[async_trait]
impl StatusStore for SqlxStatusStore {
    async fn write(&self, record: &MigrationStatusRecord) -> MigrationResult<()> {
        self.options.set(MIGRATION_STATUS, &record.to_json()?).await
    }

    async fn read(&self) -> MigrationResult<Option<MigrationStatusRecord>> {
        self.options
            .get(MIGRATION_STATUS)
            .await?
            .as_deref()
            .map(MigrationStatusRecord::from_json)
            .transpose()
    }

    async fn clear(&self) -> MigrationResult<()> {
        self.options.delete(MIGRATION_STATUS).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_option_handles_scalars_and_arrays() {
        assert_eq!(decode_option("twentytwenty").unwrap(), json!("twentytwenty"));
        assert_eq!(decode_option("12").unwrap(), json!("12"));
        assert_eq!(
            decode_option(r#"a:1:{s:12:"default_lang";s:2:"en";}"#).unwrap(),
            json!({"default_lang": "en"})
        );
        assert!(decode_option("a:1:{broken").is_err());
    }
}
