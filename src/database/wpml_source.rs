//! Source store over the WPML tables (`icl_*`) of a WordPress database.

use super::options::OptionsTable;
use super::push_in_list;
use crate::constants::options::WPML_SETTINGS;
use crate::constants::NAV_MENU_TAXONOMY;
use crate::error::MigrationResult;
use crate::models::{ContentShape, SourceLanguage, StringTranslationRow, TranslationRow};
use crate::processing::BatchCursor;
use crate::store::SourceStore;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::mysql::{MySql, MySqlPool};
use sqlx::QueryBuilder;

#[derive(Debug, Clone)]
pub struct SqlxSourceStore {
    pool: MySqlPool,
    prefix: String,
    options: OptionsTable,
}

impl SqlxSourceStore {
    pub fn new(pool: MySqlPool, table_prefix: &str) -> Self {
        Self {
            options: OptionsTable::new(pool.clone(), table_prefix),
            pool,
            prefix: table_prefix.to_string(),
        }
    }

    fn table(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    /// `FROM` clause joining term-taxonomies to their WPML rows.
    fn term_translations_from(&self) -> String {
        format!(
            "FROM {tt} AS tt \
             INNER JOIN {icl} AS wpml ON (\
                wpml.element_id = tt.term_taxonomy_id \
                AND wpml.element_type = CONCAT('tax_', tt.taxonomy))",
            tt = self.table("term_taxonomy"),
            icl = self.table("icl_translations"),
        )
    }

    fn strings_from(&self) -> String {
        format!(
            "FROM {s} AS s INNER JOIN {st} AS st ON (st.string_id = s.id)",
            s = self.table("icl_strings"),
            st = self.table("icl_string_translations"),
        )
    }

    fn push_domain_filter<'a>(builder: &mut QueryBuilder<'a, MySql>, excluded: &'a [String]) {
        if excluded.is_empty() {
            return;
        }
        builder.push(" WHERE s.context NOT IN ");
        push_in_list(builder, excluded.iter().map(String::as_str));
    }
}

#[async_trait]
impl SourceStore for SqlxSourceStore {
    async fn settings(&self) -> MigrationResult<Option<JsonValue>> {
        self.options.get_serialized(WPML_SETTINGS).await
    }

    async fn languages(&self) -> MigrationResult<Vec<SourceLanguage>> {
        let sql = format!(
            "SELECT l.code AS code, COALESCE(l.default_locale, '') AS locale, lt.name AS name \
             FROM {l} AS l \
             INNER JOIN {lt} AS lt ON (l.code = lt.language_code) \
             WHERE l.active = 1 AND lt.language_code = lt.display_language_code \
             ORDER BY l.id",
            l = self.table("icl_languages"),
            lt = self.table("icl_languages_translations"),
        );
        Ok(sqlx::query_as::<_, SourceLanguage>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn count_groups(&self, shape: &ContentShape) -> MigrationResult<u64> {
        let sql = match shape {
            ContentShape::PostType(_) => format!(
                "SELECT COUNT(DISTINCT trid) FROM {} WHERE element_type = ?",
                self.table("icl_translations")
            ),
            ContentShape::Taxonomy(_) => format!(
                "SELECT COUNT(DISTINCT wpml.trid) {} WHERE wpml.element_type = ?",
                self.term_translations_from()
            ),
        };
        let total: i64 = sqlx::query_scalar(&sql)
            .bind(shape.element_type())
            .fetch_one(&self.pool)
            .await?;
        Ok(total.max(0) as u64)
    }

    async fn group_ids(
        &self,
        shape: &ContentShape,
        cursor: &BatchCursor,
    ) -> MigrationResult<Vec<i64>> {
        let sql = match shape {
            ContentShape::PostType(_) => format!(
                "SELECT DISTINCT CAST(trid AS SIGNED) AS trid FROM {} \
                 WHERE element_type = ? ORDER BY trid LIMIT ?, ?",
                self.table("icl_translations")
            ),
            ContentShape::Taxonomy(_) => format!(
                "SELECT DISTINCT CAST(wpml.trid AS SIGNED) AS trid {} \
                 WHERE wpml.element_type = ? ORDER BY trid LIMIT ?, ?",
                self.term_translations_from()
            ),
        };
        Ok(sqlx::query_scalar::<_, i64>(&sql)
            .bind(shape.element_type())
            .bind(cursor.offset())
            .bind(cursor.limit())
            .fetch_all(&self.pool)
            .await?)
    }

    async fn translations(
        &self,
        shape: &ContentShape,
        trids: &[i64],
    ) -> MigrationResult<Vec<TranslationRow>> {
        if trids.is_empty() {
            return Ok(Vec::new());
        }
        let mut builder = QueryBuilder::<MySql>::new(match shape {
            ContentShape::PostType(_) => format!(
                "SELECT DISTINCT CAST(trid AS SIGNED) AS trid, language_code, \
                 CAST(element_id AS SIGNED) AS object_id \
                 FROM {} WHERE element_type = ",
                self.table("icl_translations")
            ),
            ContentShape::Taxonomy(_) => format!(
                "SELECT DISTINCT CAST(wpml.trid AS SIGNED) AS trid, wpml.language_code, \
                 CAST(tt.term_id AS SIGNED) AS object_id \
                 {} WHERE wpml.element_type = ",
                self.term_translations_from()
            ),
        });
        builder.push_bind(shape.element_type());
        builder.push(match shape {
            ContentShape::PostType(_) => " AND trid IN ",
            ContentShape::Taxonomy(_) => " AND wpml.trid IN ",
        });
        push_in_list(&mut builder, trids.iter().copied());

        Ok(builder
            .build_query_as::<TranslationRow>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn menu_translations(&self) -> MigrationResult<Vec<TranslationRow>> {
        let sql = format!(
            "SELECT DISTINCT CAST(wpml.trid AS SIGNED) AS trid, wpml.language_code, \
             CAST(tt.term_id AS SIGNED) AS object_id \
             {} WHERE wpml.element_type = ?",
            self.term_translations_from()
        );
        let element_type = ContentShape::Taxonomy(NAV_MENU_TAXONOMY.to_string()).element_type();
        Ok(sqlx::query_as::<_, TranslationRow>(&sql)
            .bind(element_type)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn excluded_string_domains(&self) -> MigrationResult<Vec<String>> {
        let table = self.table("icl_mo_files_domains");
        let exists: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM information_schema.tables \
             WHERE table_schema = DATABASE() AND table_name = ?",
        )
        .bind(&table)
        .fetch_one(&self.pool)
        .await?;
        if exists == 0 {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT DISTINCT domain FROM {table} ORDER BY domain");
        Ok(sqlx::query_scalar::<_, String>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn count_string_translations(&self, excluded: &[String]) -> MigrationResult<u64> {
        let mut builder =
            QueryBuilder::<MySql>::new(format!("SELECT COUNT(1) {}", self.strings_from()));
        Self::push_domain_filter(&mut builder, excluded);
        let total: i64 = builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;
        Ok(total.max(0) as u64)
    }

    async fn string_translations(
        &self,
        excluded: &[String],
        cursor: &BatchCursor,
    ) -> MigrationResult<Vec<StringTranslationRow>> {
        let mut builder = QueryBuilder::<MySql>::new(format!(
            "SELECT s.value AS source, st.language AS language, st.value AS translation {}",
            self.strings_from()
        ));
        Self::push_domain_filter(&mut builder, excluded);
        builder
            .push(" ORDER BY st.id LIMIT ")
            .push_bind(cursor.offset())
            .push(", ")
            .push_bind(cursor.limit());

        Ok(builder
            .build_query_as::<StringTranslationRow>()
            .fetch_all(&self.pool)
            .await?)
    }
}
