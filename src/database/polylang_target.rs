//! Target store over the WordPress term tables, shaped the way Polylang
//! models languages and translation groups.

use super::options::OptionsTable;
use super::{connection, push_in_list, INSERT_CHUNK_SIZE};
use crate::codec::php::PhpValue;
use crate::constants::options::{
    DEFAULT_CATEGORY, NAV_MENU_LOCATIONS, POLYLANG_SETTINGS, STYLESHEET, THEME_MODS_PREFIX,
};
use crate::constants::taxonomies::{
    LANGUAGE, TERM_LANGUAGE, TERM_LANGUAGE_SLUG_PREFIX, TERM_TRANSLATIONS,
};
use crate::constants::STRINGS_TRANSLATIONS_META_KEY;
use crate::error::{MigrationError, MigrationResult};
use crate::models::{
    MenuLocations, NewLanguage, ObjectKind, ObjectScope, PolylangSettings, StringCatalog,
    TargetLanguage, UnassignedObjects,
};
use crate::store::{NewTermTaxonomy, TargetStore, TermStore};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::mysql::{MySql, MySqlPool};
use sqlx::{FromRow, MySqlConnection, QueryBuilder};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, FromRow)]
struct LanguageRow {
    term_id: i64,
    name: String,
    code: String,
    description: String,
    term_taxonomy_id: i64,
    tl_term_taxonomy_id: i64,
}

impl LanguageRow {
    fn into_language(self) -> TargetLanguage {
        let locale = PhpValue::decode(&self.description)
            .ok()
            .and_then(|d| d.get("locale").and_then(PhpValue::as_str).map(str::to_string))
            .unwrap_or_default();
        TargetLanguage {
            code: self.code,
            name: self.name,
            locale,
            term_id: self.term_id,
            term_taxonomy_id: self.term_taxonomy_id,
            tl_term_taxonomy_id: self.tl_term_taxonomy_id,
        }
    }
}

fn to_id(id: u64) -> MigrationResult<i64> {
    i64::try_from(id).map_err(|_| MigrationError::Database(format!("id {id} out of range")))
}

#[derive(Debug, Clone)]
pub struct SqlxTargetStore {
    pool: MySqlPool,
    prefix: String,
    options: OptionsTable,
}

impl SqlxTargetStore {
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

    async fn insert_term(
        &self,
        conn: &mut MySqlConnection,
        name: &str,
        slug: &str,
        term_group: i64,
    ) -> MigrationResult<i64> {
        let sql = format!(
            "INSERT INTO {} (name, slug, term_group) VALUES (?, ?, ?)",
            self.table("terms")
        );
        let result = sqlx::query(&sql)
            .bind(name)
            .bind(slug)
            .bind(term_group)
            .execute(&mut *conn)
            .await?;
        to_id(result.last_insert_id())
    }

    async fn insert_term_taxonomy(
        &self,
        conn: &mut MySqlConnection,
        term_id: i64,
        taxonomy: &str,
        description: &str,
    ) -> MigrationResult<i64> {
        let sql = format!(
            "INSERT INTO {} (term_id, taxonomy, description, count) VALUES (?, ?, ?, 0)",
            self.table("term_taxonomy")
        );
        let result = sqlx::query(&sql)
            .bind(term_id)
            .bind(taxonomy)
            .bind(description)
            .execute(&mut *conn)
            .await?;
        to_id(result.last_insert_id())
    }

    /// Object ids of one kind without a relationship to `language_taxonomy`.
    /// `select` ends with the column compared against `types`.
    async fn unassigned(
        &self,
        select: String,
        types: &[String],
        object_column: &str,
        language_taxonomy: &str,
        limit: u32,
    ) -> MigrationResult<Vec<i64>> {
        if types.is_empty() {
            return Ok(Vec::new());
        }
        let mut builder = QueryBuilder::<MySql>::new(select);
        builder.push(" IN ");
        push_in_list(&mut builder, types.iter().map(String::as_str));
        builder.push(format!(
            " AND NOT EXISTS (SELECT 1 FROM {tr} AS tr \
             INNER JOIN {tt} AS ltt ON (ltt.term_taxonomy_id = tr.term_taxonomy_id) \
             WHERE tr.object_id = {object_column} AND ltt.taxonomy = ",
            tr = self.table("term_relationships"),
            tt = self.table("term_taxonomy"),
        ));
        builder.push_bind(language_taxonomy);
        builder.push(") ORDER BY object_id LIMIT ");
        builder.push_bind(limit);

        Ok(builder
            .build_query_scalar::<i64>()
            .fetch_all(&self.pool)
            .await?)
    }
}

#[async_trait]
impl TermStore for SqlxTargetStore {
    async fn insert_term_relationships(&self, rows: &[(i64, i64)]) -> MigrationResult<u64> {
        let mut inserted = 0;
        for chunk in rows.chunks(INSERT_CHUNK_SIZE) {
            let mut builder = QueryBuilder::<MySql>::new(format!(
                "INSERT IGNORE INTO {} (object_id, term_taxonomy_id) ",
                self.table("term_relationships")
            ));
            builder.push_values(chunk, |mut row, (object_id, term_taxonomy_id)| {
                row.push_bind(*object_id).push_bind(*term_taxonomy_id);
            });
            inserted += builder.build().execute(&self.pool).await?.rows_affected();
        }
        Ok(inserted)
    }

    async fn find_terms_by_slug(&self, slugs: &[String]) -> MigrationResult<HashMap<String, i64>> {
        let mut found = HashMap::new();
        for chunk in slugs.chunks(INSERT_CHUNK_SIZE) {
            let mut builder = QueryBuilder::<MySql>::new(format!(
                "SELECT CAST(term_id AS SIGNED) AS term_id, slug FROM {} WHERE slug IN ",
                self.table("terms")
            ));
            push_in_list(&mut builder, chunk.iter().map(String::as_str));
            builder.push(" ORDER BY term_id");

            let rows = builder
                .build_query_as::<(i64, String)>()
                .fetch_all(&self.pool)
                .await?;
            for (term_id, slug) in rows {
                found.entry(slug).or_insert(term_id);
            }
        }
        Ok(found)
    }

    async fn insert_terms(&self, slugs: &[String]) -> MigrationResult<()> {
        for chunk in slugs.chunks(INSERT_CHUNK_SIZE) {
            let mut builder = QueryBuilder::<MySql>::new(format!(
                "INSERT INTO {} (slug, name) ",
                self.table("terms")
            ));
            builder.push_values(chunk, |mut row, slug| {
                row.push_bind(slug.as_str()).push_bind(slug.as_str());
            });
            builder.build().execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn find_term_taxonomies(
        &self,
        taxonomy: &str,
        slugs: &[String],
    ) -> MigrationResult<HashMap<String, i64>> {
        let mut found = HashMap::new();
        for chunk in slugs.chunks(INSERT_CHUNK_SIZE) {
            let mut builder = QueryBuilder::<MySql>::new(format!(
                "SELECT CAST(tt.term_taxonomy_id AS SIGNED) AS term_taxonomy_id, t.slug \
                 FROM {t} AS t INNER JOIN {tt} AS tt ON (t.term_id = tt.term_id) \
                 WHERE tt.taxonomy = ",
                t = self.table("terms"),
                tt = self.table("term_taxonomy"),
            ));
            builder.push_bind(taxonomy);
            builder.push(" AND t.slug IN ");
            push_in_list(&mut builder, chunk.iter().map(String::as_str));
            builder.push(" ORDER BY tt.term_taxonomy_id");

            let rows = builder
                .build_query_as::<(i64, String)>()
                .fetch_all(&self.pool)
                .await?;
            for (term_taxonomy_id, slug) in rows {
                found.entry(slug).or_insert(term_taxonomy_id);
            }
        }
        Ok(found)
    }

    async fn insert_term_taxonomies(&self, rows: &[NewTermTaxonomy]) -> MigrationResult<()> {
        for chunk in rows.chunks(INSERT_CHUNK_SIZE) {
            let mut builder = QueryBuilder::<MySql>::new(format!(
                "INSERT INTO {} (term_id, taxonomy, description, count) ",
                self.table("term_taxonomy")
            ));
            builder.push_values(chunk, |mut row, tt| {
                row.push_bind(tt.term_id)
                    .push_bind(tt.taxonomy.as_str())
                    .push_bind(tt.description.as_str())
                    .push_bind(tt.count);
            });
            builder.build().execute(&self.pool).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl TargetStore for SqlxTargetStore {
    async fn health_check(&self) -> MigrationResult<()> {
        if connection::health_check(&self.pool).await? {
            Ok(())
        } else {
            Err(MigrationError::Database("health check returned an unexpected value".into()))
        }
    }

    async fn languages(&self) -> MigrationResult<Vec<TargetLanguage>> {
        let sql = format!(
            "SELECT CAST(t.term_id AS SIGNED) AS term_id, t.name, t.slug AS code, tt.description, \
                CAST(tt.term_taxonomy_id AS SIGNED) AS term_taxonomy_id, \
                CAST(COALESCE(tl.term_taxonomy_id, 0) AS SIGNED) AS tl_term_taxonomy_id \
             FROM {terms} AS t \
             INNER JOIN {tt} AS tt ON (tt.term_id = t.term_id AND tt.taxonomy = ?) \
             LEFT JOIN {terms} AS tlt ON (tlt.slug = CONCAT(?, t.slug)) \
             LEFT JOIN {tt} AS tl ON (tl.term_id = tlt.term_id AND tl.taxonomy = ?) \
             ORDER BY t.term_group, t.term_id",
            terms = self.table("terms"),
            tt = self.table("term_taxonomy"),
        );
        let rows = sqlx::query_as::<_, LanguageRow>(&sql)
            .bind(LANGUAGE)
            .bind(TERM_LANGUAGE_SLUG_PREFIX)
            .bind(TERM_LANGUAGE)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(LanguageRow::into_language).collect())
    }

    async fn create_language(&self, language: &NewLanguage) -> MigrationResult<TargetLanguage> {
        let mut tx = self.pool.begin().await?;

        let term_id = self
            .insert_term(&mut *tx, &language.name, &language.slug, language.term_group)
            .await?;
        let term_taxonomy_id = self
            .insert_term_taxonomy(&mut *tx, term_id, LANGUAGE, &language.description())
            .await?;

        let tl_slug = format!("{TERM_LANGUAGE_SLUG_PREFIX}{}", language.slug);
        let tl_term_id = self.insert_term(&mut *tx, &language.name, &tl_slug, 0).await?;
        let tl_term_taxonomy_id = self
            .insert_term_taxonomy(&mut *tx, tl_term_id, TERM_LANGUAGE, "")
            .await?;

        tx.commit().await?;
        debug!(
            code = %language.slug,
            term_id,
            term_taxonomy_id,
            tl_term_taxonomy_id,
            "Created language"
        );

        Ok(TargetLanguage {
            code: language.slug.clone(),
            name: language.name.clone(),
            locale: language.locale.clone(),
            term_id,
            term_taxonomy_id,
            tl_term_taxonomy_id,
        })
    }

    async fn create_term_language(&self, language: &TargetLanguage) -> MigrationResult<i64> {
        let mut tx = self.pool.begin().await?;
        let tl_slug = format!("{TERM_LANGUAGE_SLUG_PREFIX}{}", language.code);
        let tl_term_id = self.insert_term(&mut *tx, &language.name, &tl_slug, 0).await?;
        let tl_term_taxonomy_id = self
            .insert_term_taxonomy(&mut *tx, tl_term_id, TERM_LANGUAGE, "")
            .await?;
        tx.commit().await?;

        debug!(code = %language.code, tl_term_taxonomy_id, "Created missing term_language term");
        Ok(tl_term_taxonomy_id)
    }

    async fn cleanup_after_language_creation(&self) -> MigrationResult<()> {
        let terms = self.table("terms");
        let tt = self.table("term_taxonomy");
        let tr = self.table("term_relationships");

        let mut tx = self.pool.begin().await?;
        sqlx::query(&format!(
            "DELETE tr FROM {tr} AS tr INNER JOIN {tt} AS tt \
             ON (tt.term_taxonomy_id = tr.term_taxonomy_id) WHERE tt.taxonomy = ?"
        ))
        .bind(TERM_TRANSLATIONS)
        .execute(&mut *tx)
        .await?;
        sqlx::query(&format!(
            "DELETE t FROM {terms} AS t INNER JOIN {tt} AS tt \
             ON (tt.term_id = t.term_id) WHERE tt.taxonomy = ?"
        ))
        .bind(TERM_TRANSLATIONS)
        .execute(&mut *tx)
        .await?;
        sqlx::query(&format!("DELETE FROM {tt} WHERE taxonomy = ?"))
            .bind(TERM_TRANSLATIONS)
            .execute(&mut *tx)
            .await?;

        let default_category = self
            .options
            .get(DEFAULT_CATEGORY)
            .await?
            .and_then(|v| v.trim().parse::<i64>().ok());
        if let Some(category) = default_category {
            sqlx::query(&format!(
                "DELETE tr FROM {tr} AS tr INNER JOIN {tt} AS tt \
                 ON (tt.term_taxonomy_id = tr.term_taxonomy_id) \
                 WHERE tr.object_id = ? AND tt.taxonomy = ?"
            ))
            .bind(category)
            .bind(TERM_LANGUAGE)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn settings(&self) -> MigrationResult<PolylangSettings> {
        Ok(self
            .options
            .get_serialized(POLYLANG_SETTINGS)
            .await?
            .map(PolylangSettings::from_json)
            .unwrap_or_default())
    }

    async fn save_settings(&self, settings: &PolylangSettings) -> MigrationResult<()> {
        self.options
            .set_serialized(POLYLANG_SETTINGS, &settings.to_json())
            .await
    }

    async fn nav_menu_locations(&self) -> MigrationResult<Option<MenuLocations>> {
        let Some(theme) = self.options.get(STYLESHEET).await? else {
            return Ok(None);
        };
        let mods = self
            .options
            .get_serialized(&format!("{THEME_MODS_PREFIX}{theme}"))
            .await?;
        let locations = match mods.as_ref().and_then(|m| m.get(NAV_MENU_LOCATIONS)) {
            Some(JsonValue::Object(map)) => map
                .iter()
                .filter_map(|(location, id)| {
                    let id = id
                        .as_i64()
                        .or_else(|| id.as_str().and_then(|s| s.parse().ok()))?;
                    Some((location.clone(), id))
                })
                .collect(),
            _ => return Ok(None),
        };
        Ok(Some(MenuLocations { theme, locations }))
    }

    async fn objects_without_language(
        &self,
        scope: &ObjectScope,
        limit: u32,
    ) -> MigrationResult<UnassignedObjects> {
        let posts = self
            .unassigned(
                format!(
                    "SELECT CAST(p.ID AS SIGNED) AS object_id FROM {} AS p \
                     WHERE p.post_status <> 'auto-draft' AND p.post_type",
                    self.table("posts")
                ),
                &scope.post_types,
                "p.ID",
                LANGUAGE,
                limit,
            )
            .await?;
        let terms = self
            .unassigned(
                format!(
                    "SELECT DISTINCT CAST(tt.term_id AS SIGNED) AS object_id FROM {} AS tt \
                     WHERE tt.taxonomy",
                    self.table("term_taxonomy")
                ),
                &scope.taxonomies,
                "tt.term_id",
                TERM_LANGUAGE,
                limit,
            )
            .await?;
        Ok(UnassignedObjects { posts, terms })
    }

    async fn assign_language(
        &self,
        kind: ObjectKind,
        ids: &[i64],
        language: &TargetLanguage,
    ) -> MigrationResult<()> {
        let term_taxonomy_id = match kind {
            ObjectKind::Post => language.term_taxonomy_id,
            ObjectKind::Term => language.tl_term_taxonomy_id,
        };
        let rows: Vec<(i64, i64)> = ids.iter().map(|id| (*id, term_taxonomy_id)).collect();
        self.insert_term_relationships(&rows).await?;
        Ok(())
    }

    async fn load_catalog(&self, language: &TargetLanguage) -> MigrationResult<StringCatalog> {
        let sql = format!(
            "SELECT meta_value FROM {} WHERE term_id = ? AND meta_key = ? ORDER BY meta_id LIMIT 1",
            self.table("termmeta")
        );
        let raw: Option<String> = sqlx::query_scalar(&sql)
            .bind(language.term_id)
            .bind(STRINGS_TRANSLATIONS_META_KEY)
            .fetch_optional(&self.pool)
            .await?;
        match raw {
            Some(raw) if !raw.is_empty() => Ok(StringCatalog::decode(&raw)?),
            _ => Ok(StringCatalog::new()),
        }
    }

    async fn save_catalog(
        &self,
        language: &TargetLanguage,
        catalog: &StringCatalog,
    ) -> MigrationResult<()> {
        let termmeta = self.table("termmeta");
        let mut tx = self.pool.begin().await?;
        sqlx::query(&format!(
            "DELETE FROM {termmeta} WHERE term_id = ? AND meta_key = ?"
        ))
        .bind(language.term_id)
        .bind(STRINGS_TRANSLATIONS_META_KEY)
        .execute(&mut *tx)
        .await?;
        sqlx::query(&format!(
            "INSERT INTO {termmeta} (term_id, meta_key, meta_value) VALUES (?, ?, ?)"
        ))
        .bind(language.term_id)
        .bind(STRINGS_TRANSLATIONS_META_KEY)
        .bind(catalog.encode())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn finalize(&self) -> MigrationResult<()> {
        let sql = format!(
            "UPDATE {tt} AS tt SET tt.count = (\
                SELECT COUNT(*) FROM {tr} AS tr WHERE tr.term_taxonomy_id = tt.term_taxonomy_id) \
             WHERE tt.taxonomy IN (?, ?)",
            tt = self.table("term_taxonomy"),
            tr = self.table("term_relationships"),
        );
        let result = sqlx::query(&sql)
            .bind(LANGUAGE)
            .bind(TERM_LANGUAGE)
            .execute(&self.pool)
            .await?;
        debug!(rows = result.rows_affected(), "Recounted language terms");
        Ok(())
    }
}
