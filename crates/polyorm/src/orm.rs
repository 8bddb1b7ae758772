//! Typed entry point binding one dialect to one querier.

use crate::client::Querier;
use crate::config::OrmConfig;
use crate::dialect::{self, ColumnInfo, DbBaser};
use crate::error::OrmResult;
use crate::model::{Model, ModelMeta};
use crate::monitor::TracingQuerier;
use crate::qb::QueryBuilder;
use chrono::FixedOffset;
use std::collections::HashMap;
use std::sync::Arc;

/// A dialect, a querier and the settings they run with.
///
/// ```rust,ignore
/// let orm = Orm::new(client, OrmConfig::new("opengauss").log_sql())?;
///
/// let mut user = User { id: 0, name: "alice".into() };
/// orm.insert(&mut user).await?;
/// assert!(user.id > 0);
/// ```
#[derive(Clone)]
pub struct Orm {
    dialect: Arc<dyn DbBaser>,
    querier: Arc<dyn Querier>,
    config: OrmConfig,
    tz: FixedOffset,
}

impl std::fmt::Debug for Orm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orm")
            .field("dialect", &self.dialect.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Orm {
    /// Resolve `config.dialect` through the registry.
    pub fn new(querier: impl Querier + 'static, config: OrmConfig) -> OrmResult<Self> {
        let dialect = dialect::dialect(&config.dialect)?;
        Self::with_dialect(dialect, querier, config)
    }

    /// Use `dialect` directly; `config.dialect` is ignored.
    pub fn with_dialect(
        dialect: Arc<dyn DbBaser>,
        querier: impl Querier + 'static,
        config: OrmConfig,
    ) -> OrmResult<Self> {
        let tz = config.time_zone()?;
        let querier: Arc<dyn Querier> = if config.log_sql {
            Arc::new(TracingQuerier::new(querier).max_sql_length(config.max_sql_length))
        } else {
            Arc::new(querier)
        };
        tracing::debug!(dialect = dialect.name(), log_sql = config.log_sql, "orm ready");
        Ok(Self {
            dialect,
            querier,
            config,
            tz,
        })
    }

    pub fn dialect(&self) -> &dyn DbBaser {
        self.dialect.as_ref()
    }

    pub fn querier(&self) -> &dyn Querier {
        self.querier.as_ref()
    }

    pub fn config(&self) -> &OrmConfig {
        &self.config
    }

    pub fn time_zone(&self) -> FixedOffset {
        self.tz
    }

    /// Insert one model; returns the generated key (0 when the dialect reports none).
    pub async fn insert<M: ModelMeta>(&self, model: &mut M) -> OrmResult<i64> {
        self.dialect
            .insert(self.querier(), M::model_info(), model, self.tz)
            .await
    }

    /// Insert models in batches of `config.default_bulk`; returns rows affected.
    pub async fn insert_multi<M: ModelMeta>(&self, models: &mut [M]) -> OrmResult<i64> {
        self.insert_multi_bulk(models, self.config.default_bulk).await
    }

    pub async fn insert_multi_bulk<M: ModelMeta>(
        &self,
        models: &mut [M],
        bulk: usize,
    ) -> OrmResult<i64> {
        let mut rows: Vec<&mut dyn Model> = models.iter_mut().map(|m| m as &mut dyn Model).collect();
        self.dialect
            .insert_multi(self.querier(), M::model_info(), &mut rows, bulk, self.tz)
            .await
    }

    /// Load the row matching the model's primary key.
    pub async fn read<M: ModelMeta>(&self, model: &mut M) -> OrmResult<()> {
        self.read_by(model, &[]).await
    }

    /// Load the row matching the model's current values for `cols`.
    pub async fn read_by<M: ModelMeta>(&self, model: &mut M, cols: &[&str]) -> OrmResult<()> {
        self.dialect
            .read(self.querier(), M::model_info(), model, self.tz, cols, false)
            .await
    }

    /// Like [`Orm::read`], locking the row (`FOR UPDATE`).
    pub async fn read_for_update<M: ModelMeta>(&self, model: &mut M) -> OrmResult<()> {
        self.dialect
            .read(self.querier(), M::model_info(), model, self.tz, &[], true)
            .await
    }

    /// Update `cols` (all non-auto columns when empty) by primary key.
    pub async fn update<M: ModelMeta>(&self, model: &mut M, cols: &[&str]) -> OrmResult<i64> {
        self.dialect
            .update(self.querier(), M::model_info(), model, self.tz, cols)
            .await
    }

    /// Delete by primary key.
    pub async fn delete<M: ModelMeta>(&self, model: &mut M) -> OrmResult<i64> {
        self.delete_by(model, &[]).await
    }

    pub async fn delete_by<M: ModelMeta>(&self, model: &mut M, cols: &[&str]) -> OrmResult<i64> {
        self.dialect
            .delete(self.querier(), M::model_info(), model, self.tz, cols)
            .await
    }

    pub async fn get_tables(&self) -> OrmResult<HashMap<String, bool>> {
        self.dialect.get_tables(self.querier()).await
    }

    pub async fn get_columns(&self, table: &str) -> OrmResult<HashMap<String, ColumnInfo>> {
        self.dialect.get_columns(self.querier(), table).await
    }

    pub async fn index_exists(&self, table: &str, name: &str) -> bool {
        self.dialect.index_exists(self.querier(), table, name).await
    }

    /// Comparison fragment for a field of `M`, e.g. `UPPER("name"::text) LIKE UPPER(?)`.
    pub fn condition<M: ModelMeta>(&self, field: &str, operator: &str) -> OrmResult<String> {
        let fi = M::model_info().field(field)?;
        dialect::operator_condition(self.dialect(), fi, operator)
    }

    /// Column definition for a field of `M`.
    pub fn column_type<M: ModelMeta>(&self, field: &str) -> OrmResult<String> {
        let fi = M::model_info().field(field)?;
        dialect::render_column_type(self.dialect(), fi)
    }

    pub fn query_builder(&self) -> QueryBuilder {
        QueryBuilder::new()
    }
}
