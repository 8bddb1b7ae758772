//! # polyorm
//!
//! The dialect layer of an ORM that targets Oracle, DM, openGauss, SQL Server
//! and Taos from one model description.
//!
//! ## Features
//!
//! - **One contract, many dialects**: every database implements [`DbBaser`]
//!   and inherits the shared CRUD algorithms, overriding only what differs
//! - **Native placeholders**: statements are written with `?` and rewritten
//!   once into `:1`, `$1` or `@p1`
//! - **Key handling**: `RETURNING` where supported, sequence literals for
//!   Oracle and DM, `setval` resynchronization for openGauss
//! - **Introspection**: tables, columns and index presence per dialect catalog
//! - **Token query builder**: [`qb::QueryBuilder`] for hand-assembled statements
//! - **Pluggable execution**: anything implementing [`Querier`] runs the SQL;
//!   `tokio-postgres` clients work out of the box (`postgres` feature)
//!
//! ## Usage
//!
//! ```ignore
//! use polyorm::{Orm, OrmConfig};
//!
//! let orm = Orm::new(client, OrmConfig::new("opengauss"))?;
//!
//! let mut user = User { id: 0, name: "alice".into() };
//! orm.insert(&mut user).await?;
//! orm.read(&mut user).await?;
//! orm.update(&mut user, &["name"]).await?;
//! orm.delete(&mut user).await?;
//! ```
//!
//! Dialects can also be used directly:
//!
//! ```ignore
//! use polyorm::dialect::{self, DbBaser};
//!
//! let oracle = dialect::dialect("oracle")?;
//! let id = oracle.insert(&client, User::model_info(), &mut user, tz).await?;
//! ```

pub mod client;
pub mod config;
pub mod dialect;
pub mod error;
pub mod model;
pub mod monitor;
pub mod orm;
pub mod qb;
pub mod row;
pub mod value;

#[cfg(feature = "postgres")]
pub mod pg;

pub use client::{ExecResult, Querier};
pub use config::OrmConfig;
pub use dialect::{ColumnInfo, DbBaser, DialectRegistration};
pub use error::{OrmError, OrmResult, Phase};
pub use model::{FieldInfo, FieldType, Model, ModelInfo, ModelMeta, OnDelete, ReverseRelation};
pub use monitor::TracingQuerier;
pub use orm::Orm;
pub use qb::QueryBuilder;
pub use row::Row;
pub use value::{FromValue, Value};

// Re-export inventory for dialects registered outside this crate.
pub use inventory;
