//! sqlite-comfort - fluent SQL building with a small SQLite facade
//!
//! The crate assembles SQL text from plain builder values and runs it
//! against an embedded SQLite database, mapping result rows onto typed
//! records.
//!
//! # Layers
//!
//! - **Conditions**: an expression tree for WHERE, HAVING, ON and CHECK
//!   clauses ([`condition`], [`aggregate`])
//! - **Queries**: a chainable SELECT builder compiled by [`Query::to_sql`]
//! - **Schema**: CREATE TABLE / CREATE INDEX generation ([`schema`])
//! - **Entities**: explicit field lists that turn records into bind values
//!   and rows back into records ([`entity`], [`entity!`])
//! - **Backend**: the [`DatabaseBackend`] facade and its SQLite
//!   implementation
//!
//! # Example
//!
//! ```rust
//! use sqlite_comfort::prelude::*;
//!
//! #[derive(Debug, Default)]
//! struct Player {
//!     id: i64,
//!     name: String,
//!     score: f64,
//! }
//!
//! sqlite_comfort::entity!(Player {
//!     id: i64,
//!     name: String,
//!     score: f64,
//! });
//!
//! fn main() -> Result<()> {
//!     let mut db = SqliteBackend::open_in_memory()?;
//!
//!     db.comfort().create_table(&[Table::new(
//!         "players",
//!         vec![
//!             Column::new("id", SqlType::Integer).primary_key(),
//!             Column::new("name", SqlType::Text).not_null(),
//!             Column::new("score", SqlType::Real),
//!         ],
//!     )])?;
//!
//!     db.insert(
//!         "players",
//!         &[Player { id: 1, name: "Ada".into(), score: 1200.0 }],
//!     )?;
//!
//!     let query = Query::new()
//!         .from("players")
//!         .condition(greater("score", 1000))
//!         .order_by_desc(["score"])
//!         .limit(10);
//!
//!     let top: Vec<Player> = db.comfort().query(&query, &[])?;
//!     assert_eq!(top[0].name, "Ada");
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `sqlite` (default): the [`SqliteBackend`] driver, built on a bundled
//!   SQLite

pub mod aggregate;
pub mod backend;
pub mod builder;
pub mod condition;
pub mod config;
pub mod entity;
pub mod error;
pub mod schema;
pub mod value;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use aggregate::AggregateFunc;
pub use backend::{Comfort, ConnectionState, DatabaseBackend, QueryResult, QueryRow};
pub use builder::{
    DeleteBuilder, FromSource, InsertBuilder, Join, JoinType, Query, Sort, SortDirection,
    UpdateBuilder,
};
pub use condition::{ComparisonOp, Condition, LogicalOp, Operand, Statement};
pub use config::{DatabaseConfig, JournalMode};
pub use entity::{Entity, FieldDef, FieldType, FieldValue};
pub use error::{QueryError, Result};
pub use schema::{Check, Column, ForeignKey, ForeignKeyAction, Index, SqlType, Table};
pub use value::Value;

#[cfg(feature = "sqlite")]
pub use sqlite::{ColumnInfo, SqliteBackend};

/// Prelude for common imports
pub mod prelude {
    pub use crate::aggregate::{
        avg, avg_eq, avg_ge, avg_gt, avg_le, avg_lt, count, count_distinct, count_eq, count_ge,
        count_gt, count_le, count_lt, max, max_eq, max_ge, max_gt, max_le, max_lt, min, min_eq,
        min_ge, min_gt, min_le, min_lt, sum, sum_eq, sum_ge, sum_gt, sum_le, sum_lt,
    };
    pub use crate::backend::{DatabaseBackend, QueryResult, QueryRow};
    pub use crate::builder::{JoinType, Query, Sort, SortDirection};
    pub use crate::condition::{
        between, col, eq, greater, greater_eq, in_list, in_list_params, is_not_null, is_null,
        less, less_eq, like, like_raw, literal, neq, not_in_list, not_in_list_params, not_like,
        not_like_raw, param, raw, sub, text, Condition, Statement,
    };
    pub use crate::config::DatabaseConfig;
    pub use crate::entity::{table_for, Entity};
    pub use crate::error::{QueryError, Result};
    pub use crate::schema::{Check, Column, ForeignKey, ForeignKeyAction, Index, SqlType, Table};
    pub use crate::value::Value;

    #[cfg(feature = "sqlite")]
    pub use crate::sqlite::SqliteBackend;
}
