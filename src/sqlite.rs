use crate::backend::{ConnectionState, DatabaseBackend, QueryResult, QueryRow};
use crate::config::DatabaseConfig;
use crate::error::{QueryError, Result};
use crate::value::Value;
use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef};
use rusqlite::{Connection, OpenFlags, Row, Statement};
use std::path::Path;
use std::time::Duration;

/// Blocking backend over a single SQLite connection
///
/// Every call prepares its own statement, binds positional values and steps
/// it to completion. The statement is finalized when it drops, on success
/// and on every error path.
#[derive(Debug)]
pub struct SqliteBackend {
    conn: Option<Connection>,
    state: ConnectionState,
}

impl SqliteBackend {
    /// Open (creating if needed) a database file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_config(&DatabaseConfig::default().path(path.as_ref()))
    }

    /// Create an in-memory SQLite database
    pub fn open_in_memory() -> Result<Self> {
        Self::with_config(&DatabaseConfig::default())
    }

    pub fn with_config(config: &DatabaseConfig) -> Result<Self> {
        let conn = match &config.path {
            Some(path) => {
                let mut flags = OpenFlags::default();
                if !config.create_if_missing {
                    flags.remove(OpenFlags::SQLITE_OPEN_CREATE);
                }
                Connection::open_with_flags(path, flags)
            }
            None => Connection::open_in_memory(),
        }
        .map_err(|e| QueryError::Open(e.to_string()))?;

        if let Some(millis) = config.busy_timeout_ms {
            conn.busy_timeout(Duration::from_millis(millis))
                .map_err(|e| QueryError::Open(e.to_string()))?;
        }

        if let Err(err) = conn.pragma_update(None, "foreign_keys", config.foreign_keys) {
            tracing::warn!(error = %err, "could not set foreign_keys pragma");
        }

        if let Some(mode) = config.journal_mode {
            match conn.pragma_update_and_check(None, "journal_mode", mode.as_str(), |row| {
                row.get::<_, String>(0)
            }) {
                Ok(applied) if !applied.eq_ignore_ascii_case(mode.as_str()) => {
                    tracing::warn!(requested = mode.as_str(), applied = %applied, "journal mode not applied");
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(error = %err, "could not set journal_mode pragma");
                }
            }
        }

        match &config.path {
            Some(path) => tracing::info!(path = %path.display(), "opened sqlite database"),
            None => tracing::info!("opened in-memory sqlite database"),
        }

        Ok(Self {
            conn: Some(conn),
            state: ConnectionState::Open,
        })
    }

    fn connection(&self) -> Result<&Connection> {
        match (&self.conn, self.state) {
            (Some(conn), ConnectionState::Open) => Ok(conn),
            _ => Err(QueryError::Connection("database is not open".to_string())),
        }
    }

    /// Prepare `sql` and bind `args` to its placeholders, 1-based.
    fn prepare<'c>(conn: &'c Connection, sql: &str, args: &[Value]) -> Result<Statement<'c>> {
        tracing::debug!(sql, "preparing statement");

        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| QueryError::Prepare(e.to_string()))?;

        for (index, arg) in args.iter().enumerate() {
            stmt.raw_bind_parameter(index + 1, arg)
                .map_err(|e| QueryError::Bind(e.to_string()))?;
        }

        Ok(stmt)
    }

    /// Convert SQLite row to QueryRow, using the storage class of each cell
    fn convert_row(row: &Row<'_>, names: &[String]) -> Result<QueryRow> {
        let mut query_row = QueryRow::new();

        for (index, name) in names.iter().enumerate() {
            let cell = row
                .get_ref(index)
                .map_err(|e| QueryError::Step(e.to_string()))?;

            let value = match cell {
                ValueRef::Null => Value::Null,
                ValueRef::Integer(i) => Value::Integer(i),
                ValueRef::Real(r) => Value::Real(r),
                ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
                ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
            };

            query_row.insert(name.clone(), value);
        }

        Ok(query_row)
    }

    /// Get list of all user tables
    pub fn list_tables(&mut self) -> Result<Vec<String>> {
        let rows = self.query(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            &[],
        )?;

        Ok(rows.iter().filter_map(|row| row.get_string("name")).collect())
    }

    /// Get table info
    pub fn table_info(&mut self, table_name: &str) -> Result<Vec<ColumnInfo>> {
        let rows = self.query(&format!("PRAGMA table_info({})", table_name), &[])?;

        Ok(rows
            .iter()
            .map(|row| ColumnInfo {
                cid: row.get_i64("cid").unwrap_or_default(),
                name: row.get_string("name").unwrap_or_default(),
                type_name: row.get_string("type").unwrap_or_default(),
                not_null: row.get_i64("notnull").unwrap_or(0) != 0,
                default_value: row.get_value("dflt_value").and_then(|v| match v {
                    Value::Null => None,
                    Value::Text(s) => Some(s.clone()),
                    other => Some(other.to_sql_literal()),
                }),
                primary_key: row.get_i64("pk").unwrap_or(0) != 0,
            })
            .collect())
    }
}

/// Column information from PRAGMA table_info
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub cid: i64,
    pub name: String,
    pub type_name: String,
    pub not_null: bool,
    pub default_value: Option<String>,
    pub primary_key: bool,
}

impl DatabaseBackend for SqliteBackend {
    fn execute(&mut self, sql: &str, args: &[Value]) -> Result<usize> {
        let conn = self.connection()?;
        let mut stmt = Self::prepare(conn, sql, args)?;

        if stmt.column_count() == 0 {
            return stmt
                .raw_execute()
                .map_err(|e| QueryError::Step(e.to_string()));
        }

        // Row-returning statements (e.g. PRAGMA) are stepped to completion.
        let mut rows = stmt.raw_query();
        while rows
            .next()
            .map_err(|e| QueryError::Step(e.to_string()))?
            .is_some()
        {}

        Ok(0)
    }

    fn query(&mut self, sql: &str, args: &[Value]) -> Result<QueryResult> {
        let conn = self.connection()?;
        let mut stmt = Self::prepare(conn, sql, args)?;

        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut rows = stmt.raw_query();
        let mut result = Vec::new();

        while let Some(row) = rows.next().map_err(|e| QueryError::Step(e.to_string()))? {
            result.push(Self::convert_row(row, &names)?);
        }

        Ok(result)
    }

    fn state(&self) -> ConnectionState {
        self.state
    }

    fn close(&mut self) -> Result<()> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };

        self.state = ConnectionState::Closing;
        match conn.close() {
            Ok(()) => {
                self.state = ConnectionState::Closed;
                tracing::info!("closed sqlite database");
                Ok(())
            }
            Err((conn, err)) => {
                self.conn = Some(conn);
                self.state = ConnectionState::Open;
                Err(QueryError::Connection(err.to_string()))
            }
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Bool(b) => ToSqlOutput::Owned(SqlValue::Integer(i64::from(*b))),
            Value::Integer(i) => ToSqlOutput::Owned(SqlValue::Integer(*i)),
            Value::Real(r) => ToSqlOutput::Owned(SqlValue::Real(*r)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Blob(bytes) => ToSqlOutput::Borrowed(ValueRef::Blob(bytes)),
        })
    }
}
