use crate::builder::{DeleteBuilder, InsertBuilder, Query, UpdateBuilder};
use crate::condition::Condition;
use crate::entity::Entity;
use crate::error::Result;
use crate::schema::{Index, Table};
use crate::value::Value;

/// Row from a query result
///
/// Columns keep the order the engine reported them in.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRow {
    columns: Vec<(String, Value)>,
}

impl QueryRow {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// Set a column value, replacing an earlier value with the same name.
    pub fn insert(&mut self, key: String, value: Value) {
        match self.columns.iter_mut().find(|(name, _)| *name == key) {
            Some((_, slot)) => *slot = value,
            None => self.columns.push((key, value)),
        }
    }

    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    pub fn get<T>(&self, key: &str) -> Option<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.get_value(key)
            .and_then(|v| serde_json::from_value(v.to_json()).ok())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get_value(key)
            .and_then(|v| v.as_str().map(String::from))
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get_value(key).and_then(Value::as_i64)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get_value(key).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get_value(key).and_then(Value::as_bool)
    }

    pub fn get_bytes(&self, key: &str) -> Option<&[u8]> {
        match self.get_value(key) {
            Some(Value::Blob(bytes)) => Some(bytes),
            _ => None,
        }
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Default for QueryRow {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a query
pub type QueryResult = Vec<QueryRow>;

/// Lifecycle of a backend connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Closed,
    Open,
    Closing,
}

/// Database backend trait
///
/// Implementors provide statement execution; the entity-level operations
/// are built on top of `execute` and `query`.
pub trait DatabaseBackend {
    /// Execute a statement that returns no rows, yielding the changed row count.
    fn execute(&mut self, sql: &str, args: &[Value]) -> Result<usize>;

    /// Run a statement and collect every result row.
    fn query(&mut self, sql: &str, args: &[Value]) -> Result<QueryResult>;

    fn state(&self) -> ConnectionState;

    /// Check if connected
    fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Close the connection. Closing twice is a no-op.
    fn close(&mut self) -> Result<()>;

    /// Insert or replace each record as one row.
    ///
    /// Unset optional fields are left out of the column list. The first
    /// failing record stops the batch; earlier rows stay written.
    fn insert<T: Entity>(&mut self, table: &str, records: &[T]) -> Result<usize>
    where
        Self: Sized,
    {
        let mut changed = 0;

        for record in records {
            let builder = record
                .persisted_values()
                .into_iter()
                .fold(InsertBuilder::new(table), |builder, (column, value)| {
                    builder.value(column, value)
                });
            let (sql, binds) = builder.build();
            changed += self.execute(&sql, &binds)?;
        }

        Ok(changed)
    }

    /// Update rows matching `condition` with the record's set fields.
    ///
    /// Field values are inlined as SQL literals; `args` bind only into
    /// placeholders inside `condition`.
    fn update<T: Entity>(
        &mut self,
        table: &str,
        record: &T,
        condition: impl Into<Condition>,
        args: &[Value],
    ) -> Result<usize>
    where
        Self: Sized,
    {
        let sql = record
            .persisted_values()
            .into_iter()
            .fold(UpdateBuilder::new(table), |builder, (column, value)| {
                builder.set(column, value)
            })
            .where_clause(condition)
            .build()?;

        self.execute(&sql, args)
    }

    /// Delete rows matching `condition`, or every row when it is `None`.
    ///
    /// `args` bind into placeholders of `condition` and are ignored without one.
    fn delete(&mut self, table: &str, condition: Option<&str>, args: &[Value]) -> Result<usize> {
        match condition {
            Some(condition) => {
                let sql = DeleteBuilder::new(table).where_clause(condition).build();
                self.execute(&sql, args)
            }
            None => self.execute(&DeleteBuilder::new(table).build(), &[]),
        }
    }

    fn drop_table(&mut self, tables: &[&str]) -> Result<()> {
        for table in tables {
            self.execute(&format!("DROP TABLE IF EXISTS {}", table), &[])?;
        }
        Ok(())
    }

    /// Run a query and decode each row into a fresh record.
    fn query_as<T: Entity>(&mut self, sql: &str, args: &[Value]) -> Result<Vec<T>>
    where
        Self: Sized,
    {
        let rows = self.query(sql, args)?;
        Ok(rows.iter().map(T::from_row).collect())
    }

    fn exec_sql(&mut self, sql: &str, args: &[Value]) -> Result<()> {
        self.execute(sql, args).map(|_| ())
    }

    /// Builder-object variants of the facade operations.
    fn comfort(&mut self) -> Comfort<'_, Self>
    where
        Self: Sized,
    {
        Comfort { backend: self }
    }
}

/// Facade operations that take builder values instead of SQL text
pub struct Comfort<'a, B: DatabaseBackend> {
    backend: &'a mut B,
}

impl<'a, B: DatabaseBackend> Comfort<'a, B> {
    pub fn create_table(&mut self, tables: &[Table]) -> Result<()> {
        for table in tables {
            self.backend.execute(&table.create_statement(), &[])?;
        }
        Ok(())
    }

    pub fn create_index(&mut self, indexes: &[Index]) -> Result<()> {
        for index in indexes {
            self.backend.execute(&index.create_statement(), &[])?;
        }
        Ok(())
    }

    pub fn drop_table(&mut self, tables: &[Table]) -> Result<()> {
        for table in tables {
            self.backend.execute(&table.drop_statement(), &[])?;
        }
        Ok(())
    }

    pub fn delete(
        &mut self,
        table: &str,
        condition: Option<Condition>,
        args: &[Value],
    ) -> Result<usize> {
        match condition {
            Some(condition) => {
                let sql = DeleteBuilder::new(table).where_clause(condition).build();
                self.backend.execute(&sql, args)
            }
            None => self.backend.execute(&DeleteBuilder::new(table).build(), &[]),
        }
    }

    pub fn update<T: Entity>(
        &mut self,
        table: &str,
        record: &T,
        condition: Condition,
        args: &[Value],
    ) -> Result<usize> {
        self.backend.update(table, record, condition, args)
    }

    pub fn query<T: Entity>(&mut self, query: &Query, args: &[Value]) -> Result<Vec<T>> {
        self.backend.query_as(&query.to_sql(), args)
    }
}
