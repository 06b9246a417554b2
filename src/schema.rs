use crate::condition::{compile_statements, Condition, Statement};

/// SQLite storage class used as a column's declared type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Null,
    Integer,
    Real,
    Text,
    Blob,
}

impl SqlType {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SqlType::Null => "NULL",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Text => "TEXT",
            SqlType::Blob => "BLOB",
        }
    }
}

/// Action taken by a foreign key when its parent key changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForeignKeyAction {
    SetNull,
    SetDefault,
    Restrict,
    NoAction,
    Cascade,
}

impl ForeignKeyAction {
    pub fn to_sql(&self) -> &'static str {
        match self {
            ForeignKeyAction::SetNull => "SET NULL",
            ForeignKeyAction::SetDefault => "SET DEFAULT",
            ForeignKeyAction::Restrict => "RESTRICT",
            ForeignKeyAction::NoAction => "NO ACTION",
            ForeignKeyAction::Cascade => "CASCADE",
        }
    }
}

/// Column definition
///
/// Flags are independent and rendered in a fixed order. Combinations the
/// engine rejects (e.g. AUTOINCREMENT without an INTEGER PRIMARY KEY) are
/// not checked here.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub sql_type: SqlType,
    primary_key: bool,
    not_null: bool,
    unique: bool,
    autoincrement: bool,
    checks: Vec<Statement>,
    default: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            primary_key: false,
            not_null: false,
            unique: false,
            autoincrement: false,
            checks: Vec::new(),
            default: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn autoincrement(mut self) -> Self {
        self.autoincrement = true;
        self
    }

    /// Add a CHECK condition; several are joined by AND.
    pub fn check(mut self, condition: impl Into<Condition>) -> Self {
        self.checks.push(Statement::and(condition));
        self
    }

    /// DEFAULT expression, inlined verbatim.
    pub fn default_value(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }

    pub fn to_sql(&self) -> String {
        let mut def = format!("{} {}", self.name, self.sql_type.to_sql());

        if self.primary_key {
            def.push_str(" PRIMARY KEY");
        }
        if self.not_null {
            def.push_str(" NOT NULL");
        }
        if self.unique {
            def.push_str(" UNIQUE");
        }
        if self.autoincrement {
            def.push_str(" AUTOINCREMENT");
        }
        if !self.checks.is_empty() {
            def.push_str(&format!(" CHECK ({})", compile_statements(&self.checks)));
        }
        if let Some(default) = &self.default {
            def.push_str(&format!(" DEFAULT {}", default));
        }

        def
    }
}

/// Table-level CHECK constraint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Check {
    conditions: Vec<Statement>,
}

impl Check {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(mut self, condition: impl Into<Condition>) -> Self {
        self.conditions.push(Statement::and(condition));
        self
    }

    pub fn checks<I, C>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Condition>,
    {
        self.conditions
            .extend(conditions.into_iter().map(Statement::and));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// `CHECK (...)`, or an empty string without conditions.
    pub fn to_sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("CHECK ({})", compile_statements(&self.conditions))
        }
    }
}

/// FOREIGN KEY constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    column: String,
    reference_table: String,
    reference_column: String,
    on_update: Option<ForeignKeyAction>,
    on_delete: Option<ForeignKeyAction>,
}

impl ForeignKey {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            reference_table: String::new(),
            reference_column: String::new(),
            on_update: None,
            on_delete: None,
        }
    }

    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.reference_table = table.into();
        self.reference_column = column.into();
        self
    }

    pub fn on_update(mut self, action: ForeignKeyAction) -> Self {
        self.on_update = Some(action);
        self
    }

    pub fn on_delete(mut self, action: ForeignKeyAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    pub fn to_sql(&self) -> String {
        let mut sql = format!(
            "FOREIGN KEY ({}) REFERENCES {}({})",
            self.column, self.reference_table, self.reference_column
        );
        if let Some(action) = self.on_update {
            sql.push_str(&format!(" ON UPDATE {}", action.to_sql()));
        }
        if let Some(action) = self.on_delete {
            sql.push_str(&format!(" ON DELETE {}", action.to_sql()));
        }
        sql
    }
}

/// Table schema
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub check: Option<Check>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
            check: None,
            foreign_keys: Vec::new(),
        }
    }

    pub fn check(mut self, check: Check) -> Self {
        self.check = Some(check);
        self
    }

    pub fn foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    /// Generate the CREATE TABLE statement.
    ///
    /// A table without columns yields an empty column list; the engine
    /// rejects it at execution time.
    pub fn create_statement(&self) -> String {
        let mut parts: Vec<String> = self.columns.iter().map(Column::to_sql).collect();

        if let Some(check) = self.check.as_ref().filter(|c| !c.is_empty()) {
            parts.push(check.to_sql());
        }
        parts.extend(self.foreign_keys.iter().map(ForeignKey::to_sql));

        format!("CREATE TABLE IF NOT EXISTS {}({});", self.name, parts.join(","))
    }

    pub fn drop_statement(&self) -> String {
        format!("DROP TABLE IF EXISTS {};", self.name)
    }
}

/// Index definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub name: String,
    pub table: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

impl Index {
    pub fn new<I, S>(name: impl Into<String>, table: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            table: table.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            unique: false,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Generate CREATE INDEX SQL
    pub fn create_statement(&self) -> String {
        let unique = if self.unique { "UNIQUE " } else { "" };
        format!(
            "CREATE {}INDEX IF NOT EXISTS {} ON {} ({});",
            unique,
            self.name,
            self.table,
            self.columns.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{greater, greater_eq, less_eq};

    #[test]
    fn test_create_table_basic() {
        let table = Table::new(
            "t",
            vec![
                Column::new("id", SqlType::Integer).primary_key(),
                Column::new("name", SqlType::Text).not_null(),
            ],
        );

        assert_eq!(
            table.create_statement(),
            "CREATE TABLE IF NOT EXISTS t(id INTEGER PRIMARY KEY,name TEXT NOT NULL);"
        );
    }

    #[test]
    fn test_column_flag_order() {
        let column = Column::new("code", SqlType::Text)
            .check("length(code) = 3")
            .autoincrement()
            .unique()
            .not_null()
            .primary_key();

        assert_eq!(
            column.to_sql(),
            "code TEXT PRIMARY KEY NOT NULL UNIQUE AUTOINCREMENT CHECK (length(code) = 3)"
        );
    }

    #[test]
    fn test_column_checks_and_default() {
        let column = Column::new("age", SqlType::Integer)
            .check(greater_eq("age", 0))
            .check(less_eq("age", 150))
            .default_value("0");

        assert_eq!(
            column.to_sql(),
            "age INTEGER CHECK (age >= 0 AND age <= 150) DEFAULT 0"
        );
    }

    #[test]
    fn test_table_check_and_foreign_keys() {
        let table = Table::new(
            "orders",
            vec![
                Column::new("id", SqlType::Integer).primary_key().autoincrement(),
                Column::new("user_id", SqlType::Integer).not_null(),
                Column::new("product_id", SqlType::Integer),
                Column::new("total", SqlType::Real),
            ],
        )
        .check(Check::new().check(greater("total", 0)))
        .foreign_key(
            ForeignKey::new("user_id")
                .references("users", "id")
                .on_update(ForeignKeyAction::Cascade)
                .on_delete(ForeignKeyAction::SetNull),
        )
        .foreign_key(ForeignKey::new("product_id").references("products", "id"));

        assert_eq!(
            table.create_statement(),
            "CREATE TABLE IF NOT EXISTS orders(\
             id INTEGER PRIMARY KEY AUTOINCREMENT,\
             user_id INTEGER NOT NULL,\
             product_id INTEGER,\
             total REAL,\
             CHECK (total > 0),\
             FOREIGN KEY (user_id) REFERENCES users(id) ON UPDATE CASCADE ON DELETE SET NULL,\
             FOREIGN KEY (product_id) REFERENCES products(id));"
        );
    }

    #[test]
    fn test_empty_check_is_omitted() {
        let table = Table::new("t", vec![Column::new("a", SqlType::Blob)]).check(Check::new());
        assert_eq!(table.create_statement(), "CREATE TABLE IF NOT EXISTS t(a BLOB);");
    }

    #[test]
    fn test_table_without_columns() {
        assert_eq!(
            Table::new("empty", Vec::new()).create_statement(),
            "CREATE TABLE IF NOT EXISTS empty();"
        );
    }

    #[test]
    fn test_drop_statement() {
        assert_eq!(
            Table::new("t", Vec::new()).drop_statement(),
            "DROP TABLE IF EXISTS t;"
        );
    }

    #[test]
    fn test_index_generation() {
        let index = Index::new("idx_player_name", "Player", ["name"]);
        assert_eq!(
            index.create_statement(),
            "CREATE INDEX IF NOT EXISTS idx_player_name ON Player (name);"
        );

        let unique = Index::new("idx_email", "users", ["email", "tenant"]).unique();
        assert_eq!(
            unique.create_statement(),
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_email ON users (email, tenant);"
        );
    }
}
