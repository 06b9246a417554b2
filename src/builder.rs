use crate::condition::{compile_statements, Condition, Statement};
use crate::error::{QueryError, Result};
use crate::value::Value;
use std::fmt;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// A column of the ORDER BY clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub column: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }

    pub fn to_sql(&self) -> String {
        format!("{} {}", self.column, self.direction)
    }
}

/// Join type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Plain,
    Inner,
    Left,
    LeftOuter,
    Right,
    RightOuter,
    Full,
    Cross,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinType::Plain => write!(f, "JOIN"),
            JoinType::Inner => write!(f, "INNER JOIN"),
            JoinType::Left => write!(f, "LEFT JOIN"),
            JoinType::LeftOuter => write!(f, "LEFT OUTER JOIN"),
            JoinType::Right => write!(f, "RIGHT JOIN"),
            JoinType::RightOuter => write!(f, "RIGHT OUTER JOIN"),
            JoinType::Full => write!(f, "FULL JOIN"),
            JoinType::Cross => write!(f, "CROSS JOIN"),
        }
    }
}

/// Join clause
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub join_type: JoinType,
    pub table: String,
    pub on: Vec<Statement>,
}

impl Join {
    pub fn to_sql(&self) -> String {
        if self.on.is_empty() {
            format!("{} {}", self.join_type, self.table)
        } else {
            format!(
                "{} {} ON ({})",
                self.join_type,
                self.table,
                compile_statements(&self.on)
            )
        }
    }
}

/// Entry of the FROM clause
#[derive(Debug, Clone, PartialEq)]
pub enum FromSource {
    Table(String),
    Subquery {
        query: Box<Query>,
        alias: Option<String>,
    },
}

impl FromSource {
    pub fn to_sql(&self) -> String {
        match self {
            FromSource::Table(name) => name.clone(),
            FromSource::Subquery { query, alias } => match alias {
                Some(alias) => format!("({}) AS {}", query.to_sql(), alias),
                None => format!("({})", query.to_sql()),
            },
        }
    }
}

/// SELECT query builder
///
/// Every setter appends to the accumulated state; [`Query::to_sql`] is a pure
/// function of that state and may be called any number of times.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    current_table: String,
    columns: Vec<(String, Vec<String>)>,
    distinct: bool,
    from: Vec<FromSource>,
    joins: Vec<Join>,
    where_conditions: Vec<Statement>,
    group_by: Vec<String>,
    having: Vec<Statement>,
    order_by: Vec<Sort>,
    limit: Option<(usize, usize)>,
}

impl Query {
    /// Create a new SELECT query builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Qualify the columns of following `select` calls with `name`.
    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.current_table = name.into();
        self
    }

    /// Select columns of the current table
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let table = self.current_table.clone();
        self.push_columns(table, columns.into_iter().map(Into::into).collect());
        self
    }

    /// Select all columns
    pub fn select_all(mut self) -> Self {
        self.push_columns(String::new(), vec!["*".to_string()]);
        self
    }

    /// Add an aggregate (or any expression) to the select list, unqualified.
    pub fn aggregate(mut self, expr: impl Into<Condition>, alias: Option<&str>) -> Self {
        let expr = expr.into().to_sql();
        let column = match alias {
            Some(alias) => format!("{} AS {}", expr, alias),
            None => expr,
        };
        self.push_columns(String::new(), vec![column]);
        self
    }

    fn push_columns(&mut self, table: String, columns: Vec<String>) {
        match self.columns.iter_mut().find(|(t, _)| *t == table) {
            Some((_, existing)) => existing.extend(columns),
            None => self.columns.push((table, columns)),
        }
    }

    /// Use DISTINCT
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.from.push(FromSource::Table(table.into()));
        self
    }

    pub fn from_tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.from
            .extend(tables.into_iter().map(|t| FromSource::Table(t.into())));
        self
    }

    /// Use a subquery as FROM source, rendered as `(SELECT ...)`.
    pub fn from_query(mut self, query: Query) -> Self {
        self.from.push(FromSource::Subquery {
            query: Box::new(query),
            alias: None,
        });
        self
    }

    /// Use a subquery as FROM source, rendered as `(SELECT ...) AS alias`.
    pub fn from_query_as(mut self, query: Query, alias: impl Into<String>) -> Self {
        self.from.push(FromSource::Subquery {
            query: Box::new(query),
            alias: Some(alias.into()),
        });
        self
    }

    /// Add a JOIN clause. Attach its conditions with `on`, `on_all` or `on_any`.
    pub fn join_with(mut self, join_type: JoinType, table: impl Into<String>) -> Self {
        self.joins.push(Join {
            join_type,
            table: table.into(),
            on: Vec::new(),
        });
        self
    }

    pub fn join(self, table: impl Into<String>) -> Self {
        self.join_with(JoinType::Plain, table)
    }

    pub fn inner_join(self, table: impl Into<String>) -> Self {
        self.join_with(JoinType::Inner, table)
    }

    pub fn left_join(self, table: impl Into<String>) -> Self {
        self.join_with(JoinType::Left, table)
    }

    pub fn left_outer_join(self, table: impl Into<String>) -> Self {
        self.join_with(JoinType::LeftOuter, table)
    }

    pub fn right_join(self, table: impl Into<String>) -> Self {
        self.join_with(JoinType::Right, table)
    }

    pub fn right_outer_join(self, table: impl Into<String>) -> Self {
        self.join_with(JoinType::RightOuter, table)
    }

    pub fn full_join(self, table: impl Into<String>) -> Self {
        self.join_with(JoinType::Full, table)
    }

    pub fn cross_join(self, table: impl Into<String>) -> Self {
        self.join_with(JoinType::Cross, table)
    }

    /// Add a condition to the most recent join. Ignored when no join exists.
    pub fn on(mut self, condition: impl Into<Condition>) -> Self {
        if let Some(join) = self.joins.last_mut() {
            join.on.push(Statement::and(condition));
        }
        self
    }

    /// Add join conditions linked by AND.
    pub fn on_all<I, C>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Condition>,
    {
        if let Some(join) = self.joins.last_mut() {
            join.on.extend(conditions.into_iter().map(Statement::and));
        }
        self
    }

    /// Add join conditions linked by OR.
    pub fn on_any<I, C>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Condition>,
    {
        if let Some(join) = self.joins.last_mut() {
            join.on.extend(conditions.into_iter().map(Statement::or));
        }
        self
    }

    /// Add a WHERE condition, linked to the next one by AND.
    pub fn condition(mut self, condition: impl Into<Condition>) -> Self {
        self.where_conditions.push(Statement::and(condition));
        self
    }

    /// Add a WHERE condition, linked to the next one by OR.
    pub fn or_condition(mut self, condition: impl Into<Condition>) -> Self {
        self.where_conditions.push(Statement::or(condition));
        self
    }

    pub fn conditions<I, C>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Condition>,
    {
        self.where_conditions
            .extend(conditions.into_iter().map(Statement::and));
        self
    }

    pub fn conditions_any<I, C>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Condition>,
    {
        self.where_conditions
            .extend(conditions.into_iter().map(Statement::or));
        self
    }

    /// Add GROUP BY columns
    pub fn group_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Add a HAVING condition. Only rendered together with GROUP BY.
    pub fn having(mut self, condition: impl Into<Condition>) -> Self {
        self.having.push(Statement::and(condition));
        self
    }

    pub fn having_all<I, C>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Condition>,
    {
        self.having.extend(conditions.into_iter().map(Statement::and));
        self
    }

    pub fn having_any<I, C>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Condition>,
    {
        self.having.extend(conditions.into_iter().map(Statement::or));
        self
    }

    /// Add ORDER BY
    pub fn order_by(mut self, sort: Sort) -> Self {
        self.order_by.push(sort);
        self
    }

    /// Add ascending ORDER BY columns
    pub fn order_by_asc<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order_by.extend(columns.into_iter().map(Sort::asc));
        self
    }

    /// Add descending ORDER BY columns
    pub fn order_by_desc<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order_by.extend(columns.into_iter().map(Sort::desc));
        self
    }

    /// Set LIMIT with offset 0
    pub fn limit(self, row_count: usize) -> Self {
        self.limit_offset(row_count, 0)
    }

    pub fn limit_offset(mut self, row_count: usize, offset: usize) -> Self {
        self.limit = Some((row_count, offset));
        self
    }

    /// Build the SQL query string
    pub fn to_sql(&self) -> String {
        let mut sql = String::from("SELECT ");

        if self.distinct {
            sql.push_str("DISTINCT ");
        }

        sql.push_str(&self.compile_select());
        sql.push_str(" FROM ");
        sql.push_str(
            &self
                .from
                .iter()
                .map(FromSource::to_sql)
                .collect::<Vec<_>>()
                .join(", "),
        );

        if !self.joins.is_empty() {
            sql.push(' ');
            sql.push_str(
                &self
                    .joins
                    .iter()
                    .map(Join::to_sql)
                    .collect::<Vec<_>>()
                    .join(" "),
            );
        }

        if !self.where_conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&compile_statements(&self.where_conditions));
        }

        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by.join(", "));

            if !self.having.is_empty() {
                sql.push_str(" HAVING ");
                sql.push_str(&compile_statements(&self.having));
            }
        }

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(
                &self
                    .order_by
                    .iter()
                    .map(Sort::to_sql)
                    .collect::<Vec<_>>()
                    .join(", "),
            );
        }

        if let Some((limit, offset)) = self.limit {
            sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));
        }

        sql
    }

    fn compile_select(&self) -> String {
        let mut columns = Vec::new();

        for (table, cols) in &self.columns {
            if table.is_empty() {
                columns.extend(cols.iter().cloned());
            } else {
                columns.extend(cols.iter().map(|c| format!("{}.{}", table, c)));
            }
        }

        if columns.is_empty() {
            "*".to_string()
        } else {
            columns.join(", ")
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// INSERT OR REPLACE builder with positional parameters
#[derive(Debug, Clone)]
pub struct InsertBuilder {
    table: String,
    values: Vec<(String, Value)>,
}

impl InsertBuilder {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            values: Vec::new(),
        }
    }

    /// Set a column value
    pub fn value(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.push((column.into(), value.into()));
        self
    }

    /// Build the SQL and the bind values in placeholder order
    pub fn build(self) -> (String, Vec<Value>) {
        if self.values.is_empty() {
            return (
                format!("INSERT OR REPLACE INTO {} DEFAULT VALUES", self.table),
                Vec::new(),
            );
        }

        let (columns, values): (Vec<String>, Vec<Value>) = self.values.into_iter().unzip();
        let placeholders = vec!["?"; columns.len()].join(",");

        let sql = format!(
            "INSERT OR REPLACE INTO {} ({}) VALUES ({})",
            self.table,
            columns.join(","),
            placeholders
        );

        (sql, values)
    }
}

/// UPDATE query builder
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table: String,
    set_values: Vec<(String, Value)>,
    where_clause: Option<Condition>,
}

impl UpdateBuilder {
    /// Create a new UPDATE query builder
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            set_values: Vec::new(),
            where_clause: None,
        }
    }

    /// Set a column value, inlined as a SQL literal
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_values.push((column.into(), value.into()));
        self
    }

    /// Add WHERE condition
    pub fn where_clause(mut self, condition: impl Into<Condition>) -> Self {
        self.where_clause = Some(condition.into());
        self
    }

    /// Build the SQL query string
    pub fn build(self) -> Result<String> {
        if self.set_values.is_empty() {
            return Err(QueryError::Query(
                "UPDATE must have at least one SET value".to_string(),
            ));
        }

        let mut sql = format!("UPDATE {} SET ", self.table);

        let set_clauses: Vec<String> = self
            .set_values
            .iter()
            .map(|(col, val)| format!("{} = {}", col, val.to_sql_literal()))
            .collect();

        sql.push_str(&set_clauses.join(", "));

        if let Some(where_clause) = &self.where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(&where_clause.to_sql());
        }

        Ok(sql)
    }
}

/// DELETE query builder
#[derive(Debug, Clone)]
pub struct DeleteBuilder {
    table: String,
    where_clause: Option<Condition>,
}

impl DeleteBuilder {
    /// Create a new DELETE query builder
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            where_clause: None,
        }
    }

    /// Add WHERE condition
    pub fn where_clause(mut self, condition: impl Into<Condition>) -> Self {
        self.where_clause = Some(condition.into());
        self
    }

    /// Build the SQL query string
    pub fn build(self) -> String {
        let mut sql = format!("DELETE FROM {}", self.table);

        if let Some(where_clause) = &self.where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(&where_clause.to_sql());
        }

        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{count, count_gt, sum};
    use crate::condition::{eq, greater, in_list_params, like, param, sub};

    #[test]
    fn test_select_basic() {
        let query = Query::new().select(["id", "name"]).from("users").condition(eq("id", 5));

        assert_eq!(query.to_sql(), "SELECT id, name FROM users WHERE id = 5");
    }

    #[test]
    fn test_select_defaults_to_star() {
        assert_eq!(Query::new().from("users").to_sql(), "SELECT * FROM users");
        assert_eq!(Query::new().select_all().from("users").to_sql(), "SELECT * FROM users");
    }

    #[test]
    fn test_select_where_multiple() {
        let query = Query::new()
            .select(["id"])
            .from("users")
            .condition(eq("age", 25))
            .condition(greater("score", 100));

        assert_eq!(
            query.to_sql(),
            "SELECT id FROM users WHERE age = 25 AND score > 100"
        );
    }

    #[test]
    fn test_where_or_connectives() {
        let query = Query::new()
            .from("users")
            .conditions_any([eq("a", 1), eq("b", 2)])
            .condition("c IS NULL");

        assert_eq!(
            query.to_sql(),
            "SELECT * FROM users WHERE a = 1 OR b = 2 OR c IS NULL"
        );
    }

    #[test]
    fn test_mixed_and_or_conditions() {
        let query = Query::new()
            .from("users")
            .condition(eq("active", 1))
            .or_condition(greater("age", 60))
            .condition(eq("role", 2));

        assert_eq!(
            query.to_sql(),
            "SELECT * FROM users WHERE active = 1 AND age > 60 OR role = 2"
        );
    }

    #[test]
    fn test_on_all_links_with_and() {
        let query = Query::new()
            .from("a")
            .left_join("b")
            .on_all(["a.id = b.a_id", "b.deleted = 0"]);

        assert_eq!(
            query.to_sql(),
            "SELECT * FROM a LEFT JOIN b ON (a.id = b.a_id AND b.deleted = 0)"
        );
    }

    #[test]
    fn test_having_chains() {
        let any = Query::new()
            .select(["user_id"])
            .from("orders")
            .group_by(["user_id"])
            .having_any([count_gt("id", 5), sum("total").greater(100)]);

        assert_eq!(
            any.to_sql(),
            "SELECT user_id FROM orders GROUP BY user_id \
             HAVING COUNT(id) > 5 OR SUM(total) > 100"
        );

        let all = Query::new()
            .from("orders")
            .group_by(["user_id"])
            .having_all([count_gt("id", 1), sum("total").less(50)]);

        assert_eq!(
            all.to_sql(),
            "SELECT * FROM orders GROUP BY user_id HAVING COUNT(id) > 1 AND SUM(total) < 50"
        );
    }

    #[test]
    fn test_qualified_columns_keep_insertion_order() {
        let query = Query::new()
            .table("users")
            .select(["name", "email"])
            .table("orders")
            .select(["total"])
            .table("users")
            .select(["id"])
            .from_tables(["users", "orders"]);

        assert_eq!(
            query.to_sql(),
            "SELECT users.name, users.email, users.id, orders.total FROM users, orders"
        );
    }

    #[test]
    fn test_joins() {
        let query = Query::new()
            .table("users")
            .select(["name"])
            .table("posts")
            .select(["title"])
            .from("users")
            .inner_join("posts")
            .on("users.id = posts.user_id")
            .left_outer_join("tags")
            .on_any(["tags.post_id = posts.id", "tags.global = 1"]);

        assert_eq!(
            query.to_sql(),
            "SELECT users.name, posts.title FROM users \
             INNER JOIN posts ON (users.id = posts.user_id) \
             LEFT OUTER JOIN tags ON (tags.post_id = posts.id OR tags.global = 1)"
        );
    }

    #[test]
    fn test_join_without_condition() {
        let query = Query::new().from("a").cross_join("b");
        assert_eq!(query.to_sql(), "SELECT * FROM a CROSS JOIN b");
    }

    #[test]
    fn test_on_without_join_is_ignored() {
        let query = Query::new().from("a").on("a.x = 1");
        assert_eq!(query.to_sql(), "SELECT * FROM a");
    }

    #[test]
    fn test_group_by_having() {
        let query = Query::new()
            .select(["user_id"])
            .aggregate(count("*"), Some("order_count"))
            .from("orders")
            .group_by(["user_id"])
            .having(count_gt("id", 2));

        assert_eq!(
            query.to_sql(),
            "SELECT user_id, COUNT(*) AS order_count FROM orders GROUP BY user_id HAVING COUNT(id) > 2"
        );
    }

    #[test]
    fn test_having_without_group_by_is_suppressed() {
        let query = Query::new().from("orders").having(count_gt("id", 2));
        assert_eq!(query.to_sql(), "SELECT * FROM orders");
    }

    #[test]
    fn test_empty_where_has_no_keyword() {
        let sql = Query::new().select(["id"]).from("t").to_sql();
        assert!(!sql.contains("WHERE"));
    }

    #[test]
    fn test_order_and_limit() {
        let query = Query::new()
            .from("users")
            .order_by_desc(["created_at"])
            .order_by(Sort::asc("name"))
            .limit(10);

        assert_eq!(
            query.to_sql(),
            "SELECT * FROM users ORDER BY created_at DESC, name ASC LIMIT 10 OFFSET 0"
        );

        let paged = Query::new().from("users").order_by_asc(["id"]).limit_offset(5, 20);
        assert_eq!(
            paged.to_sql(),
            "SELECT * FROM users ORDER BY id ASC LIMIT 5 OFFSET 20"
        );
    }

    #[test]
    fn test_subquery_is_closed() {
        let inner = Query::new()
            .aggregate(sum("total"), Some("spent"))
            .select(["user_id"])
            .from("orders")
            .group_by(["user_id"]);

        let query = Query::new()
            .from_query_as(inner.clone(), "totals")
            .condition(greater("spent", 100));

        assert_eq!(
            query.to_sql(),
            "SELECT * FROM (SELECT SUM(total) AS spent, user_id FROM orders GROUP BY user_id) AS totals WHERE spent > 100"
        );

        let bare = Query::new().from_query(inner).to_sql();
        assert!(bare.starts_with("SELECT * FROM (SELECT "));
        assert!(bare.ends_with("GROUP BY user_id)"));
    }

    #[test]
    fn test_to_sql_is_idempotent() {
        let query = Query::new()
            .distinct()
            .select(["country"])
            .from("users")
            .condition(sub(like("name", param()).or(in_list_params("id", 2))))
            .group_by(["country"])
            .having("COUNT(*) > 1")
            .order_by_asc(["country"])
            .limit(3);

        assert_eq!(query.to_sql(), query.to_sql());
        assert_eq!(query.to_string(), query.to_sql());
    }

    #[test]
    fn test_insert_builder() {
        let (sql, values) = InsertBuilder::new("users")
            .value("name", "Alice")
            .value("age", 30)
            .build();

        assert_eq!(sql, "INSERT OR REPLACE INTO users (name,age) VALUES (?,?)");
        assert_eq!(values, vec![Value::from("Alice"), Value::Integer(30)]);

        let (sql, values) = InsertBuilder::new("users").build();
        assert_eq!(sql, "INSERT OR REPLACE INTO users DEFAULT VALUES");
        assert!(values.is_empty());
    }

    #[test]
    fn test_update_basic() {
        let query = UpdateBuilder::new("users")
            .set("name", "O'Reilly")
            .set("active", true)
            .where_clause(eq("id", 1))
            .build()
            .unwrap();

        assert_eq!(query, "UPDATE users SET name = 'O''Reilly', active = 1 WHERE id = 1");
    }

    #[test]
    fn test_update_requires_values() {
        assert!(UpdateBuilder::new("users").build().is_err());
    }

    #[test]
    fn test_delete_basic() {
        assert_eq!(DeleteBuilder::new("users").build(), "DELETE FROM users");
        assert_eq!(
            DeleteBuilder::new("users").where_clause(eq("id", param())).build(),
            "DELETE FROM users WHERE id = ?"
        );
    }
}
