//! Condition algebra used by WHERE, HAVING, ON and CHECK clauses.
//!
//! Conditions are a small expression tree compiled by [`Condition::to_sql`].
//! Composition never adds parentheses on its own; group explicitly with
//! [`sub`].

use crate::aggregate::AggregateFunc;
use crate::value::Value;
use std::fmt;

/// Comparison operators for WHERE clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    NotLike,
    IsNull,
    IsNotNull,
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonOp::Eq => write!(f, "="),
            ComparisonOp::Ne => write!(f, "!="),
            ComparisonOp::Lt => write!(f, "<"),
            ComparisonOp::Le => write!(f, "<="),
            ComparisonOp::Gt => write!(f, ">"),
            ComparisonOp::Ge => write!(f, ">="),
            ComparisonOp::Like => write!(f, "LIKE"),
            ComparisonOp::NotLike => write!(f, "NOT LIKE"),
            ComparisonOp::IsNull => write!(f, "IS NULL"),
            ComparisonOp::IsNotNull => write!(f, "IS NOT NULL"),
        }
    }
}

/// Logical operators for combining conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOp::And => write!(f, "AND"),
            LogicalOp::Or => write!(f, "OR"),
        }
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Positional `?` bind marker.
    Placeholder,
    /// Inlined verbatim, no escaping.
    Expr(String),
    /// Inlined as a SQL literal.
    Literal(Value),
}

impl Operand {
    fn write_sql(&self, out: &mut String) {
        match self {
            Operand::Placeholder => out.push('?'),
            Operand::Expr(expr) => out.push_str(expr),
            Operand::Literal(value) => out.push_str(&value.to_sql_literal()),
        }
    }
}

/// A `?` placeholder operand.
pub fn param() -> Operand {
    Operand::Placeholder
}

/// Raw SQL text inlined without escaping. The caller owns injection safety.
pub fn raw(expr: impl Into<String>) -> Operand {
    Operand::Expr(expr.into())
}

/// A column reference, e.g. for column-to-column comparisons.
pub fn col(name: impl Into<String>) -> Operand {
    Operand::Expr(name.into())
}

/// A string literal, single-quoted with embedded quotes doubled.
pub fn text(s: impl Into<String>) -> Operand {
    Operand::Literal(Value::Text(s.into()))
}

pub fn literal(value: impl Into<Value>) -> Operand {
    Operand::Literal(value.into())
}

impl From<i32> for Operand {
    fn from(v: i32) -> Self {
        Operand::Literal(v.into())
    }
}

impl From<i64> for Operand {
    fn from(v: i64) -> Self {
        Operand::Literal(v.into())
    }
}

impl From<u32> for Operand {
    fn from(v: u32) -> Self {
        Operand::Literal(v.into())
    }
}

impl From<f64> for Operand {
    fn from(v: f64) -> Self {
        Operand::Literal(v.into())
    }
}

impl From<f32> for Operand {
    fn from(v: f32) -> Self {
        Operand::Literal(v.into())
    }
}

impl From<bool> for Operand {
    fn from(v: bool) -> Self {
        Operand::Literal(v.into())
    }
}

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Operand::Literal(v)
    }
}

/// Items of an IN list.
#[derive(Debug, Clone, PartialEq)]
pub enum InItems {
    /// Comma separated values, inlined verbatim.
    Literal(String),
    /// That many `?` placeholders.
    Params(usize),
}

/// A boolean SQL expression fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Expr(String),
    Compare {
        left: Box<Condition>,
        op: ComparisonOp,
        right: Option<Operand>,
    },
    Between {
        expr: Box<Condition>,
        low: Operand,
        high: Operand,
    },
    InList {
        expr: Box<Condition>,
        negated: bool,
        items: InItems,
    },
    Aggregate {
        func: AggregateFunc,
        arg: String,
    },
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
    Sub(Box<Condition>),
}

impl Condition {
    pub fn expr(sql: impl Into<String>) -> Self {
        Condition::Expr(sql.into())
    }

    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out);
        out
    }

    fn write_sql(&self, out: &mut String) {
        match self {
            Condition::Expr(sql) => out.push_str(sql),
            Condition::Compare { left, op, right } => {
                left.write_sql(out);
                out.push(' ');
                out.push_str(&op.to_string());
                if let Some(right) = right {
                    out.push(' ');
                    right.write_sql(out);
                }
            }
            Condition::Between { expr, low, high } => {
                expr.write_sql(out);
                out.push_str(" BETWEEN ");
                low.write_sql(out);
                out.push_str(" AND ");
                high.write_sql(out);
            }
            Condition::InList {
                expr,
                negated,
                items,
            } => {
                expr.write_sql(out);
                out.push_str(if *negated { " NOT IN (" } else { " IN (" });
                match items {
                    InItems::Literal(values) => out.push_str(values),
                    InItems::Params(n) => out.push_str(&vec!["?"; *n].join(",")),
                }
                out.push(')');
            }
            Condition::Aggregate { func, arg } => out.push_str(&func.to_sql(arg)),
            Condition::And(l, r) => {
                l.write_sql(out);
                out.push_str(" AND ");
                r.write_sql(out);
            }
            Condition::Or(l, r) => {
                l.write_sql(out);
                out.push_str(" OR ");
                r.write_sql(out);
            }
            Condition::Sub(inner) => {
                out.push('(');
                inner.write_sql(out);
                out.push(')');
            }
        }
    }

    /// Link with `other` by a logical AND.
    pub fn and(self, other: impl Into<Condition>) -> Condition {
        Condition::And(Box::new(self), Box::new(other.into()))
    }

    /// Link with `other` by a logical OR.
    pub fn or(self, other: impl Into<Condition>) -> Condition {
        Condition::Or(Box::new(self), Box::new(other.into()))
    }

    fn compare(self, op: ComparisonOp, right: impl Into<Operand>) -> Condition {
        Condition::Compare {
            left: Box::new(self),
            op,
            right: Some(right.into()),
        }
    }

    /// `self = value`.
    ///
    /// This shadows `PartialEq::eq` in method position; compare two
    /// conditions with `==` instead.
    pub fn eq(self, value: impl Into<Operand>) -> Condition {
        self.compare(ComparisonOp::Eq, value)
    }

    pub fn neq(self, value: impl Into<Operand>) -> Condition {
        self.compare(ComparisonOp::Ne, value)
    }

    pub fn greater(self, value: impl Into<Operand>) -> Condition {
        self.compare(ComparisonOp::Gt, value)
    }

    pub fn greater_eq(self, value: impl Into<Operand>) -> Condition {
        self.compare(ComparisonOp::Ge, value)
    }

    pub fn less(self, value: impl Into<Operand>) -> Condition {
        self.compare(ComparisonOp::Lt, value)
    }

    pub fn less_eq(self, value: impl Into<Operand>) -> Condition {
        self.compare(ComparisonOp::Le, value)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

impl From<&str> for Condition {
    fn from(sql: &str) -> Self {
        Condition::Expr(sql.to_string())
    }
}

impl From<String> for Condition {
    fn from(sql: String) -> Self {
        Condition::Expr(sql)
    }
}

impl From<&Condition> for Condition {
    fn from(c: &Condition) -> Self {
        c.clone()
    }
}

fn compare(column: impl Into<String>, op: ComparisonOp, value: impl Into<Operand>) -> Condition {
    Condition::expr(column).compare(op, value)
}

pub fn eq(column: impl Into<String>, value: impl Into<Operand>) -> Condition {
    compare(column, ComparisonOp::Eq, value)
}

pub fn neq(column: impl Into<String>, value: impl Into<Operand>) -> Condition {
    compare(column, ComparisonOp::Ne, value)
}

pub fn greater(column: impl Into<String>, value: impl Into<Operand>) -> Condition {
    compare(column, ComparisonOp::Gt, value)
}

pub fn greater_eq(column: impl Into<String>, value: impl Into<Operand>) -> Condition {
    compare(column, ComparisonOp::Ge, value)
}

pub fn less(column: impl Into<String>, value: impl Into<Operand>) -> Condition {
    compare(column, ComparisonOp::Lt, value)
}

pub fn less_eq(column: impl Into<String>, value: impl Into<Operand>) -> Condition {
    compare(column, ComparisonOp::Le, value)
}

pub fn like(column: impl Into<String>, value: impl Into<Operand>) -> Condition {
    compare(column, ComparisonOp::Like, value)
}

pub fn not_like(column: impl Into<String>, value: impl Into<Operand>) -> Condition {
    compare(column, ComparisonOp::NotLike, value)
}

/// `column LIKE 'pattern'` with the pattern inlined and quotes doubled.
pub fn like_raw(column: impl Into<String>, pattern: impl Into<String>) -> Condition {
    like(column, text(pattern))
}

pub fn not_like_raw(column: impl Into<String>, pattern: impl Into<String>) -> Condition {
    not_like(column, text(pattern))
}

pub fn between(
    column: impl Into<String>,
    low: impl Into<Operand>,
    high: impl Into<Operand>,
) -> Condition {
    Condition::Between {
        expr: Box::new(Condition::expr(column)),
        low: low.into(),
        high: high.into(),
    }
}

pub fn is_null(expr: impl Into<Condition>) -> Condition {
    Condition::Compare {
        left: Box::new(expr.into()),
        op: ComparisonOp::IsNull,
        right: None,
    }
}

pub fn is_not_null(expr: impl Into<Condition>) -> Condition {
    Condition::Compare {
        left: Box::new(expr.into()),
        op: ComparisonOp::IsNotNull,
        right: None,
    }
}

fn in_items(expr: impl Into<Condition>, negated: bool, items: InItems) -> Condition {
    Condition::InList {
        expr: Box::new(expr.into()),
        negated,
        items,
    }
}

/// `expr IN (values)` with `values` inlined verbatim.
pub fn in_list(expr: impl Into<Condition>, values: impl Into<String>) -> Condition {
    in_items(expr, false, InItems::Literal(values.into()))
}

/// `expr IN (?,?,...)` with `count` placeholders.
pub fn in_list_params(expr: impl Into<Condition>, count: usize) -> Condition {
    in_items(expr, false, InItems::Params(count))
}

pub fn not_in_list(expr: impl Into<Condition>, values: impl Into<String>) -> Condition {
    in_items(expr, true, InItems::Literal(values.into()))
}

pub fn not_in_list_params(expr: impl Into<Condition>, count: usize) -> Condition {
    in_items(expr, true, InItems::Params(count))
}

/// Enclose a condition in parentheses.
pub fn sub(inner: impl Into<Condition>) -> Condition {
    Condition::Sub(Box::new(inner.into()))
}

/// A condition tagged with the connective that links it to its successor.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub condition: Condition,
    pub connective: LogicalOp,
}

impl Statement {
    pub fn and(condition: impl Into<Condition>) -> Self {
        Self {
            condition: condition.into(),
            connective: LogicalOp::And,
        }
    }

    pub fn or(condition: impl Into<Condition>) -> Self {
        Self {
            condition: condition.into(),
            connective: LogicalOp::Or,
        }
    }
}

/// Join statements by their connectives. The last connective is dropped.
pub fn compile_statements(statements: &[Statement]) -> String {
    let mut out = String::new();
    let mut iter = statements.iter().peekable();

    while let Some(stmt) = iter.next() {
        stmt.condition.write_sql(&mut out);
        if iter.peek().is_some() {
            out.push(' ');
            out.push_str(&stmt.connective.to_string());
            out.push(' ');
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_comparisons_inline() {
        assert_eq!(eq("id", 5).to_sql(), "id = 5");
        assert_eq!(neq("id", 5).to_sql(), "id != 5");
        assert_eq!(greater("score", 100).to_sql(), "score > 100");
        assert_eq!(greater_eq("score", 2.5).to_sql(), "score >= 2.5");
        assert_eq!(less("age", 18i64).to_sql(), "age < 18");
        assert_eq!(less_eq("price", 9.99).to_sql(), "price <= 9.99");
    }

    #[test]
    fn test_string_comparisons_default_to_placeholder() {
        assert_eq!(eq("name", param()).to_sql(), "name = ?");
        assert_eq!(neq("name", param()).to_sql(), "name != ?");
        assert_eq!(like("name", param()).to_sql(), "name LIKE ?");
        assert_eq!(not_like("name", param()).to_sql(), "name NOT LIKE ?");
    }

    #[test]
    fn test_raw_values_are_not_escaped() {
        assert_eq!(eq("name", raw("'Bob'")).to_sql(), "name = 'Bob'");
        assert_eq!(greater("a.total", col("b.total")).to_sql(), "a.total > b.total");
    }

    #[test]
    fn test_like_raw_doubles_quotes() {
        assert_eq!(like_raw("title", "%Rock'n'Roll%").to_sql(), "title LIKE '%Rock''n''Roll%'");
        assert_eq!(not_like_raw("title", "a%").to_sql(), "title NOT LIKE 'a%'");
    }

    #[test]
    fn test_text_operand_is_escaped() {
        assert_eq!(eq("name", text("O'Reilly")).to_sql(), "name = 'O''Reilly'");
    }

    #[test]
    fn test_between() {
        assert_eq!(between("age", 18, 65).to_sql(), "age BETWEEN 18 AND 65");
        assert_eq!(between("price", 1.5, 9.5).to_sql(), "price BETWEEN 1.5 AND 9.5");
        assert_eq!(between("day", param(), param()).to_sql(), "day BETWEEN ? AND ?");
        assert_eq!(
            between("day", raw("'2021-01-01'"), raw("'2021-12-31'")).to_sql(),
            "day BETWEEN '2021-01-01' AND '2021-12-31'"
        );
    }

    #[test]
    fn test_null_checks() {
        assert_eq!(is_null("deleted_at").to_sql(), "deleted_at IS NULL");
        assert_eq!(is_not_null("email").to_sql(), "email IS NOT NULL");
    }

    #[test]
    fn test_in_lists() {
        assert_eq!(in_list_params("id", 3).to_sql(), "id IN (?,?,?)");
        assert_eq!(in_list("id", "1,2,3").to_sql(), "id IN (1,2,3)");
        assert_eq!(not_in_list("status", "'a','b'").to_sql(), "status NOT IN ('a','b')");
        assert_eq!(not_in_list_params("id", 1).to_sql(), "id NOT IN (?)");
        assert_eq!(in_list_params("id", 0).to_sql(), "id IN ()");
    }

    #[test]
    fn test_and_or_embed_operands_unchanged() {
        let a = eq("a", 1);
        let b = eq("b", param());
        assert_eq!(a.clone().and(b.clone()).to_sql(), format!("{} AND {}", a, b));
        assert_eq!(a.clone().or(b).to_sql(), "a = 1 OR b = ?");

        let chained = eq("a", 1).or(eq("b", 2)).and(eq("c", 3));
        assert_eq!(chained.to_sql(), "a = 1 OR b = 2 AND c = 3");
    }

    #[test]
    fn test_sub_groups_explicitly() {
        let grouped = sub(eq("a", 1).or(eq("b", 2))).and(eq("c", 3));
        assert_eq!(grouped.to_sql(), "(a = 1 OR b = 2) AND c = 3");
        assert_eq!(sub("x > 1").to_sql(), "(x > 1)");
    }

    #[test]
    fn test_condition_as_left_operand() {
        let c = Condition::expr("length(name)").greater_eq(3);
        assert_eq!(c.to_sql(), "length(name) >= 3");
        assert_eq!(sub("a + b").less(col("c")).to_sql(), "(a + b) < c");
    }

    #[test]
    fn test_eq_method_builds_and_operator_compares() {
        assert!(eq("a", 1) == eq("a", 1));
        assert!(eq("a", 1) != eq("a", 2));
        assert_eq!(eq("a", 1).eq(true).to_sql(), "a = 1 = 1");
        assert_eq!(greater("v", f64::INFINITY).to_sql(), "v > 9e999");
    }

    #[test]
    fn test_compile_statements_drops_last_connective() {
        let stmts = vec![
            Statement::and(eq("a", 1)),
            Statement::or(eq("b", 2)),
            Statement::or(eq("c", 3)),
        ];
        assert_eq!(compile_statements(&stmts), "a = 1 AND b = 2 OR c = 3");
        assert_eq!(compile_statements(&[Statement::or("x = 1")]), "x = 1");
        assert_eq!(compile_statements(&[]), "");
    }
}
