//! Aggregate expressions for SELECT lists and HAVING clauses.

use crate::condition::{Condition, Operand};

/// Aggregate function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunc {
    Count,
    CountDistinct,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunc {
    pub fn to_sql(&self, column: &str) -> String {
        match self {
            AggregateFunc::Count => format!("COUNT({})", column),
            AggregateFunc::CountDistinct => format!("COUNT(DISTINCT {})", column),
            AggregateFunc::Sum => format!("SUM({})", column),
            AggregateFunc::Avg => format!("AVG({})", column),
            AggregateFunc::Min => format!("MIN({})", column),
            AggregateFunc::Max => format!("MAX({})", column),
        }
    }

    /// The bare aggregate over `column`.
    pub fn of(self, column: impl Into<String>) -> Condition {
        Condition::Aggregate {
            func: self,
            arg: column.into(),
        }
    }
}

macro_rules! aggregate_fns {
    ($($func:ident => $bare:ident, $eq:ident, $gt:ident, $lt:ident, $ge:ident, $le:ident;)*) => {
        $(
            pub fn $bare(column: impl Into<String>) -> Condition {
                AggregateFunc::$func.of(column)
            }

            pub fn $eq(column: impl Into<String>, value: impl Into<Operand>) -> Condition {
                $bare(column).eq(value)
            }

            pub fn $gt(column: impl Into<String>, value: impl Into<Operand>) -> Condition {
                $bare(column).greater(value)
            }

            pub fn $lt(column: impl Into<String>, value: impl Into<Operand>) -> Condition {
                $bare(column).less(value)
            }

            pub fn $ge(column: impl Into<String>, value: impl Into<Operand>) -> Condition {
                $bare(column).greater_eq(value)
            }

            pub fn $le(column: impl Into<String>, value: impl Into<Operand>) -> Condition {
                $bare(column).less_eq(value)
            }
        )*
    };
}

aggregate_fns! {
    Sum => sum, sum_eq, sum_gt, sum_lt, sum_ge, sum_le;
    Count => count, count_eq, count_gt, count_lt, count_ge, count_le;
    CountDistinct => count_distinct, count_distinct_eq, count_distinct_gt, count_distinct_lt, count_distinct_ge, count_distinct_le;
    Avg => avg, avg_eq, avg_gt, avg_lt, avg_ge, avg_le;
    Min => min, min_eq, min_gt, min_lt, min_ge, min_le;
    Max => max, max_eq, max_gt, max_lt, max_ge, max_le;
}
