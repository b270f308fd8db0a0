//! Boolean predicate trees.
//!
//! A [`Filter`] renders a boolean SQL fragment with `?` placeholders and produces
//! the bind values for those placeholders. Rendering and bind extraction walk the
//! tree in the same depth-first, left-to-right order, so the n-th `?` in
//! [`Filter::render`] always corresponds to the n-th entry of [`Filter::binds`].

use crate::schema::ColumnRef;
use crate::value::Value;

/// Comparison operator of a value or column filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
}

impl CompareOp {
    pub fn as_sql(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Like => "LIKE",
        }
    }
}

/// Boolean combinator of a filter group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

impl BoolOp {
    pub fn as_sql(self) -> &'static str {
        match self {
            BoolOp::And => "AND",
            BoolOp::Or => "OR",
        }
    }
}

/// A node of a boolean expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `column op ?` with one bind value.
    Value {
        column: ColumnRef,
        op: CompareOp,
        value: Value,
    },

    /// `left op right`, no bind values.
    Column {
        left: ColumnRef,
        op: CompareOp,
        right: ColumnRef,
    },

    /// Children joined by `AND`/`OR`, parenthesized when non-empty.
    ///
    /// An empty group renders to the empty string, never to `TRUE`/`FALSE`:
    /// a statement whose filters render empty has no WHERE clause at all.
    Boolean { op: BoolOp, filters: Vec<Filter> },
}

/// Conjunction of `filters`. Zero filters is legal and renders empty.
pub fn and(filters: impl IntoIterator<Item = Filter>) -> Filter {
    Filter::Boolean {
        op: BoolOp::And,
        filters: filters.into_iter().collect(),
    }
}

/// Disjunction of `filters`. Zero filters is legal and renders empty.
pub fn or(filters: impl IntoIterator<Item = Filter>) -> Filter {
    Filter::Boolean {
        op: BoolOp::Or,
        filters: filters.into_iter().collect(),
    }
}

impl Filter {
    /// `self AND other`
    pub fn and_also(self, other: Filter) -> Filter {
        and([self, other])
    }

    /// `self OR other`
    pub fn or_else(self, other: Filter) -> Filter {
        or([self, other])
    }

    /// Render the boolean expression, qualifying columns with their table name
    /// when `qualified`.
    pub fn render(&self, qualified: bool) -> String {
        match self {
            Filter::Value { column, op, .. } => {
                format!("{} {} ?", column.render(qualified), op.as_sql())
            }
            Filter::Column { left, op, right } => format!(
                "{} {} {}",
                left.render(qualified),
                op.as_sql(),
                right.render(qualified)
            ),
            Filter::Boolean { .. } => {
                let joined = self.render_unwrapped(qualified);
                if joined.is_empty() {
                    joined
                } else {
                    // keep precedence intact when nested
                    format!("( {joined} )")
                }
            }
        }
    }

    /// Like [`Filter::render`], but a group is emitted without its outer
    /// parentheses. Used for the top-level conjunction of a WHERE clause.
    pub(crate) fn render_unwrapped(&self, qualified: bool) -> String {
        match self {
            Filter::Boolean { op, filters } => {
                let separator = format!(" {} ", op.as_sql());
                filters
                    .iter()
                    .map(|f| f.render(qualified))
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(&separator)
            }
            _ => self.render(qualified),
        }
    }

    /// Bind values in placeholder order.
    pub fn binds(&self) -> Vec<Value> {
        let mut out = Vec::new();
        self.collect_binds(&mut out);
        out
    }

    fn collect_binds(&self, out: &mut Vec<Value>) {
        match self {
            Filter::Value { value, .. } => out.push(value.clone()),
            Filter::Column { .. } => {}
            Filter::Boolean { filters, .. } => {
                for filter in filters {
                    filter.collect_binds(out);
                }
            }
        }
    }

    /// Number of `?` placeholders this filter renders.
    pub fn placeholder_count(&self) -> usize {
        match self {
            Filter::Value { .. } => 1,
            Filter::Column { .. } => 0,
            Filter::Boolean { filters, .. } => filters.iter().map(Filter::placeholder_count).sum(),
        }
    }

    /// Whether this filter renders to the empty string.
    pub fn is_empty(&self) -> bool {
        match self {
            Filter::Boolean { filters, .. } => filters.iter().all(Filter::is_empty),
            _ => false,
        }
    }
}
