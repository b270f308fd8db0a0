//! Tables and columns as comparable, renderable identities.
//!
//! A [`Column`] holds a shared back-reference to its [`Table`] and renders either
//! bare (`name`) or table-qualified (`table.name`). Columns are value objects:
//! cloning is cheap and equality is `(table, name)`.
//!
//! # Example
//! ```ignore
//! tessera::table! {
//!     pub struct Users("users") {
//!         id: i64,
//!         name: String,
//!     }
//! }
//!
//! let users = Users::new();
//! assert_eq!(users.id.render(true), "users.id");
//! ```

use crate::filter::{CompareOp, Filter};
use crate::value::{Literal, ToValue};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A table identity, compared and ordered by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Table {
    name: Arc<str>,
}

impl Table {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare a typed column owned by this table.
    pub fn column<T>(&self, name: impl Into<Arc<str>>) -> Column<T> {
        Column {
            inner: ColumnRef {
                table: self.clone(),
                name: name.into(),
            },
            _kind: PhantomData,
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// An untyped column identity: `(table, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnRef {
    table: Table,
    name: Arc<str>,
}

impl ColumnRef {
    pub fn new(table: &Table, name: impl Into<Arc<str>>) -> Self {
        Self {
            table: table.clone(),
            name: name.into(),
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render as `name`, or `table.name` when `qualified`.
    pub fn render(&self, qualified: bool) -> String {
        if qualified {
            format!("{}.{}", self.table.name(), self.name)
        } else {
            self.name.to_string()
        }
    }

    pub fn asc(&self) -> OrderBy {
        OrderBy::new(self.clone(), Direction::Asc)
    }

    pub fn desc(&self) -> OrderBy {
        OrderBy::new(self.clone(), Direction::Desc)
    }
}

/// A column whose values are of kind `T`.
pub struct Column<T> {
    inner: ColumnRef,
    _kind: PhantomData<fn() -> T>,
}

// Manual impls: `T` is only a marker and need not be Clone/Debug/PartialEq.
impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _kind: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("table", &self.inner.table.name())
            .field("name", &self.inner.name())
            .field("kind", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> PartialEq for Column<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Eq for Column<T> {}

impl<T> Column<T> {
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn table(&self) -> &Table {
        self.inner.table()
    }

    /// Erase the value kind.
    pub fn to_ref(&self) -> ColumnRef {
        self.inner.clone()
    }

    pub fn render(&self, qualified: bool) -> String {
        self.inner.render(qualified)
    }

    pub fn asc(&self) -> OrderBy {
        self.inner.asc()
    }

    pub fn desc(&self) -> OrderBy {
        self.inner.desc()
    }

    fn compare_column(&self, op: CompareOp, other: &Column<T>) -> Filter {
        Filter::Column {
            left: self.to_ref(),
            op,
            right: other.to_ref(),
        }
    }

    /// Column filter: `self = other`
    pub fn eq_column(&self, other: &Column<T>) -> Filter {
        self.compare_column(CompareOp::Eq, other)
    }

    /// Column filter: `self != other`
    pub fn ne_column(&self, other: &Column<T>) -> Filter {
        self.compare_column(CompareOp::Ne, other)
    }

    /// Column filter: `self < other`
    pub fn lt_column(&self, other: &Column<T>) -> Filter {
        self.compare_column(CompareOp::Lt, other)
    }

    /// Column filter: `self <= other`
    pub fn lte_column(&self, other: &Column<T>) -> Filter {
        self.compare_column(CompareOp::Lte, other)
    }

    /// Column filter: `self > other`
    pub fn gt_column(&self, other: &Column<T>) -> Filter {
        self.compare_column(CompareOp::Gt, other)
    }

    /// Column filter: `self >= other`
    pub fn gte_column(&self, other: &Column<T>) -> Filter {
        self.compare_column(CompareOp::Gte, other)
    }
}

impl<T: ToValue> Column<T> {
    fn compare(&self, op: CompareOp, value: impl Literal<T>) -> Filter {
        Filter::Value {
            column: self.to_ref(),
            op,
            value: value.into_value(),
        }
    }

    /// Value filter: `column = ?`
    pub fn eq(&self, value: impl Literal<T>) -> Filter {
        self.compare(CompareOp::Eq, value)
    }

    /// Value filter: `column != ?`
    pub fn ne(&self, value: impl Literal<T>) -> Filter {
        self.compare(CompareOp::Ne, value)
    }

    /// Value filter: `column < ?`
    pub fn lt(&self, value: impl Literal<T>) -> Filter {
        self.compare(CompareOp::Lt, value)
    }

    /// Value filter: `column <= ?`
    pub fn lte(&self, value: impl Literal<T>) -> Filter {
        self.compare(CompareOp::Lte, value)
    }

    /// Value filter: `column > ?`
    pub fn gt(&self, value: impl Literal<T>) -> Filter {
        self.compare(CompareOp::Gt, value)
    }

    /// Value filter: `column >= ?`
    pub fn gte(&self, value: impl Literal<T>) -> Filter {
        self.compare(CompareOp::Gte, value)
    }
}

impl Column<String> {
    /// Value filter: `column LIKE ?`
    pub fn like(&self, pattern: impl Literal<String>) -> Filter {
        self.compare(CompareOp::Like, pattern)
    }
}

/// Sort direction of an [`OrderBy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// A column plus a sort direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    column: ColumnRef,
    direction: Direction,
}

impl OrderBy {
    pub fn new(column: ColumnRef, direction: Direction) -> Self {
        Self { column, direction }
    }

    pub fn column(&self) -> &ColumnRef {
        &self.column
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_descending(&self) -> bool {
        self.direction == Direction::Desc
    }

    pub fn render(&self, qualified: bool) -> String {
        let dir = match self.direction {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        };
        format!("{} {}", self.column.render(qualified), dir)
    }
}

/// Anything that yields one or more columns for a SELECT list.
pub trait Columns {
    fn columns(&self) -> Vec<ColumnRef>;
}

impl Columns for ColumnRef {
    fn columns(&self) -> Vec<ColumnRef> {
        vec![self.clone()]
    }
}

impl<T> Columns for Column<T> {
    fn columns(&self) -> Vec<ColumnRef> {
        vec![self.to_ref()]
    }
}

impl<C: Columns> Columns for [C] {
    fn columns(&self) -> Vec<ColumnRef> {
        self.iter().flat_map(Columns::columns).collect()
    }
}

impl<C: Columns> Columns for Vec<C> {
    fn columns(&self) -> Vec<ColumnRef> {
        self.as_slice().columns()
    }
}

/// An ordered group of columns, e.g. every column of a table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnGroup {
    columns: Vec<ColumnRef>,
}

impl ColumnGroup {
    pub fn new(columns: Vec<ColumnRef>) -> Self {
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnRef> {
        self.columns.iter()
    }
}

impl Columns for ColumnGroup {
    fn columns(&self) -> Vec<ColumnRef> {
        self.columns.clone()
    }
}

/// Declare a table and its typed columns.
///
/// Generates a struct with one public [`Column`] field per column, `new()`,
/// `table()`, `columns()` and a [`Columns`] impl yielding the columns in
/// declaration order.
///
/// ```ignore
/// tessera::table! {
///     pub struct People("people") {
///         id: i64,
///         name: String,
///         nickname: Option<String>,
///     }
/// }
/// ```
#[macro_export]
macro_rules! table {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident($sql:literal) {
            $($(#[$field_meta:meta])* $col:ident : $ty:ty),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $name {
            table: $crate::Table,
            $($(#[$field_meta])* pub $col: $crate::Column<$ty>,)*
        }

        impl $name {
            pub fn new() -> Self {
                let table = $crate::Table::new($sql);
                Self {
                    $($col: table.column(stringify!($col)),)*
                    table,
                }
            }

            pub fn table(&self) -> &$crate::Table {
                &self.table
            }

            pub fn columns(&self) -> $crate::ColumnGroup {
                $crate::ColumnGroup::new(vec![$(self.$col.to_ref()),*])
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl $crate::Columns for $name {
            fn columns(&self) -> Vec<$crate::ColumnRef> {
                vec![$(self.$col.to_ref()),*]
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn column_renders_bare_or_qualified() {
        let users = Table::new("users");
        let id: Column<i64> = users.column("id");
        assert_eq!(id.render(false), "id");
        assert_eq!(id.render(true), "users.id");
    }

    #[test]
    fn column_identity_is_table_and_name() {
        let a = Table::new("a");
        let b = Table::new("b");
        assert_eq!(a.column::<i64>("x"), a.column::<i64>("x"));
        assert_ne!(a.column::<i64>("x").to_ref(), b.column::<i64>("x").to_ref());
    }

    #[test]
    fn ordering_carries_direction() {
        let name: Column<String> = Table::new("users").column("name");
        assert_eq!(name.asc().render(false), "name ASC");
        assert_eq!(name.desc().render(true), "users.name DESC");
        assert!(name.desc().is_descending());
    }

    #[test]
    fn value_filters_capture_converted_literal() {
        let t = Table::new("t");
        let age: Column<i64> = t.column("age");
        let name: Column<String> = t.column("name");

        assert_eq!(age.gt(18).binds(), vec![Value::Int(18)]);
        assert_eq!(name.like("a%").render(false), "name LIKE ?");
        assert_eq!(
            name.eq("bob").binds(),
            vec![Value::Text("bob".to_string())]
        );
    }

    #[test]
    fn bare_literals_take_the_column_kind() {
        let t = Table::new("t");
        let small: Column<i16> = t.column("small");
        let ratio: Column<f32> = t.column("ratio");
        let parent: Column<Option<i64>> = t.column("parent_id");

        assert_eq!(small.eq(5).binds(), vec![Value::Int(5)]);
        assert_eq!(ratio.gt(1.5).binds(), vec![Value::Float(1.5)]);
        assert_eq!(parent.eq(9).binds(), vec![Value::Int(9)]);
        assert_eq!(parent.ne(None).binds(), vec![Value::Null]);
    }

    #[test]
    fn column_filters_have_no_binds() {
        let a: Column<i64> = Table::new("a").column("id");
        let b: Column<i64> = Table::new("b").column("a_id");
        let f = a.eq_column(&b);
        assert_eq!(f.render(true), "a.id = b.a_id");
        assert!(f.binds().is_empty());
    }

    crate::table! {
        struct Users("users") {
            id: i64,
            name: String,
        }
    }

    #[test]
    fn table_macro_declares_columns_in_order() {
        let users = Users::new();
        assert_eq!(users.table().name(), "users");
        let names: Vec<_> = users.columns().iter().map(|c| c.render(false)).collect();
        assert_eq!(names, vec!["id", "name"]);
        assert_eq!(Columns::columns(&users).len(), 2);
    }
}
