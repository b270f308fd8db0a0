//! Reconcile flat column lists with (possibly nested) destination values.
//!
//! Destinations are described statically: scalars implement [`Scan`] (any
//! [`FromValue`] type does), structured values implement [`Record`] (usually via
//! `#[derive(Record)]`), and growable collections of records implement
//! [`Sequence`]. [`flatten`] expands records into their fields until only scalar
//! write targets remain, preserving declaration order.

use crate::error::{OrmError, OrmResult};
use crate::value::{FromValue, Value};
use std::any::type_name;

/// A scalar write target for one column.
pub trait Scan: Send {
    fn assign(&mut self, value: Value) -> OrmResult<()>;
}

impl<T: FromValue + Send> Scan for T {
    fn assign(&mut self, value: Value) -> OrmResult<()> {
        *self = T::from_value(value)?;
        Ok(())
    }
}

/// A structured destination made of scalar and/or nested record fields.
///
/// `fields` returns writable references to the immediate fields, in declaration
/// order. Nested records are returned as [`Dest::record`] and expanded by
/// [`flatten`].
///
/// ```ignore
/// #[derive(Default, tessera::Record)]
/// struct Row {
///     id: i64,
///     #[tessera(nested)]
///     author: Author,
/// }
/// ```
pub trait Record: Send {
    fn fields(&mut self) -> Vec<Dest<'_>>;
}

/// A growable collection of records, used by `SelectStmt::all`.
///
/// Only `Vec<T: Record + Default>` implements it. To collect a single scalar
/// column, use one-element tuples such as `Vec<(i64,)>`.
pub trait Sequence: Send {
    /// Append a fresh element and return a destination pointing at it.
    fn grow(&mut self) -> Dest<'_>;

    /// Remove the element appended by the last `grow`.
    fn shrink(&mut self);
}

impl<T: Record + Default> Sequence for Vec<T> {
    fn grow(&mut self) -> Dest<'_> {
        let idx = self.len();
        self.push(T::default());
        Dest::record(&mut self[idx])
    }

    fn shrink(&mut self) {
        self.pop();
    }
}

enum Slot<'a> {
    Scalar(&'a mut dyn Scan),
    Record(&'a mut dyn Record),
    Sequence(&'a mut dyn Sequence),
}

/// A caller-owned destination reference.
///
/// Carries the declared type name of the target so that shape errors can name
/// the offending argument.
pub struct Dest<'a> {
    kind: &'static str,
    slot: Slot<'a>,
}

impl<'a> Dest<'a> {
    pub fn scalar<T: Scan>(target: &'a mut T) -> Self {
        Self {
            kind: type_name::<T>(),
            slot: Slot::Scalar(target),
        }
    }

    pub fn record<T: Record>(target: &'a mut T) -> Self {
        Self {
            kind: type_name::<T>(),
            slot: Slot::Record(target),
        }
    }

    pub fn sequence<T: Sequence>(target: &'a mut T) -> Self {
        Self {
            kind: type_name::<T>(),
            slot: Slot::Sequence(target),
        }
    }

    /// Declared type name of the target.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.slot, Slot::Scalar(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self.slot, Slot::Sequence(_))
    }

    /// The sequence behind this destination, or its declared kind.
    pub(crate) fn into_sequence(self) -> Result<&'a mut dyn Sequence, &'static str> {
        match self.slot {
            Slot::Sequence(seq) => Ok(seq),
            _ => Err(self.kind),
        }
    }
}

impl std::fmt::Debug for Dest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shape = match self.slot {
            Slot::Scalar(_) => "scalar",
            Slot::Record(_) => "record",
            Slot::Sequence(_) => "sequence",
        };
        f.debug_struct("Dest")
            .field("kind", &self.kind)
            .field("shape", &shape)
            .finish()
    }
}

/// Expand records into their fields until only scalar targets remain.
///
/// Each pass replaces every record in place by its immediate fields; passes
/// repeat until one performs no replacement. The output order is the
/// depth-first declaration order of all scalar leaves.
pub fn flatten(dests: Vec<Dest<'_>>) -> OrmResult<Vec<&mut dyn Scan>> {
    let mut current = dests;
    while !current.iter().all(Dest::is_scalar) {
        let mut next = Vec::with_capacity(current.len());
        for dest in current {
            match dest.slot {
                Slot::Record(record) => next.extend(record.fields()),
                Slot::Sequence(_) => {
                    return Err(OrmError::UnexpectedSequence { kind: dest.kind });
                }
                Slot::Scalar(target) => next.push(Dest {
                    kind: dest.kind,
                    slot: Slot::Scalar(target),
                }),
            }
        }
        current = next;
    }

    Ok(current
        .into_iter()
        .filter_map(|dest| match dest.slot {
            Slot::Scalar(target) => Some(target),
            _ => None,
        })
        .collect())
}

/// Number of scalar targets `dests` flattens to.
pub fn flat_len(dests: Vec<Dest<'_>>) -> OrmResult<usize> {
    flatten(dests).map(|targets| targets.len())
}

macro_rules! impl_tuple_record {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: Scan),+> Record for ($($name,)+) {
            fn fields(&mut self) -> Vec<Dest<'_>> {
                vec![$(Dest::scalar(&mut self.$idx)),+]
            }
        }
    };
}

impl_tuple_record!(A: 0);
impl_tuple_record!(A: 0, B: 1);
impl_tuple_record!(A: 0, B: 1, C: 2);
impl_tuple_record!(A: 0, B: 1, C: 2, D: 3);
impl_tuple_record!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_tuple_record!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
impl_tuple_record!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
impl_tuple_record!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);
