//! # Projections
//!
//! Mapping of selected expressions onto output shapes that are not entities.
//!
//! Three strategies are available through [`Projection`]:
//!
//! - [`Projection::fields`] - label/value map deserialized straight into the
//!   target with serde; the target's own validation is bypassed
//! - [`Projection::bean`] - default-construct, then [`Bean::set`] each property
//! - [`Projection::constructor`] - positional values handed to a constructor
//!   through [`FromTuple`]
//!
//! The [`query_projection!`](crate::query_projection) macro derives
//! [`FromTuple`] for a constructor and adds a typed `projection(..)` function
//! taking one expression per constructor parameter.

use crate::error::{QueryError, Result};
use crate::query_builder::Expr;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

/// One result row of a tuple query
#[derive(Debug, Clone, PartialEq)]
pub struct Tuple {
    exprs: Vec<Expr>,
    labels: Vec<String>,
    values: Vec<Value>,
}

impl Tuple {
    pub fn new(exprs: Vec<Expr>, values: Vec<Value>) -> Self {
        let labels = exprs.iter().map(Expr::label).collect();
        Self {
            exprs,
            labels,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Value whose label (column name or alias) is `label`
    pub fn get_by_label(&self, label: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|l| l == label)
            .and_then(|index| self.values.get(index))
    }

    /// Value selected by `expr`, ignoring aliases on either side
    pub fn get_expr(&self, expr: &Expr) -> Option<&Value> {
        self.exprs
            .iter()
            .position(|e| e.unaliased() == expr.unaliased())
            .and_then(|index| self.values.get(index))
    }

    /// Decode the value at `index`
    pub fn get_as<T: DeserializeOwned>(&self, index: usize) -> Result<T> {
        match (self.labels.get(index), self.values.get(index)) {
            (Some(label), Some(value)) => decode_value(label, value.clone()),
            _ => Err(QueryError::projection(format!("tuple has no column {index}"))),
        }
    }

    pub fn exprs(&self) -> &[Expr] {
        &self.exprs
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .labels
            .iter()
            .zip(&self.values)
            .map(|(label, value)| format!("{label}={value}"))
            .collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Decode one projected value, reporting failures as [`QueryError::ProjectionError`]
pub fn decode_value<T: DeserializeOwned>(label: &str, value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| QueryError::projection(format!("cannot map column '{label}': {e}")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionStrategy {
    Fields,
    Setters,
    Constructor,
}

/// A target populated one property at a time after default construction
pub trait Bean: Default {
    /// Assign `property`; implementations reject values that break their invariants
    fn set(&mut self, property: &str, value: Value) -> Result<()>;
}

/// A target built from positional values
pub trait FromTuple: Sized {
    const ARITY: usize;

    fn from_values(values: Vec<Value>) -> Result<Self>;
}

macro_rules! tuple_from_values {
    ($arity:expr; $($name:ident),+) => {
        impl<$($name: DeserializeOwned),+> FromTuple for ($($name,)+) {
            const ARITY: usize = $arity;

            fn from_values(values: Vec<Value>) -> Result<Self> {
                if values.len() != Self::ARITY {
                    return Err(arity_mismatch(Self::ARITY, values.len()));
                }
                let mut values = values.into_iter().enumerate();
                Ok(($(
                    {
                        let (index, value) = values
                            .next()
                            .ok_or_else(|| arity_mismatch(Self::ARITY, 0))?;
                        decode_value::<$name>(&index.to_string(), value)?
                    },
                )+))
            }
        }
    };
}

tuple_from_values!(1; A);
tuple_from_values!(2; A, B);
tuple_from_values!(3; A, B, C);
tuple_from_values!(4; A, B, C, D);

#[doc(hidden)]
pub fn arity_mismatch(expected: usize, actual: usize) -> QueryError {
    QueryError::projection(format!(
        "constructor takes {expected} values but the row has {actual}"
    ))
}

/// Selected expressions plus the strategy that turns each row into a `T`
pub struct Projection<T> {
    strategy: ProjectionStrategy,
    exprs: Vec<Expr>,
    mapper: fn(&Tuple) -> Result<T>,
}

impl<T> Projection<T> {
    pub fn strategy(&self) -> ProjectionStrategy {
        self.strategy
    }

    /// Expressions the query must select for this projection
    pub fn exprs(&self) -> &[Expr] {
        &self.exprs
    }

    pub fn map(&self, tuple: &Tuple) -> Result<T> {
        (self.mapper)(tuple)
    }

    pub fn map_tuples(&self, tuples: &[Tuple]) -> Result<Vec<T>> {
        tuples.iter().map(|tuple| self.map(tuple)).collect()
    }

    fn with(strategy: ProjectionStrategy, exprs: Vec<Expr>, mapper: fn(&Tuple) -> Result<T>) -> Self {
        Self {
            strategy,
            exprs,
            mapper,
        }
    }
}

impl<T: DeserializeOwned> Projection<T> {
    /// Assign fields directly by label
    pub fn fields<I, X>(exprs: I) -> Self
    where
        I: IntoIterator<Item = X>,
        X: Into<Expr>,
    {
        Self::with(ProjectionStrategy::Fields, collect_exprs(exprs), map_fields::<T>)
    }
}

impl<T: Bean> Projection<T> {
    /// Default-construct the target and call its setter for each label
    pub fn bean<I, X>(exprs: I) -> Self
    where
        I: IntoIterator<Item = X>,
        X: Into<Expr>,
    {
        Self::with(ProjectionStrategy::Setters, collect_exprs(exprs), map_bean::<T>)
    }
}

impl<T: FromTuple> Projection<T> {
    /// Pass the row's values positionally to the target's constructor
    pub fn constructor<I, X>(exprs: I) -> Self
    where
        I: IntoIterator<Item = X>,
        X: Into<Expr>,
    {
        Self::with(
            ProjectionStrategy::Constructor,
            collect_exprs(exprs),
            map_constructor::<T>,
        )
    }
}

impl<T> fmt::Debug for Projection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Projection")
            .field("strategy", &self.strategy)
            .field("exprs", &self.exprs)
            .finish()
    }
}

fn collect_exprs<I, X>(exprs: I) -> Vec<Expr>
where
    I: IntoIterator<Item = X>,
    X: Into<Expr>,
{
    exprs.into_iter().map(Into::into).collect()
}

fn map_fields<T: DeserializeOwned>(tuple: &Tuple) -> Result<T> {
    let mut fields = Map::new();
    for (label, value) in tuple.labels().iter().zip(tuple.values()) {
        if fields.insert(label.clone(), value.clone()).is_some() {
            return Err(duplicate_label(label));
        }
    }
    serde_json::from_value(Value::Object(fields))
        .map_err(|e| QueryError::projection(format!("cannot assign fields: {e}")))
}

fn map_bean<T: Bean>(tuple: &Tuple) -> Result<T> {
    let mut target = T::default();
    let mut assigned = HashSet::new();
    for (label, value) in tuple.labels().iter().zip(tuple.values()) {
        if !assigned.insert(label.as_str()) {
            return Err(duplicate_label(label));
        }
        target.set(label, value.clone())?;
    }
    Ok(target)
}

fn duplicate_label(label: &str) -> QueryError {
    QueryError::projection(format!(
        "label '{label}' is selected twice; alias one of the columns"
    ))
}

fn map_constructor<T: FromTuple>(tuple: &Tuple) -> Result<T> {
    if tuple.len() != T::ARITY {
        return Err(arity_mismatch(T::ARITY, tuple.len()));
    }
    T::from_values(tuple.values().to_vec())
}

/// Derive [`FromTuple`](crate::projection::FromTuple) for a constructor and add
/// a typed `projection(..)` function with one expression per parameter.
///
/// ```rust
/// use relquery_core::query_projection;
///
/// pub struct NameAndAge {
///     name: Option<String>,
///     age: i32,
/// }
///
/// impl NameAndAge {
///     pub fn new(name: Option<String>, age: i32) -> Self {
///         Self { name, age }
///     }
/// }
///
/// query_projection!(NameAndAge::new(name: Option<String>, age: i32));
///
/// let projection = NameAndAge::projection(
///     relquery_core::models::Member::USERNAME,
///     relquery_core::models::Member::AGE,
/// );
/// assert_eq!(projection.exprs().len(), 2);
/// ```
#[macro_export]
macro_rules! query_projection {
    (@count) => { 0usize };
    (@count $head:ident $($tail:ident)*) => {
        1usize + $crate::query_projection!(@count $($tail)*)
    };
    ($target:ident :: $ctor:ident ( $($arg:ident : $ty:ty),+ $(,)? )) => {
        impl $crate::projection::FromTuple for $target {
            const ARITY: usize = $crate::query_projection!(@count $($arg)+);

            fn from_values(
                values: ::std::vec::Vec<$crate::Value>,
            ) -> $crate::error::Result<Self> {
                let arity = <Self as $crate::projection::FromTuple>::ARITY;
                if values.len() != arity {
                    return Err($crate::projection::arity_mismatch(arity, values.len()));
                }
                let mut values = values.into_iter();
                $(
                    let $arg: $ty = $crate::projection::decode_value(
                        stringify!($arg),
                        values.next().unwrap_or($crate::Value::Null),
                    )?;
                )+
                Ok($target::$ctor($($arg),+))
            }
        }

        impl $target {
            /// Constructor projection selecting one expression per parameter
            #[allow(clippy::too_many_arguments)]
            pub fn projection(
                $($arg: impl Into<$crate::query_builder::Expr>),+
            ) -> $crate::projection::Projection<$target> {
                $crate::projection::Projection::constructor([
                    $(::core::convert::Into::<$crate::query_builder::Expr>::into($arg)),+
                ])
            }
        }
    };
}
