//! Static tuple shapes.
//!
//! Streams are typed by a Rust tuple of their column types: `(A,)`, `(A, B)`,
//! `(A, B, C)` or `(A, B, C, D)`. At runtime the columns travel as a row of
//! [`Value`]s; [`RowFn`] bridges a typed closure to an erased row.

use crate::value::{column, ColumnValue, Value};

/// A tuple shape of one to four columns.
pub trait RowType: 'static {
    const WIDTH: usize;
}

/// Appending a column to a tuple shape; `(A, B, C, D)` cannot grow.
pub trait Append<N>: RowType {
    type Output: RowType;
}

/// A closure over the columns of a tuple of shape `T`, returning `R`.
///
/// Implemented for every `Fn(&A, ..) -> R` that is `Send + Sync + 'static`.
pub trait RowFn<T, R>: Send + Sync + 'static {
    fn apply(&self, row: &[Value]) -> R;
}

macro_rules! impl_row {
    ($width:literal; $($t:ident => $i:tt),+) => {
        impl<$($t: ColumnValue),+> RowType for ($($t,)+) {
            const WIDTH: usize = $width;
        }

        impl<Func, Ret, $($t: ColumnValue),+> RowFn<($($t,)+), Ret> for Func
        where
            Func: Fn($(&$t),+) -> Ret + Send + Sync + 'static,
        {
            #[inline]
            fn apply(&self, row: &[Value]) -> Ret {
                (self)($(column::<$t>(row, $i)),+)
            }
        }
    };
}

impl_row!(1; A => 0);
impl_row!(2; A => 0, B => 1);
impl_row!(3; A => 0, B => 1, C => 2);
impl_row!(4; A => 0, B => 1, C => 2, D => 3);

macro_rules! impl_append {
    ($($t:ident),+) => {
        impl<$($t: ColumnValue,)+ N: ColumnValue> Append<N> for ($($t,)+) {
            type Output = ($($t,)+ N);
        }
    };
}

impl_append!(A);
impl_append!(A, B);
impl_append!(A, B, C);

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn apply<T, R, F: RowFn<T, R>>(f: F, row: &[Value]) -> R {
        f.apply(row)
    }

    #[test]
    fn test_widths() {
        assert_eq!(<(u8,) as RowType>::WIDTH, 1);
        assert_eq!(<(u8, u16, u32, u64) as RowType>::WIDTH, 4);
        assert_eq!(<<(u8, u16) as Append<u32>>::Output as RowType>::WIDTH, 3);
    }

    #[test]
    fn test_row_fn_reads_columns_in_order() {
        let row: Vec<Value> = vec![Arc::new(2_i64) as Value, Arc::new("room".to_string()) as Value];
        let described = apply::<(i64, String), _, _>(
            |n: &i64, name: &String| format!("{}x{}", n, name),
            &row,
        );
        assert_eq!(described, "2xroom");
    }
}
