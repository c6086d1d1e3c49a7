//! Fixed-length dense buffers and the vector algebra defined over them.
use std::{
    fmt,
    ops::{Index, IndexMut},
};

use ndarray::{ArrayView1, ArrayViewMut1, LinalgScalar};
use num_traits::Zero;

/// A fixed-length, contiguous buffer that exclusively owns its storage.
///
/// The length is set at construction or on `resize` and never grows implicitly.
/// Resizing drops the previous contents.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseBuffer<T> {
    data: Box<[T]>,
}

impl<T: Clone + Default> DenseBuffer<T> {
    /// Creates a new `DenseBuffer` of `size` default values.
    pub fn new(size: usize) -> Self {
        Self::filled(size, T::default())
    }

    /// Reallocates the buffer with `size` default values.
    pub fn resize(&mut self, size: usize) {
        self.resize_filled(size, T::default());
    }
}

impl<T: Clone> DenseBuffer<T> {
    /// Creates a new `DenseBuffer` of `size` copies of `init`.
    pub fn filled(size: usize, init: T) -> Self {
        Self {
            data: vec![init; size].into_boxed_slice(),
        }
    }

    /// Reallocates the buffer with `size` copies of `init`.
    pub fn resize_filled(&mut self, size: usize, init: T) {
        self.data = vec![init; size].into_boxed_slice();
    }
}

impl<T> DenseBuffer<T> {
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Returns a read-only `ndarray` view over the same memory.
    #[inline]
    pub fn view(&self) -> ArrayView1<'_, T> {
        ArrayView1::from(self.as_slice())
    }

    /// Returns a mutable `ndarray` view over the same memory.
    #[inline]
    pub fn view_mut(&mut self) -> ArrayViewMut1<'_, T> {
        ArrayViewMut1::from(self.as_mut_slice())
    }
}

impl<T> From<Vec<T>> for DenseBuffer<T> {
    fn from(value: Vec<T>) -> Self {
        Self {
            data: value.into_boxed_slice(),
        }
    }
}

impl<T> Index<usize> for DenseBuffer<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

impl<T> IndexMut<usize> for DenseBuffer<T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.data[index]
    }
}

/// Writes `[ i:v ... ]`, skipping exact zeros so the output lines up with sparse vectors.
impl<T: fmt::Display + Zero> fmt::Display for DenseBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[ ")?;

        for (i, value) in self.data.iter().enumerate() {
            if !value.is_zero() {
                write!(f, "{i}:{value} ")?;
            }
        }

        f.write_str("]")
    }
}

/// `v <- v * c`
pub fn scale<T: LinalgScalar>(v: &mut DenseBuffer<T>, c: T) {
    v.view_mut().mapv_inplace(|x| x * c);
}

/// `dst <- src * c`
///
/// # Panics
/// If `dst` and `src` differ in length.
pub fn scale_into<T: LinalgScalar>(dst: &mut DenseBuffer<T>, src: &DenseBuffer<T>, c: T) {
    assert_eq!(dst.len(), src.len(), "scale_into: length mismatch");
    dst.view_mut().zip_mut_with(&src.view(), |d, &s| *d = s * c);
}

/// `dst <- dst + src * c`
///
/// # Panics
/// If `dst` and `src` differ in length.
pub fn add_scaled<T: LinalgScalar>(dst: &mut DenseBuffer<T>, src: &DenseBuffer<T>, c: T) {
    assert_eq!(dst.len(), src.len(), "add_scaled: length mismatch");
    dst.view_mut().scaled_add(c, &src.view());
}

/// `dst <- a + b * c`
///
/// # Panics
/// If any of the three buffers differ in length.
pub fn add_scaled_into<T: LinalgScalar>(
    dst: &mut DenseBuffer<T>,
    a: &DenseBuffer<T>,
    b: &DenseBuffer<T>,
    c: T,
) {
    assert_eq!(a.len(), b.len(), "add_scaled_into: operand length mismatch");
    assert_eq!(dst.len(), a.len(), "add_scaled_into: output length mismatch");

    let mut out = dst.view_mut();
    out.assign(&a.view());
    out.scaled_add(c, &b.view());
}

/// Returns `Σ a[i] * b[i]`.
///
/// # Panics
/// If `a` and `b` differ in length.
pub fn dot_product<T: LinalgScalar>(a: &DenseBuffer<T>, b: &DenseBuffer<T>) -> T {
    assert_eq!(a.len(), b.len(), "dot_product: length mismatch");
    a.view().dot(&b.view())
}
