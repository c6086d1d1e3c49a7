//! Ordered sparse vectors and the vector algebra defined over them.
//!
//! Every binary operation walks both operands in ascending key order, which is
//! what keeps them linear in the number of stored entries.
use std::{
    cmp::Ordering,
    collections::BTreeMap,
    fmt,
    ops::Mul,
};

use num_traits::Zero;

/// An ordered mapping from keys to values where absent keys read as zero.
///
/// No key is ever stored with a value of exactly zero: `set(k, 0)` removes `k`.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseVector<K, V> {
    entries: BTreeMap<K, V>,
}

impl<K, V> Default for SparseVector<K, V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Copy, V: Copy + Zero> SparseVector<K, V> {
    /// Creates a new empty `SparseVector`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored at `key`, or zero if there is none.
    #[inline]
    pub fn get(&self, key: K) -> V {
        self.entries.get(&key).copied().unwrap_or_else(V::zero)
    }

    /// Sets the value at `key`. Setting zero removes the entry.
    pub fn set(&mut self, key: K, value: V) {
        if value.is_zero() {
            self.entries.remove(&key);
        } else {
            self.entries.insert(key, value);
        }
    }

    #[inline]
    pub fn has(&self, key: K) -> bool {
        self.entries.contains_key(&key)
    }

    /// Returns the number of stored (non-zero) entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates the stored entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (K, V)> + '_ {
        self.entries.iter().map(|(&k, &v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.entries.keys().copied()
    }

    /// `self[key] <- self[key] + delta`
    pub(crate) fn accumulate(&mut self, key: K, delta: V) {
        let value = self.get(key) + delta;
        self.set(key, value);
    }
}

impl<K: Ord + Copy, V: Copy + Zero> FromIterator<(K, V)> for SparseVector<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut vector = Self::new();

        for (k, v) in iter {
            vector.set(k, v);
        }

        vector
    }
}

/// Writes `[ k:v ... ]` for every stored entry in ascending key order.
impl<K: fmt::Display, V: fmt::Display> fmt::Display for SparseVector<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[ ")?;

        for (key, value) in &self.entries {
            write!(f, "{key}:{value} ")?;
        }

        f.write_str("]")
    }
}

/// `v <- v * c`
///
/// Scaling by zero empties the vector, and any value that underflows to exactly
/// zero is dropped, so the sparsity invariant holds afterwards.
pub fn scale<K, V>(v: &mut SparseVector<K, V>, c: V)
where
    K: Ord + Copy,
    V: Copy + Zero + Mul<Output = V>,
{
    if c.is_zero() {
        v.entries.clear();
        return;
    }

    for value in v.entries.values_mut() {
        *value = *value * c;
    }

    v.entries.retain(|_, value| !value.is_zero());
}

/// `dst <- src * c`, discarding whatever `dst` held before.
pub fn scale_into<K, V>(dst: &mut SparseVector<K, V>, src: &SparseVector<K, V>, c: V)
where
    K: Ord + Copy,
    V: Copy + Zero + Mul<Output = V>,
{
    dst.entries.clear();

    for (key, value) in src.iter() {
        dst.set(key, value * c);
    }
}

/// `dst <- dst + src * c`
pub fn add_scaled<K, V>(dst: &mut SparseVector<K, V>, src: &SparseVector<K, V>, c: V)
where
    K: Ord + Copy,
    V: Copy + Zero + Mul<Output = V>,
{
    for (key, value) in src.iter() {
        dst.accumulate(key, value * c);
    }
}

/// `dst <- a + b * c`, discarding whatever `dst` held before.
///
/// A single merge over both operands: equal keys are consumed together, otherwise
/// the smaller key advances first.
pub fn add_scaled_into<K, V>(
    dst: &mut SparseVector<K, V>,
    a: &SparseVector<K, V>,
    b: &SparseVector<K, V>,
    c: V,
) where
    K: Ord + Copy,
    V: Copy + Zero + Mul<Output = V>,
{
    let mut lhs = a.entries.iter().peekable();
    let mut rhs = b.entries.iter().peekable();
    let mut merged = Vec::with_capacity(a.len() + b.len());

    loop {
        let (key, value) = match (lhs.peek(), rhs.peek()) {
            (Some(&(&ka, &va)), Some(&(&kb, &vb))) => match ka.cmp(&kb) {
                Ordering::Less => {
                    lhs.next();
                    (ka, va)
                }
                Ordering::Greater => {
                    rhs.next();
                    (kb, vb * c)
                }
                Ordering::Equal => {
                    lhs.next();
                    rhs.next();
                    (ka, va + vb * c)
                }
            },
            (Some(&(&ka, &va)), None) => {
                lhs.next();
                (ka, va)
            }
            (None, Some(&(&kb, &vb))) => {
                rhs.next();
                (kb, vb * c)
            }
            (None, None) => break,
        };

        if !value.is_zero() {
            merged.push((key, value));
        }
    }

    dst.entries = merged.into_iter().collect();
}

/// Returns the sum of products over the keys both vectors store.
pub fn dot_product<K, V>(a: &SparseVector<K, V>, b: &SparseVector<K, V>) -> V
where
    K: Ord + Copy,
    V: Copy + Zero + Mul<Output = V>,
{
    let mut lhs = a.entries.iter();
    let mut rhs = b.entries.iter();
    let (mut x, mut y) = (lhs.next(), rhs.next());
    let mut sum = V::zero();

    while let (Some((ka, &va)), Some((kb, &vb))) = (x, y) {
        match ka.cmp(kb) {
            Ordering::Less => x = lhs.next(),
            Ordering::Greater => y = rhs.next(),
            Ordering::Equal => {
                sum = sum + va * vb;
                x = lhs.next();
                y = rhs.next();
            }
        }
    }

    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    type RealVector = SparseVector<u32, f64>;

    fn vector(entries: &[(u32, f64)]) -> RealVector {
        entries.iter().copied().collect()
    }

    #[test]
    fn get_reads_zero_without_inserting() {
        let mut v = RealVector::new();
        v.set(101, 1.0);

        assert_eq!(v.get(101), 1.0);
        assert_eq!(v.get(102), 0.0);
        assert!(v.has(101));
        assert!(!v.has(102));
        assert_eq!(v.len(), 1);
    }

    #[test]
    fn set_zero_removes() {
        let mut v = RealVector::new();
        assert!(v.is_empty());

        v.set(101, 0.0);
        assert!(v.is_empty());
        assert!(!v.has(101));

        v.set(101, 1.0);
        v.set(101, 2.0);
        assert_eq!(v.len(), 1);
        assert_eq!(v.get(101), 2.0);

        v.set(101, 0.0);
        assert_eq!(v.len(), 0);
        assert!(!v.has(101));
    }

    #[test]
    fn iteration_is_ascending() {
        let v = vector(&[(30, 1.0), (10, 2.0), (20, 3.0)]);
        let keys: Vec<_> = v.keys().collect();
        assert_eq!(keys, [10, 20, 30]);
    }

    #[test]
    fn scale_halves_values() {
        let mut v = vector(&[(101, 2.0), (102, 4.0)]);
        scale(&mut v, 0.5);
        assert_eq!(v.len(), 2);
        assert_eq!(v.get(101), 1.0);
        assert_eq!(v.get(102), 2.0);
    }

    #[test]
    fn scale_by_zero_keeps_no_entries() {
        let mut v = vector(&[(101, 2.0), (102, 4.0)]);
        scale(&mut v, 0.0);
        assert!(v.is_empty());
        assert!(!v.has(101));
    }

    #[test]
    fn scale_drops_underflowed_values() {
        let mut v = SparseVector::<u32, f32>::new();
        v.set(1, 1e-30);
        v.set(2, 1.0);
        scale(&mut v, 1e-30);
        assert!(!v.has(1));
        assert!(v.has(2));
    }

    #[test]
    fn scale_into_replaces_dst() {
        let mut u = vector(&[(200, 2.0)]);
        let v = vector(&[(101, 2.0), (102, 4.0)]);
        scale_into(&mut u, &v, 0.5);
        assert_eq!(u.len(), 2);
        assert_eq!(u.get(101), 1.0);
        assert_eq!(u.get(102), 2.0);
        assert!(!u.has(200));
    }

    #[test]
    fn add_scaled_keeps_dst_entries() {
        let mut u = vector(&[(200, 2.0)]);
        let v = vector(&[(101, 2.0), (102, 4.0)]);
        add_scaled(&mut u, &v, 0.5);
        assert_eq!(u.len(), 3);
        assert_eq!(u.get(200), 2.0);
        assert_eq!(u.get(101), 1.0);
        assert_eq!(u.get(102), 2.0);
    }

    #[test]
    fn add_scaled_removes_cancelled_keys() {
        let mut u = vector(&[(1, 2.0), (2, 1.0)]);
        let v = vector(&[(1, 4.0)]);
        add_scaled(&mut u, &v, -0.5);
        assert!(!u.has(1));
        assert_eq!(u.get(2), 1.0);
    }

    #[test]
    fn add_scaled_into_merges() {
        let mut w = vector(&[(200, 100.0)]);
        let u = vector(&[(101, 2.0), (102, 4.0), (301, 8.0), (302, 100.0)]);
        let v = vector(&[(101, 2.0), (103, 6.0), (301, 8.0)]);

        add_scaled_into(&mut w, &u, &v, 0.5);

        let expected = vector(&[
            (101, 3.0),
            (102, 4.0),
            (103, 3.0),
            (301, 12.0),
            (302, 100.0),
        ]);
        assert_eq!(w, expected);
        assert_eq!(w.len(), 5);
        assert!(!w.has(200));

        let keys: Vec<_> = w.keys().collect();
        assert_eq!(keys, [101, 102, 103, 301, 302]);
    }

    #[test]
    fn add_scaled_into_skips_zero_results() {
        let mut w = RealVector::new();
        let u = vector(&[(1, 2.0), (2, 3.0)]);
        let v = vector(&[(1, 4.0)]);
        add_scaled_into(&mut w, &u, &v, -0.5);
        assert!(!w.has(1));
        assert_eq!(w.get(2), 3.0);
    }

    #[test]
    fn dot_product_over_coinciding_keys() {
        let v = vector(&[(101, 2.0), (102, 4.0), (301, 9.0), (302, 100.0)]);
        let u = vector(&[(101, 2.0), (103, 6.0), (301, 9.0)]);
        let w = vector(&[(200, 10.0)]);

        assert_eq!(dot_product(&v, &u), 85.0);
        assert_eq!(dot_product(&u, &v), 85.0);
        assert_eq!(dot_product(&v, &w), 0.0);
        assert_eq!(dot_product(&w, &RealVector::new()), 0.0);
    }

    #[test]
    fn display_lists_every_entry() {
        let v = vector(&[(7, 0.5), (3, -1.0)]);
        assert_eq!(v.to_string(), "[ 3:-1 7:0.5 ]");
        assert_eq!(RealVector::new().to_string(), "[ ]");
    }
}
