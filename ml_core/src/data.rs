use std::ops::Index;

/// Maps a raw label to `{-1, +1}`: anything not positive is the negative class.
#[inline]
pub fn normalized_label(y: f32) -> f32 {
    if y > 0.0 { 1.0 } else { -1.0 }
}

/// Returns whether `y` is one of the accepted raw labels `{-1, 0, 1}`.
#[inline]
pub fn is_valid_label(y: f32) -> bool {
    y == 0.0 || y == 1.0 || y == -1.0
}

/// One training example: a run of `(value, feature position)` pairs, optional
/// field ids for field-aware data, and the label.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseRow {
    values: Vec<f32>,
    positions: Vec<u32>,
    fields: Option<Vec<u32>>,
    label: f32,
}

impl SparseRow {
    /// Creates a new `SparseRow` without field ids.
    ///
    /// # Panics
    /// - if `values.len() != positions.len()`
    /// - if `label` is not one of `{-1, 0, 1}`
    pub fn new(values: Vec<f32>, positions: Vec<u32>, label: f32) -> Self {
        assert_eq!(
            values.len(),
            positions.len(),
            "values and positions must have same length"
        );
        assert!(is_valid_label(label), "invalid label {label}");

        Self {
            values,
            positions,
            fields: None,
            label,
        }
    }

    /// Creates a new `SparseRow` carrying one field id per feature.
    ///
    /// # Panics
    /// Same as `new`, and if `fields.len() != values.len()`.
    pub fn with_fields(values: Vec<f32>, positions: Vec<u32>, fields: Vec<u32>, label: f32) -> Self {
        assert_eq!(
            values.len(),
            fields.len(),
            "values and fields must have same length"
        );

        let mut row = Self::new(values, positions, label);
        row.fields = Some(fields);
        row
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    #[inline]
    pub fn positions(&self) -> &[u32] {
        &self.positions
    }

    #[inline]
    pub fn fields(&self) -> Option<&[u32]> {
        self.fields.as_deref()
    }

    #[inline]
    pub fn label(&self) -> f32 {
        self.label
    }

    /// Iterates `(position, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        self.positions.iter().copied().zip(self.values.iter().copied())
    }

    /// Iterates `(field, position, value)` triples, or `None` if the row has no fields.
    pub fn field_iter(&self) -> Option<impl Iterator<Item = (u32, u32, f32)> + '_> {
        let fields = self.fields.as_deref()?;
        Some(
            fields
                .iter()
                .copied()
                .zip(self.iter())
                .map(|(field, (position, value))| (field, position, value)),
        )
    }
}

/// The rows of one batch, in read order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataMatrix {
    rows: Vec<SparseRow>,
}

impl DataMatrix {
    pub fn new(rows: Vec<SparseRow>) -> Self {
        Self { rows }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    pub fn rows(&self) -> &[SparseRow] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SparseRow> {
        self.rows.iter()
    }

    pub fn push(&mut self, row: SparseRow) {
        self.rows.push(row);
    }

    /// Returns the raw label of every row.
    pub fn labels(&self) -> Vec<f32> {
        self.rows.iter().map(SparseRow::label).collect()
    }
}

impl FromIterator<SparseRow> for DataMatrix {
    fn from_iter<I: IntoIterator<Item = SparseRow>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl Index<usize> for DataMatrix {
    type Output = SparseRow;

    fn index(&self, index: usize) -> &Self::Output {
        &self.rows[index]
    }
}

impl<'a> IntoIterator for &'a DataMatrix {
    type Item = &'a SparseRow;
    type IntoIter = std::slice::Iter<'a, SparseRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
