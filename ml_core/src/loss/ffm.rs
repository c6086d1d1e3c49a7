use super::Loss;
use crate::{
    Model, ModelKind, SparseGrad, SparseRow, kernel::sparse_vector_dense_vector_times,
};

/// Field-aware factorization machine:
/// `pred = Σ w_j x_j + Σ_{a<b} <v_{j_a,f_b}, v_{j_b,f_a}> x_a x_b`.
///
/// Each feature keeps one latent vector per field and uses the one matching the field
/// of the feature it interacts with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FfmLoss;

/// `(field, feature, value)` of every entry in the row.
fn entries(row: &SparseRow) -> Vec<(usize, usize, f32)> {
    let Some(triples) = row.field_iter() else {
        panic!("field-aware row without fields");
    };

    triples
        .map(|(field, j, x)| (field as usize, j as usize, x))
        .collect()
}

#[inline]
fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

impl Loss for FfmLoss {
    fn kind(&self) -> ModelKind {
        ModelKind::Ffm
    }

    fn predict_row(&self, row: &SparseRow, model: &Model) -> f32 {
        let linear = sparse_vector_dense_vector_times(row.values(), row.positions(), model.get_w());
        let entries = entries(row);
        let mut interaction = 0.;

        for (a, &(fa, ja, xa)) in entries.iter().enumerate() {
            for &(fb, jb, xb) in &entries[a + 1..] {
                let va = model.get_v_field(ja, fb);
                let vb = model.get_v_field(jb, fa);
                interaction += dot(va, vb) * xa * xb;
            }
        }

        linear + interaction
    }

    /// `∂pred/∂v_{j_a,f_b} = v_{j_b,f_a} x_a x_b`, and symmetrically for `b`.
    fn accumulate_row(&self, row: &SparseRow, model: &Model, p: f32, grad: &mut SparseGrad) {
        for (j, x) in row.iter() {
            grad.accumulate_w(j as usize, x * p);
        }

        let layout = model.layout();
        let entries = entries(row);

        for (a, &(fa, ja, xa)) in entries.iter().enumerate() {
            for &(fb, jb, xb) in &entries[a + 1..] {
                let coef = p * xa * xb;
                let base_a = layout.v_ffm(ja, fb).start;
                let base_b = layout.v_ffm(jb, fa).start;
                let va = model.get_v_field(ja, fb);
                let vb = model.get_v_field(jb, fa);

                for (d, (&wa, &wb)) in va.iter().zip(vb).enumerate() {
                    grad.accumulate_v(base_a + d, coef * wb);
                    grad.accumulate_v(base_b + d, coef * wa);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DataMatrix, ModelSpec};

    const EPS: f32 = 1e-5;

    fn model() -> Model {
        // F = 3, k = 2, N = 2
        let mut model = Model::new(ModelSpec::ffm(3, 2, 2), 0.).unwrap();
        model.get_w_mut().copy_from_slice(&[1., 0., 0.]);
        model.get_v_field_mut(0, 1).copy_from_slice(&[1., 2.]);
        model.get_v_field_mut(2, 0).copy_from_slice(&[3., 4.]);
        model.get_v_field_mut(0, 0).copy_from_slice(&[100., 100.]);
        model.get_v_field_mut(2, 1).copy_from_slice(&[100., 100.]);
        model
    }

    #[test]
    fn interaction_uses_cross_field_vectors() {
        let model = model();
        // feature 0 in field 0, feature 2 in field 1
        let row = SparseRow::with_fields(vec![1., 2.], vec![0, 2], vec![0, 1], 1.);

        // linear 1 + <v_{0,1}, v_{2,0}> * 1 * 2 = 1 + 11 * 2
        assert!((FfmLoss.predict_row(&row, &model) - 23.).abs() < EPS);
    }

    #[test]
    fn gradient_touches_only_cross_field_blocks() {
        let model = model();
        let row = SparseRow::with_fields(vec![1., 2.], vec![0, 2], vec![0, 1], 1.);

        let mut grad = SparseGrad::for_spec(&model.spec());
        FfmLoss.accumulate_row(&row, &model, 1., &mut grad);

        let layout = model.layout();
        let v = grad.v().unwrap();
        let a = layout.v_ffm(0, 1).start;
        let b = layout.v_ffm(2, 0).start;

        assert_eq!(v.len(), 4);
        assert_eq!(v.get(a), 2. * 3.);
        assert_eq!(v.get(a + 1), 2. * 4.);
        assert_eq!(v.get(b), 2. * 1.);
        assert_eq!(v.get(b + 1), 2. * 2.);
    }

    #[test]
    fn same_field_pair_uses_own_field_blocks() {
        let mut model = Model::new(ModelSpec::ffm(2, 1, 2), 0.).unwrap();
        model.get_v_field_mut(0, 1)[0] = 2.;
        model.get_v_field_mut(1, 1)[0] = 3.;

        let matrix = DataMatrix::new(vec![SparseRow::with_fields(
            vec![1., 1.],
            vec![0, 1],
            vec![1, 1],
            0.,
        )]);

        let pred = FfmLoss.predict(&matrix, &model).unwrap();
        assert!((pred[0] - 6.).abs() < EPS);
    }

    #[test]
    #[should_panic(expected = "without fields")]
    fn row_without_fields_panics() {
        let model = model();
        FfmLoss.predict_row(&SparseRow::new(vec![1.], vec![0], 1.), &model);
    }
}
