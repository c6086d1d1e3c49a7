use super::Loss;
use crate::{
    Model, ModelKind, SparseGrad, SparseRow, kernel::sparse_vector_dense_vector_times,
};

/// Factorization machine:
/// `pred = Σ w_j x_j + ½ Σ_f [(Σ_j v_{j,f} x_j)² - Σ_j v_{j,f}² x_j²]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FmLoss;

impl FmLoss {
    /// Per-factor sums `s_f = Σ_j v_{j,f} x_j` and `Σ_j v_{j,f}² x_j²` over the row.
    fn latent_sums(row: &SparseRow, model: &Model) -> (Vec<f32>, f32) {
        let mut sum = vec![0.; model.layout().k()];
        let mut sum_sq = 0.;

        for (j, x) in row.iter() {
            for (s, &v) in sum.iter_mut().zip(model.get_v(j as usize)) {
                let t = v * x;
                *s += t;
                sum_sq += t * t;
            }
        }

        (sum, sum_sq)
    }
}

impl Loss for FmLoss {
    fn kind(&self) -> ModelKind {
        ModelKind::Fm
    }

    fn predict_row(&self, row: &SparseRow, model: &Model) -> f32 {
        let linear = sparse_vector_dense_vector_times(row.values(), row.positions(), model.get_w());
        let (sum, sum_sq) = Self::latent_sums(row, model);
        let square: f32 = sum.iter().map(|s| s * s).sum();

        linear + 0.5 * (square - sum_sq)
    }

    /// `∂pred/∂w_j = x_j` and `∂pred/∂v_{j,f} = x_j (s_f - v_{j,f} x_j)`.
    fn accumulate_row(&self, row: &SparseRow, model: &Model, p: f32, grad: &mut SparseGrad) {
        let (sum, _) = Self::latent_sums(row, model);

        for (j, x) in row.iter() {
            let j = j as usize;
            grad.accumulate_w(j, x * p);

            let base = model.layout().v_fm(j).start;
            for (f, (&v, &s)) in model.get_v(j).iter().zip(&sum).enumerate() {
                grad.accumulate_v(base + f, p * x * (s - v * x));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DataMatrix, ModelSpec};

    const EPS: f32 = 1e-5;

    #[test]
    fn interaction_is_pairwise_dot() {
        let mut model = Model::new(ModelSpec::fm(3, 2), 0.).unwrap();
        model.get_w_mut().copy_from_slice(&[0.5, 0., -1.]);
        model.get_v_mut(0).copy_from_slice(&[1., 2.]);
        model.get_v_mut(1).copy_from_slice(&[3., -1.]);
        model.get_v_mut(2).copy_from_slice(&[0.5, 0.5]);

        let row = SparseRow::new(vec![2., 1., 4.], vec![0, 1, 2], 1.);

        // linear: 0.5*2 + 0 - 1*4 = -3
        // <v0,v1> x0 x1 = (3 - 2) * 2 = 2
        // <v0,v2> x0 x2 = 1.5 * 8 = 12
        // <v1,v2> x1 x2 = 1 * 4 = 4
        let expected = -3. + 2. + 12. + 4.;
        assert!((FmLoss.predict_row(&row, &model) - expected).abs() < EPS);
    }

    #[test]
    fn single_feature_has_no_interaction() {
        let mut model = Model::new(ModelSpec::fm(2, 3), 1.).unwrap();
        model.get_w_mut()[1] = 2.;

        let matrix = DataMatrix::new(vec![SparseRow::new(vec![3.], vec![1], 0.)]);
        let pred = FmLoss.predict(&matrix, &model).unwrap();
        assert!((pred[0] - 6.).abs() < EPS);

        // The latent gradient of a lone feature is zero and leaves nothing stored.
        let grad = FmLoss.calc_grad(&matrix, &model).unwrap();
        assert_eq!(grad.v().unwrap().len(), 0);
        assert_eq!(grad.w().len(), 1);
    }

    #[test]
    fn latent_gradient_lands_in_feature_block() {
        let mut model = Model::new(ModelSpec::fm(4, 2), 0.).unwrap();
        model.get_v_mut(1).copy_from_slice(&[1., 0.]);
        model.get_v_mut(3).copy_from_slice(&[0., 1.]);

        let row = SparseRow::new(vec![1., 1.], vec![1, 3], 1.);
        let mut grad = SparseGrad::for_spec(&model.spec());
        FmLoss.accumulate_row(&row, &model, 1., &mut grad);

        // ∂/∂v_1 = x_1 * v_3 x_3 = [0, 1], ∂/∂v_3 = [1, 0]
        let v = grad.v().unwrap();
        let keys: Vec<_> = v.keys().collect();
        assert_eq!(keys, [model.layout().v_fm(1).start + 1, model.layout().v_fm(3).start]);
        assert_eq!(v.get(4 + 2 + 1), 1.);
        assert_eq!(v.get(4 + 6), 1.);
    }
}
