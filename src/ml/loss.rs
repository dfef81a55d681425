// ============================================================
// Layer 5 — Triplet Margin Loss
// ============================================================
// For a batch of (anchor, positive, negative) embeddings:
//
//   d(x, y) = ‖x − y + eps‖_p            (row-wise)
//   loss    = mean( max(d(a,p) − d(a,n) + margin, 0) )
//
// The loss is zero once every negative sits at least `margin`
// further from its anchor than the positive does.
//
// Defaults follow the usual convention: margin = 1.0, p = 2,
// eps = 1e-6 (keeps the norm differentiable at x == y).
//
// Reference: Schroff et al. (2015) FaceNet

use burn::prelude::*;

#[derive(Config, Debug)]
pub struct TripletMarginLossConfig {
    #[config(default = 1.0)]
    pub margin: f64,
    #[config(default = 2.0)]
    pub p: f64,
    #[config(default = 1e-6)]
    pub eps: f64,
}

impl TripletMarginLossConfig {
    pub fn init(&self) -> TripletMarginLoss {
        TripletMarginLoss { margin: self.margin, p: self.p, eps: self.eps }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TripletMarginLoss {
    pub margin: f64,
    pub p:      f64,
    pub eps:    f64,
}

impl TripletMarginLoss {
    /// Row-wise p-norm distance: [batch, dim] × [batch, dim] → [batch]
    pub fn distance<B: Backend>(&self, x: Tensor<B, 2>, y: Tensor<B, 2>) -> Tensor<B, 1> {
        let diff = (x - y).add_scalar(self.eps);
        let dist = if self.p == 2.0 {
            diff.powf_scalar(2.0).sum_dim(1).sqrt()
        } else {
            diff.abs().powf_scalar(self.p).sum_dim(1).powf_scalar(1.0 / self.p)
        };
        dist.squeeze::<1>(1)
    }

    pub fn forward<B: Backend>(
        &self,
        anchor:   Tensor<B, 2>,
        positive: Tensor<B, 2>,
        negative: Tensor<B, 2>,
    ) -> Tensor<B, 1> {
        let d_ap = self.distance(anchor.clone(), positive);
        let d_an = self.distance(anchor, negative);
        (d_ap - d_an).add_scalar(self.margin).clamp_min(0.0).mean()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn rows(values: [[f32; 2]; 2]) -> Tensor<TestBackend, 2> {
        Tensor::from_floats(values, &Default::default())
    }

    fn scalar(t: Tensor<TestBackend, 1>) -> f64 {
        t.into_scalar().elem::<f64>()
    }

    #[test]
    fn test_well_separated_triplets_have_zero_loss() {
        let loss = TripletMarginLossConfig::new().init();
        let anchor   = rows([[0.0, 0.0], [1.0, 1.0]]);
        let positive = rows([[0.0, 0.0], [1.0, 1.0]]);
        let negative = rows([[3.0, 4.0], [4.0, 5.0]]);
        assert!(scalar(loss.forward(anchor, positive, negative)).abs() < 1e-4);
    }

    #[test]
    fn test_violating_triplet_is_penalised() {
        let loss = TripletMarginLossConfig::new().init();
        // d(a,p) = 5, d(a,n) ≈ 0 → 5 - 0 + 1 = 6 for both rows
        let anchor   = rows([[0.0, 0.0], [0.0, 0.0]]);
        let positive = rows([[3.0, 4.0], [3.0, 4.0]]);
        let negative = rows([[0.0, 0.0], [0.0, 0.0]]);
        assert!((scalar(loss.forward(anchor, positive, negative)) - 6.0).abs() < 1e-3);
    }

    #[test]
    fn test_margin_is_configurable() {
        let loss = TripletMarginLossConfig::new().with_margin(0.5).init();
        // d(a,p) = 1, d(a,n) = 1 → only the margin remains
        let anchor   = rows([[0.0, 0.0], [0.0, 0.0]]);
        let positive = rows([[1.0, 0.0], [0.0, 1.0]]);
        let negative = rows([[0.0, 1.0], [1.0, 0.0]]);
        assert!((scalar(loss.forward(anchor, positive, negative)) - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_l1_distance() {
        let loss = TripletMarginLossConfig::new().with_p(1.0).with_eps(0.0).init();
        let d = loss.distance(rows([[0.0, 0.0], [1.0, 1.0]]), rows([[3.0, 4.0], [1.0, 1.0]]));
        let values: Vec<f32> = d.into_data().to_vec().unwrap();
        assert!((values[0] - 7.0).abs() < 1e-4);
        assert!(values[1].abs() < 1e-4);
    }
}
