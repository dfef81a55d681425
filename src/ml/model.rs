use burn::{
    nn::{Dropout, DropoutConfig, Linear, LinearConfig},
    prelude::*,
    tensor::activation::relu,
};

use crate::data::batcher::FusionInput;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally; do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct FusionConfig {
    pub image_dim: usize,
    pub text_dim:  usize,
    #[config(default = 256)]
    pub hidden_dim: usize,
    #[config(default = 128)]
    pub embedding_dim: usize,
    #[config(default = 0.1)]
    pub dropout: f64,
}

impl FusionConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> FusionModel<B> {
        let image_proj = LinearConfig::new(self.image_dim, self.hidden_dim).init(device);
        let text_proj  = LinearConfig::new(self.text_dim, self.hidden_dim).init(device);
        let head       = LinearConfig::new(2 * self.hidden_dim, self.embedding_dim).init(device);
        let dropout    = DropoutConfig::new(self.dropout).init();
        FusionModel { image_proj, text_proj, head, dropout }
    }
}

/// Late-fusion embedding network: each modality gets its own projection,
/// the projections are concatenated and mapped to the shared embedding space.
#[derive(Module, Debug)]
pub struct FusionModel<B: Backend> {
    pub image_proj: Linear<B>,
    pub text_proj:  Linear<B>,
    pub head:       Linear<B>,
    pub dropout:    Dropout,
}

impl<B: Backend> FusionModel<B> {
    /// image: [batch, image_dim], text: [batch, text_dim] → [batch, embedding_dim]
    pub fn forward(&self, image: Tensor<B, 2>, text: Tensor<B, 2>) -> Tensor<B, 2> {
        let image = relu(self.image_proj.forward(image));
        let text  = relu(self.text_proj.forward(text));
        let fused = Tensor::cat(vec![image, text], 1); // [batch, 2 * hidden_dim]
        self.head.forward(self.dropout.forward(fused))
    }

    pub fn embed(&self, input: FusionInput<B>) -> Tensor<B, 2> {
        self.forward(input.image, input.text)
    }

    /// Weight shapes of every layer, `[d_input, d_output]`, in field order.
    pub fn param_shapes(&self) -> Vec<(&'static str, [usize; 2])> {
        vec![
            ("image_proj", self.image_proj.weight.val().dims()),
            ("text_proj",  self.text_proj.weight.val().dims()),
            ("head",       self.head.weight.val().dims()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_output_shape() {
        let device = Default::default();
        let model: FusionModel<TestBackend> = FusionConfig::new(6, 4)
            .with_hidden_dim(8)
            .with_embedding_dim(5)
            .init(&device);

        let image = Tensor::<TestBackend, 2>::zeros([3, 6], &device);
        let text  = Tensor::<TestBackend, 2>::ones([3, 4], &device);
        assert_eq!(model.forward(image, text).dims(), [3, 5]);
    }

    #[test]
    fn test_param_shapes_follow_config() {
        let model: FusionModel<TestBackend> = FusionConfig::new(6, 4)
            .with_hidden_dim(8)
            .with_embedding_dim(5)
            .init(&Default::default());
        assert_eq!(
            model.param_shapes(),
            vec![("image_proj", [6, 8]), ("text_proj", [4, 8]), ("head", [16, 5])]
        );
    }

    #[test]
    fn test_config_defaults() {
        let cfg = FusionConfig::new(10, 20);
        assert_eq!(cfg.hidden_dim, 256);
        assert_eq!(cfg.embedding_dim, 128);
    }
}
