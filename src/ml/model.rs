// ============================================================
// Layer 5 — CSRNet Density Model (Burn)
// ============================================================
// Fully convolutional: a VGG-16 frontend followed by a dilated
// backend and a 1x1 conv producing one density value per cell.
// Any input size works; the output is 8x smaller on each side.
//
// Reference: Li, Zhang & Chen (2018) CSRNet

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        loss::{MseLoss, Reduction},
        pool::{MaxPool2d, MaxPool2dConfig},
        Initializer, PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::relu,
};

// Frontend: the first ten conv layers of VGG-16, grouped by the
// max-pool that follows them. Three pools → output stride 8.
const FRONTEND: [&[usize]; 4] = [&[64, 64], &[128, 128], &[256, 256, 256], &[512, 512, 512]];

// Backend: dilated convs keep the resolution while widening the
// receptive field.
const BACKEND: [usize; 6] = [512, 512, 512, 256, 128, 64];
const BACKEND_DILATION: usize = 2;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally; adding them again gives conflicting impls.
#[derive(Config, Debug)]
pub struct CsrNetConfig {
    /// Every channel count is divided by this (minimum 1 channel).
    /// 1 gives the full-size network.
    #[config(default = 1)]
    pub width_divisor: usize,
}

impl CsrNetConfig {
    fn channels(&self, base: usize) -> usize {
        (base / self.width_divisor.max(1)).max(1)
    }

    fn conv3x3<B: Backend>(&self, c_in: usize, c_out: usize, dilation: usize, device: &B::Device) -> Conv2d<B> {
        Conv2dConfig::new([c_in, c_out], [3, 3])
            .with_padding(PaddingConfig2d::Explicit(dilation, dilation))
            .with_dilation([dilation, dilation])
            .with_initializer(Initializer::Normal { mean: 0.0, std: 0.01 })
            .init(device)
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> CsrNet<B> {
        let mut c_in = 3;

        let mut frontend = Vec::with_capacity(FRONTEND.len());
        for stage in FRONTEND {
            let mut convs = Vec::with_capacity(stage.len());
            for &base in stage {
                let c_out = self.channels(base);
                convs.push(self.conv3x3(c_in, c_out, 1, device));
                c_in = c_out;
            }
            frontend.push(FrontendStage { convs });
        }

        let backend: Vec<Conv2d<B>> = BACKEND
            .iter()
            .map(|&base| {
                let c_out = self.channels(base);
                let conv = self.conv3x3(c_in, c_out, BACKEND_DILATION, device);
                c_in = c_out;
                conv
            })
            .collect();

        let output = Conv2dConfig::new([c_in, 1], [1, 1])
            .with_initializer(Initializer::Normal { mean: 0.0, std: 0.01 })
            .init(device);
        let pool = MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init();

        CsrNet { frontend, pool, backend, output }
    }
}

#[derive(Module, Debug)]
pub struct FrontendStage<B: Backend> {
    pub convs: Vec<Conv2d<B>>,
}

#[derive(Module, Debug)]
pub struct CsrNet<B: Backend> {
    pub frontend: Vec<FrontendStage<B>>,
    pub pool:     MaxPool2d,
    pub backend:  Vec<Conv2d<B>>,
    pub output:   Conv2d<B>,
}

impl<B: Backend> CsrNet<B> {
    /// images: [batch, 3, H, W] → density: [batch, 1, H/8, W/8]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 4> {
        let last = self.frontend.len() - 1;
        let mut x = images;
        for (i, stage) in self.frontend.iter().enumerate() {
            for conv in &stage.convs {
                x = relu(conv.forward(x));
            }
            if i < last {
                x = self.pool.forward(x);
            }
        }
        for conv in &self.backend {
            x = relu(conv.forward(x));
        }
        self.output.forward(x)
    }

    /// Predicted density map for a single image, squeezed to [h, w].
    pub fn forward_density(&self, image: Tensor<B, 4>) -> Tensor<B, 2> {
        let out = self.forward(image);
        let [_, _, h, w] = out.dims();
        out.reshape([h, w])
    }

    /// Mean squared error between the predicted and target density maps.
    /// image: [1, 3, H, W], target: [H/8, W/8]
    pub fn forward_loss(&self, image: Tensor<B, 4>, target: Tensor<B, 2>) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let pred = self.forward_density(image);
        let loss = MseLoss::new().forward(pred.clone(), target, Reduction::Mean);
        (loss, pred)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_output_stride_is_eight() {
        let device = Default::default();
        let model: CsrNet<TestBackend> = CsrNetConfig::new().with_width_divisor(32).init(&device);
        let images = Tensor::<TestBackend, 4>::zeros([1, 3, 35, 48], &device);
        assert_eq!(model.forward(images).dims(), [1, 1, 4, 6]);
    }

    #[test]
    fn test_channel_floor() {
        let cfg = CsrNetConfig::new().with_width_divisor(128);
        assert_eq!(cfg.channels(64), 1);
        assert_eq!(cfg.channels(512), 4);
        let model: CsrNet<TestBackend> = cfg.init(&Default::default());
        assert_eq!(model.frontend.len(), 4);
        assert_eq!(model.backend.len(), 6);
    }

    #[test]
    fn test_loss_is_zero_for_matching_target() {
        let device = Default::default();
        let model: CsrNet<TestBackend> = CsrNetConfig::new().with_width_divisor(32).init(&device);
        let image = Tensor::<TestBackend, 4>::ones([1, 3, 16, 16], &device);
        let pred = model.forward_density(image.clone());
        assert_eq!(pred.dims(), [2, 2]);

        let (loss, _) = model.forward_loss(image, pred);
        let loss: f64 = loss.into_scalar().elem::<f64>();
        assert!(loss.abs() < 1e-12);
    }
}
