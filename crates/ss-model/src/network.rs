//! Sample classifier CNN.
//!
//! # Architecture
//!
//! ```text
//! (1, 128, 640)
//!   → Conv2d(1→16, k3, p1) → BatchNorm → ReLU → MaxPool 2×2
//!   → Conv2d(16→32, k3, p1) → BatchNorm → ReLU → MaxPool 2×2
//!   → AdaptiveAvgPool (4×4) → Flatten (512)
//!   → Linear(128) → ReLU → Dropout(0.3, inference no-op) → Linear(4)
//! ```
//!
//! Parameter names follow the PyTorch `state_dict` of the training
//! notebook (`conv_block.*`, `fc.*`), so `.pth` checkpoints load as-is.

use std::collections::HashMap;
use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_nn::{BatchNorm, Conv2d, Conv2dConfig, Linear, Module, ModuleT, VarBuilder};
use ss_audio::MelSpectrogram;
use ss_core::ClassLabel;

use crate::error::ModelError;

const CONV1_OUT: usize = 16;
const CONV2_OUT: usize = 32;
const POOLED: usize = 4;
const FLAT: usize = CONV2_OUT * POOLED * POOLED;
const HIDDEN: usize = 128;
const BN_EPS: f64 = 1e-5;

/// Every parameter tensor of the network with its expected shape.
pub const PARAMETERS: &[(&str, &[usize])] = &[
    ("conv_block.0.weight", &[CONV1_OUT, 1, 3, 3]),
    ("conv_block.0.bias", &[CONV1_OUT]),
    ("conv_block.1.weight", &[CONV1_OUT]),
    ("conv_block.1.bias", &[CONV1_OUT]),
    ("conv_block.1.running_mean", &[CONV1_OUT]),
    ("conv_block.1.running_var", &[CONV1_OUT]),
    ("conv_block.4.weight", &[CONV2_OUT, CONV1_OUT, 3, 3]),
    ("conv_block.4.bias", &[CONV2_OUT]),
    ("conv_block.5.weight", &[CONV2_OUT]),
    ("conv_block.5.bias", &[CONV2_OUT]),
    ("conv_block.5.running_mean", &[CONV2_OUT]),
    ("conv_block.5.running_var", &[CONV2_OUT]),
    ("fc.0.weight", &[HIDDEN, FLAT]),
    ("fc.0.bias", &[HIDDEN]),
    ("fc.3.weight", &[ClassLabel::COUNT, HIDDEN]),
    ("fc.3.bias", &[ClassLabel::COUNT]),
];

/// Four-way sample classifier with immutable, pre-loaded weights.
///
/// Borrowed by every inference call; nothing is mutated during a forward
/// pass.
pub struct SampleClassifier {
    conv1: Conv2d,
    bn1: BatchNorm,
    conv2: Conv2d,
    bn2: BatchNorm,
    fc1: Linear,
    fc2: Linear,
    device: Device,
}

impl SampleClassifier {
    /// Load weights from a `.pth` (PyTorch) or `.safetensors` file.
    ///
    /// # Errors
    /// `ModelError::WeightsNotFound` if `path` is not a file,
    /// `ModelError::WeightLoad` if it cannot be parsed or a tensor is
    /// missing or mis-shaped.
    ///
    /// # Example
    /// ```no_run
    /// use ss_model::{SampleClassifier, select_device};
    /// let model = SampleClassifier::load("audio_classifier_cnn.pth", &select_device(false)).unwrap();
    /// ```
    pub fn load(path: impl AsRef<Path>, device: &Device) -> Result<Self, ModelError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ModelError::WeightsNotFound {
                path: path.to_path_buf(),
            });
        }
        let load_err = |e: candle_core::Error| ModelError::WeightLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        let is_safetensors = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("safetensors"));

        let vb = if is_safetensors {
            let tensors = candle_core::safetensors::load(path, device).map_err(load_err)?;
            VarBuilder::from_tensors(tensors, DType::F32, device)
        } else {
            VarBuilder::from_pth(path, DType::F32, device).map_err(load_err)?
        };

        let model = Self::from_var_builder(&vb, device).map_err(load_err)?;
        log::info!(
            "Loaded classifier weights from {} ({} tensors)",
            path.display(),
            PARAMETERS.len()
        );
        Ok(model)
    }

    /// Build the network from an in-memory parameter map.
    ///
    /// # Errors
    /// Returns `ModelError::WeightLoad` if a tensor is missing or mis-shaped.
    pub fn from_tensors(
        tensors: HashMap<String, Tensor>,
        device: &Device,
    ) -> Result<Self, ModelError> {
        let vb = VarBuilder::from_tensors(tensors, DType::F32, device);
        Self::from_var_builder(&vb, device).map_err(|e| ModelError::WeightLoad {
            path: "<memory>".into(),
            reason: e.to_string(),
        })
    }

    fn from_var_builder(vb: &VarBuilder<'_>, device: &Device) -> candle_core::Result<Self> {
        let conv_cfg = Conv2dConfig {
            padding: 1,
            ..Default::default()
        };
        let convs = vb.pp("conv_block");
        let fc = vb.pp("fc");

        Ok(Self {
            conv1: candle_nn::conv2d(1, CONV1_OUT, 3, conv_cfg, convs.pp("0"))?,
            bn1: candle_nn::batch_norm(CONV1_OUT, BN_EPS, convs.pp("1"))?,
            conv2: candle_nn::conv2d(CONV1_OUT, CONV2_OUT, 3, conv_cfg, convs.pp("4"))?,
            bn2: candle_nn::batch_norm(CONV2_OUT, BN_EPS, convs.pp("5"))?,
            fc1: candle_nn::linear(FLAT, HIDDEN, fc.pp("0"))?,
            fc2: candle_nn::linear(HIDDEN, ClassLabel::COUNT, fc.pp("3"))?,
            device: device.clone(),
        })
    }

    /// Wrap a spectrogram as a `(1, 1, n_mels, n_frames)` input tensor.
    ///
    /// # Errors
    /// Returns `ModelError::Inference` if the tensor cannot be allocated.
    pub fn input_tensor(&self, mel: &MelSpectrogram) -> Result<Tensor, ModelError> {
        Ok(Tensor::from_slice(
            mel.as_slice(),
            (1, 1, mel.n_mels(), mel.n_frames()),
            &self.device,
        )?)
    }

    /// Forward pass, `(batch, 1, H, W)` → `(batch, 4)` logits.
    ///
    /// # Errors
    /// Returns `ModelError::Inference` on shape or device errors.
    pub fn forward(&self, input: &Tensor) -> Result<Tensor, ModelError> {
        let x = self.conv1.forward(input)?;
        let x = self.bn1.forward_t(&x, false)?.relu()?.max_pool2d(2)?;
        let x = self.conv2.forward(&x)?;
        let x = self.bn2.forward_t(&x, false)?.relu()?.max_pool2d(2)?;
        let x = adaptive_avg_pool2d(&x, POOLED, POOLED)?.flatten_from(1)?;
        // Dropout is the identity at inference time
        let x = self.fc1.forward(&x)?.relu()?;
        Ok(self.fc2.forward(&x)?)
    }

    /// Logits for a single spectrogram, in [`ClassLabel::ALL`] order.
    ///
    /// # Errors
    /// Returns `ModelError::Inference` if the forward pass fails.
    pub fn logits(&self, mel: &MelSpectrogram) -> Result<Vec<f32>, ModelError> {
        let input = self.input_tensor(mel)?;
        let logits = self.forward(&input)?;
        Ok(logits.squeeze(0)?.to_dtype(DType::F32)?.to_vec1::<f32>()?)
    }

    /// Arg-max label for a single spectrogram.
    ///
    /// # Errors
    /// Returns `ModelError::Inference` if the forward pass fails or yields
    /// non-finite scores.
    pub fn classify(&self, mel: &MelSpectrogram) -> Result<ClassLabel, ModelError> {
        let logits = self.logits(mel)?;
        let index = argmax(&logits)
            .ok_or_else(|| ModelError::Inference(format!("non-finite logits: {logits:?}")))?;
        ClassLabel::from_index(index).map_err(|e| ModelError::Inference(e.to_string()))
    }
}

/// Index of the largest finite value; the first one wins on ties.
fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .fold(None, |best: Option<(usize, f32)>, (i, &v)| match best {
            Some((_, b)) if v <= b => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

/// Average pooling to a fixed `(out_h, out_w)` grid over the last two dims.
///
/// Bin `i` covers `[floor(i·H/out), ceil((i+1)·H/out))`, so bins may
/// overlap when the input is not a multiple of the output size.
fn adaptive_avg_pool2d(x: &Tensor, out_h: usize, out_w: usize) -> candle_core::Result<Tensor> {
    let (_, _, h, w) = x.dims4()?;
    if h == 0 || w == 0 {
        candle_core::bail!("adaptive_avg_pool2d: empty spatial input {h}x{w}");
    }

    let mut rows = Vec::with_capacity(out_h);
    for i in 0..out_h {
        let h0 = i * h / out_h;
        let h1 = ((i + 1) * h).div_ceil(out_h);
        let band = x.narrow(2, h0, h1 - h0)?;
        let mut cells = Vec::with_capacity(out_w);
        for j in 0..out_w {
            let w0 = j * w / out_w;
            let w1 = ((j + 1) * w).div_ceil(out_w);
            cells.push(band.narrow(3, w0, w1 - w0)?.mean_keepdim(3)?.mean_keepdim(2)?);
        }
        rows.push(Tensor::cat(&cells, 3)?);
    }
    Tensor::cat(&rows, 2)
}
