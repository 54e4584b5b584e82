use ndarray::Array4;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Model file not found: {0}")]
    NotFound(String),
    #[cfg_attr(feature = "torch", allow(dead_code))]
    #[error("Server was built without a model backend (enable the `torch` feature)")]
    BackendUnavailable,
    #[cfg_attr(not(feature = "torch"), allow(dead_code))]
    #[error("Torch error: {0}")]
    Torch(String),
    #[cfg_attr(not(feature = "torch"), allow(dead_code))]
    #[error("Model lock poisoned")]
    Poisoned,
    #[error("Model produced no output")]
    EmptyOutput,
    #[error("Model output {0} is not a probability")]
    InvalidOutput(f32),
}

/// A loaded binary classifier returning the probability for one image batch.
pub trait Classifier: Send + Sync {
    fn predict(&self, input: &Array4<f32>) -> Result<f32, InferenceError>;
}

/// Takes the first element of a flattened model output and checks it is a probability.
pub fn first_probability(output: &[f32]) -> Result<f32, InferenceError> {
    let p = *output.first().ok_or(InferenceError::EmptyOutput)?;
    if !p.is_finite() || !(0.0..=1.0).contains(&p) {
        return Err(InferenceError::InvalidOutput(p));
    }
    Ok(p)
}

pub fn load_model(model_path: &Path) -> Result<Arc<dyn Classifier>, InferenceError> {
    if !model_path.exists() {
        return Err(InferenceError::NotFound(model_path.display().to_string()));
    }

    #[cfg(feature = "torch")]
    {
        let model = torch::TorchClassifier::load(model_path)?;
        Ok(Arc::new(model))
    }

    #[cfg(not(feature = "torch"))]
    {
        Err(InferenceError::BackendUnavailable)
    }
}

#[cfg(feature = "torch")]
pub mod torch {
    use super::{Classifier, InferenceError, first_probability};
    use ndarray::Array4;
    use std::path::Path;
    use std::sync::Mutex;
    use tch::{CModule, Device, Kind, TchError, Tensor};

    impl From<TchError> for InferenceError {
        fn from(err: TchError) -> Self {
            InferenceError::Torch(err.to_string())
        }
    }

    pub struct TorchClassifier {
        module: Mutex<CModule>,
        device: Device,
    }

    impl TorchClassifier {
        pub fn load(model_path: &Path) -> Result<Self, InferenceError> {
            let device = Device::cuda_if_available();
            let mut module = CModule::load_on_device(model_path, device)?;
            module.set_eval();
            log::info!("Loaded TorchScript model {} on {:?}", model_path.display(), device);
            Ok(Self {
                module: Mutex::new(module),
                device,
            })
        }
    }

    /// Copies an NHWC batch into a tensor of the same shape, row-major.
    pub fn to_input_tensor(input: &Array4<f32>) -> Tensor {
        let shape: Vec<i64> = input.shape().iter().map(|&d| d as i64).collect();
        let data: Vec<f32> = input.iter().copied().collect();
        Tensor::from_slice(&data).view(shape.as_slice())
    }

    impl Classifier for TorchClassifier {
        fn predict(&self, input: &Array4<f32>) -> Result<f32, InferenceError> {
            let tensor = to_input_tensor(input).to_device(self.device);

            let output = {
                let module = self.module.lock().map_err(|_| InferenceError::Poisoned)?;
                tch::no_grad(|| module.forward_ts(&[tensor]))?
            };

            let flat = output.to_kind(Kind::Float).to_device(Device::Cpu).view([-1]);
            let values = Vec::<f32>::try_from(&flat)?;
            first_probability(&values)
        }
    }
}
