use image::RgbImage;
use image::imageops::{self, FilterType};
use std::sync::Arc;
use tch::{CModule, Device, Kind, Tensor};

use crate::error::AnalysisError;

/// A fixed, pretrained image classifier producing unnormalized class scores.
pub trait Classifier: Send + Sync {
    fn logits(&self, image: &RgbImage) -> Result<Vec<f32>, AnalysisError>;
}

/// Resizes to the square input the classifier expects.
/// Rejects degenerate images before any inference is attempted.
pub fn preprocess(image: &RgbImage, size: u32) -> Result<RgbImage, AnalysisError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(AnalysisError::InvalidImage { width, height });
    }
    if (width, height) == (size, size) {
        return Ok(image.clone());
    }
    Ok(imageops::resize(image, size, size, FilterType::Triangle))
}

/// HWC u8 pixels into a 1x3xHxW float tensor scaled to [0, 1].
fn to_tensor(image: &RgbImage) -> Tensor {
    let (width, height) = image.dimensions();
    Tensor::from_slice(image.as_raw())
        .view([height as i64, width as i64, 3])
        .permute([2, 0, 1])
        .to_kind(Kind::Float)
        / 255.0
}

/// TorchScript export of the pretrained network, loaded once at startup.
#[derive(Clone)]
pub struct TorchClassifier {
    // Weights are never mutated after load; forward passes share the module freely.
    model: Arc<CModule>,
    device: Device,
    input_size: u32,
}

impl TorchClassifier {
    pub fn load(model_path: &str, input_size: u32) -> Result<Self, AnalysisError> {
        let device = Device::cuda_if_available();
        let mut model = CModule::load_on_device(model_path, device)?;
        model.set_eval();
        log::info!("Loaded classifier from {} on {:?}", model_path, device);
        Ok(Self {
            model: Arc::new(model),
            device,
            input_size,
        })
    }

    fn forward(&self, input: Tensor) -> Result<Tensor, AnalysisError> {
        let output = tch::no_grad(|| self.model.forward_ts(&[input]))?;
        Ok(output)
    }
}

impl Classifier for TorchClassifier {
    fn logits(&self, image: &RgbImage) -> Result<Vec<f32>, AnalysisError> {
        let resized = preprocess(image, self.input_size)?;
        let input = to_tensor(&resized).unsqueeze(0).to_device(self.device);
        let output = self.forward(input)?;

        let shape = output.size();
        let classes = match shape.as_slice() {
            [1, n] | [n] if *n > 0 => *n as usize,
            _ => {
                return Err(AnalysisError::Inference(format!(
                    "unexpected output shape {:?}",
                    shape
                )));
            }
        };

        let output_flat = output.to_device(Device::Cpu).to_kind(Kind::Float).view([-1]);
        let mut output_vec = vec![0.0f32; classes];
        output_flat.copy_data(&mut output_vec, classes);
        Ok(output_vec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn assert_shareable<T: Send + Sync + Clone + 'static>() {}

    #[test]
    fn torch_classifier_is_shared_without_locking() {
        // Worker threads hold clones of one handle over the same module.
        assert_shareable::<TorchClassifier>();
        assert_shareable::<Arc<CModule>>();
    }

    #[test]
    fn resizes_to_square_input() {
        let image = RgbImage::from_pixel(640, 480, Rgb([10, 20, 30]));
        let resized = preprocess(&image, 299).unwrap();
        assert_eq!(resized.dimensions(), (299, 299));
        assert_eq!(resized.get_pixel(150, 150), &Rgb([10, 20, 30]));
    }

    #[test]
    fn leaves_correctly_sized_input_alone() {
        let image = RgbImage::from_pixel(299, 299, Rgb([1, 2, 3]));
        assert_eq!(preprocess(&image, 299).unwrap(), image);
    }

    #[test]
    fn rejects_empty_image() {
        let image = RgbImage::new(0, 12);
        let err = preprocess(&image, 299).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InvalidImage {
                width: 0,
                height: 12
            }
        ));
    }
}
