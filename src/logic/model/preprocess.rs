//! Frame Preprocessing - RGB frame -> NCHW f32 tensor
//!
//! Center crop về hình vuông, resize về input_size, scale [0,1], rồi normalize mean/std.

use image::imageops::{self, FilterType};
use image::RgbImage;
use ndarray::Array4;

use super::manifest::ModelManifest;

/// Largest centered square of the frame
pub fn center_crop(frame: &RgbImage) -> RgbImage {
    let (width, height) = frame.dimensions();
    let side = width.min(height);
    let x = (width - side) / 2;
    let y = (height - side) / 2;
    imageops::crop_imm(frame, x, y, side, side).to_image()
}

/// Crop + resize to `size x size`
pub fn fit_square(frame: &RgbImage, size: u32) -> RgbImage {
    let square = if frame.width() == frame.height() {
        frame.clone()
    } else {
        center_crop(frame)
    };

    if square.width() == size {
        square
    } else {
        imageops::resize(&square, size, size, FilterType::Triangle)
    }
}

/// Build the `(1, 3, H, W)` input tensor
pub fn to_input_tensor(frame: &RgbImage, manifest: &ModelManifest) -> Array4<f32> {
    let size = manifest.input_size;
    let square = fit_square(frame, size);
    let side = size as usize;

    let mut input = Array4::<f32>::zeros((1, 3, side, side));
    for (x, y, pixel) in square.enumerate_pixels() {
        for c in 0..3 {
            // std > 0 is enforced when the manifest is loaded
            let value = pixel[c] as f32 / 255.0;
            input[[0, c, y as usize, x as usize]] = (value - manifest.mean[c]) / manifest.std[c];
        }
    }

    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_center_crop_landscape() {
        let mut frame = RgbImage::new(6, 4);
        // mark the pixel that should land at the crop origin
        frame.put_pixel(1, 0, Rgb([9, 9, 9]));

        let cropped = center_crop(&frame);
        assert_eq!(cropped.dimensions(), (4, 4));
        assert_eq!(cropped.get_pixel(0, 0), &Rgb([9, 9, 9]));
    }

    #[test]
    fn test_center_crop_portrait() {
        let cropped = center_crop(&RgbImage::new(3, 9));
        assert_eq!(cropped.dimensions(), (3, 3));
    }

    #[test]
    fn test_fit_square_resizes() {
        let fitted = fit_square(&RgbImage::new(640, 480), 32);
        assert_eq!(fitted.dimensions(), (32, 32));
    }

    #[test]
    fn test_tensor_layout_and_scaling() {
        let manifest = ModelManifest {
            input_size: 2,
            ..ModelManifest::default()
        };
        let mut frame = RgbImage::new(2, 2);
        frame.put_pixel(1, 0, Rgb([255, 0, 51]));

        let tensor = to_input_tensor(&frame, &manifest);

        assert_eq!(tensor.shape(), &[1, 3, 2, 2]);
        assert_eq!(tensor[[0, 0, 0, 1]], 1.0);
        assert_eq!(tensor[[0, 1, 0, 1]], 0.0);
        assert!((tensor[[0, 2, 0, 1]] - 0.2).abs() < 1e-6);
        assert_eq!(tensor[[0, 0, 1, 1]], 0.0);
    }

    #[test]
    fn test_tensor_mean_std() {
        let manifest = ModelManifest {
            input_size: 1,
            mean: [0.5, 0.5, 0.5],
            std: [0.25, 0.5, 1.0],
            ..ModelManifest::default()
        };
        let frame = RgbImage::from_pixel(1, 1, Rgb([255, 255, 255]));

        let tensor = to_input_tensor(&frame, &manifest);

        assert!((tensor[[0, 0, 0, 0]] - 2.0).abs() < 1e-6);
        assert!((tensor[[0, 1, 0, 0]] - 1.0).abs() < 1e-6);
        assert!((tensor[[0, 2, 0, 0]] - 0.5).abs() < 1e-6);
    }
}
