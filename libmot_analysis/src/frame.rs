use ndarray::{s, Array2, Zip};
use serde::{Deserialize, Serialize};

use super::error::FrameError;

/// Pixel bounds of the region of interest on the camera sensor.
///
/// Row bounds are top/bottom, column bounds are left/right, all half-open
/// (`top..bottom`, `left..right`). The MOT sits in a small window of the full
/// sensor, so every pipeline crops before doing arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    pub top: usize,
    pub bottom: usize,
    pub left: usize,
    pub right: usize,
}

impl Default for CropRegion {
    /// The window the green MOT search camera was aligned to
    fn default() -> Self {
        Self {
            top: 550,
            bottom: 850,
            left: 910,
            right: 1310,
        }
    }
}

impl CropRegion {
    /// Check that the bounds describe a non-empty region
    pub fn validate(&self) -> Result<(), FrameError> {
        if self.top >= self.bottom || self.left >= self.right {
            return Err(FrameError::InvalidCropRegion {
                top: self.top,
                bottom: self.bottom,
                left: self.left,
                right: self.right,
            });
        }
        Ok(())
    }

    pub fn height(&self) -> usize {
        self.bottom - self.top
    }

    pub fn width(&self) -> usize {
        self.right - self.left
    }

    /// Cut the region out of a full camera frame.
    ///
    /// Fails if the region is empty or extends past the frame edge.
    pub fn crop(&self, frame: &Array2<u16>) -> Result<Array2<u16>, FrameError> {
        self.validate()?;
        let (rows, cols) = frame.dim();
        if self.bottom > rows || self.right > cols {
            return Err(FrameError::CropOutOfBounds(
                self.bottom,
                self.right,
                rows,
                cols,
            ));
        }
        Ok(frame
            .slice(s![self.top..self.bottom, self.left..self.right])
            .to_owned())
    }
}

fn check_shapes(a: &Array2<u16>, b: &Array2<u16>) -> Result<(), FrameError> {
    if a.dim() != b.dim() {
        let (ar, ac) = a.dim();
        let (br, bc) = b.dim();
        return Err(FrameError::ShapeMismatch(ar, ac, br, bc));
    }
    Ok(())
}

/// Pixel-wise saturating subtraction, clamping at zero
pub fn subtract(data: &Array2<u16>, reference: &Array2<u16>) -> Result<Array2<u16>, FrameError> {
    check_shapes(data, reference)?;
    Ok(Zip::from(data)
        .and(reference)
        .map_collect(|d, r| d.saturating_sub(*r)))
}

/// Pixel-wise saturating addition, clamping at the sensor maximum
pub fn add(first: &Array2<u16>, second: &Array2<u16>) -> Result<Array2<u16>, FrameError> {
    check_shapes(first, second)?;
    Ok(Zip::from(first)
        .and(second)
        .map_collect(|a, b| a.saturating_add(*b)))
}

/// Total counts over a frame
pub fn pixel_sum(frame: &Array2<u16>) -> u64 {
    frame.iter().fold(0u64, |sum, px| sum + *px as u64)
}

/// Number of pixels strictly above the brightness threshold
pub fn bright_pixel_count(frame: &Array2<u16>, threshold: u16) -> usize {
    frame.iter().filter(|px| **px > threshold).count()
}

/// Min-max normalize a frame to 8-bit for rendering.
///
/// A constant frame maps to all zeros.
pub fn normalize_to_u8(frame: &Array2<u16>) -> Array2<u8> {
    let min = frame.iter().copied().min().unwrap_or(0);
    let max = frame.iter().copied().max().unwrap_or(0);
    if max == min {
        return Array2::zeros(frame.dim());
    }
    let span = (max - min) as f64;
    frame.mapv(|px| (((px - min) as f64 / span) * 255.0) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_crop_region() {
        let frame = Array2::<u16>::from_shape_fn((10, 12), |(r, c)| (r * 12 + c) as u16);
        let region = CropRegion {
            top: 2,
            bottom: 5,
            left: 3,
            right: 7,
        };
        let cropped = region.crop(&frame).unwrap();
        assert_eq!(cropped.dim(), (3, 4));
        assert_eq!(cropped[[0, 0]], frame[[2, 3]]);
        assert_eq!(cropped[[2, 3]], frame[[4, 6]]);
    }

    #[test]
    fn test_crop_rejects_bad_bounds() {
        let frame = Array2::<u16>::zeros((10, 10));
        let empty = CropRegion {
            top: 5,
            bottom: 5,
            left: 0,
            right: 10,
        };
        assert!(matches!(
            empty.crop(&frame),
            Err(FrameError::InvalidCropRegion { .. })
        ));
        let outside = CropRegion {
            top: 0,
            bottom: 11,
            left: 0,
            right: 10,
        };
        assert!(matches!(
            outside.crop(&frame),
            Err(FrameError::CropOutOfBounds(..))
        ));
    }

    #[test]
    fn test_saturating_arithmetic() {
        let data = array![[10u16, 200], [65535, 0]];
        let reference = array![[20u16, 50], [1, 5]];
        let diff = subtract(&data, &reference).unwrap();
        assert_eq!(diff, array![[0u16, 150], [65534, 0]]);
        let sum = add(&data, &reference).unwrap();
        assert_eq!(sum, array![[30u16, 250], [65535, 5]]);
    }

    #[test]
    fn test_arithmetic_rejects_mismatched_shapes() {
        let a = Array2::<u16>::zeros((2, 2));
        let b = Array2::<u16>::zeros((2, 3));
        assert!(matches!(
            subtract(&a, &b),
            Err(FrameError::ShapeMismatch(2, 2, 2, 3))
        ));
    }

    #[test]
    fn test_summary_scalars() {
        let frame = array![[0u16, 100], [200, 300]];
        assert_eq!(pixel_sum(&frame), 600);
        assert_eq!(bright_pixel_count(&frame, 100), 2);
        assert_eq!(bright_pixel_count(&frame, 300), 0);
    }

    #[test]
    fn test_normalize() {
        let frame = array![[0u16, 500], [1000, 250]];
        let norm = normalize_to_u8(&frame);
        assert_eq!(norm[[0, 0]], 0);
        assert_eq!(norm[[1, 0]], 255);
        assert_eq!(norm[[0, 1]], 127);

        let flat = Array2::<u16>::from_elem((3, 3), 42);
        assert!(normalize_to_u8(&flat).iter().all(|px| *px == 0));
    }
}
