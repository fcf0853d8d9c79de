//! Background frames are shots taken with the MOT beams blocked, used to
//! remove stray light from the data frames. Two recipes are in use, matching
//! how the two data-taking campaigns recorded their backgrounds.

use ndarray::Array2;
use std::path::Path;

use super::constants::REQUIRED_BACKGROUND_FRAMES;
use super::error::BackgroundError;
use super::frame;
use super::shot_stack::ShotStack;

/// Exactly two background frames.
///
/// The lifetime campaign recorded one background with the main beams blocked
/// and one with the diagonal beams blocked; every analysis that subtracts
/// backgrounds expects the pair.
#[derive(Debug, Clone)]
pub struct BackgroundPair {
    first: Array2<u16>,
    second: Array2<u16>,
}

impl BackgroundPair {
    /// Build the pair from collected frames. Any count other than two is fatal
    /// to the analysis.
    pub fn from_frames(mut frames: Vec<Array2<u16>>) -> Result<Self, BackgroundError> {
        if frames.len() != REQUIRED_BACKGROUND_FRAMES {
            return Err(BackgroundError::WrongFrameCount(frames.len()));
        }
        let second = frames.pop().unwrap();
        let first = frames.pop().unwrap();
        Ok(Self { first, second })
    }

    /// Collect the pair from background-labeled folders.
    ///
    /// Every shot file in every folder contributes one frame; the total must
    /// come out to exactly two.
    pub fn from_folders(
        folders: &[impl AsRef<Path>],
        dataset_path: &str,
    ) -> Result<Self, BackgroundError> {
        let mut frames: Vec<Array2<u16>> = Vec::new();
        for folder in folders {
            let mut stack = ShotStack::new(folder.as_ref())?;
            while let Some(shot) = stack.next_shot()? {
                log::info!("Background frame from {}", shot.file_name());
                frames.push(shot.frame(dataset_path)?);
            }
        }
        Self::from_frames(frames)
    }

    /// Subtract each background separately and add the two differences
    /// (first lifetime campaign recipe).
    pub fn subtract_each(&self, data: &Array2<u16>) -> Result<Array2<u16>, BackgroundError> {
        let first_subtracted = frame::subtract(data, &self.first)?;
        let second_subtracted = frame::subtract(data, &self.second)?;
        Ok(frame::add(&first_subtracted, &second_subtracted)?)
    }

    /// Add the two backgrounds and subtract the sum from the data frame
    /// (release-and-recapture recipe).
    pub fn subtract_combined(&self, data: &Array2<u16>) -> Result<Array2<u16>, BackgroundError> {
        let combined = frame::add(&self.first, &self.second)?;
        Ok(frame::subtract(data, &combined)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_pair_requires_exactly_two() {
        let one = vec![Array2::<u16>::zeros((2, 2))];
        assert!(matches!(
            BackgroundPair::from_frames(one),
            Err(BackgroundError::WrongFrameCount(1))
        ));
        let three = vec![Array2::<u16>::zeros((2, 2)); 3];
        assert!(matches!(
            BackgroundPair::from_frames(three),
            Err(BackgroundError::WrongFrameCount(3))
        ));
    }

    #[test]
    fn test_subtract_each() {
        let data = array![[100u16, 50], [10, 0]];
        let first = array![[30u16, 10], [5, 0]];
        let second = array![[20u16, 60], [5, 0]];
        let pair = BackgroundPair::from_frames(vec![first, second]).unwrap();
        // (data - first) + (data - second), saturating at each step
        let result = pair.subtract_each(&data).unwrap();
        assert_eq!(result, array![[150u16, 40], [10, 0]]);
    }

    #[test]
    fn test_subtract_combined() {
        let data = array![[100u16, 50], [10, 0]];
        let first = array![[30u16, 10], [5, 0]];
        let second = array![[20u16, 60], [5, 0]];
        let pair = BackgroundPair::from_frames(vec![first, second]).unwrap();
        let result = pair.subtract_combined(&data).unwrap();
        assert_eq!(result, array![[50u16, 0], [0, 0]]);
    }
}
