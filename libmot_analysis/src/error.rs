use std::path::PathBuf;
use thiserror::Error;

use super::constants::REQUIRED_BACKGROUND_FRAMES;

#[derive(Debug, Error)]
pub enum ShotFileError {
    #[error("Could not open shot file because file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Shot file failed due to HDF5 error: {0}")]
    HDF5Error(#[from] hdf5::Error),
    #[error("Shot file {0:?} does not contain the frame dataset '{1}'")]
    MissingFrameDataset(PathBuf, String),
    #[error("Frame dataset in shot file {0:?} is empty")]
    EmptyFrame(PathBuf),
}

#[derive(Debug, Error)]
pub enum ShotStackError {
    #[error("ShotStack failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("ShotStack did not find any shot files in directory {0:?}")]
    NoMatchingFiles(PathBuf),
    #[error("ShotStack failed due to shot file error: {0}")]
    FileError(#[from] ShotFileError),
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Invalid crop region: top {top} bottom {bottom} left {left} right {right}")]
    InvalidCropRegion {
        top: usize,
        bottom: usize,
        left: usize,
        right: usize,
    },
    #[error("Crop region (bottom {0}, right {1}) does not fit frame of shape ({2}, {3})")]
    CropOutOfBounds(usize, usize, usize, usize),
    #[error("Frame arithmetic was given mismatched shapes ({0}, {1}) and ({2}, {3})")]
    ShapeMismatch(usize, usize, usize, usize),
}

#[derive(Debug, Error)]
pub enum BackgroundError {
    #[error("Expected {exp} background frames, found {0}", exp = REQUIRED_BACKGROUND_FRAMES)]
    WrongFrameCount(usize),
    #[error("Background collection failed due to ShotStack error: {0}")]
    StackError(#[from] ShotStackError),
    #[error("Background collection failed due to shot file error: {0}")]
    FileError(#[from] ShotFileError),
    #[error("Background subtraction failed due to frame error: {0}")]
    FrameError(#[from] FrameError),
}

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("Plotting failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Plotting failed while rendering: {0}")]
    RenderError(String),
    #[error("Plotting failed due to frame error: {0}")]
    FrameError(#[from] FrameError),
    #[error("Plot was given no frames to draw")]
    NoData,
}

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("Video rendering failed due to OpenCV error: {0}")]
    OpenCVError(#[from] opencv::Error),
    #[error("Could not open video writer for {0:?}")]
    WriterNotOpened(PathBuf),
    #[error("Video was given no frames to encode")]
    NoFrames,
    #[error("Video rendering failed due to frame error: {0}")]
    FrameError(#[from] FrameError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Config failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Config failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
    #[error("Config crop region is invalid: {0}")]
    BadCropRegion(#[from] FrameError),
    #[error("Config requires the field '{0}' for the {1} analysis")]
    MissingField(String, String),
}

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("Processor failed due to ShotStack error: {0}")]
    StackError(#[from] ShotStackError),
    #[error("Processor failed due to shot file error: {0}")]
    FileError(#[from] ShotFileError),
    #[error("Processor failed due to frame error: {0}")]
    FrameError(#[from] FrameError),
    #[error("Processor failed due to background error: {0}")]
    BackgroundError(#[from] BackgroundError),
    #[error("Processor failed due to plot error: {0}")]
    PlotError(#[from] PlotError),
    #[error("Processor failed due to video error: {0}")]
    VideoError(#[from] VideoError),
    #[error("Processor failed due to Config error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Processor failed due to IO error: {0}")]
    IoError(#[from] std::io::Error),
}
