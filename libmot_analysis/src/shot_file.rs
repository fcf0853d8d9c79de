use hdf5::File;
use ndarray::Array2;
use std::path::{Path, PathBuf};

use super::error::ShotFileError;

/// A simple struct which wraps around the hdf5-rust library.
///
/// Opens one shot file read-only. One shot file holds one camera frame at a
/// configurable dataset path plus the experiment globals as scalar attributes.
/// The handle is dropped (and the file closed) before the scanner moves to the
/// next shot.
#[derive(Debug)]
pub struct ShotFile {
    file_handle: File,
    path: PathBuf,
}

impl ShotFile {
    /// Open a shot file for reading
    pub fn open(path: &Path) -> Result<Self, ShotFileError> {
        if !path.exists() {
            return Err(ShotFileError::BadFilePath(path.to_path_buf()));
        }
        Ok(Self {
            file_handle: File::open(path)?,
            path: path.to_path_buf(),
        })
    }

    /// Read the camera frame at `dataset_path`.
    ///
    /// A shot without the dataset (some shots only recorded the slower camera)
    /// returns MissingFrameDataset so callers can skip it and move on. An
    /// empty dataset is treated the same way.
    pub fn frame(&self, dataset_path: &str) -> Result<Array2<u16>, ShotFileError> {
        let dataset = match self.file_handle.dataset(dataset_path) {
            Ok(dataset) => dataset,
            Err(_) => {
                return Err(ShotFileError::MissingFrameDataset(
                    self.path.clone(),
                    String::from(dataset_path),
                ))
            }
        };
        let frame = dataset.read_2d::<u16>()?;
        if frame.is_empty() {
            return Err(ShotFileError::EmptyFrame(self.path.clone()));
        }
        Ok(frame)
    }

    /// Read a scalar experiment global such as `T_WAIT` or `B_FINAL`.
    ///
    /// Returns None when the group or the attribute is absent; missing globals
    /// render as N/A rather than failing the shot.
    pub fn global(&self, globals_group: &str, name: &str) -> Option<f64> {
        let group = self.file_handle.group(globals_group).ok()?;
        let attr = group.attr(name).ok()?;
        attr.read_scalar::<f64>().ok()
    }

    /// File name of the shot, for titles and log lines
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File stem of the shot, for per-shot output naming
    pub fn file_stem(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_shot_round_trip() {
        let path = std::env::temp_dir().join(format!("mot_analysis_shot_{}.h5", std::process::id()));
        {
            let file = File::create(&path).unwrap();
            let images = file.create_group("images").unwrap();
            let cam = images.create_group("cam1").unwrap();
            let ramp = cam.create_group("after ramp").unwrap();
            let frame = Array2::<u16>::from_shape_fn((4, 6), |(r, c)| (r * 6 + c) as u16);
            ramp.new_dataset_builder()
                .with_data(&frame)
                .create("frame")
                .unwrap();
            let globals = file.create_group("globals").unwrap();
            globals
                .new_attr::<f64>()
                .create("T_WAIT")
                .unwrap()
                .write_scalar(&0.25)
                .unwrap();
        }

        let shot = ShotFile::open(&path).unwrap();
        let frame = shot.frame("images/cam1/after ramp/frame").unwrap();
        assert_eq!(frame.dim(), (4, 6));
        assert_eq!(frame[[1, 2]], 8);
        assert_eq!(shot.global("globals", "T_WAIT"), Some(0.25));
        assert_eq!(shot.global("globals", "B_FINAL"), None);
        assert!(matches!(
            shot.frame("images/cam2/frame"),
            Err(ShotFileError::MissingFrameDataset(..))
        ));
        drop(shot);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_open_missing_file() {
        assert!(matches!(
            ShotFile::open(Path::new("/no/such/shot.h5")),
            Err(ShotFileError::BadFilePath(_))
        ));
    }
}
