use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::constants::{DEFAULT_FRAME_DATASET, DEFAULT_GLOBALS_GROUP, DEFAULT_VIDEO_FPS};
use super::error::ConfigError;
use super::frame::CropRegion;

/// Which pipeline `process` runs. Each variant corresponds to one of the
/// analyses the lab runs on a day of shot data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// Grid of every frame in a flat folder, titled with the field values
    Survey,
    /// Subfolder scan with pair background subtraction and a decay scatter
    Lifetime,
    /// Release-and-recapture folders with combined background subtraction
    Recapture,
    /// Bright-pixel counts above the configured threshold
    BrightPixels,
    /// Per-shot renders of the crop region over the full frame
    CropPreview,
    /// Render the shots of a folder into an mp4
    Video,
}

impl AnalysisMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Survey => "survey",
            Self::Lifetime => "lifetime",
            Self::Recapture => "recapture",
            Self::BrightPixels => "bright_pixels",
            Self::CropPreview => "crop_preview",
            Self::Video => "video",
        }
    }
}

/// Structure representing the application configuration. Contains pathing, the
/// in-file dataset locations, and the analysis parameters.
/// Configs are serializable and deserializable to YAML using serde and serde_yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Folder of shot files, or parent of shot subfolders for the nested layouts
    pub data_path: PathBuf,
    /// First background folder (recapture analysis)
    pub background_path: Option<PathBuf>,
    /// Second background folder (recapture analysis)
    pub second_background_path: Option<PathBuf>,
    /// Second data folder for the side-by-side video
    pub comparison_path: Option<PathBuf>,
    /// Directory that rendered plots and videos are written to
    pub output_path: PathBuf,
    /// Name used in output file stems and video titles
    pub experiment: String,
    /// Location of the camera frame inside each shot file
    pub frame_dataset: String,
    /// Group holding the experiment globals
    pub globals_group: String,
    /// Which analysis to run
    pub analysis: AnalysisMode,
    /// Region of interest; None plots full frames where that is allowed
    pub crop: Option<CropRegion>,
    /// Brightness threshold for the bright-pixel count
    pub brightness_threshold: u16,
    /// Playback rate of rendered videos
    pub video_fps: f64,
}

impl Default for Config {
    /// Generate a new Config object. Pathing fields will be empty/invalid
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("None"),
            background_path: None,
            second_background_path: None,
            comparison_path: None,
            output_path: PathBuf::from("None"),
            experiment: String::from(""),
            frame_dataset: String::from(DEFAULT_FRAME_DATASET),
            globals_group: String::from(DEFAULT_GLOBALS_GROUP),
            analysis: AnalysisMode::Survey,
            crop: Some(CropRegion::default()),
            brightness_threshold: 200,
            video_fps: DEFAULT_VIDEO_FPS,
        }
    }
}

impl Config {
    /// Read the configuration in a YAML file
    /// Returns a Config if successful
    pub fn read_config_file(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::BadFilePath(config_path.to_path_buf()));
        }

        let yaml_str = std::fs::read_to_string(config_path)?;

        Ok(serde_yaml::from_str::<Self>(&yaml_str)?)
    }

    /// Check the fields the selected analysis relies on.
    ///
    /// Catches bad crop bounds and missing background folders before any shot
    /// file is opened.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(crop) = &self.crop {
            crop.validate()?;
        }
        match self.analysis {
            AnalysisMode::Recapture => {
                if self.background_path.is_none() {
                    return Err(ConfigError::MissingField(
                        String::from("background_path"),
                        String::from(self.analysis.name()),
                    ));
                }
                if self.second_background_path.is_none() {
                    return Err(ConfigError::MissingField(
                        String::from("second_background_path"),
                        String::from(self.analysis.name()),
                    ));
                }
            }
            AnalysisMode::Lifetime | AnalysisMode::BrightPixels | AnalysisMode::CropPreview => {
                if self.crop.is_none() {
                    return Err(ConfigError::MissingField(
                        String::from("crop"),
                        String::from(self.analysis.name()),
                    ));
                }
            }
            _ => (),
        }
        Ok(())
    }

    pub fn does_data_dir_exist(&self) -> bool {
        self.data_path.exists()
    }

    pub fn has_comparison_path(&self) -> bool {
        self.comparison_path.is_some()
    }

    /// File stem used for every rendered artifact
    fn output_stem(&self) -> String {
        if self.experiment.is_empty() {
            String::from("analysis")
        } else {
            self.experiment.clone()
        }
    }

    /// Path of the rendered frame grid
    pub fn get_grid_plot_path(&self) -> PathBuf {
        self.output_path
            .join(format!("{}_frames.png", self.output_stem()))
    }

    /// Path of the rendered summary scatter
    pub fn get_scatter_plot_path(&self) -> PathBuf {
        self.output_path
            .join(format!("{}_summary.png", self.output_stem()))
    }

    /// Path of a per-shot crop preview render
    pub fn get_crop_preview_path(&self, shot_stem: &str) -> PathBuf {
        self.output_path
            .join(format!("{}_{}_crop.png", self.output_stem(), shot_stem))
    }

    /// Path of the rendered video
    pub fn get_video_path(&self) -> PathBuf {
        self.output_path.join(format!("{}.mp4", self.output_stem()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_yaml_round_trip() {
        let config = Config {
            data_path: PathBuf::from("data/20250114_release_and_recapture"),
            analysis: AnalysisMode::Recapture,
            background_path: Some(PathBuf::from("data/backgrounds1")),
            second_background_path: Some(PathBuf::from("data/backgrounds2")),
            ..Default::default()
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        let back: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.data_path, config.data_path);
        assert_eq!(back.analysis, AnalysisMode::Recapture);
        assert_eq!(back.crop, config.crop);
    }

    #[test]
    fn test_validate_requires_backgrounds_for_recapture() {
        let config = Config {
            analysis: AnalysisMode::Recapture,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingField(..))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_crop() {
        let config = Config {
            crop: Some(CropRegion {
                top: 100,
                bottom: 50,
                left: 0,
                right: 10,
            }),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BadCropRegion(..))
        ));
    }

    #[test]
    fn test_output_paths() {
        let config = Config {
            output_path: PathBuf::from("out"),
            experiment: String::from("WithRamp_9V_6V"),
            ..Default::default()
        };
        assert_eq!(
            config.get_video_path(),
            PathBuf::from("out/WithRamp_9V_6V.mp4")
        );
        assert_eq!(
            config.get_grid_plot_path(),
            PathBuf::from("out/WithRamp_9V_6V_frames.png")
        );
    }
}
