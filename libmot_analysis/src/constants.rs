//! Names and defaults shared across the analysis pipelines. The dataset and
//! attribute names match what the labscript control software writes into each
//! shot file.

/// Location of the camera frame inside a shot file
pub const DEFAULT_FRAME_DATASET: &str = "images/cam1/after ramp/frame";
/// Group holding the experiment globals (scalar attributes)
pub const DEFAULT_GLOBALS_GROUP: &str = "globals";

/// Final magnetic field value for the shot
pub const B_FINAL_ATTR: &str = "B_FINAL";
/// Initial magnetic field value for the shot
pub const B_INITIAL_ATTR: &str = "B_INITIAL";
/// Release/recapture wait time in seconds
pub const T_WAIT_ATTR: &str = "T_WAIT";
/// Green laser VCA setpoint
pub const GREEN_LASER_SET_POINT_ATTR: &str = "GREEN_LASER_SET_POINT";

/// Shot files are the only files the scanners pick up
pub const SHOT_FILE_EXTENSION: &str = "h5";

/// The pair-subtraction recipe needs exactly this many background frames
pub const REQUIRED_BACKGROUND_FRAMES: usize = 2;

/// Columns in a rendered frame grid
pub const GRID_COLUMNS: usize = 4;
/// The survey grids use wider frames, so fewer columns
pub const SURVEY_GRID_COLUMNS: usize = 3;

/// Default frames per second for rendered videos
pub const DEFAULT_VIDEO_FPS: f64 = 2.0;
