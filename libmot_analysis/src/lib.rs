//! # mot_analysis
//!
//! mot_analysis is the analysis toolbox for the Yb171 green MOT camera data,
//! written in Rust. It takes the per-shot HDF5 files produced by the experiment
//! control software, extracts and crops the camera frame of each shot, applies
//! the background subtraction recipe of the campaign, and renders frame grids,
//! summary scatter plots, and mp4 videos.
//!
//! ## Installation
//!
//! ### Rust
//!
//! If you have not used Rust before, you will most likely need to install the
//! Rust tool chain. See the [Rust docs](https://www.rust-lang.org/tools/install)
//! for installation instructions.
//!
//! ### HDF5
//!
//! Before building and running mot_analysis, HDF5 must be installed. Typically
//! this will be installed using a package manager (homebrew, apt, etc), and the
//! Rust libraries will auto detect the location of the HDF install. However,
//! this is not always possible. Sometimes a newer version will need to be
//! installed to a custom location. If this is the case, write the following
//! snippet into the file `.cargo/config.toml` in the mot_analysis repository:
//!
//! ```toml
//! [env]
//! HDF5_DIR="/path/to/my/hdf5/install/"
//!
//! [build]
//! rustflags="-C link-args=-Wl,-rpath,/path/to/my/hdf5/install/lib"
//! ```
//!
//! Replace `/path/to/my/hdf5/install/` with the path to your HDF5 installation.
//!
//! ### OpenCV
//!
//! The video pipelines link against OpenCV for mp4 encoding and text overlay.
//! Install it from your package manager before building; only the videoio and
//! imgproc modules are used.
//!
//! ### Building & Install
//!
//! To build and install the CLI use `cargo install --path ./mot_analysis_cli`
//! from the top level mot_analysis repository.
//!
//! ## Configuration
//!
//! Every run is driven by a YAML configuration file. A template can be written
//! with the CLI `new` subcommand. The format is as follows:
//!
//! ```yml
//! data_path: None
//! background_path: null
//! second_background_path: null
//! comparison_path: null
//! output_path: None
//! experiment: ''
//! frame_dataset: images/cam1/after ramp/frame
//! globals_group: globals
//! analysis: survey
//! crop:
//!   top: 550
//!   bottom: 850
//!   left: 910
//!   right: 1310
//! brightness_threshold: 200
//! video_fps: 2.0
//! ```
//!
//! The `analysis` field selects the pipeline: `survey`, `lifetime`,
//! `recapture`, `bright_pixels`, `crop_preview`, or `video`. Set `crop` to
//! `null` to run the survey and video pipelines on the full sensor frame.
//!
//! ## Shot file format
//!
//! Each shot file is expected to follow the layout written by the control
//! software:
//!
//! ```text
//! shot_0001.h5
//! images
//! |---- cam1
//! |    |---- after ramp
//! |    |    |---- frame(dset)
//! globals - B_FINAL, B_INITIAL, T_WAIT, GREEN_LASER_SET_POINT
//! ```
//!
//! Shots missing the frame dataset are skipped with a logged warning; missing
//! globals render as N/A.
//!
//! ## Output
//!
//! Rendered artifacts are written to the configured output directory: a
//! `<experiment>_frames.png` grid, a `<experiment>_summary.png` scatter,
//! per-shot `*_crop.png` previews, or a `<experiment>.mp4` video, depending on
//! the analysis.
pub mod analysis;
pub mod background;
pub mod config;
pub mod constants;
pub mod error;
pub mod folder_label;
pub mod frame;
pub mod plot;
pub mod process;
pub mod shot_file;
pub mod shot_stack;
pub mod video;
