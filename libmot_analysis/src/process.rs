use ndarray::Array2;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use super::analysis::{summarize, AnalysisSeries, ShotSummary, SummaryKind};
use super::background::BackgroundPair;
use super::config::{AnalysisMode, Config};
use super::constants::{
    B_FINAL_ATTR, B_INITIAL_ATTR, GREEN_LASER_SET_POINT_ATTR, GRID_COLUMNS, SURVEY_GRID_COLUMNS,
    T_WAIT_ATTR,
};
use super::error::{ConfigError, ProcessorError, ShotFileError};
use super::folder_label::{FolderLabel, RampLabel};
use super::frame::{normalize_to_u8, CropRegion};
use super::plot::{plot_crop_preview, plot_frame_grid, plot_scatter, GridCell};
use super::shot_file::ShotFile;
use super::shot_stack::{FolderScan, ShotStack};
use super::video::{render_side_by_side, render_video, VideoFrame};

/// What one analysis run did, for the final log lines and for callers that
/// want to chain runs.
#[derive(Debug, Default)]
pub struct AnalysisReport {
    pub shots_processed: usize,
    pub shots_skipped: usize,
    pub outputs: Vec<PathBuf>,
}

fn set_progress(status: &Arc<Mutex<f32>>, fraction: f32) {
    match status.lock() {
        Ok(mut stat) => *stat = fraction,
        Err(e) => log::error!("{e}"),
    }
}

/// Read a shot's frame, downgrading the skippable failures to a warning.
fn read_frame_or_skip(
    shot: &ShotFile,
    dataset: &str,
) -> Result<Option<Array2<u16>>, ProcessorError> {
    match shot.frame(dataset) {
        Ok(frame) => Ok(Some(frame)),
        Err(e @ (ShotFileError::MissingFrameDataset(..) | ShotFileError::EmptyFrame(..))) => {
            log::warn!("{e}");
            log::warn!("Skipping shot...");
            Ok(None)
        }
        Err(e) => Err(ProcessorError::FileError(e)),
    }
}

/// Crop a frame, downgrading a region that does not fit to a warning.
fn crop_or_skip(frame: &Array2<u16>, region: &CropRegion, shot_name: &str) -> Option<Array2<u16>> {
    match region.crop(frame) {
        Ok(cropped) => Some(cropped),
        Err(e) => {
            log::warn!("Invalid cropping region for {shot_name}: {e}");
            log::warn!("Skipping shot...");
            None
        }
    }
}

fn format_field(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => String::from("N/A"),
    }
}

/// Grid of every shot in the data folder, titled with the shot's field values.
fn process_survey(
    config: &Config,
    status: &Arc<Mutex<f32>>,
) -> Result<AnalysisReport, ProcessorError> {
    let mut stack = ShotStack::new(&config.data_path)?;
    log::info!(
        "Total data size: {}",
        human_bytes::human_bytes(stack.get_total_data_size() as f64)
    );

    let total = stack.len();
    let mut report = AnalysisReport::default();
    let mut cells: Vec<GridCell> = Vec::new();
    let mut setpoint: Option<f64> = None;
    let mut seen = 0;
    while let Some(shot) = stack.next_shot()? {
        seen += 1;
        set_progress(status, seen as f32 / total as f32);
        let Some(frame) = read_frame_or_skip(&shot, &config.frame_dataset)? else {
            report.shots_skipped += 1;
            continue;
        };
        let frame = match &config.crop {
            Some(region) => match crop_or_skip(&frame, region, &shot.file_name()) {
                Some(cropped) => cropped,
                None => {
                    report.shots_skipped += 1;
                    continue;
                }
            },
            None => frame,
        };

        let b_final = shot.global(&config.globals_group, B_FINAL_ATTR);
        let b_initial = shot.global(&config.globals_group, B_INITIAL_ATTR);
        if setpoint.is_none() {
            setpoint = shot.global(&config.globals_group, GREEN_LASER_SET_POINT_ATTR);
        }
        let title = format!(
            "{} B_FINAL: {} B_INITIAL: {}",
            shot.file_name(),
            format_field(b_final),
            format_field(b_initial)
        );
        cells.push(GridCell { frame, title });
        report.shots_processed += 1;
    }

    let figure_title = setpoint.map(|v| format!("{GREEN_LASER_SET_POINT_ATTR}: {v}"));
    let grid_path = config.get_grid_plot_path();
    plot_frame_grid(
        &cells,
        SURVEY_GRID_COLUMNS,
        figure_title.as_deref(),
        &grid_path,
    )?;
    report.outputs.push(grid_path);
    Ok(report)
}

/// Subfolder scan with pair background subtraction: labeled grid plus the
/// pixel-sum decay scatter used to estimate the MOT lifetime.
fn process_lifetime(
    config: &Config,
    status: &Arc<Mutex<f32>>,
) -> Result<AnalysisReport, ProcessorError> {
    let scan = FolderScan::new(&config.data_path)?;
    let background_folders: Vec<PathBuf> =
        scan.backgrounds.iter().map(|f| f.path.clone()).collect();
    log::info!(
        "Collecting background frames from {} folder(s)...",
        background_folders.len()
    );
    let pair = BackgroundPair::from_folders(&background_folders, &config.frame_dataset)?;

    let region = config
        .crop
        .ok_or_else(|| ConfigError::MissingField(String::from("crop"), String::from("lifetime")))?;

    let mut report = AnalysisReport::default();
    let mut ordered_cells: Vec<(f64, GridCell)> = Vec::new();
    let mut summaries: Vec<ShotSummary> = Vec::new();
    let total_folders = scan.shots.len();

    for (folder_index, folder) in scan.shots.iter().enumerate() {
        if folder.label == FolderLabel::Mot {
            // The Zeeman shots have no wait time to fit against
            log::info!("Skipping Zeeman folder {:?}", folder.path);
            continue;
        }
        set_progress(status, folder_index as f32 / total_folders as f32);

        let mut stack = ShotStack::new(&folder.path)?;
        while let Some(shot) = stack.next_shot()? {
            let Some(frame) = read_frame_or_skip(&shot, &config.frame_dataset)? else {
                report.shots_skipped += 1;
                continue;
            };
            log::info!("Subtracting backgrounds from {}...", shot.file_name());
            let subtracted = pair.subtract_each(&frame)?;
            let Some(cropped) = crop_or_skip(&subtracted, &region, &shot.file_name()) else {
                report.shots_skipped += 1;
                continue;
            };

            let sort_value = folder.label.sort_value();
            let parameter = sort_value.is_finite().then_some(sort_value);
            summaries.push(ShotSummary {
                title: folder.label.display(),
                parameter,
                value: summarize(&cropped, SummaryKind::PixelSum, config.brightness_threshold),
            });
            ordered_cells.push((
                sort_value,
                GridCell {
                    frame: cropped,
                    title: folder.label.display(),
                },
            ));
            report.shots_processed += 1;
        }
    }

    ordered_cells.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    let cells: Vec<GridCell> = ordered_cells.into_iter().map(|(_, cell)| cell).collect();

    let grid_path = config.get_grid_plot_path();
    plot_frame_grid(&cells, GRID_COLUMNS, None, &grid_path)?;
    report.outputs.push(grid_path);

    let series = AnalysisSeries::new(summaries);
    let scatter_path = config.get_scatter_plot_path();
    plot_scatter(
        &series,
        "Wait time (s)",
        "Sum of pixel values",
        "Pixel sum vs wait time (backgrounds subtracted)",
        &scatter_path,
    )?;
    report.outputs.push(scatter_path);
    Ok(report)
}

/// Release-and-recapture: the data folder is zipped shot-by-shot with two
/// background folders, the combined background is subtracted, and the pixel
/// sum is plotted against the recorded wait time.
fn process_recapture(
    config: &Config,
    status: &Arc<Mutex<f32>>,
) -> Result<AnalysisReport, ProcessorError> {
    let mut data_stack = ShotStack::new(&config.data_path)?;
    let background_path = config.background_path.as_ref().ok_or_else(|| {
        ConfigError::MissingField(String::from("background_path"), String::from("recapture"))
    })?;
    let second_background_path = config.second_background_path.as_ref().ok_or_else(|| {
        ConfigError::MissingField(
            String::from("second_background_path"),
            String::from("recapture"),
        )
    })?;
    let mut first_bg_stack = ShotStack::new(background_path)?;
    let mut second_bg_stack = ShotStack::new(second_background_path)?;

    let region = config.crop.ok_or_else(|| {
        ConfigError::MissingField(String::from("crop"), String::from("recapture"))
    })?;

    let total = data_stack.len();
    let mut report = AnalysisReport::default();
    let mut ordered_cells: Vec<(f64, GridCell)> = Vec::new();
    let mut summaries: Vec<ShotSummary> = Vec::new();
    let mut seen = 0;

    // Shots and their backgrounds were taken in lock step; pair them in
    // natural order and stop at the shortest sequence
    loop {
        let (Some(shot), Some(first_bg), Some(second_bg)) = (
            data_stack.next_shot()?,
            first_bg_stack.next_shot()?,
            second_bg_stack.next_shot()?,
        ) else {
            break;
        };
        seen += 1;
        set_progress(status, seen as f32 / total as f32);

        let Some(frame) = read_frame_or_skip(&shot, &config.frame_dataset)? else {
            report.shots_skipped += 1;
            continue;
        };
        let (Some(first_frame), Some(second_frame)) = (
            read_frame_or_skip(&first_bg, &config.frame_dataset)?,
            read_frame_or_skip(&second_bg, &config.frame_dataset)?,
        ) else {
            report.shots_skipped += 1;
            continue;
        };

        let pair = BackgroundPair::from_frames(vec![first_frame, second_frame])?;
        let subtracted = pair.subtract_combined(&frame)?;
        let Some(cropped) = crop_or_skip(&subtracted, &region, &shot.file_name()) else {
            report.shots_skipped += 1;
            continue;
        };

        let t_wait = shot.global(&config.globals_group, T_WAIT_ATTR);
        let title = match t_wait {
            Some(t) => format!("Wait time {t} s"),
            None => String::from("Wait time N/A"),
        };
        summaries.push(ShotSummary {
            title: title.clone(),
            parameter: t_wait,
            value: summarize(&cropped, SummaryKind::PixelSum, config.brightness_threshold),
        });
        ordered_cells.push((
            t_wait.unwrap_or(f64::INFINITY),
            GridCell {
                frame: cropped,
                title,
            },
        ));
        report.shots_processed += 1;
    }

    ordered_cells.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    let cells: Vec<GridCell> = ordered_cells.into_iter().map(|(_, cell)| cell).collect();

    let grid_path = config.get_grid_plot_path();
    plot_frame_grid(&cells, GRID_COLUMNS, None, &grid_path)?;
    report.outputs.push(grid_path);

    let series = AnalysisSeries::new(summaries);
    let scatter_path = config.get_scatter_plot_path();
    plot_scatter(
        &series,
        "Wait time (s)",
        "Sum of pixel values",
        "Pixel sum vs wait time (combined background subtracted)",
        &scatter_path,
    )?;
    report.outputs.push(scatter_path);
    Ok(report)
}

/// Count pixels above the brightness threshold in every cropped frame.
fn process_bright_pixels(
    config: &Config,
    status: &Arc<Mutex<f32>>,
) -> Result<AnalysisReport, ProcessorError> {
    let mut stack = ShotStack::new(&config.data_path)?;
    let region = config.crop.ok_or_else(|| {
        ConfigError::MissingField(String::from("crop"), String::from("bright_pixels"))
    })?;

    let total = stack.len();
    let mut report = AnalysisReport::default();
    let mut summaries: Vec<ShotSummary> = Vec::new();
    let mut seen = 0;
    while let Some(shot) = stack.next_shot()? {
        seen += 1;
        set_progress(status, seen as f32 / total as f32);
        let Some(frame) = read_frame_or_skip(&shot, &config.frame_dataset)? else {
            report.shots_skipped += 1;
            continue;
        };
        let Some(cropped) = crop_or_skip(&frame, &region, &shot.file_name()) else {
            report.shots_skipped += 1;
            continue;
        };

        let count = summarize(
            &cropped,
            SummaryKind::BrightPixels,
            config.brightness_threshold,
        );
        log::info!(
            "File: {} - Number of bright pixels: {}",
            shot.file_name(),
            count
        );
        summaries.push(ShotSummary {
            title: shot.file_name(),
            parameter: shot.global(&config.globals_group, T_WAIT_ATTR),
            value: count,
        });
        report.shots_processed += 1;
    }

    let series = AnalysisSeries::new(summaries);
    if series.points().is_empty() {
        log::info!("No shots carried {T_WAIT_ATTR}; skipping the scatter plot.");
    } else {
        let scatter_path = config.get_scatter_plot_path();
        plot_scatter(
            &series,
            "Wait time (s)",
            "Bright pixel count",
            "Bright pixels vs wait time",
            &scatter_path,
        )?;
        report.outputs.push(scatter_path);
    }
    Ok(report)
}

/// Render a crop preview for every shot, for dialing in the crop bounds.
fn process_crop_preview(
    config: &Config,
    status: &Arc<Mutex<f32>>,
) -> Result<AnalysisReport, ProcessorError> {
    let mut stack = ShotStack::new(&config.data_path)?;
    let region = config.crop.ok_or_else(|| {
        ConfigError::MissingField(String::from("crop"), String::from("crop_preview"))
    })?;

    let total = stack.len();
    let mut report = AnalysisReport::default();
    let mut seen = 0;
    while let Some(shot) = stack.next_shot()? {
        seen += 1;
        set_progress(status, seen as f32 / total as f32);
        let Some(frame) = read_frame_or_skip(&shot, &config.frame_dataset)? else {
            report.shots_skipped += 1;
            continue;
        };
        let preview_path = config.get_crop_preview_path(&shot.file_stem());
        match plot_crop_preview(&frame, &region, &shot.file_name(), &preview_path) {
            Ok(()) => {
                report.outputs.push(preview_path);
                report.shots_processed += 1;
            }
            Err(e) => {
                log::warn!("Could not render preview for {}: {e}", shot.file_name());
                report.shots_skipped += 1;
            }
        }
    }
    Ok(report)
}

/// Collect the video frames of one folder: cropped, normalized, titled.
fn collect_video_frames(
    config: &Config,
    folder: &std::path::Path,
    report: &mut AnalysisReport,
    status: &Arc<Mutex<f32>>,
) -> Result<Vec<VideoFrame>, ProcessorError> {
    let mut stack = ShotStack::new(folder)?;
    let label = match folder.file_name() {
        Some(name) => RampLabel::parse(&name.to_string_lossy()),
        None => RampLabel::Unknown,
    };

    let total = stack.len();
    let mut frames: Vec<VideoFrame> = Vec::new();
    let mut seen = 0;
    while let Some(shot) = stack.next_shot()? {
        seen += 1;
        set_progress(status, seen as f32 / total as f32);
        let Some(frame) = read_frame_or_skip(&shot, &config.frame_dataset)? else {
            report.shots_skipped += 1;
            continue;
        };
        let frame = match &config.crop {
            Some(region) => match crop_or_skip(&frame, region, &shot.file_name()) {
                Some(cropped) => cropped,
                None => {
                    report.shots_skipped += 1;
                    continue;
                }
            },
            None => frame,
        };

        let title = match shot.global(&config.globals_group, T_WAIT_ATTR) {
            Some(t_wait) => format!("{} Wait Time: {:.2} ms", label.display(), t_wait * 1e3),
            None => format!("{}: N/A", T_WAIT_ATTR),
        };
        log::info!("Processed {} with {}", shot.file_name(), title);
        frames.push(VideoFrame {
            pixels: normalize_to_u8(&frame),
            title,
        });
        report.shots_processed += 1;
    }
    Ok(frames)
}

/// Render the shots of the data folder into an mp4, optionally side by side
/// with a comparison folder.
fn process_video(
    config: &Config,
    status: &Arc<Mutex<f32>>,
) -> Result<AnalysisReport, ProcessorError> {
    let mut report = AnalysisReport::default();
    let frames = collect_video_frames(config, &config.data_path, &mut report, status)?;

    let video_path = config.get_video_path();
    match &config.comparison_path {
        Some(comparison) => {
            let comparison_frames =
                collect_video_frames(config, comparison, &mut report, status)?;
            render_side_by_side(&frames, &comparison_frames, config.video_fps, &video_path)?;
        }
        None => {
            render_video(&frames, config.video_fps, &video_path)?;
        }
    }
    report.outputs.push(video_path);
    Ok(report)
}

/// The main loop of mot_analysis.
///
/// This takes in a config (and progress monitor) and runs the selected
/// analysis over the shot data. Shots are processed strictly one at a time;
/// each file handle closes before the next shot opens.
pub fn process(config: Config, status: Arc<Mutex<f32>>) -> Result<AnalysisReport, ProcessorError> {
    config.validate()?;
    if !config.does_data_dir_exist() {
        return Err(ConfigError::BadFilePath(config.data_path.clone()).into());
    }
    std::fs::create_dir_all(&config.output_path)?;

    log::info!(
        "Running the {} analysis on {:?}...",
        config.analysis.name(),
        config.data_path
    );

    let report = match config.analysis {
        AnalysisMode::Survey => process_survey(&config, &status),
        AnalysisMode::Lifetime => process_lifetime(&config, &status),
        AnalysisMode::Recapture => process_recapture(&config, &status),
        AnalysisMode::BrightPixels => process_bright_pixels(&config, &status),
        AnalysisMode::CropPreview => process_crop_preview(&config, &status),
        AnalysisMode::Video => process_video(&config, &status),
    }?;
    set_progress(&status, 1.0);

    log::info!(
        "Processed {} shot(s), skipped {} shot(s).",
        report.shots_processed,
        report.shots_skipped
    );
    for output in report.outputs.iter() {
        log::info!("Wrote {:?}", output);
    }
    Ok(report)
}
