//! Renders shot sequences into mp4 files through OpenCV, the same library the
//! camera tooling uses elsewhere in the lab. Frames are 8-bit grayscale going
//! in; each one is converted to BGR and stamped with its title on a filled
//! text box before encoding.

use ndarray::Array2;
use opencv::{core, imgproc, prelude::*, videoio};
use std::path::Path;

use super::error::{FrameError, VideoError};

/// One video frame: normalized pixels plus the overlay text
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub pixels: Array2<u8>,
    pub title: String,
}

const FONT_SCALE: f64 = 1.0;
const FONT_THICKNESS: i32 = 2;
const TEXT_X: i32 = 20;
const TEXT_Y: i32 = 50;

fn mat_from_gray(pixels: &Array2<u8>) -> Result<Mat, VideoError> {
    let bytes: Vec<u8> = pixels.iter().copied().collect();
    let (rows, cols) = pixels.dim();
    Ok(Mat::new_rows_cols_with_data(rows as i32, cols as i32, bytes.as_slice())?.try_clone()?)
}

/// Convert a grayscale frame to BGR and draw the title on a black box in the
/// top-left corner.
fn annotate_frame(frame: &VideoFrame) -> Result<Mat, VideoError> {
    let gray = mat_from_gray(&frame.pixels)?;
    let mut bgr = Mat::default();
    imgproc::cvt_color_def(&gray, &mut bgr, imgproc::COLOR_GRAY2BGR)?;

    let mut baseline = 0;
    let text_size = imgproc::get_text_size(
        &frame.title,
        imgproc::FONT_HERSHEY_SIMPLEX,
        FONT_SCALE,
        FONT_THICKNESS,
        &mut baseline,
    )?;
    let backdrop = core::Rect::new(TEXT_X - 10, TEXT_Y - 30, text_size.width + 20, 40);
    imgproc::rectangle(
        &mut bgr,
        backdrop,
        core::Scalar::all(0.0),
        -1,
        imgproc::LINE_8,
        0,
    )?;
    imgproc::put_text(
        &mut bgr,
        &frame.title,
        core::Point::new(TEXT_X, TEXT_Y),
        imgproc::FONT_HERSHEY_SIMPLEX,
        FONT_SCALE,
        core::Scalar::all(255.0),
        FONT_THICKNESS,
        imgproc::LINE_8,
        false,
    )?;
    Ok(bgr)
}

fn check_uniform_dims(frames: &[VideoFrame]) -> Result<(usize, usize), VideoError> {
    let first = match frames.first() {
        Some(frame) => frame.pixels.dim(),
        None => return Err(VideoError::NoFrames),
    };
    for frame in frames {
        if frame.pixels.dim() != first {
            let (rows, cols) = frame.pixels.dim();
            return Err(VideoError::FrameError(FrameError::ShapeMismatch(
                first.0, first.1, rows, cols,
            )));
        }
    }
    Ok(first)
}

fn open_writer(path: &Path, fps: f64, width: i32, height: i32) -> Result<videoio::VideoWriter, VideoError> {
    let fourcc = videoio::VideoWriter::fourcc('m', 'p', '4', 'v')?;
    let writer = videoio::VideoWriter::new(
        &path.to_string_lossy(),
        fourcc,
        fps,
        core::Size::new(width, height),
        true,
    )?;
    if !writer.is_opened()? {
        return Err(VideoError::WriterNotOpened(path.to_path_buf()));
    }
    Ok(writer)
}

/// Encode a shot sequence into an mp4 at `path`.
pub fn render_video(frames: &[VideoFrame], fps: f64, path: &Path) -> Result<(), VideoError> {
    let (rows, cols) = check_uniform_dims(frames)?;
    let mut writer = open_writer(path, fps, cols as i32, rows as i32)?;
    for frame in frames {
        let annotated = annotate_frame(frame)?;
        writer.write(&annotated)?;
    }
    writer.release()?;
    Ok(())
}

/// Encode two shot sequences side by side for comparing experiment variants.
///
/// Sequences are paired in order; the longer one is truncated to the shorter,
/// and the two crops must share a height.
pub fn render_side_by_side(
    left: &[VideoFrame],
    right: &[VideoFrame],
    fps: f64,
    path: &Path,
) -> Result<(), VideoError> {
    let (left_rows, left_cols) = check_uniform_dims(left)?;
    let (right_rows, right_cols) = check_uniform_dims(right)?;
    if left_rows != right_rows {
        return Err(VideoError::FrameError(FrameError::ShapeMismatch(
            left_rows, left_cols, right_rows, right_cols,
        )));
    }

    let mut writer = open_writer(path, fps, (left_cols + right_cols) as i32, left_rows as i32)?;
    for (left_frame, right_frame) in left.iter().zip(right.iter()) {
        let left_mat = annotate_frame(left_frame)?;
        let right_mat = annotate_frame(right_frame)?;
        let mut combined = Mat::default();
        core::hconcat2(&left_mat, &right_mat, &mut combined)?;
        writer.write(&combined)?;
    }
    writer.release()?;
    Ok(())
}
