use ndarray::Array2;
use plotters::prelude::*;
use std::path::Path;

use super::analysis::AnalysisSeries;
use super::error::PlotError;
use super::frame::{normalize_to_u8, CropRegion};

/// One frame of a rendered grid, with its title text
#[derive(Debug, Clone)]
pub struct GridCell {
    pub frame: Array2<u16>,
    pub title: String,
}

const CELL_MARGIN: u32 = 10;
const TITLE_STRIP: u32 = 26;
const TITLE_FONT: u32 = 15;

fn render_err<E: std::fmt::Display>(error: E) -> PlotError {
    PlotError::RenderError(error.to_string())
}

/// Paint a grayscale frame onto the canvas with its top-left corner at (x0, y0)
fn draw_frame<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    frame: &Array2<u16>,
    x0: i32,
    y0: i32,
) -> Result<(), PlotError> {
    let pixels = normalize_to_u8(frame);
    for ((row, col), value) in pixels.indexed_iter() {
        let shade = RGBColor(*value, *value, *value);
        root.draw_pixel((x0 + col as i32, y0 + row as i32), &shade)
            .map_err(render_err)?;
    }
    Ok(())
}

/// Render labeled frames into a fixed-column grid, optionally with a figure
/// title above the grid (used for the laser setpoint header).
pub fn plot_frame_grid(
    cells: &[GridCell],
    columns: usize,
    figure_title: Option<&str>,
    path: &Path,
) -> Result<(), PlotError> {
    if cells.is_empty() {
        return Err(PlotError::NoData);
    }

    let cell_width = cells
        .iter()
        .map(|cell| cell.frame.dim().1)
        .max()
        .unwrap_or(0) as u32;
    let cell_height = cells
        .iter()
        .map(|cell| cell.frame.dim().0)
        .max()
        .unwrap_or(0) as u32;
    let rows = cells.len().div_ceil(columns) as u32;
    let columns = columns as u32;

    let canvas_width = columns * (cell_width + CELL_MARGIN) + CELL_MARGIN;
    let canvas_height = rows * (cell_height + TITLE_STRIP + CELL_MARGIN) + CELL_MARGIN;

    let root = BitMapBackend::new(path, (canvas_width, canvas_height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let root = match figure_title {
        Some(title) => root
            .titled(title, ("sans-serif", 24))
            .map_err(render_err)?,
        None => root,
    };

    for (index, cell) in cells.iter().enumerate() {
        let grid_col = index as u32 % columns;
        let grid_row = index as u32 / columns;
        let x0 = (CELL_MARGIN + grid_col * (cell_width + CELL_MARGIN)) as i32;
        let y0 = (CELL_MARGIN + grid_row * (cell_height + TITLE_STRIP + CELL_MARGIN)) as i32;
        draw_frame(&root, &cell.frame, x0, y0)?;
        root.draw(&Text::new(
            cell.title.clone(),
            (x0, y0 + cell_height as i32 + 4),
            ("sans-serif", TITLE_FONT).into_font().color(&BLACK),
        ))
        .map_err(render_err)?;
    }

    root.present().map_err(render_err)?;
    Ok(())
}

/// Scatter the summary series against its parameter.
pub fn plot_scatter(
    series: &AnalysisSeries,
    x_label: &str,
    y_label: &str,
    caption: &str,
    path: &Path,
) -> Result<(), PlotError> {
    let points = series.points();
    if points.is_empty() {
        return Err(PlotError::NoData);
    }

    let x_min = points.iter().map(|(x, _)| *x).fold(f64::INFINITY, f64::min);
    let x_max = points
        .iter()
        .map(|(x, _)| *x)
        .fold(f64::NEG_INFINITY, f64::max);
    let y_min = points.iter().map(|(_, y)| *y).fold(f64::INFINITY, f64::min);
    let y_max = points
        .iter()
        .map(|(_, y)| *y)
        .fold(f64::NEG_INFINITY, f64::max);
    let x_pad = ((x_max - x_min) * 0.05).max(0.1);
    let y_pad = ((y_max - y_min) * 0.05).max(1.0);

    let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((x_min - x_pad)..(x_max + x_pad), (y_min - y_pad)..(y_max + y_pad))
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc(x_label)
        .y_desc(y_label)
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(
            points
                .iter()
                .map(|(x, y)| Circle::new((*x, *y), 4, BLUE.filled())),
        )
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

/// Render the full frame with the crop region outlined next to the cropped
/// frame, for dialing in crop bounds before a batch run.
pub fn plot_crop_preview(
    frame: &Array2<u16>,
    region: &CropRegion,
    title: &str,
    path: &Path,
) -> Result<(), PlotError> {
    let cropped = region.crop(frame)?;
    let (frame_rows, frame_cols) = frame.dim();
    let (crop_rows, crop_cols) = cropped.dim();

    let canvas_width = (frame_cols + crop_cols) as u32 + 3 * CELL_MARGIN;
    let canvas_height = frame_rows.max(crop_rows) as u32 + 2 * CELL_MARGIN + TITLE_STRIP;

    let root = BitMapBackend::new(path, (canvas_width, canvas_height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let root = root.titled(title, ("sans-serif", 20)).map_err(render_err)?;

    let full_x0 = CELL_MARGIN as i32;
    let y0 = CELL_MARGIN as i32;
    draw_frame(&root, frame, full_x0, y0)?;
    root.draw(&Rectangle::new(
        [
            (full_x0 + region.left as i32, y0 + region.top as i32),
            (full_x0 + region.right as i32, y0 + region.bottom as i32),
        ],
        RED.stroke_width(2),
    ))
    .map_err(render_err)?;

    let crop_x0 = (2 * CELL_MARGIN + frame_cols as u32) as i32;
    draw_frame(&root, &cropped, crop_x0, y0)?;

    root.present().map_err(render_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ShotSummary;
    use ndarray::Array2;

    fn temp_png(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("mot_analysis_{}_{}.png", std::process::id(), name))
    }

    #[test]
    fn test_grid_render_writes_file() {
        let cells = vec![
            GridCell {
                frame: Array2::<u16>::from_shape_fn((20, 30), |(r, c)| (r * c) as u16),
                title: String::from("t=1s"),
            },
            GridCell {
                frame: Array2::<u16>::zeros((20, 30)),
                title: String::from("t=2s"),
            },
        ];
        let path = temp_png("grid");
        plot_frame_grid(&cells, 4, Some("GREEN_LASER_SET_POINT: 0.35"), &path).unwrap();
        assert!(path.exists());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_grid_rejects_empty_input() {
        let path = temp_png("empty_grid");
        assert!(matches!(
            plot_frame_grid(&[], 4, None, &path),
            Err(PlotError::NoData)
        ));
    }

    #[test]
    fn test_scatter_render_writes_file() {
        let series = AnalysisSeries::new(vec![
            ShotSummary {
                title: String::from("t=1s"),
                parameter: Some(1.0),
                value: 100.0,
            },
            ShotSummary {
                title: String::from("t=2s"),
                parameter: Some(2.0),
                value: 60.0,
            },
        ]);
        let path = temp_png("scatter");
        plot_scatter(&series, "Wait time (s)", "Pixel sum", "Lifetime", &path).unwrap();
        assert!(path.exists());
        std::fs::remove_file(&path).unwrap();
    }
}
