//! Render sinks receiving each annotated frame.

use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut, draw_text_mut};
use thiserror::Error;

use super::FrameReport;
use crate::counting::CountingLine;

const TRACK_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const LINE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const LINE_COUNTED_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const TOTAL_COLOR: Rgb<u8> = Rgb([90, 90, 90]);
const LINE_THICKNESS: i32 = 5;
const BOX_THICKNESS: i32 = 2;
const ID_FONT_SIZE: f32 = 16.0;
const TOTAL_FONT_SIZE: f32 = 48.0;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("invalid font file {0}")]
    Font(PathBuf),
}

/// Presentation step run after a frame's counting is done.
pub trait RenderSink {
    fn render(
        &mut self,
        frame: &RgbImage,
        report: &FrameReport,
        line: &CountingLine,
    ) -> Result<(), RenderError>;
}

/// Discards every frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn render(&mut self, _: &RgbImage, _: &FrameReport, _: &CountingLine) -> Result<(), RenderError> {
        Ok(())
    }
}

/// Draws tracks, the line and the running total, then writes
/// `frame_NNNNNN.png` into an output directory.
///
/// Text is only drawn when a font is loaded.
pub struct AnnotatedFrameWriter {
    dir: PathBuf,
    font: Option<FontVec>,
}

impl AnnotatedFrameWriter {
    pub fn create(dir: impl AsRef<Path>) -> Result<Self, RenderError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, font: None })
    }

    pub fn with_font_file(mut self, path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let font = FontVec::try_from_vec(data).map_err(|_| RenderError::Font(path.to_path_buf()))?;
        self.font = Some(font);
        Ok(self)
    }

    pub fn frame_path(&self, frame_index: u64) -> PathBuf {
        self.dir.join(format!("frame_{frame_index:06}.png"))
    }

    /// Draw the annotations onto a copy of `frame`.
    pub fn annotate(&self, frame: &RgbImage, report: &FrameReport, line: &CountingLine) -> RgbImage {
        let mut image = frame.clone();

        let line_color = if report.crossings.is_empty() {
            LINE_COLOR
        } else {
            LINE_COUNTED_COLOR
        };
        for offset in -(LINE_THICKNESS / 2)..=(LINE_THICKNESS / 2) {
            draw_line_segment_mut(
                &mut image,
                (line.x1 as f32, (line.y1 + offset) as f32),
                (line.x2 as f32, (line.y2 + offset) as f32),
                line_color,
            );
        }

        for track in &report.tracks {
            let [x1, y1, x2, y2] = track.bbox.truncated().to_tlbr().map(|v| v as i32);
            for t in 0..BOX_THICKNESS {
                let (w, h) = (x2 - x1 - 2 * t, y2 - y1 - 2 * t);
                if w <= 0 || h <= 0 {
                    break;
                }
                let rect = imageproc::rect::Rect::at(x1 + t, y1 + t).of_size(w as u32, h as u32);
                draw_hollow_rect_mut(&mut image, rect, TRACK_COLOR);
            }
            if let Some(font) = &self.font {
                let label = format!("ID: {}", track.id);
                draw_text_mut(
                    &mut image,
                    TRACK_COLOR,
                    x1,
                    (y1 - 20).max(0),
                    PxScale::from(ID_FONT_SIZE),
                    font,
                    &label,
                );
            }
        }

        if let Some(font) = &self.font {
            let label = format!("Cars: {}", report.total);
            draw_text_mut(
                &mut image,
                TOTAL_COLOR,
                10,
                60,
                PxScale::from(TOTAL_FONT_SIZE),
                font,
                &label,
            );
        }

        image
    }
}

impl RenderSink for AnnotatedFrameWriter {
    fn render(
        &mut self,
        frame: &RgbImage,
        report: &FrameReport,
        line: &CountingLine,
    ) -> Result<(), RenderError> {
        let image = self.annotate(frame, report, line);
        image.save(self.frame_path(report.frame_index))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{Rect, Track};

    fn report(crossings: Vec<u64>) -> FrameReport {
        FrameReport {
            frame_index: 3,
            detections: 1,
            tracks: vec![Track::new(1, Rect::new(2.0, 2.0, 12.0, 12.0))],
            crossings,
            total: 1,
        }
    }

    #[test]
    fn test_annotate_draws_line_and_boxes() {
        let dir = tempfile::tempdir().unwrap();
        let writer = AnnotatedFrameWriter::create(dir.path()).unwrap();
        let line = CountingLine::new(0, 15, 19, 15);
        let frame = RgbImage::new(20, 20);

        let image = writer.annotate(&frame, &report(vec![]), &line);
        assert_eq!(image.get_pixel(10, 15), &LINE_COLOR);
        assert_eq!(image.get_pixel(2, 5), &TRACK_COLOR);
        assert_eq!(image.get_pixel(7, 7), &Rgb([0, 0, 0]));

        let image = writer.annotate(&frame, &report(vec![1]), &line);
        assert_eq!(image.get_pixel(10, 15), &LINE_COUNTED_COLOR);
    }

    #[test]
    fn test_render_writes_numbered_frame() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = AnnotatedFrameWriter::create(dir.path().join("out")).unwrap();
        let line = CountingLine::new(0, 15, 19, 15);
        writer
            .render(&RgbImage::new(20, 20), &report(vec![]), &line)
            .unwrap();
        assert!(dir.path().join("out").join("frame_000003.png").is_file());
    }

    #[test]
    fn test_bad_font_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let font = dir.path().join("font.ttf");
        std::fs::write(&font, b"nope").unwrap();
        let writer = AnnotatedFrameWriter::create(dir.path()).unwrap();
        assert!(matches!(writer.with_font_file(&font), Err(RenderError::Font(_))));
    }
}
