// THEORY:
// Video I/O is the only part of the run that can fail fatally, and only while it is
// being set up: a source that cannot be read or a sink that cannot be written ends
// the process. Once frames are flowing, a failed read or write simply ends the loop.
//
// Source and sink are wrapped so that each is released exactly once, on every exit
// path, by `Drop`.

use image::RgbImage;
use opencv::{
    core::{self, Mat},
    imgproc,
    prelude::*,
    videoio::{self, VideoCapture, VideoWriter},
};
use shade_tracker::FourCc;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VideoIoError {
    #[error("Cannot read the source video: {}", path.display())]
    SourceUnreadable { path: PathBuf },
    #[error("Cannot write into output video: {}", path.display())]
    SinkUnwritable { path: PathBuf },
}

/// Stream properties queried once when the source is opened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoProperties {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// As reported by the container; may be zero or negative for live streams.
    pub frame_count: i64,
}

pub struct VideoSource {
    capture: VideoCapture,
    properties: VideoProperties,
}

impl VideoSource {
    pub fn open(path: &Path) -> Result<Self, VideoIoError> {
        let unreadable = || VideoIoError::SourceUnreadable {
            path: path.to_path_buf(),
        };
        let name = path.to_str().ok_or_else(unreadable)?;
        let capture = VideoCapture::from_file(name, videoio::CAP_ANY).map_err(|_| unreadable())?;
        if !capture.is_opened().unwrap_or(false) {
            return Err(unreadable());
        }

        let property = |id: i32| capture.get(id).unwrap_or(0.0);
        let properties = VideoProperties {
            width: property(videoio::CAP_PROP_FRAME_WIDTH) as u32,
            height: property(videoio::CAP_PROP_FRAME_HEIGHT) as u32,
            fps: property(videoio::CAP_PROP_FPS),
            frame_count: property(videoio::CAP_PROP_FRAME_COUNT) as i64,
        };
        Ok(Self {
            capture,
            properties,
        })
    }

    pub fn properties(&self) -> VideoProperties {
        self.properties
    }

    /// The next BGR frame, or `None` at the end of the stream.
    pub fn next_frame(&mut self) -> opencv::Result<Option<Mat>> {
        let mut frame = Mat::default();
        match self.capture.read(&mut frame)? {
            true if !frame.empty() => Ok(Some(frame)),
            _ => Ok(None),
        }
    }
}

impl Drop for VideoSource {
    fn drop(&mut self) {
        if let Err(err) = self.capture.release() {
            log::warn!("Failed to release the source video: {}", err);
        }
    }
}

pub struct VideoSink {
    writer: VideoWriter,
    path: PathBuf,
}

impl VideoSink {
    pub fn open(path: &Path, codec: FourCc, properties: &VideoProperties) -> Result<Self, VideoIoError> {
        let unwritable = || VideoIoError::SinkUnwritable {
            path: path.to_path_buf(),
        };
        let name = path.to_str().ok_or_else(unwritable)?;
        let [a, b, c, d] = codec.chars();
        let fourcc = VideoWriter::fourcc(a, b, c, d).map_err(|_| unwritable())?;
        let size = core::Size::new(properties.width as i32, properties.height as i32);
        let writer =
            VideoWriter::new(name, fourcc, properties.fps, size, true).map_err(|_| unwritable())?;
        if !writer.is_opened().unwrap_or(false) {
            return Err(unwritable());
        }
        Ok(Self {
            writer,
            path: path.to_path_buf(),
        })
    }

    pub fn write(&mut self, frame: &Mat) -> opencv::Result<()> {
        self.writer.write(frame)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for VideoSink {
    fn drop(&mut self) {
        if let Err(err) = self.writer.release() {
            log::warn!("Failed to release the output video: {}", err);
        }
    }
}

/// Converts an OpenCV BGR frame into the RGB image the tracker works on.
pub fn to_rgb_image(frame: &Mat) -> anyhow::Result<RgbImage> {
    let mut rgb = Mat::default();
    imgproc::cvt_color(frame, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;
    let width = rgb.cols() as u32;
    let height = rgb.rows() as u32;
    let data = rgb.data_bytes()?.to_vec();
    RgbImage::from_vec(width, height, data)
        .ok_or_else(|| anyhow::anyhow!("frame buffer does not match {}x{} RGB", width, height))
}
