mod canvas;
mod cli;
mod video;

use anyhow::Context;
use canvas::MatCanvas;
use clap::Parser;
use cli::Args;
use opencv::highgui;
use shade_tracker::{PipelineConfig, TrackingPipeline};
use video::{VideoSink, VideoSource};

const PREVIEW_WINDOW: &str = "frame";
const PREVIEW_DELAY_MS: i32 = 25;
const QUIT_KEY: char = 'q';

/// Closes any preview window when the run ends, however it ends.
struct Preview;

impl Drop for Preview {
    fn drop(&mut self) {
        if let Err(err) = highgui::destroy_all_windows() {
            log::warn!("Failed to close the preview window: {}", err);
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    log::info!("App is starting...");
    if let Err(err) = run(&args) {
        log::error!("{:#}", err);
        std::process::exit(1);
    }
    log::info!("App is closing now...");
}

fn run(args: &Args) -> anyhow::Result<()> {
    // --- 1. Configuration ---
    let input_path = std::path::absolute(&args.path_name)
        .with_context(|| format!("Cannot resolve {}", args.path_name.display()))?;
    let output = args.output_spec()?;
    let output_path = output.output_path(&input_path);

    // --- 2. Video I/O Initialization ---
    let mut source = VideoSource::open(&input_path)?;
    let properties = source.properties();
    let mut sink = VideoSink::open(&output_path, output.codec, &properties)?;

    // --- 3. Pipeline Initialization ---
    let config = PipelineConfig::new(properties.width, properties.height, args.annotations())?
        .with_eviction(args.max_unmatched_frames);
    let mut pipeline = TrackingPipeline::new(config);
    let _preview = args.show_realtime.then_some(Preview);

    // --- 4. Main Processing Loop ---
    let mut frame_index = 0u64;
    loop {
        log::info!("{}", frame_progress(frame_index, properties.frame_count));
        frame_index += 1;

        let mut frame = match source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                log::info!("No frame has been received. Exiting simulation!");
                break;
            }
            Err(err) => {
                log::warn!("Error reading frame: {}", err);
                break;
            }
        };

        // --- 5. Detection, Tracking and Annotation ---
        let rgb = match video::to_rgb_image(&frame) {
            Ok(rgb) => rgb,
            Err(err) => {
                log::warn!("Error converting frame: {:#}", err);
                break;
            }
        };
        let report = pipeline.process_and_render(&rgb, &mut MatCanvas::new(&mut frame));
        log::debug!("{:?}", report);

        // --- 6. Output ---
        if let Err(err) = sink.write(&frame) {
            log::error!("Error writing frame: {}", err);
            break;
        }

        if args.show_realtime {
            let key = highgui::imshow(PREVIEW_WINDOW, &frame)
                .and_then(|_| highgui::wait_key(PREVIEW_DELAY_MS));
            if stops_preview(key) {
                break;
            }
        }
    }

    let saved = sink.path().to_path_buf();
    drop(sink);
    log::info!("Output video has been saved into: {}", saved.display());
    Ok(())
}

fn frame_progress(frame_index: u64, frame_count: i64) -> String {
    format!("[Frame: {}/{}]", frame_index, frame_count)
}

/// True when the preview asked to quit with `q`, or when the preview itself failed.
fn stops_preview(key: opencv::Result<i32>) -> bool {
    match key {
        Ok(key) => key == QUIT_KEY as i32,
        Err(err) => {
            log::warn!("Error showing preview: {}", err);
            true
        }
    }
}
