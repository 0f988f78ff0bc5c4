//! Capture a tall synthetic document page by page and save it as PNG.
//!
//! ```sh
//! RUST_LOG=scrollshot=debug cargo run --example capture_document -- out.png
//! ```

use std::cell::RefCell;
use std::time::Duration;

use scrollshot::{CaptureConfig, ScrollArea, SnapshotScheduler, Snapshotter};
use scrollshot_render::{Color, ImageBuffer, Rect};

/// A document of alternating colored bands, like rows in a long list.
fn build_document(width: u32, height: u32) -> ImageBuffer {
    let bands = [
        Color::from_hex("#f4f4f4"),
        Color::from_hex("#d9e8ff"),
        Color::from_hex("#ffe7c2"),
    ];
    let mut document = ImageBuffer::new(width, height);
    for y in 0..height {
        let color = bands[(y / 48) as usize % bands.len()].unwrap_or(Color::WHITE);
        for x in 0..width {
            document.set_pixel(x, y, color);
        }
    }
    document
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "scrollshot-capture.png".to_string());

    let mut area = ScrollArea::new(Rect::new(0.0, 0.0, 360.0, 640.0), build_document(360, 2900))
        .with_background(Color::WHITE)
        .with_layout_latency(2, true);

    let config = CaptureConfig::default().with_settle_delay(Duration::from_millis(50));
    let snapshotter = Snapshotter::with_config(config);
    let result = RefCell::new(None);

    {
        let mut scheduler = SnapshotScheduler::new();
        snapshotter.capture_full_content_async(&mut scheduler, &mut area, |capture| {
            *result.borrow_mut() = Some(capture);
        });
        scheduler.run_until_idle();
    }

    match result.into_inner() {
        Some(Ok(image)) => match image.save(&output) {
            Ok(()) => println!(
                "captured {}x{} in {} render passes -> {output}",
                image.width(),
                image.height(),
                area.render_count()
            ),
            Err(err) => eprintln!("failed to save capture: {err}"),
        },
        Some(Err(err)) => eprintln!("capture failed: {err}"),
        None => eprintln!("capture did not complete"),
    }
}
