//! Integration tests for surface allocation, compositing and export.

use scrollshot_render::{
    Color, ImageBuffer, OutputFormat, Point, RasterAllocator, Rect, RenderError, Size,
    SurfaceAllocator,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn test_allocator_budget() {
    init_tracing();
    let allocator = RasterAllocator::new().with_max_pixels(100 * 100);

    assert!(allocator.allocate(Size::new(100.0, 100.0)).is_ok());
    assert_eq!(
        allocator.allocate(Size::new(100.0, 101.0)).unwrap_err(),
        RenderError::SurfaceUnavailable {
            width: 100,
            height: 101
        }
    );
    assert!(allocator.allocate(Size::new(0.0, 10.0)).is_err());
    assert!(allocator.allocate(Size::new(f32::INFINITY, 10.0)).is_err());
}

#[test]
fn test_allocator_by_reference() {
    fn allocate_with(allocator: impl SurfaceAllocator) -> bool {
        allocator.allocate(Size::new(4.0, 4.0)).is_ok()
    }

    let allocator = RasterAllocator::default();
    assert!(allocate_with(&allocator));
    assert!(allocate_with(allocator));
}

#[test]
fn test_pages_composite_into_one_surface() {
    let mut surface = RasterAllocator::default()
        .allocate(Size::new(30.0, 250.0))
        .unwrap();
    let colors = [Color::RED, Color::GREEN, Color::BLUE];

    {
        let mut ctx = surface.context();
        ctx.set_fill_color(Color::WHITE);
        ctx.fill_all();
        for (index, color) in colors.iter().enumerate() {
            let page = ImageBuffer::from_color(30, 100, *color);
            ctx.draw_image(&page, Point::new(0.0, index as f32 * 100.0));
        }
    }

    let image = surface.finish();
    assert_eq!(image.dimensions(), (30, 250));
    assert_eq!(image.pixel_rgba8(0, 50), Some([255, 0, 0, 255]));
    assert_eq!(image.pixel_rgba8(0, 150), Some([0, 255, 0, 255]));
    // The last page is clipped at the surface edge.
    assert_eq!(image.pixel_rgba8(29, 249), Some([0, 0, 255, 255]));
}

#[test]
fn test_stroke_uses_stroke_color() {
    let mut surface = RasterAllocator::default()
        .allocate(Size::new(20.0, 20.0))
        .unwrap();
    {
        let mut ctx = surface.context();
        ctx.set_fill_color(Color::WHITE);
        ctx.fill_all();
        ctx.set_stroke_color(Color::BLACK);
        ctx.stroke_rect(Rect::new(0.0, 0.0, 20.0, 20.0), 2.0);
    }

    let image = surface.finish();
    assert_eq!(image.pixel_rgba8(0, 10), Some([0, 0, 0, 255]));
    assert_eq!(image.pixel_rgba8(10, 10), Some([255, 255, 255, 255]));
}

#[test]
fn test_png_export_decodes() {
    let image = ImageBuffer::from_color(12, 34, Color::from_rgb8(10, 20, 30));
    let bytes = image.to_png().unwrap();

    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    let decoded = ImageBuffer::from_bytes(&bytes).unwrap();
    assert_eq!(decoded, image);
}

#[test]
fn test_jpeg_drops_alpha() {
    let image = ImageBuffer::from_color(8, 8, Color::from_rgba8(200, 100, 50, 128));
    let bytes = image.encode(OutputFormat::Jpeg).unwrap();

    let decoded = ImageBuffer::from_bytes(&bytes).unwrap();
    assert_eq!(decoded.dimensions(), (8, 8));
    assert_eq!(decoded.pixel_rgba8(4, 4).map(|p| p[3]), Some(255));
}

#[test]
fn test_save_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("capture.png");
    let image = ImageBuffer::from_color(5, 7, Color::YELLOW);

    image.save(&path).unwrap();
    let bytes = std::fs::read(&path).unwrap();

    assert_eq!(ImageBuffer::from_bytes(&bytes).unwrap(), image);
}

#[test]
fn test_save_unknown_extension_fails() {
    let image = ImageBuffer::new(2, 2);
    let err = image.save("capture.unknown-format").unwrap_err();
    assert!(matches!(err, RenderError::ImageSave(_)));
}
