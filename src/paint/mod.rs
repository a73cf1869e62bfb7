/// Drawing target trait.
pub mod canvas;
/// Recorded drawing commands.
pub mod display_list;
/// Shared immutable images.
pub mod image;
/// CPU raster canvas.
pub mod pixmap_canvas;
