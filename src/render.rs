/// Premultiplied pixel blending for overlays.
pub mod blend;
/// Sheet compositing, encoding and export.
pub mod composite;
/// Crop-highlight previews of single frames.
pub mod preview;
