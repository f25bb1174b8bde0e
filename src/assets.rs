/// Frame decoding and size probing.
pub mod decode;
/// Frame folder discovery and ordering.
pub mod scan;
