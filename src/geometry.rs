/// Crop resolution and margin conversion.
pub mod crop;
