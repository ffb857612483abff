pub mod recording;
pub mod svg;
pub mod traits;
