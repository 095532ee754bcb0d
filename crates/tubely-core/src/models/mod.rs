pub mod upload;
pub mod video;

pub use upload::{Orientation, UploadKind};
pub use video::Video;
