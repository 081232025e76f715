pub mod catalog;
pub mod codec;
pub mod error;
pub mod events;
pub mod prompts;
pub mod runs;
pub mod shell;
pub mod shot;

pub use catalog::{ColorSelection, ShirtColor, CATALOG};
pub use codec::{DataUrl, EncodedImage, ImageSource};
pub use error::InputError;
pub use shot::{DownloadSize, ShotType};
