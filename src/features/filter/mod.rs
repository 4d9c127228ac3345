mod codec;
pub mod handler;
pub mod kernels;
mod service;
mod types;

pub use codec::{decode_image, encode_base64, encode_png};
pub use handler::create_filter_router;
pub use service::{FilteredImage, run_filter};
pub use types::{FilterKind, ProcessImageForm, ProcessImageResponse};
