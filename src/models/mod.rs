pub mod gemini;
pub mod image;
pub mod job;
pub mod request;

pub use image::*;
pub use job::*;
pub use request::*;
