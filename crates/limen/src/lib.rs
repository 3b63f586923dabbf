#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use limen_image as image;

#[doc(inline)]
pub use limen_imgproc as imgproc;
