/// An error type for the image and image processing crates.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when channel and shape are not valid.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when two images were expected to have the same size.
    #[error("Image size ({0}x{1}) does not match the expected size ({2}x{3})")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when a pixel value cannot be represented in the target type.
    #[error("Failed to cast image data")]
    CastError,

    /// Error when the channel index is out of bounds.
    #[error("Channel index {0} is out of bounds ({1})")]
    ChannelIndexOutOfBounds(usize, usize),

    /// Error when the image contains no pixels.
    #[error("Image is empty")]
    EmptyImage,

    /// Error when the number of histogram bins is invalid.
    #[error("Invalid number of histogram bins: {0}")]
    InvalidHistogramBins(usize),

    /// Error when a global threshold is requested for an image with a single value.
    #[error("Threshold is ambiguous: the image contains a single value")]
    SingleValuedImage,

    /// Error when the neighborhood window size is not a positive odd number.
    #[error("Block size must be a positive odd number, got {0}")]
    InvalidBlockSize(usize),

    /// Error when the local threshold method name is unknown.
    #[error("Unknown local threshold method: {0}")]
    UnknownThresholdMethod(String),

    /// Error when the border mode name is unknown.
    #[error("Unknown border mode: {0}")]
    UnknownBorderMode(String),

    /// Error when the generic method is requested without a reducer.
    #[error("The generic method requires a reducer function")]
    MissingReducer,
}
