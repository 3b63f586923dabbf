use std::str::FromStr;

use limen_image::ImageError;

/// Policy used to synthesize samples beyond the image edge in neighborhood filters.
///
/// The examples show how the row `a b c d` is extended on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderMode {
    /// Reflect about the edge of the last sample, repeating the edge sample.
    ///
    /// Example: ...d c b a | a b c d | d c b a...
    #[default]
    Reflect,

    /// Fill the border with a constant value.
    ///
    /// Example: ...k k k k | a b c d | k k k k...
    Constant,

    /// Repeat the outermost sample.
    ///
    /// Example: ...a a a a | a b c d | d d d d...
    Nearest,

    /// Reflect about the center of the last sample, the edge sample is not repeated.
    ///
    /// Example: ...d c b | a b c d | c b a...
    Mirror,

    /// Wrap around to the opposite edge.
    ///
    /// Example: ...a b c d | a b c d | a b c d...
    Wrap,
}

impl BorderMode {
    #[inline]
    fn reflect(i: isize, len: usize) -> usize {
        let len = len as isize;
        let period = 2 * len;
        let i = i.rem_euclid(period);
        if i >= len {
            (period - i - 1) as usize
        } else {
            i as usize
        }
    }

    #[inline]
    fn mirror(i: isize, len: usize) -> usize {
        if len == 1 {
            return 0;
        }
        let len = len as isize;
        let period = 2 * len - 2;
        let i = i.rem_euclid(period);
        if i >= len {
            (period - i) as usize
        } else {
            i as usize
        }
    }

    /// Maps index `i` to a valid index within `[0, len)` according to the border mode.
    ///
    /// Returns `None` when the sample must be taken from the constant fill value,
    /// which only happens for [`BorderMode::Constant`] and out-of-range indices.
    ///
    /// PRECONDITION: `len > 0`.
    ///
    /// # Example
    ///
    /// ```
    /// use limen_imgproc::border::BorderMode;
    ///
    /// assert_eq!(BorderMode::Reflect.map_index(-1, 4), Some(0));
    /// assert_eq!(BorderMode::Mirror.map_index(-1, 4), Some(1));
    /// assert_eq!(BorderMode::Wrap.map_index(4, 4), Some(0));
    /// assert_eq!(BorderMode::Constant.map_index(4, 4), None);
    /// ```
    #[inline]
    pub fn map_index(&self, i: isize, len: usize) -> Option<usize> {
        if i >= 0 && (i as usize) < len {
            return Some(i as usize);
        }
        match self {
            BorderMode::Constant => None,
            BorderMode::Nearest => Some(i.clamp(0, len as isize - 1) as usize),
            BorderMode::Reflect => Some(Self::reflect(i, len)),
            BorderMode::Mirror => Some(Self::mirror(i, len)),
            BorderMode::Wrap => Some(i.rem_euclid(len as isize) as usize),
        }
    }

    /// Map the indices `-radius..len + radius` of one axis in a single pass.
    ///
    /// The entry at position `k` corresponds to index `k - radius`.
    pub fn map_range(&self, len: usize, radius: usize) -> Vec<Option<usize>> {
        (0..len + 2 * radius)
            .map(|k| self.map_index(k as isize - radius as isize, len))
            .collect()
    }
}

impl FromStr for BorderMode {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reflect" => Ok(BorderMode::Reflect),
            "constant" => Ok(BorderMode::Constant),
            "nearest" => Ok(BorderMode::Nearest),
            "mirror" => Ok(BorderMode::Mirror),
            "wrap" => Ok(BorderMode::Wrap),
            _ => Err(ImageError::UnknownBorderMode(s.to_string())),
        }
    }
}
