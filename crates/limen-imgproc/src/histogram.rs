use limen_image::{Image, ImageError};
use num_traits::{NumCast, PrimInt, ToPrimitive};
use rayon::prelude::*;

/// The pixel intensity histogram of an image.
///
/// `counts[i]` is the number of samples that fall in the bin represented by
/// `bin_centers[i]`. Bin centers are sorted in ascending order.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// The number of samples per bin.
    pub counts: Vec<usize>,
    /// The representative value of each bin.
    pub bin_centers: Vec<f64>,
}

impl Histogram {
    /// The number of bins.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether the histogram has no bins.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The total number of counted samples.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// The counts as fractions of the total number of samples.
    pub fn normalized(&self) -> Vec<f64> {
        let total = self.total() as f64;
        if total == 0.0 {
            return vec![0.0; self.len()];
        }
        self.counts.iter().map(|&c| c as f64 / total).collect()
    }
}

/// Sample types that can be histogrammed.
///
/// Integer types are counted exactly, one bin per integer value, floating point types
/// are binned in equal-width bins.
pub trait HistogramSample: Copy + PartialOrd + Send + Sync + ToPrimitive {
    /// Compute the histogram of a flat sequence of samples.
    ///
    /// PRECONDITION: `samples` is not empty.
    fn histogram_of(samples: &[Self], nbins: usize) -> Result<Histogram, ImageError>;
}

macro_rules! impl_integer_sample {
    ($($t:ty),*) => {
        $(
            impl HistogramSample for $t {
                fn histogram_of(samples: &[Self], _nbins: usize) -> Result<Histogram, ImageError> {
                    integer_histogram(samples)
                }
            }
        )*
    };
}

macro_rules! impl_float_sample {
    ($($t:ty),*) => {
        $(
            impl HistogramSample for $t {
                fn histogram_of(samples: &[Self], nbins: usize) -> Result<Histogram, ImageError> {
                    float_histogram(samples, nbins)
                }
            }
        )*
    };
}

impl_integer_sample!(u8, u16, u32, u64, i8, i16, i32, i64);
impl_float_sample!(f32, f64);

/// Signed integer widths available to shift integer samples to a zero minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IntWidth {
    /// 8-bit.
    I8,
    /// 16-bit.
    I16,
    /// 32-bit.
    I32,
    /// 64-bit.
    I64,
    /// 128-bit.
    I128,
}

impl IntWidth {
    fn bounds(&self) -> (i128, i128) {
        match self {
            IntWidth::I8 => (i8::MIN as i128, i8::MAX as i128),
            IntWidth::I16 => (i16::MIN as i128, i16::MAX as i128),
            IntWidth::I32 => (i32::MIN as i128, i32::MAX as i128),
            IntWidth::I64 => (i64::MIN as i128, i64::MAX as i128),
            IntWidth::I128 => (i128::MIN, i128::MAX),
        }
    }

    /// The smallest width holding the samples in `[min, max]` as well as the shifted
    /// maximum `max - min`.
    ///
    /// # Example
    ///
    /// ```
    /// use limen_imgproc::histogram::IntWidth;
    ///
    /// assert_eq!(IntWidth::for_range(-1, 100), IntWidth::I8);
    /// assert_eq!(IntWidth::for_range(-128, 127), IntWidth::I16);
    /// assert_eq!(IntWidth::for_range(0, u32::MAX as i128), IntWidth::I64);
    /// ```
    pub fn for_range(min: i128, max: i128) -> IntWidth {
        let span = max - min;
        [
            IntWidth::I8,
            IntWidth::I16,
            IntWidth::I32,
            IntWidth::I64,
            IntWidth::I128,
        ]
        .into_iter()
        .find(|w| {
            let (lo, hi) = w.bounds();
            min >= lo && max <= hi && span <= hi
        })
        .unwrap_or(IntWidth::I128)
    }
}

fn min_max<T: Copy + PartialOrd>(samples: &[T]) -> Option<(T, T)> {
    let first = *samples.first()?;
    Some(samples.iter().fold((first, first), |(lo, hi), &v| {
        (if v < lo { v } else { lo }, if v > hi { v } else { hi })
    }))
}

const CHUNK_SIZE: usize = 4096;

/// Count the samples shifted by `min`, doing the subtraction in the integer type `W`.
///
/// Each rayon split owns one buffer of `num_bins` counts, merged pairwise at the end.
fn shifted_counts<T, W>(samples: &[T], min: W, num_bins: usize) -> Result<Vec<usize>, ImageError>
where
    T: Copy + Send + Sync + ToPrimitive,
    W: PrimInt + NumCast + Send + Sync,
{
    samples
        .par_iter()
        .with_min_len(CHUNK_SIZE)
        .try_fold(
            || vec![0usize; num_bins],
            |mut local, &v| -> Result<Vec<usize>, ImageError> {
                let v = W::from(v).ok_or(ImageError::CastError)?;
                let idx = (v - min).to_usize().ok_or(ImageError::CastError)?;
                local[idx] += 1;
                Ok(local)
            },
        )
        .try_reduce(
            || vec![0usize; num_bins],
            |mut a, b| {
                a.iter_mut().zip(b.iter()).for_each(|(x, y)| *x += y);
                Ok(a)
            },
        )
}

fn counts_in<T, W>(samples: &[T], min: i128, num_bins: usize) -> Result<Vec<usize>, ImageError>
where
    T: Copy + Send + Sync + ToPrimitive,
    W: PrimInt + NumCast + Send + Sync,
{
    let min = W::from(min).ok_or(ImageError::CastError)?;
    shifted_counts::<T, W>(samples, min, num_bins)
}

/// Exact histogram of integer samples, one bin per value between min and max.
fn integer_histogram<T>(samples: &[T]) -> Result<Histogram, ImageError>
where
    T: Copy + PartialOrd + Send + Sync + ToPrimitive,
{
    let (min, max) = min_max(samples).ok_or(ImageError::EmptyImage)?;
    let min = min.to_i128().ok_or(ImageError::CastError)?;
    let max = max.to_i128().ok_or(ImageError::CastError)?;

    // the first bin is the minimum, so no leading bin is ever empty
    let num_bins = usize::try_from(max - min + 1).map_err(|_| ImageError::CastError)?;

    let width = IntWidth::for_range(min, max);
    log::debug!("histogram of integer samples in [{min}, {max}] shifted in {width:?}");

    let counts = match width {
        IntWidth::I8 => counts_in::<T, i8>(samples, min, num_bins)?,
        IntWidth::I16 => counts_in::<T, i16>(samples, min, num_bins)?,
        IntWidth::I32 => counts_in::<T, i32>(samples, min, num_bins)?,
        IntWidth::I64 => counts_in::<T, i64>(samples, min, num_bins)?,
        IntWidth::I128 => counts_in::<T, i128>(samples, min, num_bins)?,
    };

    let bin_centers = (0..num_bins).map(|i| (min + i as i128) as f64).collect();

    Ok(Histogram {
        counts,
        bin_centers,
    })
}

/// Histogram of floating point samples in `nbins` equal-width bins spanning `[min, max]`.
///
/// Non-finite samples are not counted.
fn float_histogram<T>(samples: &[T], nbins: usize) -> Result<Histogram, ImageError>
where
    T: Copy + Send + Sync + ToPrimitive,
{
    if nbins == 0 {
        return Err(ImageError::InvalidHistogramBins(nbins));
    }

    let values = samples
        .iter()
        .filter_map(|v| v.to_f64())
        .filter(|v| v.is_finite())
        .collect::<Vec<f64>>();
    let (min, max) = min_max(&values).ok_or(ImageError::EmptyImage)?;

    let (lo, hi) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let bin_width = (hi - lo) / nbins as f64;

    let counts = values
        .par_chunks(CHUNK_SIZE)
        .fold(
            || vec![0usize; nbins],
            |mut local, chunk| {
                for &v in chunk {
                    // the last bin is closed on the right
                    let idx = (((v - lo) / bin_width) as usize).min(nbins - 1);
                    local[idx] += 1;
                }
                local
            },
        )
        .reduce(
            || vec![0usize; nbins],
            |mut a, b| {
                a.iter_mut().zip(b.iter()).for_each(|(x, y)| *x += y);
                a
            },
        );

    let bin_centers = (0..nbins)
        .map(|i| {
            let left = lo + i as f64 * bin_width;
            let right = lo + (i + 1) as f64 * bin_width;
            (left + right) / 2.0
        })
        .collect();

    Ok(Histogram {
        counts,
        bin_centers,
    })
}

/// Whether an image of `C` channels looks like a color image.
pub(crate) fn looks_multichannel<const C: usize>() -> bool {
    C == 2 || C == 3
}

/// Warn when an image looks like a color image, whose channels get mixed in one histogram.
pub(crate) fn warn_if_multichannel<const C: usize>() {
    if looks_multichannel::<C>() {
        log::warn!(
            "This might be a color image. The histogram will be computed on the \
             flattened image of {} channels. Use `Image::channel` to process each \
             channel separately.",
            C
        );
    }
}

/// Compute the intensity histogram of an image.
///
/// Integer images are counted exactly: bin centers are the consecutive integers from
/// the image minimum to its maximum and `nbins` is ignored. Floating point images are
/// split in `nbins` equal-width bins between their minimum and maximum, the bin center
/// being the middle of each bin.
///
/// All channels are flattened into a single histogram; a warning is logged for
/// images with two or three channels.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `nbins` - The number of bins used for floating point images.
///
/// # Errors
///
/// Returns an error if the image is empty or if `nbins` is zero for a floating point
/// image.
///
/// # Example
///
/// ```
/// use limen_image::{Image, ImageSize};
/// use limen_imgproc::histogram::histogram;
///
/// let image = Image::<i8, 1>::new(
///   ImageSize {
///     width: 3,
///     height: 2,
///   },
///   vec![-2, 0, 0, 1, 1, 1],
/// ).unwrap();
///
/// let hist = histogram(&image, 256).unwrap();
/// assert_eq!(hist.counts, vec![1, 0, 2, 3]);
/// assert_eq!(hist.bin_centers, vec![-2.0, -1.0, 0.0, 1.0]);
/// ```
pub fn histogram<T, const C: usize>(src: &Image<T, C>, nbins: usize) -> Result<Histogram, ImageError>
where
    T: HistogramSample,
{
    warn_if_multichannel::<C>();

    if src.is_empty() {
        return Err(ImageError::EmptyImage);
    }

    T::histogram_of(src.as_slice(), nbins)
}
