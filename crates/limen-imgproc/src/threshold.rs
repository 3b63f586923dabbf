use std::fmt;

use limen_image::{Image, ImageError};
use num_traits::ToPrimitive;
use rayon::prelude::*;

use crate::border::BorderMode;
use crate::filter;
use crate::histogram::{warn_if_multichannel, Histogram, HistogramSample};
use crate::parallel;

/// A function reducing the values of one window to a single value.
pub type Reducer<'a> = &'a (dyn Fn(&[f32]) -> f32 + Send + Sync);

/// The neighborhood statistic used by [`threshold_local`].
pub enum LocalThresholdMethod<'a> {
    /// Reduce each window with a caller supplied function.
    Generic(Reducer<'a>),
    /// Gaussian weighted mean. Without a sigma, `(block_size - 1) / 6` is used.
    Gaussian {
        /// The standard deviation of the gaussian, in pixels.
        sigma: Option<f32>,
    },
    /// Arithmetic mean of the window.
    Mean,
    /// Median of the window.
    Median,
}

/// The optional parameter of a method given by name.
pub enum MethodParam<'a> {
    /// The sigma of the gaussian method.
    Sigma(f32),
    /// The reducer of the generic method.
    Reducer(Reducer<'a>),
}

impl<'a> LocalThresholdMethod<'a> {
    /// Resolve a method from its name: `generic`, `gaussian`, `mean` or `median`.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::UnknownThresholdMethod`] for any other name and
    /// [`ImageError::MissingReducer`] when `generic` comes without a reducer.
    ///
    /// # Example
    ///
    /// ```
    /// use limen_imgproc::threshold::{LocalThresholdMethod, MethodParam};
    ///
    /// let method = LocalThresholdMethod::from_name("gaussian", Some(MethodParam::Sigma(2.0))).unwrap();
    /// assert!(matches!(method, LocalThresholdMethod::Gaussian { sigma: Some(_) }));
    ///
    /// assert!(LocalThresholdMethod::from_name("otsu", None).is_err());
    /// ```
    pub fn from_name(name: &str, param: Option<MethodParam<'a>>) -> Result<Self, ImageError> {
        match (name, param) {
            ("generic", Some(MethodParam::Reducer(f))) => Ok(LocalThresholdMethod::Generic(f)),
            ("generic", _) => Err(ImageError::MissingReducer),
            ("gaussian", Some(MethodParam::Sigma(sigma))) => Ok(LocalThresholdMethod::Gaussian {
                sigma: Some(sigma),
            }),
            ("gaussian", _) => Ok(LocalThresholdMethod::Gaussian { sigma: None }),
            ("mean", _) => Ok(LocalThresholdMethod::Mean),
            ("median", _) => Ok(LocalThresholdMethod::Median),
            (other, _) => Err(ImageError::UnknownThresholdMethod(other.to_string())),
        }
    }
}

impl fmt::Debug for LocalThresholdMethod<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalThresholdMethod::Generic(_) => write!(f, "Generic"),
            LocalThresholdMethod::Gaussian { sigma } => {
                f.debug_struct("Gaussian").field("sigma", sigma).finish()
            }
            LocalThresholdMethod::Mean => write!(f, "Mean"),
            LocalThresholdMethod::Median => write!(f, "Median"),
        }
    }
}

/// Apply a binary threshold to an image.
///
/// Samples strictly greater than `threshold` are set to `max_value`, the others to zero.
///
/// # Arguments
///
/// * `src` - The input image of an arbitrary number of channels and type.
/// * `dst` - The output mask with the same size and number of channels.
/// * `threshold` - The threshold value, e.g. the result of [`threshold_otsu`].
/// * `max_value` - The value of the foreground samples.
///
/// # Errors
///
/// Returns an error if `src` and `dst` do not have the same size.
///
/// # Examples
///
/// ```
/// use limen_image::{Image, ImageSize};
/// use limen_imgproc::threshold::threshold_binary;
///
/// let data = vec![100u8, 200, 50, 150, 200, 250];
/// let image = Image::<_, 1>::new(ImageSize { width: 2, height: 3 }, data).unwrap();
///
/// let mut thresholded = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// threshold_binary(&image, &mut thresholded, 100.0, 255).unwrap();
/// assert_eq!(thresholded.as_slice(), &[0, 255, 0, 255, 255, 255]);
/// ```
pub fn threshold_binary<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<u8, C>,
    threshold: f64,
    max_value: u8,
) -> Result<(), ImageError>
where
    T: ToPrimitive + Send + Sync,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows_val(src, dst, |src_pixel, dst_pixel| {
        *dst_pixel = match src_pixel.to_f64() {
            Some(v) if v > threshold => max_value,
            _ => 0,
        };
    });

    Ok(())
}

/// Apply a per-pixel threshold map to an image.
///
/// Samples strictly greater than their threshold are set to `max_value`, the others
/// to zero.
///
/// # Arguments
///
/// * `src` - The input single channel image.
/// * `thresholds` - The threshold map, e.g. the result of [`threshold_local`].
/// * `dst` - The output mask.
/// * `max_value` - The value of the foreground samples.
///
/// # Errors
///
/// Returns an error if the three images do not have the same size.
pub fn threshold_binary_map<T>(
    src: &Image<T, 1>,
    thresholds: &Image<f32, 1>,
    dst: &mut Image<u8, 1>,
    max_value: u8,
) -> Result<(), ImageError>
where
    T: ToPrimitive + Send + Sync,
{
    for other in [thresholds.size(), dst.size()] {
        if src.size() != other {
            return Err(ImageError::InvalidImageSize(
                src.cols(),
                src.rows(),
                other.width,
                other.height,
            ));
        }
    }

    parallel::par_iter_rows_val_two(src, thresholds, dst, |src_pixel, &t, dst_pixel| {
        *dst_pixel = match src_pixel.to_f64() {
            Some(v) if v > t as f64 => max_value,
            _ => 0,
        };
    });

    Ok(())
}

/// Select the split of a histogram maximizing the between-class variance.
///
/// The bins up to and including the returned center form the background class.
/// Ties are resolved in favour of the lowest split.
///
/// # Errors
///
/// Returns [`ImageError::SingleValuedImage`] if less than two bins are populated.
pub fn threshold_otsu_from_histogram(hist: &Histogram) -> Result<f64, ImageError> {
    let n = hist.len();
    if hist.counts.iter().filter(|&&c| c > 0).count() < 2 {
        return Err(ImageError::SingleValuedImage);
    }

    let counts = hist.counts.iter().map(|&c| c as f64).collect::<Vec<_>>();
    let centers = &hist.bin_centers;

    // class probabilities and means for every split, from the left
    let mut weight1 = Vec::with_capacity(n);
    let mut mean1 = Vec::with_capacity(n);
    let (mut w, mut s) = (0.0f64, 0.0f64);
    for (&c, &x) in counts.iter().zip(centers.iter()) {
        w += c;
        s += c * x;
        weight1.push(w);
        mean1.push(s / w);
    }

    // and from the right
    let mut weight2 = vec![0.0f64; n];
    let mut mean2 = vec![0.0f64; n];
    let (mut w, mut s) = (0.0f64, 0.0f64);
    for i in (0..n).rev() {
        w += counts[i];
        s += counts[i] * centers[i];
        weight2[i] = w;
        mean2[i] = s / w;
    }

    let mut best_idx = 0;
    let mut best_variance = f64::NEG_INFINITY;
    for i in 0..n - 1 {
        let variance = weight1[i] * weight2[i + 1] * (mean1[i] - mean2[i + 1]).powi(2);
        if variance > best_variance {
            best_variance = variance;
            best_idx = i;
        }
    }

    Ok(centers[best_idx])
}

/// Compute a global threshold with Otsu's method.
///
/// The threshold maximizes the between-class variance of the histogram of the image;
/// samples strictly greater than it are foreground. All channels are flattened and a
/// warning is logged for images with two or three channels.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `nbins` - The number of histogram bins, used for floating point images only.
///
/// # Errors
///
/// Returns [`ImageError::SingleValuedImage`] if all the finite samples are equal and
/// [`ImageError::EmptyImage`] if there are none. Non-finite samples of floating point
/// images are not counted.
///
/// # Example
///
/// ```
/// use limen_image::{Image, ImageSize};
/// use limen_imgproc::threshold::threshold_otsu;
///
/// let image = Image::<u8, 1>::new(
///     ImageSize { width: 3, height: 2 },
///     vec![10, 12, 11, 200, 202, 201],
/// ).unwrap();
///
/// let threshold = threshold_otsu(&image, 256).unwrap();
/// assert_eq!(threshold, 12.0);
/// ```
pub fn threshold_otsu<T, const C: usize>(src: &Image<T, C>, nbins: usize) -> Result<f64, ImageError>
where
    T: HistogramSample,
{
    warn_if_multichannel::<C>();

    if src.is_empty() {
        return Err(ImageError::EmptyImage);
    }

    // a single populated bin is rejected while selecting the split
    let hist = T::histogram_of(src.as_slice(), nbins)?;
    let threshold = threshold_otsu_from_histogram(&hist)?;
    log::debug!("otsu threshold {threshold} over {} bins", hist.len());

    Ok(threshold)
}

/// Compute a threshold map from local neighborhood statistics.
///
/// Each output value is the statistic of the `block_size` × `block_size` window
/// centered on the pixel, minus `offset`. Samples beyond the image edge are synthesized
/// with `border`; `cval` is the fill value of [`BorderMode::Constant`].
///
/// # Arguments
///
/// * `src` - The input single channel image.
/// * `block_size` - The odd side of the window.
/// * `method` - The neighborhood statistic.
/// * `offset` - The constant subtracted from the statistic.
/// * `border` - The border mode.
/// * `cval` - The fill value for the constant border mode.
///
/// # Returns
///
/// The threshold map, with the same size as `src`.
///
/// # Errors
///
/// Returns [`ImageError::InvalidBlockSize`] if `block_size` is even.
///
/// # Example
///
/// ```
/// use limen_image::{Image, ImageSize};
/// use limen_imgproc::border::BorderMode;
/// use limen_imgproc::threshold::{threshold_local, LocalThresholdMethod};
///
/// let image = Image::<u8, 1>::new(
///     ImageSize { width: 3, height: 3 },
///     vec![1, 2, 3, 4, 5, 6, 7, 8, 9],
/// ).unwrap();
///
/// let map = threshold_local(
///     &image,
///     3,
///     &LocalThresholdMethod::Median,
///     1.0,
///     BorderMode::Reflect,
///     0.0,
/// ).unwrap();
///
/// assert_eq!(map.size(), image.size());
/// assert_eq!(map.get([1, 1, 0]), Some(&4.0));
/// ```
pub fn threshold_local<T>(
    src: &Image<T, 1>,
    block_size: usize,
    method: &LocalThresholdMethod,
    offset: f32,
    border: BorderMode,
    cval: f32,
) -> Result<Image<f32, 1>, ImageError>
where
    T: ToPrimitive + Copy,
{
    if block_size % 2 == 0 {
        return Err(ImageError::InvalidBlockSize(block_size));
    }

    let src = src.cast::<f32>()?;
    let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;

    match method {
        LocalThresholdMethod::Generic(reducer) => {
            filter::generic_filter(&src, &mut dst, block_size, border, cval, |w| reducer(w))?
        }
        LocalThresholdMethod::Gaussian { sigma } => {
            let sigma = sigma.unwrap_or((block_size - 1) as f32 / 6.0);
            filter::gaussian_filter(&src, &mut dst, sigma, border, cval)?
        }
        LocalThresholdMethod::Mean => filter::mean_filter(&src, &mut dst, block_size, border, cval)?,
        LocalThresholdMethod::Median => {
            filter::median_filter(&src, &mut dst, block_size, border, cval)?
        }
    }

    dst.as_slice_mut().par_iter_mut().for_each(|v| *v -= offset);

    Ok(dst)
}
