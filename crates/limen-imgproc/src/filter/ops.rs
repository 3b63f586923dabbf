use limen_image::{Image, ImageError};

use super::{kernels, separable_filter};
use crate::{border::BorderMode, parallel};

fn check_block_size(block_size: usize) -> Result<(), ImageError> {
    if block_size % 2 == 0 {
        return Err(ImageError::InvalidBlockSize(block_size));
    }
    Ok(())
}

fn check_same_size(src: &Image<f32, 1>, dst: &Image<f32, 1>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }
    Ok(())
}

/// Average an image over a square window with two 1D box passes.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, 1).
/// * `dst` - The destination image with shape (H, W, 1).
/// * `block_size` - The odd side of the window.
/// * `border` - The border mode.
/// * `cval` - The fill value for [`BorderMode::Constant`].
///
/// # Errors
///
/// Returns an error if the block size is even or the images differ in size.
pub fn mean_filter(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    block_size: usize,
    border: BorderMode,
    cval: f32,
) -> Result<(), ImageError> {
    check_block_size(block_size)?;
    let kernel = kernels::box_kernel_1d(block_size);
    separable_filter(src, dst, &kernel, &kernel, border, cval)
}

/// Smooth an image with a gaussian kernel truncated at four sigmas.
///
/// A non-positive `sigma` copies the image unchanged.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, 1).
/// * `dst` - The destination image with shape (H, W, 1).
/// * `sigma` - The standard deviation of the gaussian, in pixels.
/// * `border` - The border mode.
/// * `cval` - The fill value for [`BorderMode::Constant`].
pub fn gaussian_filter(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    sigma: f32,
    border: BorderMode,
    cval: f32,
) -> Result<(), ImageError> {
    check_same_size(src, dst)?;

    if sigma <= 0.0 {
        dst.as_slice_mut().copy_from_slice(src.as_slice());
        return Ok(());
    }

    let radius = kernels::gaussian_kernel_radius(sigma);
    let kernel = kernels::gaussian_kernel_1d(2 * radius + 1, sigma);
    separable_filter(src, dst, &kernel, &kernel, border, cval)
}

/// Run `reduce` over the values of every square window of the image.
///
/// The window values are handed over in row-major order.
fn window_filter<F>(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    block_size: usize,
    border: BorderMode,
    cval: f32,
    reduce: F,
) -> Result<(), ImageError>
where
    F: Fn(&mut [f32]) -> f32 + Send + Sync,
{
    check_block_size(block_size)?;
    check_same_size(src, dst)?;

    if src.is_empty() {
        return Ok(());
    }

    let (rows, cols) = (src.rows(), src.cols());
    let radius = block_size / 2;
    let row_map = border.map_range(rows, radius);
    let col_map = border.map_range(cols, radius);
    let src_data = src.as_slice();

    parallel::par_rows_mut(dst.as_slice_mut(), cols, |r, dst_row| {
        let mut window = Vec::with_capacity(block_size * block_size);
        for (c, out) in dst_row.iter_mut().enumerate() {
            window.clear();
            for sr in &row_map[r..r + block_size] {
                match sr {
                    Some(sr) => {
                        let src_row = &src_data[sr * cols..(sr + 1) * cols];
                        window.extend(
                            col_map[c..c + block_size]
                                .iter()
                                .map(|sc| sc.map_or(cval, |sc| src_row[sc])),
                        );
                    }
                    None => window.extend(std::iter::repeat(cval).take(block_size)),
                }
            }
            *out = reduce(&mut window);
        }
    });

    Ok(())
}

/// Compute the median of every square window of the image.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, 1).
/// * `dst` - The destination image with shape (H, W, 1).
/// * `block_size` - The odd side of the window.
/// * `border` - The border mode.
/// * `cval` - The fill value for [`BorderMode::Constant`].
///
/// # Errors
///
/// Returns an error if the block size is even or the images differ in size.
///
/// # Example
///
/// ```
/// use limen_image::{Image, ImageSize};
/// use limen_imgproc::border::BorderMode;
/// use limen_imgproc::filter::median_filter;
///
/// let src = Image::<f32, 1>::new(
///     ImageSize { width: 3, height: 1 },
///     vec![1.0, 100.0, 3.0],
/// ).unwrap();
/// let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0).unwrap();
///
/// median_filter(&src, &mut dst, 3, BorderMode::Nearest, 0.0).unwrap();
/// assert_eq!(dst.as_slice(), &[1.0, 3.0, 3.0]);
/// ```
pub fn median_filter(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    block_size: usize,
    border: BorderMode,
    cval: f32,
) -> Result<(), ImageError> {
    window_filter(src, dst, block_size, border, cval, |window| {
        let mid = window.len() / 2;
        let (_, median, _) = window.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
        *median
    })
}

/// Reduce every square window of the image with a caller supplied function.
///
/// The function receives the window values in row-major order and must return one
/// value; it is called once per output pixel, possibly from several threads.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, 1).
/// * `dst` - The destination image with shape (H, W, 1).
/// * `block_size` - The odd side of the window.
/// * `border` - The border mode.
/// * `cval` - The fill value for [`BorderMode::Constant`].
/// * `f` - The reducer.
///
/// # Errors
///
/// Returns an error if the block size is even or the images differ in size.
pub fn generic_filter<F>(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    block_size: usize,
    border: BorderMode,
    cval: f32,
    f: F,
) -> Result<(), ImageError>
where
    F: Fn(&[f32]) -> f32 + Send + Sync,
{
    window_filter(src, dst, block_size, border, cval, |window| f(window))
}
