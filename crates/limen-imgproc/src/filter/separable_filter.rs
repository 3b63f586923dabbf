use limen_image::{Image, ImageError};

use crate::{border::BorderMode, parallel};

/// Axis along which a 1D correlation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Axis {
    /// Along the columns, i.e. mixing samples of neighbouring rows.
    Vertical,
    /// Along the rows, i.e. mixing samples of neighbouring columns.
    Horizontal,
}

/// Correlate a row-major single channel buffer with a 1D kernel along one axis.
///
/// The kernel is centered on each output sample; samples beyond the edges are
/// synthesized with `border`, `cval` being used by [`BorderMode::Constant`].
///
/// PRECONDITION: `src` and `dst` hold `rows * cols > 0` samples, the kernel length is odd.
#[allow(clippy::too_many_arguments)]
pub(crate) fn correlate1d(
    src: &[f32],
    dst: &mut [f32],
    rows: usize,
    cols: usize,
    kernel: &[f32],
    axis: Axis,
    border: BorderMode,
    cval: f32,
) {
    let radius = kernel.len() / 2;

    match axis {
        Axis::Vertical => {
            let row_map = border.map_range(rows, radius);
            parallel::par_rows_mut(dst, cols, |r, dst_row| {
                dst_row.fill(0.0);
                for (k, &w) in kernel.iter().enumerate() {
                    match row_map[r + k] {
                        Some(sr) => {
                            let src_row = &src[sr * cols..(sr + 1) * cols];
                            dst_row
                                .iter_mut()
                                .zip(src_row.iter())
                                .for_each(|(acc, &v)| *acc += w * v);
                        }
                        None => dst_row.iter_mut().for_each(|acc| *acc += w * cval),
                    }
                }
            });
        }
        Axis::Horizontal => {
            let col_map = border.map_range(cols, radius);
            parallel::par_rows_mut(dst, cols, |r, dst_row| {
                let src_row = &src[r * cols..(r + 1) * cols];
                for (c, out) in dst_row.iter_mut().enumerate() {
                    let mut acc = 0.0f32;
                    for (k, &w) in kernel.iter().enumerate() {
                        let v = match col_map[c + k] {
                            Some(sc) => src_row[sc],
                            None => cval,
                        };
                        acc += w * v;
                    }
                    *out = acc;
                }
            });
        }
    }
}

/// Apply a separable filter to a single channel image.
///
/// The vertical kernel runs first and the horizontal kernel runs on its result; each
/// pass extends its own input with the border mode.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, 1).
/// * `dst` - The destination image with shape (H, W, 1).
/// * `kernel_x` - The horizontal kernel, of odd length.
/// * `kernel_y` - The vertical kernel, of odd length.
/// * `border` - The border mode.
/// * `cval` - The fill value for [`BorderMode::Constant`].
///
/// # Errors
///
/// Returns an error if `src` and `dst` do not have the same size.
pub fn separable_filter(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    kernel_x: &[f32],
    kernel_y: &[f32],
    border: BorderMode,
    cval: f32,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    if src.is_empty() {
        return Ok(());
    }

    let (rows, cols) = (src.rows(), src.cols());
    let mut temp = vec![0.0f32; src.as_slice().len()];

    correlate1d(
        src.as_slice(),
        &mut temp,
        rows,
        cols,
        kernel_y,
        Axis::Vertical,
        border,
        cval,
    );
    correlate1d(
        &temp,
        dst.as_slice_mut(),
        rows,
        cols,
        kernel_x,
        Axis::Horizontal,
        border,
        cval,
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use limen_image::ImageSize;

    #[test]
    fn test_correlate1d_horizontal_reflect() {
        let src = [1.0f32, 2.0, 3.0, 4.0];
        let mut dst = [0.0f32; 4];
        correlate1d(
            &src,
            &mut dst,
            1,
            4,
            &[1.0, 1.0, 1.0],
            Axis::Horizontal,
            BorderMode::Reflect,
            0.0,
        );
        // 1 1 2 3 4 4
        assert_eq!(dst, [4.0, 6.0, 9.0, 11.0]);
    }

    #[test]
    fn test_correlate1d_vertical_constant() {
        let src = [1.0f32, 2.0, 3.0];
        let mut dst = [0.0f32; 3];
        correlate1d(
            &src,
            &mut dst,
            3,
            1,
            &[1.0, 1.0, 1.0],
            Axis::Vertical,
            BorderMode::Constant,
            10.0,
        );
        assert_eq!(dst, [13.0, 6.0, 15.0]);
    }

    #[test]
    fn test_separable_filter_identity() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 3,
            height: 2,
        };
        let src = Image::<f32, 1>::new(size, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0])?;
        let mut dst = Image::<f32, 1>::from_size_val(size, 0.0)?;
        separable_filter(&src, &mut dst, &[1.0], &[1.0], BorderMode::Wrap, 0.0)?;
        assert_eq!(dst.as_slice(), src.as_slice());
        Ok(())
    }

    #[test]
    fn test_separable_filter_size_mismatch() -> Result<(), ImageError> {
        let src = Image::<f32, 1>::from_size_val([3, 2].into(), 0.0)?;
        let mut dst = Image::<f32, 1>::from_size_val([2, 3].into(), 0.0)?;
        let res = separable_filter(&src, &mut dst, &[1.0], &[1.0], BorderMode::Reflect, 0.0);
        assert_eq!(res, Err(ImageError::InvalidImageSize(3, 2, 2, 3)));
        Ok(())
    }
}
