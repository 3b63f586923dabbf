use argh::FromArgs;

use limen::image::{Image, ImageSize};
use limen::imgproc::{
    self,
    border::BorderMode,
    threshold::{LocalThresholdMethod, MethodParam},
};

#[derive(FromArgs)]
/// Binarize an unevenly lit synthetic page with a global and a local threshold
struct Args {
    /// the width of the image
    #[argh(option, default = "320")]
    width: usize,

    /// the height of the image
    #[argh(option, default = "240")]
    height: usize,

    /// the odd side of the local neighborhood
    #[argh(option, default = "15")]
    block_size: usize,

    /// the constant subtracted from the local statistic
    #[argh(option, default = "-4.0")]
    offset: f32,

    /// the local statistic: mean, gaussian or median
    #[argh(option, default = "String::from(\"gaussian\")")]
    method: String,

    /// the sigma of the gaussian method
    #[argh(option)]
    sigma: Option<f32>,

    /// the border mode: reflect, constant, nearest, mirror or wrap
    #[argh(option, default = "String::from(\"reflect\")")]
    border: String,
}

/// A page whose background brightens from left to right, with bright strokes every few rows.
fn synthetic_page(width: usize, height: usize) -> Result<Image<u8, 1>, limen::image::ImageError> {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let background = 40 + (180 * x / width.max(1)) as u8;
            let stroke = y % 12 < 3 && (x / 7) % 3 != 0;
            data.push(if stroke { background + 30 } else { background });
        }
    }
    Image::new(ImageSize { width, height }, data)
}

fn foreground_ratio(mask: &Image<u8, 1>) -> f64 {
    let foreground = mask.as_slice().iter().filter(|&&v| v > 0).count();
    foreground as f64 / mask.as_slice().len().max(1) as f64
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let border: BorderMode = args.border.parse()?;
    let method =
        LocalThresholdMethod::from_name(&args.method, args.sigma.map(MethodParam::Sigma))?;

    let image = synthetic_page(args.width, args.height)?;
    log::info!("generated a {} page", image.size());

    let hist = imgproc::histogram::histogram(&image, 256)?;
    println!(
        "histogram: {} bins from {} to {}",
        hist.len(),
        hist.bin_centers.first().copied().unwrap_or_default(),
        hist.bin_centers.last().copied().unwrap_or_default(),
    );

    // a single threshold cannot follow the illumination gradient
    let global = imgproc::threshold::threshold_otsu(&image, 256)?;
    let mut global_mask = Image::<u8, 1>::from_size_val(image.size(), 0)?;
    imgproc::threshold::threshold_binary(&image, &mut global_mask, global, 255)?;
    println!(
        "otsu threshold: {global}, foreground ratio {:.3}",
        foreground_ratio(&global_mask)
    );

    let map = imgproc::threshold::threshold_local(
        &image,
        args.block_size,
        &method,
        args.offset,
        border,
        0.0,
    )?;
    let mut local_mask = Image::<u8, 1>::from_size_val(image.size(), 0)?;
    imgproc::threshold::threshold_binary_map(&image, &map, &mut local_mask, 255)?;
    println!(
        "local {method:?} threshold with block {} and offset {}: foreground ratio {:.3}",
        args.block_size,
        args.offset,
        foreground_ratio(&local_mask)
    );

    Ok(())
}
