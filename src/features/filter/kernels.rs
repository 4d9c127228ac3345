//! 固定参数的 5×5 滤波原语。
//!
//! 均值 / 高斯为可分离卷积（先横后纵，中间结果保留 f32，最后四舍五入并截断到 0..=255），
//! 边界采用 reflect-101（`gfedcb|abcdefgh|gfedcba`）；中值滤波边界为复制边缘像素。

use image::RgbImage;

/// 所有邻域滤波共用的窗口边长
pub const KERNEL_SIZE: usize = 5;

const CHANNELS: usize = 3;

/// σ 未指定时，奇数窗口 1..=7 使用固定的二项式系数表
const SMALL_GAUSSIAN_TABLES: [&[f32]; 4] = [
    &[1.0],
    &[0.25, 0.5, 0.25],
    &[0.0625, 0.25, 0.375, 0.25, 0.0625],
    &[0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125],
];

/// 由窗口边长推导高斯 σ（size=5 时为 1.1），只用于没有固定系数表的窗口
pub fn default_sigma(size: usize) -> f32 {
    0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// 归一化的一维高斯核。`sigma <= 0` 表示自动：小窗口查表，其余按窗口推导 σ。
pub fn gaussian_kernel(size: usize, sigma: f32) -> Vec<f32> {
    if sigma <= 0.0 {
        if size % 2 == 1 && size <= 7 {
            return SMALL_GAUSSIAN_TABLES[size / 2].to_vec();
        }
        return gaussian_kernel(size, default_sigma(size));
    }
    let center = (size / 2) as f32;
    let denom = 2.0 * sigma * sigma;
    let raw: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / denom).exp()
        })
        .collect();
    let sum: f32 = raw.iter().sum();
    raw.into_iter().map(|w| w / sum).collect()
}

/// 归一化的一维均值核
pub fn box_kernel(size: usize) -> Vec<f32> {
    vec![1.0 / size as f32; size]
}

/// reflect-101 边界映射；长度为 1 时退化为复制。
fn reflect_101(mut i: i64, len: i64) -> usize {
    if len == 1 {
        return 0;
    }
    while i < 0 || i >= len {
        if i < 0 {
            i = -i;
        }
        if i >= len {
            i = 2 * len - 2 - i;
        }
    }
    i as usize
}

fn to_sample(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// 同一个一维核分别沿 x、y 方向各做一次卷积
pub fn convolve_separable(src: &RgbImage, kernel: &[f32]) -> RgbImage {
    let (width, height) = src.dimensions();
    if width == 0 || height == 0 {
        return src.clone();
    }
    let (w, h) = (width as usize, height as usize);
    let radius = (kernel.len() / 2) as i64;
    let stride = w * CHANNELS;
    let input = src.as_raw();

    let mut horizontal = vec![0f32; input.len()];
    for y in 0..h {
        let row = y * stride;
        for x in 0..w {
            let mut acc = [0f32; CHANNELS];
            for (k, weight) in kernel.iter().enumerate() {
                let sx = reflect_101(x as i64 + k as i64 - radius, w as i64);
                let px = &input[row + sx * CHANNELS..row + sx * CHANNELS + CHANNELS];
                for (a, &v) in acc.iter_mut().zip(px) {
                    *a += weight * v as f32;
                }
            }
            let at = row + x * CHANNELS;
            horizontal[at..at + CHANNELS].copy_from_slice(&acc);
        }
    }

    let mut out = vec![0u8; input.len()];
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0f32; CHANNELS];
            for (k, weight) in kernel.iter().enumerate() {
                let sy = reflect_101(y as i64 + k as i64 - radius, h as i64);
                let at = sy * stride + x * CHANNELS;
                for (a, &v) in acc.iter_mut().zip(&horizontal[at..at + CHANNELS]) {
                    *a += weight * v;
                }
            }
            let at = y * stride + x * CHANNELS;
            for (o, a) in out[at..at + CHANNELS].iter_mut().zip(acc) {
                *o = to_sample(a);
            }
        }
    }

    // 尺寸与缓冲区长度一致，构造不会失败
    RgbImage::from_raw(width, height, out).unwrap_or_else(|| src.clone())
}

/// 5×5 均值模糊
pub fn mean_blur(src: &RgbImage) -> RgbImage {
    convolve_separable(src, &box_kernel(KERNEL_SIZE))
}

/// 5×5 高斯模糊，σ 自动（系数 `[1, 4, 6, 4, 1] / 16`）
pub fn gaussian_blur(src: &RgbImage) -> RgbImage {
    let kernel = gaussian_kernel(KERNEL_SIZE, 0.0);
    convolve_separable(src, &kernel)
}

/// 5×5 中值滤波
pub fn median_blur(src: &RgbImage) -> RgbImage {
    let radius = (KERNEL_SIZE / 2) as u32;
    imageproc::filter::median_filter(src, radius, radius)
}

/// 逐通道取反（255 - v）
pub fn negative(src: &RgbImage) -> RgbImage {
    let mut out = src.clone();
    image::imageops::invert(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| {
            Rgb([(x * 13 % 256) as u8, (y * 29 % 256) as u8, ((x + y) * 7 % 256) as u8])
        })
    }

    #[test]
    fn gaussian_sigma_matches_kernel_size() {
        assert!((default_sigma(5) - 1.1).abs() < 1e-6);
    }

    #[test]
    fn kernels_are_normalized_and_symmetric() {
        for kernel in [box_kernel(5), gaussian_kernel(5, 1.1)] {
            let sum: f32 = kernel.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5);
            assert_eq!(kernel[0], kernel[4]);
            assert_eq!(kernel[1], kernel[3]);
        }
        let g = gaussian_kernel(5, 1.1);
        assert!(g[2] > g[1] && g[1] > g[0]);
    }

    #[test]
    fn auto_sigma_uses_binomial_table_for_small_windows() {
        assert_eq!(gaussian_kernel(5, 0.0), vec![0.0625, 0.25, 0.375, 0.25, 0.0625]);
        assert_eq!(gaussian_kernel(3, -1.0), vec![0.25, 0.5, 0.25]);
        for size in [1, 3, 5, 7] {
            let sum: f32 = gaussian_kernel(size, 0.0).iter().sum();
            assert_eq!(sum, 1.0);
        }
        // 超出表格的窗口回退到按窗口推导的 σ
        assert_eq!(gaussian_kernel(9, 0.0), gaussian_kernel(9, default_sigma(9)));
    }

    #[test]
    fn gaussian_blur_spreads_a_spike_with_binomial_weights() {
        let mut img = RgbImage::new(9, 9);
        img.put_pixel(4, 4, Rgb([255, 255, 255]));
        let out = gaussian_blur(&img);
        let centre_row: Vec<u8> = (2..7).map(|x| out.get_pixel(x, 4)[0]).collect();
        assert_eq!(centre_row, vec![6, 24, 36, 24, 6]);
        let centre_col: Vec<u8> = (2..7).map(|y| out.get_pixel(4, y)[1]).collect();
        assert_eq!(centre_col, vec![6, 24, 36, 24, 6]);
        assert_eq!(out.get_pixel(2, 2), &Rgb([1, 1, 1]));
        assert_eq!(out.get_pixel(1, 4), &Rgb([0, 0, 0]));
    }

    #[test]
    fn reflect_101_does_not_repeat_edge() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-2, 5), 2);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(6, 5), 2);
        assert_eq!(reflect_101(3, 2), 1);
        assert_eq!(reflect_101(-2, 1), 0);
    }

    #[test]
    fn blurs_keep_uniform_regions() {
        let gray = RgbImage::from_pixel(10, 10, Rgb([128, 128, 128]));
        assert_eq!(mean_blur(&gray), gray);
        assert_eq!(gaussian_blur(&gray), gray);
        assert_eq!(median_blur(&gray), gray);
    }

    #[test]
    fn mean_blur_averages_a_single_spike() {
        // 中心点 250，其余为 0：5×5 均值 = 250 / 25 = 10
        let mut img = RgbImage::new(9, 9);
        img.put_pixel(4, 4, Rgb([250, 250, 250]));
        let out = mean_blur(&img);
        assert_eq!(out.get_pixel(4, 4), &Rgb([10, 10, 10]));
        assert_eq!(out.get_pixel(2, 2), &Rgb([10, 10, 10]));
        assert_eq!(out.get_pixel(1, 1), &Rgb([0, 0, 0]));
    }

    #[test]
    fn median_removes_isolated_noise() {
        let mut img = RgbImage::from_pixel(7, 7, Rgb([40, 40, 40]));
        img.put_pixel(3, 3, Rgb([255, 0, 255]));
        let out = median_blur(&img);
        assert_eq!(out.get_pixel(3, 3), &Rgb([40, 40, 40]));
    }

    #[test]
    fn filters_handle_images_smaller_than_kernel() {
        for (w, h) in [(1, 1), (2, 3), (4, 1)] {
            let img = gradient(w, h);
            assert_eq!(mean_blur(&img).dimensions(), (w, h));
            assert_eq!(gaussian_blur(&img).dimensions(), (w, h));
            assert_eq!(median_blur(&img).dimensions(), (w, h));
        }
        let single = RgbImage::from_pixel(1, 1, Rgb([9, 99, 199]));
        assert_eq!(gaussian_blur(&single), single);
    }

    #[test]
    fn negative_is_self_inverse() {
        let img = gradient(16, 11);
        let once = negative(&img);
        assert_eq!(once.get_pixel(1, 0), &Rgb([255 - 13, 255, 255 - 7]));
        assert_eq!(negative(&once), img);
    }
}
