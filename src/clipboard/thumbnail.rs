//! 缩略图生成
//!
//! 将剪贴板位图等比缩放到固定边长的正方形内（保持方向与宽高比，不裁剪）。
//! 优先使用 `fast_image_resize`，失败时回退 `image::imageops::resize`。

use bytes::Bytes;
use fast_image_resize as fr;
use image::imageops::FilterType;
use image::RgbaImage;

use super::item::{ImageBitmap, Thumbnail};

/// 计算放入 `side × side` 正方形后的目标尺寸（至少 1 像素）
pub(crate) fn fit_within_square(width: u32, height: u32, side: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }
    if width <= side && height <= side {
        return (width, height);
    }

    let scale = (side as f64 / width as f64).min(side as f64 / height as f64);
    let target_width = ((width as f64 * scale).round() as u32).clamp(1, side);
    let target_height = ((height as f64 * scale).round() as u32).clamp(1, side);
    (target_width, target_height)
}

/// 为位图生成缩略图；位图数据不合法时返回 `None`
pub(crate) fn make_thumbnail(bitmap: &ImageBitmap, side: u32) -> Option<Thumbnail> {
    if !bitmap.is_well_formed() {
        log::debug!(
            "位图数据长度异常，跳过缩略图 ({}x{}, {} bytes)",
            bitmap.width,
            bitmap.height,
            bitmap.rgba.len()
        );
        return None;
    }

    let width = u32::try_from(bitmap.width).ok()?;
    let height = u32::try_from(bitmap.height).ok()?;
    let (target_width, target_height) = fit_within_square(width, height, side);

    if (target_width, target_height) == (width, height) {
        return Some(Thumbnail {
            width,
            height,
            rgba: bitmap.rgba.clone(),
        });
    }

    let rgba = match resize_with_fast_image_resize(bitmap, width, height, target_width, target_height)
    {
        Ok(rgba) => rgba,
        Err(err) => {
            log::warn!("⚠️ fast_image_resize 缩放失败，回退 image::resize：{}", err);
            let src = RgbaImage::from_raw(width, height, bitmap.rgba.to_vec())?;
            image::imageops::resize(&src, target_width, target_height, FilterType::Triangle)
                .into_raw()
        }
    };

    Some(Thumbnail {
        width: target_width,
        height: target_height,
        rgba: Bytes::from(rgba),
    })
}

fn resize_with_fast_image_resize(
    bitmap: &ImageBitmap,
    width: u32,
    height: u32,
    target_width: u32,
    target_height: u32,
) -> Result<Vec<u8>, String> {
    let src_image = fr::images::Image::from_vec_u8(
        width,
        height,
        bitmap.rgba.to_vec(),
        fr::PixelType::U8x4,
    )
    .map_err(|e| format!("构建源图像缓冲失败：{}", e))?;

    let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

    let mut resizer = fr::Resizer::new();
    let options = fr::ResizeOptions::new()
        .resize_alg(fr::ResizeAlg::Convolution(fr::FilterType::Bilinear));

    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| format!("fast_image_resize 执行失败：{}", e))?;

    Ok(dst_image.into_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: usize, height: usize) -> ImageBitmap {
        ImageBitmap::new(width, height, vec![200_u8; width * height * 4])
    }

    #[test]
    fn fit_keeps_aspect_ratio() {
        assert_eq!(fit_within_square(640, 320, 32), (32, 16));
        assert_eq!(fit_within_square(100, 400, 32), (8, 32));
        assert_eq!(fit_within_square(1000, 1, 32), (32, 1));
    }

    #[test]
    fn fit_does_not_upscale() {
        assert_eq!(fit_within_square(10, 20, 32), (10, 20));
    }

    #[test]
    fn thumbnail_fits_in_square() {
        let thumb = make_thumbnail(&solid(128, 64), 32).expect("thumbnail");
        assert_eq!((thumb.width, thumb.height), (32, 16));
        assert_eq!(thumb.rgba.len(), 32 * 16 * 4);
    }

    #[test]
    fn small_image_is_reused_as_is() {
        let bitmap = solid(4, 4);
        let thumb = make_thumbnail(&bitmap, 32).expect("thumbnail");
        assert_eq!(thumb.rgba, bitmap.rgba);
    }

    #[test]
    fn malformed_bitmap_has_no_thumbnail() {
        let bitmap = ImageBitmap::new(4, 4, vec![0_u8; 3]);
        assert!(make_thumbnail(&bitmap, 32).is_none());
    }
}
