use image::RgbaImage;

/// Half-open pixel span `(x0, y0, x1, y1)`.
pub type Span = (u32, u32, u32, u32);

/// Blend a straight-alpha `color` over a straight-alpha image region, clipped to the image.
pub fn fill_rect_over(img: &mut RgbaImage, span: Span, color: [u8; 4]) {
    let src = premultiply(color);
    if src[3] == 0 {
        return;
    }
    for (x, y) in clipped(img, span) {
        let px = img.get_pixel_mut(x, y);
        px.0 = unpremultiply(over(premultiply(px.0), src));
    }
}

/// Overwrite an image region with `color`, clipped to the image.
pub fn fill_rect_solid(img: &mut RgbaImage, span: Span, color: [u8; 4]) {
    for (x, y) in clipped(img, span) {
        img.put_pixel(x, y, image::Rgba(color));
    }
}

fn clipped(img: &RgbaImage, (x0, y0, x1, y1): Span) -> impl Iterator<Item = (u32, u32)> + use<> {
    let (w, h) = img.dimensions();
    let xs = x0.min(w)..x1.min(w);
    (y0.min(h)..y1.min(h)).flat_map(move |y| xs.clone().map(move |x| (x, y)))
}

/// Premultiplied source-over: `src + dst * (1 - src_alpha)` per channel.
fn over(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    let keep = 255 - u16::from(src[3]);
    std::array::from_fn(|i| src[i].saturating_add(scale(dst[i], keep)))
}

fn premultiply(px: [u8; 4]) -> [u8; 4] {
    let a = u16::from(px[3]);
    [scale(px[0], a), scale(px[1], a), scale(px[2], a), px[3]]
}

fn unpremultiply(px: [u8; 4]) -> [u8; 4] {
    let a = u32::from(px[3]);
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let un = |c: u8| ((u32::from(c) * 255 + a / 2) / a).min(255) as u8;
    [un(px[0]), un(px[1]), un(px[2]), px[3]]
}

/// `c * f / 255`, rounded.
fn scale(c: u8, f: u16) -> u8 {
    ((u32::from(c) * u32::from(f) + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/blend.rs"]
mod tests;
