use image::imageops::FilterType;
use image::{DynamicImage, Rgb};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::widgets::Widget;

/// Paints an image into a terminal region using ▀ half-block cells, two
/// vertical pixels per cell. The image is scaled aspect-preserved so neither
/// dimension exceeds the region, then centered.
pub struct ArtworkView<'a> {
    image: &'a DynamicImage,
}

impl<'a> ArtworkView<'a> {
    pub fn new(image: &'a DynamicImage) -> Self {
        Self { image }
    }
}

impl Widget for ArtworkView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        // A cell is one pixel wide and two pixels tall.
        let max_w = area.width as u32;
        let max_h = area.height as u32 * 2;
        let scaled = self.image.resize(max_w, max_h, FilterType::Triangle);
        let rgb = scaled.to_rgb8();
        let (img_w, img_h) = rgb.dimensions();

        let cell_w = (img_w.min(max_w)) as u16;
        let cell_h = (((img_h + 1) / 2) as u16).min(area.height);
        let x0 = area.x + (area.width - cell_w) / 2;
        let y0 = area.y + (area.height - cell_h) / 2;

        for cy in 0..cell_h {
            for cx in 0..cell_w {
                let top = *rgb.get_pixel(cx as u32, cy as u32 * 2);
                let bottom_row = cy as u32 * 2 + 1;
                let bottom = if bottom_row < img_h {
                    *rgb.get_pixel(cx as u32, bottom_row)
                } else {
                    Rgb([0, 0, 0])
                };
                buf.get_mut(x0 + cx, y0 + cy)
                    .set_symbol("▀")
                    .set_fg(Color::Rgb(top[0], top[1], top[2]))
                    .set_bg(Color::Rgb(bottom[0], bottom[1], bottom[2]));
            }
        }
    }
}
