//! Low-resolution copy of the background kept in step with terrain edits

use image::{Rgba, RgbaImage};

use crate::core::types::{Color, TRANSPARENT};

#[derive(Debug, Clone)]
pub struct Minimap {
    image: RgbaImage,
    scale: u32,
}

impl Minimap {
    /// Build a minimap by sampling every `scale`-th background pixel
    pub fn from_background(background: &RgbaImage, scale: u32) -> Self {
        let scale = scale.max(1);
        let w = background.width().div_ceil(scale).max(1);
        let h = background.height().div_ceil(scale).max(1);
        let mut image = RgbaImage::new(w, h);
        for (mx, my, px) in image.enumerate_pixels_mut() {
            let (bx, by) = (mx * scale, my * scale);
            if bx < background.width() && by < background.height() {
                *px = *background.get_pixel(bx, by);
            }
        }
        Self { image, scale }
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Mirror a changed level pixel. Only pixels on the sampling grid map to
    /// a minimap pixel.
    pub fn update(&mut self, x: u32, y: u32, color: Color) {
        if x % self.scale != 0 || y % self.scale != 0 {
            return;
        }
        let (mx, my) = (x / self.scale, y / self.scale);
        if mx < self.image.width() && my < self.image.height() {
            self.image.put_pixel(mx, my, Rgba(color));
        }
    }

    pub fn clear_pixel(&mut self, x: u32, y: u32) {
        self.update(x, y, TRANSPARENT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_background_grid() {
        let mut bg = RgbaImage::new(32, 16);
        bg.put_pixel(16, 0, Rgba([9, 9, 9, 255]));
        let minimap = Minimap::from_background(&bg, 16);
        assert_eq!(minimap.image().dimensions(), (2, 1));
        assert_eq!(minimap.image().get_pixel(1, 0).0, [9, 9, 9, 255]);
    }

    #[test]
    fn test_off_grid_update_ignored() {
        let bg = RgbaImage::new(32, 32);
        let mut minimap = Minimap::from_background(&bg, 16);
        minimap.update(17, 0, [1, 2, 3, 255]);
        assert_eq!(minimap.image().get_pixel(1, 0).0, TRANSPARENT);
        minimap.update(16, 16, [1, 2, 3, 255]);
        assert_eq!(minimap.image().get_pixel(1, 1).0, [1, 2, 3, 255]);
    }
}
