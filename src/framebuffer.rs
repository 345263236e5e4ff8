use std::path::Path;

use cgmath::Vector3 as Vec3;
use rayon::prelude::*;

/// 清空后的深度，对应 NDC 的远平面
pub const FAR_DEPTH: f32 = 1.0;

#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    /// 0xAARRGGBB，可以直接交给 minifb
    pub data: Vec<u32>,
    pub depth: Vec<f32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        FrameBuffer {
            width,
            height,
            data: vec![0; width * height],
            depth: vec![FAR_DEPTH; width * height],
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.data = vec![0; width * height];
        self.depth = vec![FAR_DEPTH; width * height];
    }

    pub fn clear(&mut self, color: u32) {
        self.data.fill(color);
        self.depth.fill(FAR_DEPTH);
    }

    /// 写入一个像素，`depth_test` 为假时总是覆盖
    pub fn put_pixel(&mut self, x: usize, y: usize, color: u32, depth: f32, depth_test: bool) {
        if x < self.width && y < self.height {
            let idx = y * self.width + x;
            if !depth_test || depth < self.depth[idx] {
                self.data[idx] = color;
                self.depth[idx] = depth;
            }
        }
    }

    /// 提前做深度测试，避免为被遮挡的片元做着色
    pub fn depth_passes(&self, x: usize, y: usize, depth: f32) -> bool {
        x < self.width && y < self.height && depth < self.depth[y * self.width + x]
    }

    #[cfg(test)]
    pub fn get_pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.data[y * self.width + x])
    }

    pub fn ssaa(&self, factor: usize) -> Self {
        let factor = factor.max(1);
        let new_width = self.width / factor;
        let new_height = self.height / factor;
        let mut new_data = vec![0; new_width * new_height];
        let count = (factor * factor) as u32;

        // 每一行互不相干，可以并行
        new_data
            .par_chunks_mut(new_width.max(1))
            .enumerate()
            .for_each(|(y, row)| {
                for (x, out) in row.iter_mut().enumerate() {
                    let (mut a, mut r, mut g, mut b) = (0u32, 0u32, 0u32, 0u32);
                    for dy in 0..factor {
                        for dx in 0..factor {
                            let src_idx = (y * factor + dy) * self.width + x * factor + dx;
                            let color = self.data[src_idx];
                            a += (color >> 24) & 0xFF;
                            r += (color >> 16) & 0xFF;
                            g += (color >> 8) & 0xFF;
                            b += color & 0xFF;
                        }
                    }
                    *out = (a / count) << 24 | (r / count) << 16 | (g / count) << 8 | (b / count);
                }
            });

        Self {
            width: new_width,
            height: new_height,
            data: new_data,
            depth: vec![FAR_DEPTH; new_width * new_height],
        }
    }

    pub fn save_to_image(&self, filepath: &Path) -> Result<(), image::ImageError> {
        use image::{ImageBuffer, Rgba};

        let mut img = ImageBuffer::new(self.width as u32, self.height as u32);

        for y in 0..self.height {
            for x in 0..self.width {
                let color = self.data[y * self.width + x];
                let a = ((color >> 24) & 0xFF) as u8;
                let r = ((color >> 16) & 0xFF) as u8;
                let g = ((color >> 8) & 0xFF) as u8;
                let b = (color & 0xFF) as u8;

                img.put_pixel(x as u32, y as u32, Rgba([r, g, b, a]));
            }
        }

        img.save(filepath)
    }
}

/// [0, 1] 颜色转成不透明的 u32
pub fn pack_color(color: Vec3<f32>) -> u32 {
    let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0 + 0.5) as u32;
    0xFF000000 | to_byte(color.x) << 16 | to_byte(color.y) << 8 | to_byte(color.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: u32 = 0xFFFF0000;
    const BLUE: u32 = 0xFF0000FF;

    #[test]
    fn nearer_fragment_wins_with_depth_test() {
        let mut fb = FrameBuffer::new(4, 4);
        fb.put_pixel(1, 1, RED, 0.5, true);
        fb.put_pixel(1, 1, BLUE, 0.7, true);
        assert_eq!(fb.get_pixel(1, 1), Some(RED));
        fb.put_pixel(1, 1, BLUE, 0.2, true);
        assert_eq!(fb.get_pixel(1, 1), Some(BLUE));
    }

    #[test]
    fn later_fragment_wins_without_depth_test() {
        let mut fb = FrameBuffer::new(4, 4);
        fb.put_pixel(2, 3, RED, 0.1, false);
        fb.put_pixel(2, 3, BLUE, 0.9, false);
        assert_eq!(fb.get_pixel(2, 3), Some(BLUE));
    }

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut fb = FrameBuffer::new(2, 2);
        fb.put_pixel(5, 0, RED, 0.0, true);
        assert!(fb.data.iter().all(|&c| c == 0));
        assert_eq!(fb.get_pixel(5, 0), None);
    }

    #[test]
    fn clear_resets_color_and_depth() {
        let mut fb = FrameBuffer::new(3, 3);
        fb.put_pixel(0, 0, RED, 0.3, true);
        fb.clear(BLUE);
        assert!(fb.data.iter().all(|&c| c == BLUE));
        assert!(fb.depth.iter().all(|&d| d == FAR_DEPTH));
    }

    #[test]
    fn ssaa_averages_blocks() {
        let mut fb = FrameBuffer::new(4, 2);
        fb.clear(0xFF000000);
        fb.put_pixel(0, 0, 0xFFFFFFFF, 0.0, false);
        fb.put_pixel(1, 0, 0xFFFFFFFF, 0.0, false);
        let small = fb.ssaa(2);
        assert_eq!((small.width, small.height), (2, 1));
        assert_eq!(small.data[0], 0xFF7F7F7F);
        assert_eq!(small.data[1], 0xFF000000);
    }

    #[test]
    fn resize_reallocates_buffers() {
        let mut fb = FrameBuffer::new(2, 2);
        fb.resize(8, 5);
        assert_eq!(fb.data.len(), 40);
        assert_eq!(fb.depth.len(), 40);
    }

    #[test]
    fn pack_color_clamps_and_rounds() {
        assert_eq!(pack_color(Vec3::new(1.0, 0.0, 0.0)), RED);
        assert_eq!(pack_color(Vec3::new(2.0, -1.0, 0.5)), 0xFFFF0080);
    }

    #[test]
    fn saved_image_round_trips_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let mut fb = FrameBuffer::new(3, 2);
        fb.clear(BLUE);
        fb.put_pixel(2, 1, RED, 0.0, false);
        fb.save_to_image(&path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(2, 1).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 255, 255]);
    }
}
