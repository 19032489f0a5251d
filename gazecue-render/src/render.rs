use ab_glyph::FontVec;
use anyhow::{Context, Result};
use bytemuck::{cast_slice, cast_slice_mut};
use gazecue_core::{Scene, Side, StimulusRole};
use tiny_skia::{Color, Pixmap};

use crate::sprites::SpriteBank;
use crate::text::render_text_block;

const INSTRUCTION_TEXT: &str = "Keep your eyes on the fixation cross.\n\
A face appears, then looks to the left or right side of the display,\n\
and a target circle follows on the left or the right.\n\
The gaze direction does not predict the target location.\n\
Judge the target side as fast and as accurately as possible.\n\
\n\
Practice first\n\
F = left    J = right\n\
Press space to start";

const TRANSITION_TEXT: &str = "Practice is over, the formal trials come next\n\
Press space to continue";

const REST_TEXT: &str = "Have a rest\n\
You can press space to continue";

const CLOSING_TEXT: &str = "The experiment is over\n\
Thank you!";

fn background() -> Color {
    Color::from_rgba8(128, 128, 128, 255)
}

fn text_color() -> Color {
    Color::from_rgba8(20, 20, 20, 255)
}

struct Screens {
    instruction: Pixmap,
    transition: Pixmap,
    rest: Pixmap,
    closing: Pixmap,
}

impl Screens {
    fn build(font: &FontVec, scale: f32) -> Self {
        let size = 24.0 * scale;
        Self {
            instruction: render_text_block(INSTRUCTION_TEXT, size, font, text_color()),
            transition: render_text_block(TRANSITION_TEXT, size, font, text_color()),
            rest: render_text_block(REST_TEXT, size, font, text_color()),
            closing: render_text_block(CLOSING_TEXT, size, font, text_color()),
        }
    }
}

/// Draws one `Scene` per frame onto an offscreen canvas and copies it
/// into the visible frame buffer. Every stimulus is a full-screen
/// replacing frame, so each render is a full clear plus a few blits of
/// sprites prerendered at initialization.
pub struct SceneRenderer {
    width: u32,
    height: u32,
    center: (f32, f32),
    font: FontVec,
    canvas: Pixmap,
    sprites: SpriteBank,
    screens: Screens,
}

impl SceneRenderer {
    pub fn new(width: u32, height: u32, font: FontVec) -> Result<Self> {
        let mut canvas = Pixmap::new(width, height).context("failed to allocate frame canvas")?;
        canvas.fill(background());
        let sprites = SpriteBank::new(height);
        let screens = Screens::build(&font, height as f32 / 600.0);
        Ok(Self {
            width,
            height,
            center: (width as f32 / 2.0, height as f32 / 2.0),
            font,
            canvas,
            sprites,
            screens,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.width = width;
        self.height = height;
        self.center = (width as f32 / 2.0, height as f32 / 2.0);
        self.canvas = Pixmap::new(width, height).context("failed to resize frame canvas")?;
        self.canvas.fill(background());
        self.sprites = SpriteBank::new(height);
        self.screens = Screens::build(&self.font, height as f32 / 600.0);
        Ok(())
    }

    /// Render `scene` and copy the canvas into `frame`
    /// (`width * height * 4` premultiplied RGBA bytes).
    pub fn render(&mut self, scene: &Scene, frame: &mut [u8]) {
        self.canvas.fill(background());
        let center = self.center;
        match *scene {
            Scene::Instruction => blit(&mut self.canvas, &self.screens.instruction, center),
            Scene::Transition => blit(&mut self.canvas, &self.screens.transition, center),
            Scene::Rest => blit(&mut self.canvas, &self.screens.rest, center),
            Scene::Closing => blit(&mut self.canvas, &self.screens.closing, center),
            Scene::Fixation => blit(&mut self.canvas, self.sprites.fixation(), center),
            Scene::Face(role) => blit(&mut self.canvas, self.sprites.face(role), center),
            Scene::Target { gaze, target } => {
                let target_pos = self.target_center(target);
                blit(
                    &mut self.canvas,
                    self.sprites.face(StimulusRole::gaze(gaze)),
                    center,
                );
                blit(&mut self.canvas, self.sprites.target(), target_pos);
            }
            Scene::Blank => {}
        }
        frame.copy_from_slice(self.canvas.data());
    }

    /// Target circle centers sit at ±300 px at the 800 px reference width
    fn target_center(&self, side: Side) -> (f32, f32) {
        let offset = self.width as f32 * 0.375;
        match side {
            Side::Left => (self.center.0 - offset, self.center.1),
            Side::Right => (self.center.0 + offset, self.center.1),
        }
    }
}

/// Blit a premultiplied sprite centered at `pos`, clipped to the canvas,
/// with a row-memcpy fast path for fully opaque regions.
fn blit(canvas: &mut Pixmap, sprite: &Pixmap, pos: (f32, f32)) {
    let (w, h) = (sprite.width() as usize, sprite.height() as usize);
    let (cw, ch) = (canvas.width() as usize, canvas.height() as usize);

    let x = (pos.0 - w as f32 * 0.5).floor() as i32;
    let y = (pos.1 - h as f32 * 0.5).floor() as i32;
    if x + w as i32 <= 0 || y + h as i32 <= 0 || x >= cw as i32 || y >= ch as i32 {
        return;
    }

    let dst_x = x.max(0) as usize;
    let dst_y = y.max(0) as usize;
    let src_x = (-x).max(0) as usize;
    let src_y = (-y).max(0) as usize;
    let copy_w = (w - src_x).min(cw - dst_x);
    let copy_h = (h - src_y).min(ch - dst_y);
    if copy_w == 0 || copy_h == 0 {
        return;
    }

    let src_data = sprite.data();
    let fully_opaque = (0..copy_h).all(|row| {
        let start = ((src_y + row) * w + src_x) * 4;
        src_data[start..start + copy_w * 4]
            .iter()
            .skip(3)
            .step_by(4)
            .all(|&a| a == 255)
    });

    let src_u32: &[u32] = cast_slice(src_data);
    let dst_u32: &mut [u32] = cast_slice_mut(canvas.data_mut());

    if fully_opaque {
        for row in 0..copy_h {
            let s = (src_y + row) * w + src_x;
            let d = (dst_y + row) * cw + dst_x;
            dst_u32[d..d + copy_w].copy_from_slice(&src_u32[s..s + copy_w]);
        }
    } else {
        // Premultiplied over, in u32 lanes.
        for row in 0..copy_h {
            let s0 = (src_y + row) * w + src_x;
            let d0 = (dst_y + row) * cw + dst_x;
            for i in 0..copy_w {
                let s = src_u32[s0 + i];
                let d = dst_u32[d0 + i];

                let sa = (s >> 24) & 0xFF;
                let inv = 255 - sa;
                let sr = s & 0xFF;
                let sg = (s >> 8) & 0xFF;
                let sb = (s >> 16) & 0xFF;
                let dr = d & 0xFF;
                let dg = (d >> 8) & 0xFF;
                let db = (d >> 16) & 0xFF;
                let da = (d >> 24) & 0xFF;

                let r = sr + (dr * inv + 127) / 255;
                let g = sg + (dg * inv + 127) / 255;
                let b = sb + (db * inv + 127) / 255;
                let a = sa + (da * inv + 127) / 255;
                dst_u32[d0 + i] = (a << 24) | (b << 16) | (g << 8) | r;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, color: Color) -> Pixmap {
        let mut pm = Pixmap::new(width, height).unwrap();
        pm.fill(color);
        pm
    }

    fn pixel(pm: &Pixmap, x: u32, y: u32) -> (u8, u8, u8, u8) {
        let px = pm.pixels()[(y * pm.width() + x) as usize];
        (px.red(), px.green(), px.blue(), px.alpha())
    }

    #[test]
    fn opaque_blit_replaces_the_destination() {
        let mut canvas = solid(10, 10, Color::from_rgba8(255, 0, 0, 255));
        let sprite = solid(4, 4, Color::from_rgba8(0, 255, 0, 255));
        blit(&mut canvas, &sprite, (5.0, 5.0));

        assert_eq!(pixel(&canvas, 5, 5), (0, 255, 0, 255));
        assert_eq!(pixel(&canvas, 0, 0), (255, 0, 0, 255));
        assert_eq!(pixel(&canvas, 9, 9), (255, 0, 0, 255));
    }

    #[test]
    fn blit_clips_at_the_canvas_edge() {
        let mut canvas = solid(10, 10, Color::from_rgba8(255, 0, 0, 255));
        let sprite = solid(6, 6, Color::from_rgba8(0, 0, 255, 255));
        blit(&mut canvas, &sprite, (0.0, 0.0));

        assert_eq!(pixel(&canvas, 0, 0), (0, 0, 255, 255));
        assert_eq!(pixel(&canvas, 5, 5), (255, 0, 0, 255));
    }

    #[test]
    fn fully_offscreen_blit_is_a_no_op() {
        let mut canvas = solid(10, 10, Color::from_rgba8(255, 0, 0, 255));
        let sprite = solid(4, 4, Color::from_rgba8(0, 255, 0, 255));
        blit(&mut canvas, &sprite, (-20.0, -20.0));
        assert_eq!(pixel(&canvas, 0, 0), (255, 0, 0, 255));
    }

    #[test]
    fn transparent_sprite_blends_over_the_destination() {
        let mut canvas = solid(10, 10, Color::from_rgba8(100, 100, 100, 255));
        let sprite = solid(4, 4, Color::from_rgba8(0, 0, 0, 0));
        blit(&mut canvas, &sprite, (5.0, 5.0));
        assert_eq!(pixel(&canvas, 5, 5), (100, 100, 100, 255));
    }
}
