use gazecue_core::StimulusRole;
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Stroke, Transform};

fn skin() -> Color {
    Color::from_rgba8(231, 205, 178, 255)
}

fn outline() -> Color {
    Color::from_rgba8(52, 46, 42, 255)
}

fn white() -> Color {
    Color::from_rgba8(255, 255, 255, 255)
}

fn black() -> Color {
    Color::from_rgba8(0, 0, 0, 255)
}

fn fill_circle(pm: &mut Pixmap, cx: f32, cy: f32, r: f32, color: Color) {
    let mut pb = PathBuilder::new();
    pb.push_circle(cx, cy, r);
    let mut paint = Paint::default();
    paint.anti_alias = true;
    paint.set_color(color);
    pm.fill_path(
        &pb.finish().unwrap(),
        &paint,
        FillRule::Winding,
        Transform::identity(),
        None,
    );
}

fn stroke_circle(pm: &mut Pixmap, cx: f32, cy: f32, r: f32, width: f32, color: Color) {
    let mut pb = PathBuilder::new();
    pb.push_circle(cx, cy, r);
    let mut paint = Paint::default();
    paint.anti_alias = true;
    paint.set_color(color);
    pm.stroke_path(
        &pb.finish().unwrap(),
        &paint,
        &Stroke {
            width,
            ..Stroke::default()
        },
        Transform::identity(),
        None,
    );
}

fn stroke_segment(pm: &mut Pixmap, from: (f32, f32), to: (f32, f32), width: f32, color: Color) {
    let mut pb = PathBuilder::new();
    pb.move_to(from.0, from.1);
    pb.line_to(to.0, to.1);
    let mut paint = Paint::default();
    paint.anti_alias = true;
    paint.set_color(color);
    pm.stroke_path(
        &pb.finish().unwrap(),
        &paint,
        &Stroke {
            width,
            ..Stroke::default()
        },
        Transform::identity(),
        None,
    );
}

fn stroke_smile(pm: &mut Pixmap, cx: f32, y: f32, half_width: f32, depth: f32, width: f32) {
    let mut pb = PathBuilder::new();
    pb.move_to(cx - half_width, y);
    pb.quad_to(cx, y + depth, cx + half_width, y);
    let mut paint = Paint::default();
    paint.anti_alias = true;
    paint.set_color(outline());
    pm.stroke_path(
        &pb.finish().unwrap(),
        &paint,
        &Stroke {
            width,
            ..Stroke::default()
        },
        Transform::identity(),
        None,
    );
}

/// Draw one schematic face sprite.
///
/// Prior identities differ in mouth and eyebrows; gaze faces convey
/// direction through the pupil offset alone.
fn face_sprite(role: StimulusRole, size: u32) -> Pixmap {
    let mut pm = Pixmap::new(size, size).unwrap();
    let s = size as f32;
    let c = s * 0.5;
    let head_r = s * 0.44;
    let line = (s * 0.014).max(1.5);

    fill_circle(&mut pm, c, c, head_r, skin());
    stroke_circle(&mut pm, c, c, head_r, line, outline());

    // Eyes
    let eye_dx = head_r * 0.42;
    let eye_y = c - head_r * 0.18;
    let eye_r = head_r * 0.20;
    let pupil_r = eye_r * 0.45;
    let pupil_shift = match role {
        StimulusRole::GazeLeft => -eye_r * 0.52,
        StimulusRole::GazeRight => eye_r * 0.52,
        _ => 0.0,
    };
    for dx in [-eye_dx, eye_dx] {
        let ex = c + dx;
        fill_circle(&mut pm, ex, eye_y, eye_r, white());
        stroke_circle(&mut pm, ex, eye_y, eye_r, line * 0.8, outline());
        fill_circle(&mut pm, ex + pupil_shift, eye_y, pupil_r, black());
    }

    // Mouth, plus eyebrows for the second identity
    let mouth_y = c + head_r * 0.45;
    let mouth_w = head_r * 0.38;
    match role {
        StimulusRole::PriorOne => {
            stroke_smile(&mut pm, c, mouth_y, mouth_w, head_r * 0.22, line);
        }
        StimulusRole::PriorTwo => {
            stroke_segment(
                &mut pm,
                (c - mouth_w, mouth_y),
                (c + mouth_w, mouth_y),
                line,
                outline(),
            );
            let brow_y = eye_y - eye_r * 1.8;
            for dx in [-eye_dx, eye_dx] {
                stroke_segment(
                    &mut pm,
                    (c + dx - eye_r, brow_y),
                    (c + dx + eye_r, brow_y),
                    line,
                    outline(),
                );
            }
        }
        StimulusRole::GazeLeft | StimulusRole::GazeRight => {
            stroke_segment(
                &mut pm,
                (c - mouth_w * 0.7, mouth_y),
                (c + mouth_w * 0.7, mouth_y),
                line,
                outline(),
            );
        }
    }

    pm
}

fn fixation_sprite(size: u32) -> Pixmap {
    let mut pm = Pixmap::new(size, size).unwrap();
    let s = size as f32;
    let bar = (s * 0.05).max(2.0);
    let mut paint = Paint::default();
    paint.anti_alias = false;
    paint.set_color(white());
    let h = tiny_skia::Rect::from_xywh(0.0, (s - bar) * 0.5, s, bar).unwrap();
    pm.fill_rect(h, &paint, Transform::identity(), None);
    let v = tiny_skia::Rect::from_xywh((s - bar) * 0.5, 0.0, bar, s).unwrap();
    pm.fill_rect(v, &paint, Transform::identity(), None);
    pm
}

fn target_sprite(radius: f32, stroke: f32) -> Pixmap {
    let size = ((radius + stroke) * 2.0).ceil() as u32 + 2;
    let mut pm = Pixmap::new(size, size).unwrap();
    let c = size as f32 * 0.5;
    fill_circle(&mut pm, c, c, radius, white());
    stroke_circle(&mut pm, c, c, radius, stroke, black());
    pm
}

/// Fixed stimulus-role-to-sprite mapping, resolved once at startup.
pub struct SpriteBank {
    faces: [Pixmap; 4],
    fixation: Pixmap,
    target: Pixmap,
}

impl SpriteBank {
    /// Sprite geometry is derived from the frame height so the task
    /// keeps its proportions across DPI scale factors (600 px reference).
    pub fn new(frame_height: u32) -> Self {
        let scale = frame_height as f32 / 600.0;
        let face_size = ((240.0 * scale) as u32).max(8);
        let fixation_size = ((40.0 * scale) as u32).max(4);

        Self {
            faces: [
                face_sprite(StimulusRole::PriorOne, face_size),
                face_sprite(StimulusRole::PriorTwo, face_size),
                face_sprite(StimulusRole::GazeLeft, face_size),
                face_sprite(StimulusRole::GazeRight, face_size),
            ],
            fixation: fixation_sprite(fixation_size),
            target: target_sprite(25.0 * scale, 2.0 * scale.max(0.5)),
        }
    }

    pub fn face(&self, role: StimulusRole) -> &Pixmap {
        let index = match role {
            StimulusRole::PriorOne => 0,
            StimulusRole::PriorTwo => 1,
            StimulusRole::GazeLeft => 2,
            StimulusRole::GazeRight => 3,
        };
        &self.faces[index]
    }

    pub fn fixation(&self) -> &Pixmap {
        &self.fixation
    }

    pub fn target(&self) -> &Pixmap {
        &self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn center_pixel(pm: &Pixmap) -> tiny_skia::PremultipliedColorU8 {
        let x = pm.width() / 2;
        let y = pm.height() / 2;
        pm.pixels()[(y * pm.width() + x) as usize]
    }

    #[test]
    fn gaze_direction_changes_the_sprite() {
        let bank = SpriteBank::new(600);
        let left = bank.face(StimulusRole::GazeLeft);
        let right = bank.face(StimulusRole::GazeRight);
        assert_ne!(left.data(), right.data());
    }

    #[test]
    fn prior_identities_are_distinct() {
        let bank = SpriteBank::new(600);
        assert_ne!(
            bank.face(StimulusRole::PriorOne).data(),
            bank.face(StimulusRole::PriorTwo).data()
        );
    }

    #[test]
    fn fixation_cross_is_white_at_the_center() {
        let bank = SpriteBank::new(600);
        let px = center_pixel(bank.fixation());
        assert_eq!((px.red(), px.green(), px.blue()), (255, 255, 255));
    }

    #[test]
    fn target_is_a_filled_circle() {
        let bank = SpriteBank::new(600);
        let px = center_pixel(bank.target());
        assert_eq!((px.red(), px.green(), px.blue()), (255, 255, 255));
    }

    #[test]
    fn sprites_scale_with_frame_height() {
        let small = SpriteBank::new(600);
        let large = SpriteBank::new(1200);
        assert_eq!(
            small.face(StimulusRole::PriorOne).width() * 2,
            large.face(StimulusRole::PriorOne).width()
        );
    }
}
