use crate::app::{Camera2D, Vec2};

/// Region of the canvas the world is drawn into, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub origin_x: i32,
    pub origin_y: i32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn contains_screen(&self, x: i32, y: i32) -> bool {
        x >= self.origin_x
            && y >= self.origin_y
            && x < self.origin_x + self.width as i32
            && y < self.origin_y + self.height as i32
    }
}

pub fn world_to_screen(world: Vec2, camera: &Camera2D, viewport: Viewport) -> (i32, i32) {
    let x = world.x - camera.position.x + viewport.origin_x as f32;
    let y = world.y - camera.position.y + viewport.origin_y as f32;
    (x.round() as i32, y.round() as i32)
}

pub fn screen_to_world(screen: Vec2, camera: &Camera2D, viewport: Viewport) -> Vec2 {
    Vec2 {
        x: screen.x - viewport.origin_x as f32 + camera.position.x,
        y: screen.y - viewport.origin_y as f32 + camera.position.y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Viewport = Viewport {
        origin_x: 0,
        origin_y: 16,
        width: 320,
        height: 240,
    };

    #[test]
    fn camera_origin_maps_to_viewport_origin() {
        let camera = Camera2D::default();
        assert_eq!(world_to_screen(Vec2::ZERO, &camera, VIEWPORT), (0, 16));
    }

    #[test]
    fn camera_offset_shifts_screen_position() {
        let camera = Camera2D {
            position: Vec2 { x: 320.0, y: 240.0 },
        };
        let (x, y) = world_to_screen(Vec2 { x: 330.5, y: 250.0 }, &camera, VIEWPORT);
        assert_eq!((x, y), (11, 26));
    }

    #[test]
    fn screen_to_world_inverts_world_to_screen() {
        let camera = Camera2D {
            position: Vec2 { x: 640.0, y: 0.0 },
        };
        let world = screen_to_world(Vec2 { x: 100.0, y: 116.0 }, &camera, VIEWPORT);
        assert_eq!(world, Vec2 { x: 740.0, y: 100.0 });
        assert_eq!(world_to_screen(world, &camera, VIEWPORT), (100, 116));
    }

    #[test]
    fn viewport_containment_excludes_far_edges() {
        assert!(VIEWPORT.contains_screen(0, 16));
        assert!(VIEWPORT.contains_screen(319, 255));
        assert!(!VIEWPORT.contains_screen(320, 100));
        assert!(!VIEWPORT.contains_screen(10, 15));
    }
}
