use glam::DVec3;
use macroquad::color::{Color, GREEN, RED, WHITE, YELLOW};
use macroquad::math::{vec3, Vec3};
use macroquad::models::draw_line_3d;

use physics::Engine;

// macroquad carries its own glam, so bridge by components
fn mq(v: DVec3) -> Vec3 {
    vec3(v.x as f32, v.y as f32, v.z as f32)
}

pub fn draw_vec_line(from: DVec3, to: DVec3, color: Color) {
    draw_line_3d(mq(from), mq(to), color);
}

pub trait Draw {
    fn draw(&self);
}

impl Draw for Engine {
    fn draw(&self) {
        for body in self.body_views() {
            let color = if body.inv_mass == 0. { GREEN } else { WHITE };
            for (from, to) in body.world_edges() {
                draw_vec_line(from, to, color);
            }
        }

        // contacts of the previous step: point markers plus their normals
        for contact in self.contact_views() {
            let color = if contact.vertex_face { RED } else { YELLOW };
            draw_vec_line(contact.p, contact.p + 0.5 * contact.n, color);
        }
    }
}
