use macroquad::camera::{set_camera, Camera3D};
use macroquad::math::vec3;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod draw;

pub fn setup() {
    let fmt_layer = fmt::layer().compact();
    let filter_layer = EnvFilter::from_default_env();
    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter_layer)
        .init();
}

pub fn look_at_scene() {
    set_camera(&Camera3D {
        position: vec3(-6., 6., 12.),
        up: vec3(0., 1., 0.),
        target: vec3(0., 1., 0.),
        ..Default::default()
    });
}
