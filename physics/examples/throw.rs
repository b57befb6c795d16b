use macroquad::color::BLACK;
use macroquad::input::{is_key_pressed, KeyCode};
use macroquad::window::{clear_background, next_frame};
use physics::scenarios::Throw;
use physics::Engine;

mod shared;

#[macroquad::main("throw")]
async fn main() {
    shared::setup();
    let mut engine = Engine::new(Box::new(Throw::default()));
    engine.init();
    engine.run = true;

    loop {
        if is_key_pressed(KeyCode::Backspace) {
            engine.reset();
        }
        engine.update().expect("simulation step failed");

        use shared::draw::Draw;
        clear_background(BLACK);
        shared::look_at_scene();
        engine.draw();
        next_frame().await;
    }
}
