use macroquad::color::BLACK;
use macroquad::input::{is_key_pressed, KeyCode};
use macroquad::window::{clear_background, next_frame};
use physics::scenarios::RandomDrop;
use physics::Engine;

mod shared;

struct GameState {
    engine: Engine,
}

impl GameState {
    fn setup(&mut self) {
        self.engine.init();
        self.engine.run = true;
    }

    fn update(&mut self) {
        // space pauses, right arrow steps once, backspace resets
        if is_key_pressed(KeyCode::Space) {
            self.engine.toggle_run();
        }
        if is_key_pressed(KeyCode::Right) {
            self.engine.ask_to_step_once();
        }
        if is_key_pressed(KeyCode::Backspace) {
            self.engine.reset();
        }

        self.engine.update().expect("simulation step failed");
    }

    fn render(&self) {
        use shared::draw::Draw;
        clear_background(BLACK);
        shared::look_at_scene();
        self.engine.draw();
    }
}

#[macroquad::main("tumble")]
async fn main() {
    shared::setup();
    let mut state = GameState {
        engine: Engine::new(Box::new(RandomDrop::default())),
    };
    state.setup();

    loop {
        state.update();
        state.render();
        next_frame().await;
    }
}
