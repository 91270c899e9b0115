/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use config::GameConfig;
use sim::session::{Screen, Session};
use sim::step;
use ui::gamepad::GamepadState;
use ui::input::{InputState, KEYS_QUIT};
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();

    let mut session = Session::new(&config);
    let mut renderer = Renderer::new(config.theme.clone());

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut session, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Gem Runner!");
    println!("Final Score: {}", session.state.score);
}

fn game_loop(
    session: &mut Session,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);

    let mut last_frame = Instant::now();

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }
        // Q quits everywhere except mid-play, where it first drops to the
        // menu so a stray keypress can't throw away a run.
        if kb.any_pressed(KEYS_QUIT) || gp.cancel_pressed() {
            match session.screen {
                Screen::Playing => {
                    session.screen = Screen::Menu;
                    continue;
                }
                _ => break,
            }
        }

        // Variable timestep, clamped so a stalled frame can't launch the
        // player through geometry.
        let now = Instant::now();
        let dt = step::clamp_delta(
            now.duration_since(last_frame).as_secs_f32(),
            config.physics.max_frame_delta,
        );

        // Sub-millisecond frames carry no useful motion; render only.
        if dt >= 0.001 {
            last_frame = now;
            session.update(dt, &kb.snapshot(&gp));
        }
        renderer.render(session)?;

        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}
