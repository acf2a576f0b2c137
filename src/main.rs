/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Context;
use env_logger::{Builder, Env, Target};

use config::{data_dir, GameConfig};
use sim::controller::GameController;
use sim::event::present;
use sim::generator::{MoveSource, RandomMoves};
use sim::record::{BackgroundRecorder, FileRecordStore, RecordStore};
use ui::gamepad::GamepadState;
use ui::input::{InputState, KEYS_QUIT, KEYS_START};
use ui::renderer::Renderer;
use ui::screen::Screen;
use ui::sound::{SoundCues, SoundEngine};

const FRAME_SLEEP: Duration = Duration::from_millis(5);
const LOG_FILE: &str = "tapecho.log";

/// Log to a file next to the record: the terminal belongs to the renderer.
/// `RUST_LOG` overrides the default level.
fn init_logging(data_dir: &Path) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    match File::create(data_dir.join(LOG_FILE)) {
        Ok(file) => {
            builder.target(Target::Pipe(Box::new(file)));
        }
        Err(_) => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    let _ = builder.try_init();
}

fn main() {
    let data_dir = data_dir();
    init_logging(&data_dir);
    log::info!("data directory: {}", data_dir.display());

    let config = GameConfig::load(&data_dir);
    let file_store = FileRecordStore::new(config.record_path.clone());
    log::info!("record file: {}", file_store.path().display());

    let mut game = GameController::new(
        RandomMoves::new(),
        BackgroundRecorder::spawn(file_store),
        config.timing.clone(),
    );

    let mut gamepad = GamepadState::new();
    gamepad.load_button_config(&config.gamepad);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let mut sound = SoundEngine::new();

    let result = game_loop(&mut game, &mut renderer, &mut gamepad, sound.as_mut(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        log::error!("game loop failed: {e:#}");
        eprintln!("Game error: {e:#}");
    }

    println!();
    println!("Thanks for playing Tap Echo!");
    println!("{}", game.personal_best_text());
}

fn game_loop<M: MoveSource, R: RecordStore>(
    game: &mut GameController<M, R>,
    renderer: &mut Renderer,
    gamepad: &mut GamepadState,
    mut sound: Option<&mut SoundEngine>,
    config: &GameConfig,
) -> anyhow::Result<()> {
    let mut input = InputState::new();
    let mut screen = Screen::new(config.timing.flash(), game.personal_best_text());
    let mut last_tick = Instant::now();

    loop {
        input.drain_events();
        gamepad.update();

        if input.ctrl_c_pressed() || input.any_pressed(KEYS_QUIT) || gamepad.quit_pressed() {
            if game.is_playing_back() {
                game.cancel_playback();
            }
            log::info!("quit requested");
            break;
        }

        if input.any_pressed(KEYS_START) || gamepad.start_pressed() {
            game.start();
        }

        let mut events = Vec::new();
        for pad in input.pad_presses().into_iter().chain(gamepad.pad_presses()) {
            events.extend(game.submit_move(pad.index()));
        }

        let now = Instant::now();
        let dt = now - last_tick;
        last_tick = now;
        events.extend(game.tick(dt));

        screen.tick(dt);
        present(&mut screen, &events);
        if let Some(engine) = sound.as_deref_mut() {
            present(&mut SoundCues(engine), &events);
        }
        screen.best_text = game.personal_best_text();

        renderer
            .render(&screen, game.state(), gamepad.connected)
            .context("terminal render failed")?;

        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}
