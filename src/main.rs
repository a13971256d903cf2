use std::fs::OpenOptions;
use std::process::exit;
use std::sync::mpsc::{channel, Sender};
use std::thread::{self, sleep};
use std::time::Duration;

use log::{error, info, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};
use simplelog::{Config as LogConfig, WriteLogger};

use gridsnake::config::Config;
use gridsnake::error::{Result, SnakeError};
use gridsnake::geometry::Direction;
use gridsnake::scene::{Canvas, Scene};
use gridsnake::snake::{Snake, Steering};
use gridsnake::term::{self, InputEvent, TermCanvas};

/// Everything the main loop can be woken up by.
enum Message {
    Input(InputEvent),
    GameOver { length: usize },
    RenderFailed(String),
    /// SIGINT or SIGTERM from outside the terminal.
    Signal,
}

/// What the main loop does after handling one message.
#[derive(Debug)]
enum Flow {
    Continue,
    Stop(Result<()>),
}

fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = term::setup() {
        let _ = term::restore();
        eprintln!("Could not start the terminal for snake.");
        error!("cannot start the terminal: {}", e);
        exit(1);
    }

    let res = play(&config);

    if let Err(e) = term::restore() {
        error!("cannot restore the terminal: {}", e);
    }

    match res {
        Ok(()) => {
            info!("stopping snake");
            exit(0);
        }
        Err(e) => {
            error!("quitting because of a fatal error: {}", e);
            eprintln!("{}", e);
            exit(1);
        }
    }
}

fn init_logging(config: &Config) {
    let file = OpenOptions::new().create(true).append(true).open(&config.log_file);

    let res = match file {
        Ok(file) => WriteLogger::init(config.log_level, LogConfig::default(), file).map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };

    // The game is still playable without a log
    if let Err(e) = res {
        eprintln!("Could not open log file {}: {}", config.log_file.display(), e);
    }
}

fn play(config: &Config) -> Result<()> {
    let bounds = term::grid_size()?;
    info!("starting snake on a {}x{} grid, tick {:?}", bounds.width, bounds.height, config.tick);

    let snake = Snake::new(bounds.center(), config.initial_length, Direction::Right);
    let steering = snake.steering();
    let scene = Scene::new(snake, bounds, TermCanvas::new(), StdRng::from_entropy())?;

    let (tx, rx) = channel();
    spawn_ticker(scene, config.tick, tx.clone());
    watch_signals(tx.clone());
    spawn_input(tx);

    // Neither thread is joined, the process takes them down on exit
    for msg in rx {
        if let Flow::Stop(res) = dispatch(msg, &steering) {
            return res;
        }
    }

    warn!("every event source hung up");
    Ok(())
}

fn dispatch(msg: Message, steering: &Steering) -> Flow {
    match msg {
        Message::Input(InputEvent::Turn(dir)) => steering.turn(dir),
        Message::Input(InputEvent::Quit) => return Flow::Stop(Ok(())),
        Message::Input(InputEvent::Interrupt) => {
            info!("interrupted from the keyboard");
            return Flow::Stop(Ok(()));
        }
        Message::Input(InputEvent::Resize(w, h)) => info!("size changed to {}x{}, the grid keeps its size", w, h),
        Message::Input(InputEvent::Fatal(e)) | Message::RenderFailed(e) => return Flow::Stop(Err(SnakeError::Render(e))),
        Message::GameOver { length } => info!("game over at length {}, waiting for the player to quit", length),
        Message::Signal => {
            info!("have signal, stopping");
            return Flow::Stop(Ok(()));
        }
    }

    Flow::Continue
}

/// Turns SIGINT/SIGTERM into a message so the terminal still gets restored.
fn watch_signals(tx: Sender<Message>) {
    let res = ctrlc::set_handler(move || {
        let _ = tx.send(Message::Signal);
    });

    if let Err(e) = res {
        warn!("{}", SnakeError::from(e));
    }
}

/// Draws the scene once per tick until the snake crashes or the terminal fails.
fn spawn_ticker<C, R>(mut scene: Scene<C, R>, tick: Duration, tx: Sender<Message>)
where
    C: Canvas + Send + 'static,
    R: Rng + Send + 'static,
{
    thread::spawn(move || loop {
        sleep(tick);

        let msg = match scene.draw() {
            Ok(false) => continue,
            Ok(true) => Message::GameOver { length: scene.snake().len() },
            Err(e) => Message::RenderFailed(e.to_string()),
        };
        let _ = tx.send(msg);
        break;
    });
}

fn spawn_input(tx: Sender<Message>) {
    thread::spawn(move || loop {
        if let Some(ev) = term::read_event() {
            let fatal = matches!(ev, InputEvent::Fatal(_));
            if tx.send(Message::Input(ev)).is_err() || fatal {
                break;
            }
        }
    });
}
