//! Grenade Grid headless runner
//!
//! Plays an autoplay session on the fixed timestep and prints the final grid.

use std::error::Error;
use std::fmt::Write as _;
use std::path::PathBuf;

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use grenade_grid::{Settings, SettingsError};
use grenade_grid::consts::*;
use grenade_grid::sim::grid::{TileCoord, is_shifted_row};
use grenade_grid::sim::{GamePhase, GameState, TickInput, TileKind, tick};

/// Frame delta the runner pretends to render at
const FRAME_DT: f32 = 1.0 / 60.0;
/// Frames allowed for one shot to resolve before giving up
const MAX_FRAMES_PER_SHOT: u32 = 10_000;

#[derive(Debug, Parser)]
#[command(name = "grenade-grid", about = "Headless grenade grid autoplay")]
struct Args {
    /// Run seed
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// JSON settings file
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Maximum shots to fire
    #[arg(long, default_value_t = 50)]
    shots: u32,
    /// Print the final grid as JSON instead of ASCII
    #[arg(long)]
    json: bool,
}

/// Fixed-timestep driver around the simulation
struct Game {
    state: GameState,
    accumulator: f32,
    input: TickInput,
}

impl Game {
    fn new(settings: Settings, seed: u64) -> Result<Self, SettingsError> {
        Ok(Self {
            state: GameState::new(settings, seed)?,
            accumulator: 0.0,
            input: TickInput::default(),
        })
    }

    /// Run simulation ticks for one rendered frame
    fn update(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.state, &self.input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.shoot = false;
            self.input.new_game = false;
        }
    }

    fn settled(&self) -> bool {
        matches!(self.state.phase, GamePhase::Ready | GamePhase::GameOver)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    log::info!("Grenade Grid (headless) starting, seed {}", args.seed);

    let mut game = Game::new(settings, args.seed)?;
    let mut aim_rng = Pcg32::seed_from_u64(args.seed.wrapping_add(0x9E37_79B9_7F4A_7C15));

    // First frame leaves the Initial phase
    game.update(FRAME_DT);

    let mut fired = 0;
    while fired < args.shots && game.state.phase != GamePhase::GameOver {
        game.input.aim_angle = Some(aim_rng.random_range(AIM_MIN_DEGREES..=AIM_MAX_DEGREES));
        game.input.shoot = true;
        game.update(FRAME_DT);
        fired += 1;

        let mut frames = 0;
        while !game.settled() && frames < MAX_FRAMES_PER_SHOT {
            game.update(FRAME_DT);
            frames += 1;
        }
        if !game.settled() {
            log::warn!("Shot {} did not resolve after {} frames", fired, frames);
            break;
        }

        let occupied = game.state.grid.iter().filter(|t| !t.kind.is_empty()).count();
        log::info!(
            "Shot {} at {:.1}°: {:?}, {} tiles on the grid",
            fired,
            game.state.launcher.angle,
            game.state.phase,
            occupied
        );
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&game.state.grid)?);
    } else {
        print!("{}", render_ascii(&game.state));
    }
    println!(
        "{} shots fired, {:?}, next color {}",
        fired, game.state.phase, game.state.launcher.next_color
    );

    Ok(())
}

/// Text view of the grid with the row stagger
fn render_ascii(state: &GameState) -> String {
    let grid = &state.grid;
    let mut out = String::new();
    for row in 0..grid.rows() {
        if is_shifted_row(row as i64, state.row_offset) {
            out.push(' ');
        }
        for column in 0..grid.columns() {
            let symbol = match grid.kind(TileCoord::new(column, row)) {
                TileKind::Empty => '.',
                TileKind::Blocked => '#',
                TileKind::Color(c) => char::from_digit(c as u32 % 36, 36).unwrap_or('?'),
            };
            let _ = write!(out, "{symbol} ");
        }
        out.push('\n');
    }
    out
}
