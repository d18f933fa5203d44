//! Colony engine binary for the Habitat simulation.
//!
//! Wires the master clock to a small demonstration colony and runs it for
//! the configured number of sols.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `habitat-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Create the master clock from the time config
//! 4. Create the shift roster and spawn colonists onto it
//! 5. Offer the field survey to the colonists
//! 6. Set up the project board and the rover traverse
//! 7. Register listeners: roster, minds, project board, rover
//! 8. Run the simulation loop
//! 9. Log the result

mod callback;
mod colony;
mod error;
mod rover;
mod survey;

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use habitat_agents::{SharedMission, ShiftManager, Worker};
use habitat_core::config::SimulationConfig;
use habitat_core::{MasterClock, Simulation, runner};
use habitat_projects::{CountedStep, Project, ProjectBoard};
use habitat_types::{MarsTime, Stage};
use habitat_world::{Coordinates, StuckWatchdog};

use crate::callback::ColonyCallback;
use crate::colony::ColonistMind;
use crate::error::EngineError;
use crate::rover::RoverTraverse;
use crate::survey::FieldSurvey;

/// Config file looked up in the working directory.
const CONFIG_FILE: &str = "habitat-config.yaml";

/// Project board pulses are collapsed to this many millisols.
const BOARD_INTERVAL: f64 = 10.0;

/// Rover speed in kilometres per millisol.
const ROVER_SPEED: f64 = 0.05;

/// Application entry point for the colony engine.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation itself fails.
fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let (config, from_file) = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("habitat-engine starting");
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        from_file,
        max_sols = config.simulation.max_sols,
        colony_size = config.simulation.colony_size,
        "Configuration loaded"
    );

    // 3. Create the master clock.
    let clock = MasterClock::new(&config.time, config.world.earth_epoch)?;
    let start = clock.now();
    info!(start = %start, epoch = %clock.epoch(), "Master clock initialized");

    // 4. Roster and colonists.
    let pattern = config.shifts.pattern()?;
    let roster = Rc::new(RefCell::new(ShiftManager::new(
        &pattern,
        config.world.seed,
        start,
    )));
    let minds = colony::spawn_colonists(
        config.simulation.colony_size,
        config.world.seed,
        &config.agents,
        &roster,
    )?;
    info!(colonists = minds.len(), shifts = pattern.shifts().len(), "Colony populated");

    // 5. Field survey.
    let survey = Rc::new(RefCell::new(FieldSurvey::new("crater rim survey", 12, 3)));
    let shared = Rc::clone(&survey) as SharedMission;
    offer_survey(&minds, &shared);

    // 6. Project board and rover.
    let board = Rc::new(RefCell::new(project_board(&minds)?));
    let watchdog = StuckWatchdog::new(config.watchdog.clone())?;
    let rover = Rc::new(RefCell::new(rover_traverse(watchdog, &start)));

    // 7. Register listeners; the roster goes first so every mind sees the
    //    shift status of the current pulse.
    let mut sim = Simulation::new(clock);
    sim.dispatcher.register("roster", Rc::clone(&roster));
    for mind in &minds {
        let name = mind.borrow().worker().name().to_owned();
        sim.dispatcher.register(name, Rc::clone(mind));
    }
    sim.dispatcher.register_throttled("project board", Rc::clone(&board), BOARD_INTERVAL);
    sim.dispatcher.register("rover", Rc::clone(&rover));
    info!(listeners = sim.dispatcher.len(), "Listeners registered, entering pulse loop");

    // 8. Run the simulation.
    let mut callback = ColonyCallback::new(roster, board, rover, survey, minds);
    let result = runner::run_simulation(&mut sim, &config.simulation, &mut callback)?;

    // 9. Log results.
    runner::log_simulation_end(&result);
    info!(
        end_reason = ?result.end_reason,
        total_pulses = result.total_pulses,
        sols_reported = callback.sols_reported(),
        "habitat-engine shutdown complete"
    );

    Ok(())
}

/// Load the simulation configuration from [`CONFIG_FILE`].
///
/// Returns the config and whether it came from the file.
fn load_config() -> Result<(SimulationConfig, bool), EngineError> {
    let config_path = Path::new(CONFIG_FILE);
    if config_path.exists() {
        Ok((SimulationConfig::from_file(config_path)?, true))
    } else {
        let mut config = SimulationConfig::default();
        config.apply_env_overrides();
        Ok((config, false))
    }
}

/// Offer `survey` to every colonist until its crew is full.
fn offer_survey(minds: &[ColonistMind], survey: &SharedMission) {
    for mind in minds {
        let mut mind = mind.borrow_mut();
        match mind.offer_mission(Rc::clone(survey)) {
            Ok(true) => info!(worker = mind.worker().name(), "Joined the survey"),
            Ok(false) => {}
            Err(error) => {
                debug!(worker = mind.worker().name(), %error, "Survey offer declined");
            }
        }
    }
}

/// The colony's construction projects, crewed by every colonist.
fn project_board(minds: &[ColonistMind]) -> Result<ProjectBoard<String>, EngineError> {
    let mut board = ProjectBoard::new("main site");
    for mind in minds {
        board.add_crew(mind.borrow().worker().name().to_owned());
    }

    let mut greenhouse = Project::new("greenhouse");
    for (stage, description, work) in [
        (Stage::Preparation, "level the footprint", 60),
        (Stage::Active, "raise the frame", 300),
        (Stage::Active, "pressurise the dome", 240),
        (Stage::Closedown, "stow the tools", 60),
    ] {
        greenhouse.add_step(Box::new(CountedStep::new(stage, description, work)?))?;
    }
    board.add_project(greenhouse);

    let mut shielding = Project::new("regolith shielding");
    for (stage, description, work) in [
        (Stage::Preparation, "stage the excavator", 120),
        (Stage::Active, "bank the regolith", 3000),
    ] {
        shielding.add_step(Box::new(CountedStep::new(stage, description, work)?))?;
    }
    board.add_project(shielding);

    Ok(board)
}

/// A rover loop east of the base, caught by a dust storm on its second sol.
fn rover_traverse(watchdog: StuckWatchdog, start: &MarsTime) -> RoverTraverse {
    let home = Coordinates::from_degrees(18.4, 77.5);
    let waypoints = [
        Coordinates::from_degrees(18.6, 78.0),
        Coordinates::from_degrees(18.2, 78.6),
        Coordinates::from_degrees(17.9, 78.1),
    ];
    let storm_from = start.add_millisols(1200.0);
    let storm_until = start.add_millisols(1600.0);
    RoverTraverse::new("rover", home, waypoints, ROVER_SPEED, watchdog)
        .with_storm(&storm_from, &storm_until)
}
