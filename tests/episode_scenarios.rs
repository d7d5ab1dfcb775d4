use std::io::Write;

use qgrid::{
    AgentParams, Error, Grid, LearningMode, QTable, Session, SessionConfig,
    engine::step,
    observers::{JsonlObserver, MetricsObserver},
    ports::NoopObserver,
    q_learning::ForwardModel,
    session::FINISH_SAFETY_BOUND,
};
use rand::{SeedableRng, rngs::StdRng};
use tempfile::{NamedTempFile, tempdir};

fn four_by_four() -> Grid {
    Grid::builder(4, 4)
        .start(0, 0)
        .goal(3, 3)
        .wall(1, 1)
        .pit(2, 2)
        .build()
        .unwrap()
}

#[test]
fn greedy_agent_terminates_on_four_by_four() {
    let grid = four_by_four();
    let params = AgentParams::new(0.5, 0.9, 0.0, 0).unwrap();

    for seed in 0..10 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut table = QTable::initialize(grid.rows(), grid.cols());
        let mut model = ForwardModel::new();
        let mut state = grid.start();
        let mut terminated = false;

        for _ in 0..1000 {
            let outcome = step(state, &table, &model, &grid, &params, &mut rng);
            table = outcome.q_table;
            model = outcome.model;
            state = outcome.next_state;
            if outcome.terminal {
                terminated = true;
                break;
            }
        }

        assert!(terminated, "seed {seed} did not terminate");
        assert!(grid.is_goal(state) || grid.is_pit(state));
    }
}

#[test]
fn session_finish_episode_terminates_on_four_by_four() {
    let params = AgentParams::new(0.5, 0.9, 0.0, 0).unwrap();
    let config = SessionConfig::default()
        .with_grid(four_by_four())
        .with_params(params)
        .with_seed(42);
    let mut session = Session::new(config).unwrap();

    let outcome = session.finish_episode(&mut NoopObserver).unwrap();

    assert!(outcome.terminated);
    assert!(outcome.steps_taken <= FINISH_SAFETY_BOUND);
    assert_eq!(session.history().len(), 1);
}

#[test]
fn history_keeps_the_most_recent_hundred_episodes() {
    // One row, goal right next to the start: every episode is short.
    let grid = Grid::builder(1, 2).build().unwrap();
    let config = SessionConfig::default().with_grid(grid).with_seed(7);
    let mut session = Session::new(config).unwrap();

    for n in 1..=130 {
        let outcome = session.finish_episode(&mut NoopObserver).unwrap();
        assert!(outcome.terminated);
        assert_eq!(session.history().len(), n.min(100));
    }

    let episodes: Vec<usize> = session.history().iter().map(|stat| stat.episode).collect();
    assert_eq!(episodes.first(), Some(&31));
    assert_eq!(episodes.last(), Some(&130));
    assert_eq!(session.episodes_completed(), 130);
}

#[test]
fn model_based_mode_replays_twenty_times_per_step() {
    let grid = four_by_four();
    let mut free = Session::new(
        SessionConfig::default()
            .with_grid(grid.clone())
            .with_seed(3),
    )
    .unwrap();
    let mut dyna = Session::new(
        SessionConfig::default()
            .with_grid(grid)
            .with_mode(LearningMode::ModelBased)
            .with_seed(3),
    )
    .unwrap();
    let mut free_metrics = MetricsObserver::new();
    let mut dyna_metrics = MetricsObserver::new();

    free.finish_episode(&mut free_metrics).unwrap();
    dyna.finish_episode(&mut dyna_metrics).unwrap();

    assert_eq!(free_metrics.planning_updates, 0);
    // The model is written before planning, so every real step gets all 20 replays.
    assert_eq!(dyna_metrics.planning_updates, dyna_metrics.steps * 20);
}

#[test]
fn config_file_with_custom_grid() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "grid": {{
                "name": "Corridor",
                "rows": 1, "cols": 5,
                "start": {{"x": 0, "y": 0}},
                "goal": {{"x": 4, "y": 0}},
                "pits": [{{"x": 2, "y": 0}}]
            }},
            "params": {{"alpha": 0.5, "epsilon": 0.2}},
            "seed": 1
        }}"#
    )
    .unwrap();

    let config = SessionConfig::from_json_file(file.path()).unwrap();
    let session = Session::new(config).unwrap();

    assert_eq!(session.grid().name(), "Corridor");
    assert_eq!(session.grid().cols(), 5);
    assert_eq!(session.params().alpha, 0.5);
    assert_eq!(session.params().gamma, 0.9);
}

#[test]
fn config_file_with_overlapping_cells_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"grid": {{"rows": 3, "cols": 3, "start": {{"x": 0, "y": 0}},
                      "goal": {{"x": 2, "y": 2}}, "walls": [{{"x": 2, "y": 2}}]}}}}"#
    )
    .unwrap();

    let result = SessionConfig::from_json_file(file.path());

    assert!(matches!(result, Err(Error::Serialization(_))));
}

#[test]
fn missing_config_file_reports_io_error() {
    let dir = tempdir().unwrap();
    let result = SessionConfig::from_json_file(dir.path().join("absent.json"));
    assert!(matches!(result, Err(Error::Io { .. })));
}

#[test]
fn jsonl_observer_writes_a_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("steps.jsonl");
    let mut session = Session::new(SessionConfig::default().with_seed(21)).unwrap();

    let outcome = {
        let mut jsonl = JsonlObserver::create(&path).unwrap();
        let outcome = session.finish_episode(&mut jsonl).unwrap();
        jsonl.flush().unwrap();
        outcome
    };

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().count(), outcome.steps_taken);
    let first: serde_json::Value = serde_json::from_str(contents.lines().next().unwrap()).unwrap();
    assert_eq!(first["state"]["x"], 0);
    assert_eq!(first["state"]["y"], 0);
}
