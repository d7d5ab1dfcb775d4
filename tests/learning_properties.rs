use qgrid::{
    AgentParams, QTable,
    engine::step,
    gridworld::{Action, Cell, GOAL_REWARD, Grid, PIT_REWARD, STEP_REWARD, small_grid, transition},
    q_learning::{ForwardModel, SelectionMethod, choose_action, plan},
};
use rand::{SeedableRng, rngs::StdRng};
use statrs::distribution::{ChiSquared, ContinuousCDF};

#[test]
fn full_exploration_is_uniform_over_actions() {
    let mut rng = StdRng::seed_from_u64(2024);
    let values = [5.0, -1.0, 0.0, 2.0];
    let draws = 40_000;
    let mut counts = [0usize; Action::COUNT];

    for _ in 0..draws {
        let choice = choose_action(&values, 1.0, &mut rng);
        assert_eq!(choice.method, SelectionMethod::Exploration);
        counts[choice.action.index()] += 1;
    }

    let expected = draws as f64 / Action::COUNT as f64;
    let statistic: f64 = counts
        .iter()
        .map(|&observed| {
            let diff = observed as f64 - expected;
            diff * diff / expected
        })
        .sum();
    let critical = ChiSquared::new((Action::COUNT - 1) as f64)
        .unwrap()
        .inverse_cdf(0.999);

    assert!(
        statistic < critical,
        "chi-square statistic {statistic:.2} exceeds {critical:.2}; counts {counts:?}"
    );
}

#[test]
fn zero_epsilon_always_picks_from_the_tie_set() {
    let mut rng = StdRng::seed_from_u64(5);
    let values = [1.5, -0.5, 1.5, 1.0];
    let mut seen = [false; Action::COUNT];

    for _ in 0..500 {
        let choice = choose_action(&values, 0.0, &mut rng);
        assert_eq!(choice.method, SelectionMethod::Exploitation);
        assert!(matches!(choice.action, Action::Up | Action::Down));
        seen[choice.action.index()] = true;
    }

    // Both tied actions get picked.
    assert!(seen[Action::Up.index()] && seen[Action::Down.index()]);
}

#[test]
fn reward_contract_holds_on_every_cell() {
    let grid = small_grid();
    for cell in grid.cells().filter(|&cell| !grid.is_wall(cell)) {
        let arrival = grid.evaluate(cell);
        if grid.is_goal(cell) {
            assert_eq!((arrival.reward, arrival.terminal), (GOAL_REWARD, true));
        } else if grid.is_pit(cell) {
            assert_eq!((arrival.reward, arrival.terminal), (PIT_REWARD, true));
        } else {
            assert_eq!((arrival.reward, arrival.terminal), (STEP_REWARD, false));
        }
    }
}

#[test]
fn engine_update_matches_worked_example() {
    // Q = 2 + 0.1 * (-1 + 0.9 * 5 - 2) = 2.15
    let grid = Grid::builder(1, 3).start(0, 0).goal(2, 0).build().unwrap();
    let mut table = QTable::for_grid(&grid);
    table.set(Cell::new(0, 0), Action::Right, 2.0);
    table.set(Cell::new(1, 0), Action::Left, 5.0);
    let params = AgentParams::new(0.1, 0.9, 0.0, 0).unwrap();
    let mut rng = StdRng::seed_from_u64(1);

    let outcome = step(
        Cell::new(0, 0),
        &table,
        &ForwardModel::new(),
        &grid,
        &params,
        &mut rng,
    );

    assert_eq!(outcome.record.action, Action::Right);
    assert!((outcome.q_table.get(Cell::new(0, 0), Action::Right) - 2.15).abs() < 1e-12);
    assert_eq!(
        outcome.record.calculation,
        "Q = 2.00 + 0.1 [-1 + 0.9 * 5.00 - 2.00]"
    );
}

#[test]
fn no_planning_equals_a_single_direct_update() {
    let grid = small_grid();
    let params = AgentParams::new(0.3, 0.9, 0.4, 0).unwrap();
    let mut table = QTable::for_grid(&grid);
    table.set(Cell::new(1, 0), Action::Down, 4.0);
    table.set(Cell::new(0, 1), Action::Right, -2.0);
    let mut model = ForwardModel::new();
    model.record(Cell::new(0, 0), Action::Right, STEP_REWARD, Cell::new(1, 0));

    for seed in 0..20 {
        let mut engine_rng = StdRng::seed_from_u64(seed);
        let outcome = step(grid.start(), &table, &model, &grid, &params, &mut engine_rng);

        let mut direct_rng = StdRng::seed_from_u64(seed);
        let choice = choose_action(&table.values(grid.start()), params.epsilon, &mut direct_rng);
        let next = transition(&grid, grid.start(), choice.action).next;
        let mut direct = table.clone();
        direct.td_update(
            grid.start(),
            choice.action,
            grid.evaluate(next).reward,
            next,
            params.alpha,
            params.gamma,
        );

        assert_eq!(outcome.q_table, direct, "seed {seed}");
        assert_eq!(outcome.record.planning_updates, 0);
    }
}

#[test]
fn planning_only_changes_entries_in_the_model() {
    let grid = small_grid();
    let mut table = QTable::for_grid(&grid);
    let mut model = ForwardModel::new();
    model.record(Cell::new(0, 0), Action::Down, STEP_REWARD, Cell::new(0, 1));
    model.record(Cell::new(0, 1), Action::Right, STEP_REWARD, Cell::new(0, 1));
    let before = table.clone();
    let mut rng = StdRng::seed_from_u64(9);

    let applied = plan(&mut table, &model, 50, 0.1, 0.9, &mut rng);

    assert_eq!(applied, 50);
    for (cell, values) in table.iter() {
        for action in Action::ALL {
            let changed = values[action.index()] != before.get(cell, action);
            if changed {
                assert!(model.get(cell, action).is_some(), "{cell} {action} changed");
            }
        }
    }
}
