//! Step engine: one real interaction plus its learning updates
//!
//! [`step`] performs, in order:
//!
//! 1. ε-greedy action selection at the current cell
//! 2. the transition (edges and walls keep the agent in place)
//! 3. reward and termination at the resulting cell
//! 4. the direct Q-learning backup
//! 5. the forward-model write
//! 6. `planning_steps` Dyna-Q backups
//! 7. a [`StepRecord`] describing what happened
//!
//! The caller's Q-table and model are never touched; the updated versions
//! are returned as new owned values, so a display layer can keep reading
//! the previous snapshot while the engine moves on.

use std::fmt::Write as _;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    gridworld::{Action, Arrival, Cell, Grid, Move, transition},
    q_learning::{
        ActionValues, AgentParams, Choice, ForwardModel, QTable, SelectionMethod, TdUpdate,
        choose_action, plan,
    },
};

/// Everything that happened during one step, for explanation and telemetry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub state: Cell,
    pub action: Action,
    pub next_state: Cell,
    pub reward: f64,
    pub terminal: bool,
    pub hit_wall: bool,
    pub method: SelectionMethod,
    /// Action-values of `state` consulted by the policy
    pub q_values: ActionValues,
    pub old_q: f64,
    pub new_q: f64,
    pub max_next_q: f64,
    pub td_target: f64,
    /// Simulated backups actually applied
    pub planning_updates: usize,
    /// The numeric update, e.g. `Q = 0.00 + 0.1 [-1 + 0.9 * 0.00 - 0.00]`
    pub calculation: String,
    /// Plain-language account of the choice and its result
    pub reasoning: String,
}

/// Result of [`step`]
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub next_state: Cell,
    pub reward: f64,
    pub terminal: bool,
    pub q_table: QTable,
    pub model: ForwardModel,
    pub record: StepRecord,
}

/// Run one interaction from `state`.
///
/// A missing Q entry for any visited cell is read as the zero vector.
pub fn step<R: Rng + ?Sized>(
    state: Cell,
    q_table: &QTable,
    model: &ForwardModel,
    grid: &Grid,
    params: &AgentParams,
    rng: &mut R,
) -> StepOutcome {
    let q_values = q_table.values(state);
    let choice = choose_action(&q_values, params.epsilon, rng);
    let moved = transition(grid, state, choice.action);
    let arrival = grid.evaluate(moved.next);

    let mut next_table = q_table.clone();
    let update = next_table.td_update(
        state,
        choice.action,
        arrival.reward,
        moved.next,
        params.alpha,
        params.gamma,
    );

    let mut next_model = model.clone();
    next_model.record(state, choice.action, arrival.reward, moved.next);

    let planning_updates = plan(
        &mut next_table,
        &next_model,
        params.planning_steps,
        params.alpha,
        params.gamma,
        rng,
    );

    debug!(
        state = %state,
        action = %choice.action,
        method = %choice.method,
        next = %moved.next,
        reward = arrival.reward,
        terminal = arrival.terminal,
        old_q = update.old_q,
        new_q = update.new_q,
        planning_updates,
        "step"
    );

    let record = StepRecord {
        state,
        action: choice.action,
        next_state: moved.next,
        reward: arrival.reward,
        terminal: arrival.terminal,
        hit_wall: moved.hit_wall,
        method: choice.method,
        q_values,
        old_q: update.old_q,
        new_q: update.new_q,
        max_next_q: update.max_next_q,
        td_target: update.target,
        planning_updates,
        calculation: calculation(&update, arrival.reward, params),
        reasoning: reasoning(
            state,
            &q_values,
            choice,
            moved,
            arrival,
            update.max_next_q,
            params.epsilon,
        ),
    };

    StepOutcome {
        next_state: moved.next,
        reward: arrival.reward,
        terminal: arrival.terminal,
        q_table: next_table,
        model: next_model,
        record,
    }
}

/// `Q = old + α [r + γ * maxNext - old]`, values to two decimals
fn calculation(update: &TdUpdate, reward: f64, params: &AgentParams) -> String {
    format!(
        "Q = {old:.2} + {alpha} [{reward} + {gamma} * {max_next:.2} - {old:.2}]",
        old = update.old_q,
        alpha = params.alpha,
        gamma = params.gamma,
        max_next = update.max_next_q,
    )
}

fn reasoning(
    state: Cell,
    q_values: &ActionValues,
    choice: Choice,
    moved: Move,
    arrival: Arrival,
    max_next_q: f64,
    epsilon: f64,
) -> String {
    let mut text = String::new();
    let action = choice.action;

    match choice.method {
        SelectionMethod::Exploitation => {
            let estimates = Action::ALL
                .iter()
                .map(|a| format!("{}:{:.1}", a.name(), q_values[a.index()]))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = write!(
                text,
                "I am at state {state}. My current estimates for the actions were [{estimates}]. \
                 I chose {action} because it had the highest value (or tied for highest). "
            );
        }
        SelectionMethod::Exploration => {
            let _ = write!(
                text,
                "I am at state {state}. I decided to explore (a random choice, epsilon is {epsilon}). \
                 I picked {action} at random, ignoring my current Q-values. "
            );
        }
    }

    let _ = write!(
        text,
        "\n\nResult: I moved to {} and received a reward of {}. ",
        moved.next, arrival.reward
    );
    if moved.hit_wall {
        text.push_str("I bumped into a wall, so I stayed in place. ");
    }

    if arrival.terminal {
        text.push_str("This is a terminal state (goal or pit). The episode ends here.");
    } else {
        let _ = write!(
            text,
            "Looking ahead from the new state {}, the best action has a value of {:.2}. \
             I used this \"max next Q\" to update my previous estimate.",
            moved.next, max_next_q
        );
    }
    text
}
