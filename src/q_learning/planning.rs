//! Dyna-Q planning: replay of remembered transitions

use rand::Rng;
use tracing::trace;

use super::{model::ForwardModel, q_table::QTable};

/// Apply up to `planning_steps` simulated backups to `q_table`.
///
/// Each backup samples one remembered `(cell, action)` pair uniformly
/// over unique keys and applies the ordinary Q-learning update with the
/// stored reward and next cell. Later backups see the writes of earlier
/// ones. The model is read only. An empty model makes this a no-op.
///
/// Returns the number of backups applied.
pub fn plan<R: Rng + ?Sized>(
    q_table: &mut QTable,
    model: &ForwardModel,
    planning_steps: usize,
    alpha: f64,
    gamma: f64,
    rng: &mut R,
) -> usize {
    let mut applied = 0;
    for _ in 0..planning_steps {
        let Some((key, outcome)) = model.sample(rng) else {
            break;
        };
        let update =
            q_table.td_update(key.cell, key.action, outcome.reward, outcome.next, alpha, gamma);
        trace!(
            cell = %key.cell,
            action = %key.action,
            old_q = update.old_q,
            new_q = update.new_q,
            "planning backup"
        );
        applied += 1;
    }
    applied
}
