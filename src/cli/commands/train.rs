//! Train command - run whole episodes and report what was learned

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::to_writer_pretty;

use crate::{
    analysis::{Rollout, greedy_policy, greedy_rollout},
    cli::{
        config::SessionArgs,
        output::{format_number, policy_rows, print_kv, print_section, print_subsection},
    },
    history::{HistorySummary, RECENT_WINDOW},
    observers::{JsonlObserver, MetricsObserver, ProgressObserver},
    ports::ObserverSet,
    q_learning::AgentParams,
    session::{FINISH_SAFETY_BOUND, Session},
};

#[derive(Parser, Debug)]
#[command(about = "Train an agent for a number of episodes")]
pub struct TrainArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Number of episodes to run
    #[arg(long, short = 'e', default_value_t = 100)]
    pub episodes: usize,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Optional file for JSONL step observations
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
}

#[derive(Debug, Serialize)]
struct TrainingSummaryFile {
    grid: String,
    mode: String,
    params: AgentParams,
    seed: Option<u64>,
    episodes_requested: usize,
    episodes_completed: usize,
    unterminated_runs: usize,
    recent_average_reward: f64,
    history: HistorySummary,
    metrics: MetricsObserver,
    greedy_rollout: Rollout,
}

fn sanitize_summary_path(raw: &Path) -> PathBuf {
    let mut normalized = raw.to_path_buf();
    let raw_str = raw.as_os_str().to_string_lossy();

    // Treat trailing separators or missing filename as a directory target.
    if raw_str.ends_with(std::path::MAIN_SEPARATOR) || normalized.file_name().is_none() {
        normalized.push("training_summary.json");
        return normalized;
    }

    match normalized.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => normalized,
        _ => {
            normalized.set_extension("json");
            normalized
        }
    }
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let config = args.session.to_config()?;
    let seed = config.seed;
    let mut session = Session::new(config).context("failed to create session")?;

    print_section("Training Configuration");
    print_kv("Grid", session.grid().name());
    print_kv("Mode", session.params().mode().as_str());
    print_kv("Alpha", &session.params().alpha.to_string());
    print_kv("Gamma", &session.params().gamma.to_string());
    print_kv("Epsilon", &session.params().epsilon.to_string());
    print_kv(
        "Planning steps",
        &session.params().planning_steps.to_string(),
    );
    print_kv("Episodes", &format_number(args.episodes));
    if let Some(seed) = seed {
        print_kv("Seed", &seed.to_string());
    }

    let mut metrics = MetricsObserver::new();
    let mut progress = if args.no_progress {
        ProgressObserver::hidden()
    } else {
        ProgressObserver::new(args.episodes)?
    };
    let mut jsonl = args
        .observations
        .as_ref()
        .map(JsonlObserver::create)
        .transpose()
        .context("failed to open observation log")?;

    let mut unterminated_runs = 0;
    {
        let mut observers = ObserverSet::new().with(&mut metrics).with(&mut progress);
        if let Some(jsonl) = jsonl.as_mut() {
            observers.push(jsonl);
        }
        for _ in 0..args.episodes {
            let outcome = session.finish_episode(&mut observers)?;
            if !outcome.terminated {
                unterminated_runs += 1;
            }
        }
    }
    progress.finish();

    if let Some(mut jsonl) = jsonl {
        jsonl.flush()?;
        if let Some(path) = &args.observations {
            println!(
                "\n{} step records written to {}",
                format_number(jsonl.lines()),
                path.display()
            );
        }
    }

    let history = session.history().summary();
    let recent_average = session.history().recent_average(RECENT_WINDOW);

    print_section("Training Results");
    print_kv(
        "Episodes completed",
        &format_number(session.episodes_completed()),
    );
    print_kv("Steps", &format_number(metrics.steps));
    print_kv(
        "Exploration rate",
        &format!("{:.1}%", metrics.exploration_rate() * 100.0),
    );
    print_kv("Wall bumps", &format_number(metrics.wall_hits));
    print_kv("Planning updates", &format_number(metrics.planning_updates));
    print_kv(
        "Goals / pits",
        &format!(
            "{} / {} ({:.1}% goal)",
            metrics.goals,
            metrics.pits,
            metrics.goal_rate() * 100.0
        ),
    );
    print_kv(
        &format!("Avg reward (last {RECENT_WINDOW})"),
        &format!("{recent_average:.1}"),
    );
    print_kv(
        "Mean reward",
        &format!(
            "{:.1} ± {:.1} over {} episodes",
            history.mean_reward, history.reward_std_dev, history.episodes
        ),
    );
    if let Some(best) = history.best_reward {
        print_kv("Best reward", &format!("{best:.1}"));
    }
    if unterminated_runs > 0 {
        println!(
            "\n⚠️  {unterminated_runs} run(s) stopped after {FINISH_SAFETY_BOUND} steps without reaching a terminal cell"
        );
    }

    let policy = greedy_policy(session.grid(), session.q_table());
    print_subsection("Greedy Policy");
    for row in policy_rows(session.grid(), &policy) {
        println!("  {row}");
    }

    let rollout = greedy_rollout(
        session.grid(),
        session.q_table(),
        session.grid().rows() * session.grid().cols(),
    );
    print_subsection("Greedy Rollout");
    print_kv("Outcome", &format!("{:?}", rollout.end));
    print_kv("Moves", &rollout.actions.len().to_string());
    print_kv("Reward", &format!("{:.1}", rollout.total_reward));

    if let Some(raw) = &args.summary {
        let summary_path = sanitize_summary_path(raw);
        if let Some(parent) = summary_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let summary = TrainingSummaryFile {
            grid: session.grid().name().to_string(),
            mode: session.params().mode().to_string(),
            params: *session.params(),
            seed,
            episodes_requested: args.episodes,
            episodes_completed: session.episodes_completed(),
            unterminated_runs,
            recent_average_reward: recent_average,
            history,
            metrics,
            greedy_rollout: rollout,
        };

        let file = File::create(&summary_path)
            .with_context(|| format!("failed to create {}", summary_path.display()))?;
        to_writer_pretty(file, &summary)?;
        println!("\nSummary written to {}", summary_path.display());
    }

    Ok(())
}
