//! Autorun command - drive a session from the background scheduler

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::{Result, anyhow};
use clap::Parser;

use crate::{
    analysis::greedy_policy,
    cli::{
        config::SessionArgs,
        output::{StepPrinter, policy_rows, print_kv, print_section, print_subsection},
    },
    history::RECENT_WINDOW,
    scheduler::AutoRunner,
};

#[derive(Parser, Debug)]
#[command(about = "Issue step commands on a timer")]
pub struct AutorunArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Milliseconds between step commands
    #[arg(long, default_value_t = 200)]
    pub interval_ms: u64,

    /// Number of step commands before stopping (0 = until interrupted)
    #[arg(long, short = 'n', default_value_t = 50)]
    pub ticks: usize,

    /// Also print the numeric update and rationale of every step
    #[arg(long, default_value_t = false)]
    pub explain: bool,
}

pub fn execute(args: AutorunArgs) -> Result<()> {
    let session = Arc::new(Mutex::new(args.session.build_session()?));

    let mut runner = AutoRunner::new(Duration::from_millis(args.interval_ms));
    if args.ticks > 0 {
        runner = runner.with_max_ticks(args.ticks);
    }

    print_section("Auto-run");
    print_kv("Interval", &format!("{} ms", args.interval_ms));
    print_kv(
        "Ticks",
        &if args.ticks > 0 {
            args.ticks.to_string()
        } else {
            "until interrupted".to_string()
        },
    );

    let handle = runner.spawn(Arc::clone(&session), Box::new(StepPrinter::new(args.explain)));
    let ticks = handle.join()?;

    let snapshot = session
        .lock()
        .map_err(|_| anyhow!("session lock poisoned after auto-run"))?
        .snapshot();

    print_section("Auto-run Finished");
    print_kv("Ticks", &ticks.to_string());
    print_kv("Position", &snapshot.position.to_string());
    print_kv("Status", &format!("{:?}", snapshot.status));
    print_kv("Episodes completed", &snapshot.episodes_completed.to_string());
    print_kv(
        &format!("Avg reward (last {RECENT_WINDOW})"),
        &format!("{:.1}", snapshot.recent_average_reward),
    );

    print_subsection("Greedy Policy");
    let policy = greedy_policy(&snapshot.grid, &snapshot.q_table);
    for row in policy_rows(&snapshot.grid, &policy) {
        println!("  {row}");
    }

    Ok(())
}
