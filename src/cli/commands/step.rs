//! Step command - issue step commands one at a time and explain each update

use anyhow::Result;
use clap::Parser;

use crate::{
    cli::{
        config::SessionArgs,
        output::{StepPrinter, print_kv, print_section},
    },
    history::RECENT_WINDOW,
    ports::NoopObserver,
    session::StepEvent,
};

#[derive(Parser, Debug)]
#[command(about = "Issue step commands and explain every update")]
pub struct StepArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Number of step commands to issue
    #[arg(long, short = 'n', default_value_t = 10)]
    pub ticks: usize,

    /// Print each step record as a JSON line instead of text
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

pub fn execute(args: StepArgs) -> Result<()> {
    let mut session = args.session.build_session()?;

    if args.json {
        let mut quiet = NoopObserver;
        for _ in 0..args.ticks {
            if let StepEvent::Stepped { record, .. } = session.step(&mut quiet)? {
                println!("{}", serde_json::to_string(&record)?);
            }
        }
        return Ok(());
    }

    print_section(&format!("Stepping on {}", session.grid().name()));
    let mut printer = StepPrinter::new(true);
    for _ in 0..args.ticks {
        session.step(&mut printer)?;
    }

    print_section("Session State");
    print_kv("Position", &session.position().to_string());
    print_kv("Episode steps", &session.episode_steps().to_string());
    print_kv("Episode reward", &session.episode_reward().to_string());
    print_kv(
        "Episodes completed",
        &session.episodes_completed().to_string(),
    );
    print_kv(
        &format!("Avg reward (last {RECENT_WINDOW})"),
        &format!("{:.1}", session.history().recent_average(RECENT_WINDOW)),
    );
    print_kv("Model entries", &session.model().len().to_string());

    Ok(())
}
