//! Output formatting for CLI

use crate::{
    Result,
    analysis::PolicyCell,
    engine::StepRecord,
    gridworld::{Action, Cell, Grid},
    history::EpisodeStat,
    ports::Observer,
};

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i.is_multiple_of(3) {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

fn arrow(action: Action) -> char {
    match action {
        Action::Up => '↑',
        Action::Right => '→',
        Action::Down => '↓',
        Action::Left => '←',
    }
}

fn layout_symbol(grid: &Grid, cell: Cell) -> Option<char> {
    if grid.is_wall(cell) {
        Some('#')
    } else if grid.is_goal(cell) {
        Some('G')
    } else if grid.is_pit(cell) {
        Some('X')
    } else {
        None
    }
}

/// Text rows of the grid layout: `S` start, `G` goal, `X` pit, `#` wall
pub fn layout_rows(grid: &Grid) -> Vec<String> {
    (0..grid.rows())
        .map(|y| {
            (0..grid.cols())
                .map(|x| {
                    let cell = Cell::new(x, y);
                    layout_symbol(grid, cell).unwrap_or(if cell == grid.start() {
                        'S'
                    } else {
                        '.'
                    })
                })
                .collect()
        })
        .collect()
}

/// Text rows of the greedy policy; undecided cells show `·`
pub fn policy_rows(grid: &Grid, policy: &[PolicyCell]) -> Vec<String> {
    (0..grid.rows())
        .map(|y| {
            (0..grid.cols())
                .map(|x| {
                    let cell = Cell::new(x, y);
                    layout_symbol(grid, cell).unwrap_or_else(|| {
                        policy
                            .iter()
                            .find(|entry| entry.cell == cell)
                            .and_then(|entry| entry.action)
                            .map_or('·', arrow)
                    })
                })
                .collect()
        })
        .collect()
}

/// Observer that prints every step command as it happens
#[derive(Debug, Default)]
pub struct StepPrinter {
    steps: usize,
    explain: bool,
}

impl StepPrinter {
    /// `explain` adds the numeric update and the rationale under each step
    pub fn new(explain: bool) -> Self {
        Self { steps: 0, explain }
    }
}

impl Observer for StepPrinter {
    fn on_step(&mut self, record: &StepRecord) -> Result<()> {
        self.steps += 1;
        println!(
            "[{:>4}] {} {:<5} -> {}  reward {:>5}  ({})",
            self.steps,
            record.state,
            record.action.name(),
            record.next_state,
            record.reward,
            record.method
        );
        if self.explain {
            println!("       {}", record.calculation);
            println!("       {}", record.reasoning);
            if record.planning_updates > 0 {
                println!("       planning: {} simulated updates", record.planning_updates);
            }
        }
        Ok(())
    }

    fn on_episode_end(&mut self, stat: &EpisodeStat) -> Result<()> {
        println!(
            "       episode {} finished: reward {} in {} steps",
            stat.episode, stat.total_reward, stat.steps
        );
        Ok(())
    }

    fn on_episode_restart(&mut self) -> Result<()> {
        println!("       agent returned to the start cell");
        Ok(())
    }
}
