//! Presets command - list the built-in grids

use anyhow::Result;
use clap::Parser;

use crate::{
    cli::output::{layout_rows, print_kv, print_section},
    gridworld::{Cell, GridPreset},
};

#[derive(Parser, Debug)]
#[command(about = "List the built-in grids")]
pub struct PresetsArgs {
    /// Print the grids as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

fn join_cells<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> String {
    let listed: Vec<String> = cells.into_iter().map(Cell::to_string).collect();
    if listed.is_empty() {
        "none".to_string()
    } else {
        listed.join(" ")
    }
}

pub fn execute(args: PresetsArgs) -> Result<()> {
    if args.json {
        let grids: Vec<_> = GridPreset::ALL.iter().map(|preset| preset.grid()).collect();
        println!("{}", serde_json::to_string_pretty(&grids)?);
        return Ok(());
    }

    for preset in GridPreset::ALL {
        let grid = preset.grid();
        print_section(&format!("{preset}: {}", grid.name()));
        print_kv("Size", &format!("{} x {}", grid.cols(), grid.rows()));
        print_kv("Start", &grid.start().to_string());
        print_kv("Goal", &grid.goal().to_string());
        print_kv("Walls", &join_cells(grid.walls()));
        print_kv("Pits", &join_cells(grid.pits()));
        println!();
        for row in layout_rows(&grid) {
            println!("  {row}");
        }
    }
    Ok(())
}
