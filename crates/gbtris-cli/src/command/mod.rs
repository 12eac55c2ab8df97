use clap::{Parser, Subcommand};

use self::{auto_play::AutoPlayArg, best_move::BestMoveArg, evaluate::EvaluateArg};

mod auto_play;
mod best_move;
mod evaluate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Print the features and score of a board
    Evaluate(#[clap(flatten)] EvaluateArg),
    /// Choose the placement of a piece on a board
    BestMove(#[clap(flatten)] BestMoveArg),
    /// Let the driver play a simulated game
    AutoPlay(#[clap(flatten)] AutoPlayArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Evaluate(arg) => evaluate::run(&arg)?,
        Mode::BestMove(arg) => best_move::run(&arg)?,
        Mode::AutoPlay(arg) => auto_play::run(&arg)?,
    }
    Ok(())
}
