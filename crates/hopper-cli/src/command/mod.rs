use clap::{Parser, Subcommand};

use self::{inspect_course::InspectCourseArg, train::TrainArg};

mod inspect_course;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Evolve obstacle-course policies using a genetic algorithm
    Train(#[clap(flatten)] TrainArg),
    /// Print the course a standing runner sees for a seed
    InspectCourse(#[clap(flatten)] InspectCourseArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::InspectCourse(arg) => inspect_course::run(&arg)?,
    }
    Ok(())
}
