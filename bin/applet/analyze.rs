use anyhow::{anyhow, Error as Anyhow};
use clap::Parser;
use lib::chess::Rules;
use lib::game::{FileStore, Game};
use std::path::PathBuf;
use tracing::{info, instrument};

/// Reports on a saved game.
#[derive(Debug, Parser)]
#[clap(disable_help_flag = true, disable_version_flag = true)]
pub struct Analyze {
    /// The rules of the game.
    #[clap(short, long, default_value_t)]
    rules: Rules,

    /// The saved game to analyze.
    file: PathBuf,
}

impl Analyze {
    #[instrument(level = "trace", skip(self), err)]
    pub fn execute(self) -> Result<(), Anyhow> {
        let store = FileStore::new(self.file);
        let mut game = Game::new(self.rules);

        if !game.load(&store)? {
            return Err(anyhow!("no saved game at `{}`", store.path().display()));
        }

        println!("{}", game.position());

        let moves: Vec<_> = game.position().moves().map(|m| m.to_string()).collect();

        info!(
            turn = %game.turn(),
            check = game.is_check(game.turn()),
            promotion = ?game.pending_promotion(),
            outcome = ?game.outcome(),
            moves = moves.len(),
        );

        match game.outcome() {
            Some(o) => println!("{o}"),
            None => println!("{}", moves.join(" ")),
        }

        Ok(())
    }
}
