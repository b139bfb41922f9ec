use crate::io::Io;
use anyhow::Error as Anyhow;
use clap::Parser;
use derive_more::{Display, Error};
use lib::chess::{Move, Promotion, Rules, Square};
use lib::game::{FileStore, Game, Store};
use std::io::{stdin, stdout, ErrorKind, Read, Write};
use std::{path::PathBuf, str::FromStr};
use tracing::{info, instrument};

/// Plays a game of chess on the terminal.
#[derive(Debug, Parser)]
#[clap(disable_help_flag = true, disable_version_flag = true)]
pub struct Play {
    /// The rules of the game.
    #[clap(short, long, default_value_t)]
    rules: Rules,

    /// Where the game is saved when leaving and restored from when starting.
    #[clap(short, long, default_value = "save.json")]
    save: PathBuf,
}

impl Default for Play {
    fn default() -> Self {
        Play {
            rules: Rules::default(),
            save: "save.json".into(),
        }
    }
}

/// What the player may type at the prompt.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Command {
    Move(Move),
    Promote(Option<Promotion>),
    Moves(Square),
    Restart,
    Save,
    Help,
    Quit,
}

#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "unknown command, type `help` for the list of commands")]
struct ParseCommandError;

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_whitespace().collect::<Vec<_>>()[..] {
            ["quit" | "exit"] => Ok(Command::Quit),
            ["help"] => Ok(Command::Help),
            ["save"] => Ok(Command::Save),
            ["restart"] => Ok(Command::Restart),
            ["promote"] => Ok(Command::Promote(None)),
            ["promote", p] => match p.parse() {
                Ok(p) => Ok(Command::Promote(Some(p))),
                Err(_) => Err(ParseCommandError),
            },
            ["moves", sq] => Ok(Command::Moves(sq.parse().or(Err(ParseCommandError))?)),
            [m] => Ok(Command::Move(m.parse().or(Err(ParseCommandError))?)),
            _ => Err(ParseCommandError),
        }
    }
}

const HELP: &str = "\
commands:
  <from><to>      move a piece, e.g. `e2e4`
  promote [n|b|r|q] promote the pawn that reached the last row
  moves <square>  list the legal moves of a piece
  restart         start a new game
  save            save the game
  quit            save the game and leave";

impl Play {
    #[instrument(level = "trace", skip(self), err)]
    pub fn execute(self) -> Result<(), Anyhow> {
        let mut store = FileStore::new(self.save);
        let mut game = Game::new(self.rules);

        if game.restore(&store) {
            info!(path = %store.path().display(), "resumed saved game");
        }

        let mut io = Io::new(stdout(), stdin());
        session(&mut game, &mut io, &mut store)?;

        game.save(&mut store)?;
        info!(path = %store.path().display(), "saved game");
        Ok(())
    }
}

/// Runs the interactive loop until the player leaves or the input ends.
fn session<W: Write, R: Read, S: Store>(
    game: &mut Game,
    io: &mut Io<W, R>,
    store: &mut S,
) -> Result<(), Anyhow> {
    io.send(game.position())?;

    loop {
        let prompt = match (game.outcome(), game.pending_promotion()) {
            (Some(o), _) => format!("{o}"),
            (None, Some(_)) => "promote [n|b|r|q]".to_string(),
            (None, None) if game.is_check(game.turn()) => format!("{} is in check", game.turn()),
            (None, None) => format!("{}", game.turn()),
        };

        let line = match io.ask(prompt) {
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(()),
            line => line?,
        };

        if line.is_empty() {
            continue;
        }

        match line.parse() {
            Err(e) => io.send(e)?,
            Ok(Command::Quit) => return Ok(()),
            Ok(Command::Help) => io.send(HELP)?,

            Ok(Command::Save) => match game.save(store) {
                Err(e) => io.send(e)?,
                Ok(()) => io.send("saved")?,
            },

            Ok(Command::Restart) => {
                game.restart();
                io.send(game.position())?;
            }

            Ok(Command::Moves(sq)) => {
                let moves: Vec<_> = game.legal_moves_from(sq).map(|m| m.to_string()).collect();
                io.send(moves.join(" "))?;
            }

            Ok(Command::Promote(p)) => match game.choose_promotion(p) {
                Err(e) => io.send(e)?,
                Ok(_) => io.send(game.position())?,
            },

            Ok(Command::Move(m)) => match game.play(m) {
                Err(e) => io.send(e)?,
                Ok(_) => io.send(game.position())?,
            },
        }
    }
}
