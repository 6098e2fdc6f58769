mod render;

use crate::db::VoteLedger;
use crate::models::{CandidateId, VotingState};
use crate::voting::{Durability, VoteError, VoteSimulationEngine};
use log::{debug, info, warn};
use std::io::Write;

pub use render::render_results;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub const HELP: &str = "\
Commands:
  list             show every candidate
  search <text>    type into the candidate search box
  focus            reopen the suggestion list
  dismiss          close the suggestion list
  select <id>      pick a candidate by id
  clear            drop the current pick
  vote             cast your vote (once per profile)
  results          show the simulated results
  status           show the voting form state
  help             show this message
  quit             leave";

// Handle one line of user input
pub fn handle_line<L: VoteLedger, W: Write>(
    engine: &mut VoteSimulationEngine<L>,
    line: &str,
    out: &mut W,
) -> Result<Flow, Box<dyn std::error::Error + Send + Sync>> {
    let line = line.trim();
    let (name, arg) = match line.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (line, ""),
    };
    debug!("Received command: {:?} {:?}", name, arg);

    match name {
        "" => {}
        "list" => {
            for candidate in engine.candidates() {
                writeln!(out, "{:>4}  {} ({})", candidate.id, candidate.nombre, candidate.partido)?;
            }
        }
        "search" | "focus" | "dismiss" | "select" | "clear" if engine.state() == VotingState::Voted => {
            writeln!(out, "Your vote is already registered. Type `results` to see the simulation.")?;
        }
        "search" => {
            engine.set_search_query(arg);
            write_dropdown(engine, out)?;
        }
        "focus" => {
            engine.open_dropdown();
            write_dropdown(engine, out)?;
        }
        "dismiss" => engine.close_dropdown(),
        "select" => handle_select(engine, arg, out)?,
        "clear" => {
            engine.clear_selection();
            writeln!(out, "Selection cleared.")?;
        }
        "vote" => handle_vote(engine, out)?,
        "results" => {
            if engine.state() == VotingState::Voted {
                write!(out, "{}", render_results(&engine.derive_results()))?;
            } else {
                writeln!(out, "Results are shown once you have voted.")?;
            }
        }
        "status" => write_status(engine, out)?,
        "help" => writeln!(out, "{}", HELP)?,
        "quit" | "exit" => return Ok(Flow::Quit),
        _ => {
            writeln!(out, "Unknown command `{}`. Type `help` for the list.", name)?;
        }
    }

    Ok(Flow::Continue)
}

fn handle_select<L: VoteLedger, W: Write>(
    engine: &mut VoteSimulationEngine<L>,
    arg: &str,
    out: &mut W,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let Ok(id) = arg.parse::<CandidateId>() else {
        writeln!(out, "Usage: select <id>")?;
        return Ok(());
    };

    match engine.find_candidate(id).cloned() {
        Some(candidate) => {
            engine.select_candidate(&candidate);
            writeln!(out, "Selected candidate: {} ({})", candidate.nombre, candidate.partido)?;
        }
        None => {
            writeln!(out, "No candidate with id {}.", id)?;
        }
    }
    Ok(())
}

fn handle_vote<L: VoteLedger, W: Write>(
    engine: &mut VoteSimulationEngine<L>,
    out: &mut W,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    match engine.cast_vote() {
        Ok(durability) => {
            info!("Vote accepted ({:?})", durability);
            writeln!(out, "Vote registered.")?;
            if durability == Durability::SessionOnly {
                writeln!(out, "Note: your vote could not be saved and will be lost when you leave.")?;
            }
            write!(out, "{}", render_results(&engine.derive_results()))?;
        }
        Err(VoteError::NoSelection) => {
            writeln!(out, "Select a candidate before voting.")?;
        }
        Err(e @ VoteError::AlreadyVoted) => {
            warn!("Rejected vote: {}", e);
            writeln!(out, "You can only vote once.")?;
        }
    }
    Ok(())
}

fn write_dropdown<L: VoteLedger, W: Write>(
    engine: &VoteSimulationEngine<L>,
    out: &mut W,
) -> std::io::Result<()> {
    if !engine.selection().dropdown_visible() {
        return Ok(());
    }
    let matches = engine.filtered_candidates();
    if matches.is_empty() {
        return writeln!(out, "No matches found.");
    }
    for candidate in matches {
        writeln!(out, "{:>4}  {} ({})", candidate.id, candidate.nombre, candidate.partido)?;
    }
    Ok(())
}

fn write_status<L: VoteLedger, W: Write>(
    engine: &VoteSimulationEngine<L>,
    out: &mut W,
) -> std::io::Result<()> {
    match engine.state() {
        VotingState::Voted => writeln!(out, "Status: voted"),
        VotingState::Voting => {
            let selection = engine.selection();
            writeln!(out, "Status: voting")?;
            writeln!(out, "Search box: {:?}", selection.display_text())?;
            match selection.selected() {
                Some(candidate) => writeln!(out, "Selected: {}", candidate.nombre),
                None => writeln!(out, "Selected: none"),
            }
        }
    }
}
