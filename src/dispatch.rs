//! Hand-off of validated selections to the display tool.
//!
//! The panel itself never drives the LEDCube: accepted submissions and menu
//! playback commands cross a single trait boundary, [`SubmissionSink`].
//! The shipped implementation, [`LogSink`], records each hand-off in the
//! application log; wiring an actual launcher in means implementing the
//! trait, nothing else.

use std::fmt;

use log::info;

use crate::error::AppResult;
use crate::selection::Submission;

/// Which menu entry a playback command came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackTarget {
    /// The scripted detector demo.
    Demo,
    /// The interactive game mode.
    Game,
}

impl fmt::Display for PlaybackTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackTarget::Demo => write!(f, "DEMO"),
            PlaybackTarget::Game => write!(f, "GAME"),
        }
    }
}

/// Transport control forwarded from the playback popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackCommand {
    /// Start or resume playback.
    Play,
    /// Pause playback.
    Pause,
}

impl fmt::Display for PlaybackCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackCommand::Play => write!(f, "Play"),
            PlaybackCommand::Pause => write!(f, "Pause"),
        }
    }
}

/// Downstream consumer of validated selections and playback commands.
pub trait SubmissionSink {
    /// Hand a validated submission to the display tool.
    fn submit_events(&mut self, submission: &Submission) -> AppResult<()>;

    /// Forward a playback command from the menu popups.
    fn playback(&mut self, target: PlaybackTarget, command: PlaybackCommand) -> AppResult<()>;
}

/// Sink that records every hand-off in the application log.
#[derive(Debug, Default)]
pub struct LogSink;

impl SubmissionSink for LogSink {
    fn submit_events(&mut self, submission: &Submission) -> AppResult<()> {
        for row in &submission.rows {
            info!(
                "Selected flavour: {}, energy: {}, events: {}",
                row.flavour, row.energy, row.events
            );
        }
        info!(
            "Submission {} [{}]: {} row(s) accepted",
            submission.id,
            submission.mode,
            submission.rows.len()
        );
        Ok(())
    }

    fn playback(&mut self, target: PlaybackTarget, command: PlaybackCommand) -> AppResult<()> {
        info!("{target} - {command} selected");
        Ok(())
    }
}
