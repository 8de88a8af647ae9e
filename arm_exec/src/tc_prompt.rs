//! # Telecommand Prompt
//!
//! Reads telecommands typed by an operator, such as `arm pose 1 0 1 --config plus-minus`, in a
//! background thread and hands them to the main loop.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::tc::{Tc, TcParseError};
use log::{debug, info, warn};
use rustyline::{error::ReadlineError, DefaultEditor};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

const PROMPT: &str = "arm $ ";

/// Lines which close the prompt.
const EXIT_CMDS: [&str; 2] = ["exit", "quit"];

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Interactive telecommand source.
pub struct TcPrompt {
    tc_rx: Receiver<Tc>,

    _handle: JoinHandle<()>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TcPromptError {
    #[error("Could not create the line editor: {0}")]
    EditorError(ReadlineError),

    #[error("The prompt has been closed")]
    Closed,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TcPrompt {
    /// Start the prompt, loading and saving history at `history_path`.
    ///
    /// The editor is created on the prompt thread, this function waits until it is ready.
    pub fn new(history_path: PathBuf) -> Result<Self, TcPromptError> {
        let (tc_tx, tc_rx) = channel();
        let (init_tx, init_rx) = channel();

        let _handle = thread::spawn(move || {
            let editor = match DefaultEditor::new() {
                Ok(e) => {
                    init_tx.send(Ok(())).ok();
                    e
                }
                Err(e) => {
                    init_tx.send(Err(e)).ok();
                    return;
                }
            };

            prompt_thread(editor, history_path, tc_tx)
        });

        match init_rx.recv() {
            Ok(Ok(())) => Ok(Self { tc_rx, _handle }),
            Ok(Err(e)) => Err(TcPromptError::EditorError(e)),
            Err(_) => Err(TcPromptError::Closed),
        }
    }

    /// Receive a single TC from the prompt.
    ///
    /// Call in a loop until `Ok(None)` is returned, meaning there are no more TCs waiting right
    /// now. Once the operator closes the prompt `Err(TcPromptError::Closed)` is returned.
    pub fn receive_tc(&self) -> Result<Option<Tc>, TcPromptError> {
        match self.tc_rx.try_recv() {
            Ok(tc) => Ok(Some(tc)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(TcPromptError::Closed),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn prompt_thread(mut editor: DefaultEditor, history_path: PathBuf, tc_tx: Sender<Tc>) {
    if editor.load_history(&history_path).is_err() {
        debug!("No prompt history at {:?}", history_path);
    }

    loop {
        let line = match editor.readline(PROMPT) {
            Ok(l) => l,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                warn!("Prompt error: {}", e);
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        editor.add_history_entry(line).ok();

        if EXIT_CMDS.contains(&line) {
            break;
        }

        match Tc::from_line(line) {
            Ok(tc) => {
                if tc_tx.send(tc).is_err() {
                    break;
                }
            }
            // Includes help text
            Err(TcParseError::InvalidCommand(msg)) => println!("{}", msg),
            Err(e) => warn!("{}", e),
        }
    }

    if let Err(e) = editor.save_history(&history_path) {
        warn!("Could not save prompt history to {:?}: {}", history_path, e);
    }

    info!("Prompt closed");
}
