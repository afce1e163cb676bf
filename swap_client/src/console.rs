//! Interactive console: the event loop that owns the swap session.
//!
//! Input lines, feed answers, the settlement timer and Ctrl+C are multiplexed
//! with crossbeam `select!` on this one thread, so the session is only ever
//! touched from here.
use crossbeam_channel::{after, never, select, unbounded, Receiver};
use log::{debug, error, info, warn};
use std::io::{self, BufRead};
use std::str::FromStr;
use std::thread;
use std::time::{Duration, Instant};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use swap_common::session::{PendingSwap, RefreshOutcome};
use swap_common::{Result, SwapError, SwapSession};

use crate::feed::{FeedEvent, FeedWorker, IconProbe};
use crate::view;

/// Leading word of a console line.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Keyword {
    Amount,
    From,
    To,
    Flip,
    Max,
    Submit,
    Refresh,
    Tokens,
    Status,
    Help,
    Quit,
}

/// A parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Replace the amount text; empty clears it.
    Amount(String),
    /// Select the source token; empty unselects.
    From(String),
    /// Select the destination token; empty unselects.
    To(String),
    /// Swap source and destination.
    Flip,
    /// Fill the amount with the whole source balance.
    Max,
    /// Submit the current quote.
    Submit,
    /// Fetch prices again.
    Refresh,
    /// List tokens with prices and balances.
    Tokens,
    /// Show the form.
    Status,
    /// List commands.
    Help,
    /// Leave.
    Quit,
}

impl FromStr for ConsoleCommand {
    type Err = SwapError;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let keyword = Keyword::from_str(word)
            .map_err(|_| SwapError::Format(format!("unknown command `{}`; try `help`", word)))?;
        let rest = rest.trim().to_string();
        Ok(match keyword {
            Keyword::Amount => ConsoleCommand::Amount(rest),
            Keyword::From => ConsoleCommand::From(rest),
            Keyword::To => ConsoleCommand::To(rest),
            Keyword::Flip => ConsoleCommand::Flip,
            Keyword::Max => ConsoleCommand::Max,
            Keyword::Submit => ConsoleCommand::Submit,
            Keyword::Refresh => ConsoleCommand::Refresh,
            Keyword::Tokens => ConsoleCommand::Tokens,
            Keyword::Status => ConsoleCommand::Status,
            Keyword::Help => ConsoleCommand::Help,
            Keyword::Quit => ConsoleCommand::Quit,
        })
    }
}

/// `help` output.
pub fn help_lines() -> Vec<String> {
    Keyword::iter()
        .map(|k| {
            let usage = match k {
                Keyword::Amount => "amount <value>   set the amount to spend",
                Keyword::From => "from <token>     choose the token to spend",
                Keyword::To => "to <token>       choose the token to receive",
                Keyword::Flip => "flip             swap the two tokens",
                Keyword::Max => "max              spend the whole balance",
                Keyword::Submit => "submit           execute the simulated swap",
                Keyword::Refresh => "refresh          reload prices",
                Keyword::Tokens => "tokens           list prices and balances",
                Keyword::Status => "status           show the form",
                Keyword::Help => "help             this list",
                Keyword::Quit => "quit             exit",
            };
            format!("  {}", usage)
        })
        .collect()
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

/// Reads stdin on a background thread; the channel closes at end of input.
fn spawn_stdin_reader() -> Receiver<String> {
    let (line_tx, line_rx) = unbounded::<String>();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if line_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to read input: {}", e);
                    break;
                }
            }
        }
        debug!("Input closed");
    });
    line_rx
}

/// Whether the loop should keep going after a command.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Console state around the session.
pub struct Console {
    session: SwapSession,
    worker: FeedWorker,
    icons: IconProbe,
    settle_delay: Duration,
    settling: Option<(Receiver<Instant>, PendingSwap)>,
    awaiting_feed: bool,
}

impl Console {
    /// Wraps `session`; no refresh is requested yet.
    pub fn new(
        session: SwapSession,
        worker: FeedWorker,
        icons: IconProbe,
        settle_delay: Duration,
    ) -> Self {
        Self {
            session,
            worker,
            icons,
            settle_delay,
            settling: None,
            awaiting_feed: false,
        }
    }

    /// Issues a refresh ticket and hands it to the worker.
    pub fn refresh(&mut self) -> Result<()> {
        let ticket = self.session.begin_refresh();
        self.worker.request(ticket)?;
        self.awaiting_feed = true;
        Ok(())
    }

    /// Blocks until the next feed answer and applies it.
    pub fn wait_for_prices(&mut self) -> Result<RefreshOutcome> {
        let event = self
            .worker
            .events()
            .recv()
            .map_err(|e| SwapError::ChannelRecv(e.to_string()))?;
        Ok(self.on_feed(event))
    }

    /// The session, for one-shot callers.
    pub fn session(&self) -> &SwapSession {
        &self.session
    }

    /// Mutable session, for applying startup selections.
    pub fn session_mut(&mut self) -> &mut SwapSession {
        &mut self.session
    }

    fn on_feed(&mut self, event: FeedEvent) -> RefreshOutcome {
        let FeedEvent::Fetched { ticket, result } = event;
        let outcome = self.session.apply_refresh(ticket, result);
        if outcome != RefreshOutcome::Stale {
            self.awaiting_feed = false;
        }
        outcome
    }

    /// Current form as text.
    pub fn status_lines(&self) -> Vec<String> {
        view::render(&self.session, &self.session.evaluate(), &self.icons)
    }

    fn handle(&mut self, command: ConsoleCommand) -> Result<Flow> {
        match command {
            ConsoleCommand::Amount(text) => self.session.set_amount(text),
            ConsoleCommand::From(raw) => self.session.select_from(&raw)?,
            ConsoleCommand::To(raw) => self.session.select_to(&raw)?,
            ConsoleCommand::Flip => self.session.flip(),
            ConsoleCommand::Max => {
                self.session.fill_max();
            }
            ConsoleCommand::Submit => {
                let pending = self.session.prepare_submission()?;
                println!("Submitting swap #{}...", pending.id());
                self.settling = Some((after(self.settle_delay), pending));
                return Ok(Flow::Continue);
            }
            ConsoleCommand::Refresh => {
                self.refresh()?;
                println!("Refreshing prices...");
                return Ok(Flow::Continue);
            }
            ConsoleCommand::Tokens => {
                print_lines(&view::render_tokens(&self.session));
                return Ok(Flow::Continue);
            }
            ConsoleCommand::Status => {}
            ConsoleCommand::Help => {
                print_lines(&help_lines());
                return Ok(Flow::Continue);
            }
            ConsoleCommand::Quit => return Ok(Flow::Quit),
        }
        print_lines(&self.status_lines());
        Ok(Flow::Continue)
    }

    fn settle(&mut self) {
        let Some((_, pending)) = self.settling.take() else {
            return;
        };
        match self.session.settle(pending) {
            Ok(settlement) => {
                println!("{}", view::render_settlement(&settlement));
                print_lines(&self.status_lines());
            }
            Err(e) => error!("Settlement failed: {}", e),
        }
    }

    /// Runs until `quit`, Ctrl+C, or end of input with nothing outstanding.
    pub fn run(mut self, shutdown: Receiver<()>) -> Result<()> {
        let lines = spawn_stdin_reader();
        let feed = self.worker.events().clone();
        let mut input_open = true;
        println!("Type `help` for commands.");

        loop {
            if !input_open && self.settling.is_none() && !self.awaiting_feed {
                break;
            }
            let input = if input_open { lines.clone() } else { never() };
            let timer = match &self.settling {
                Some((timer, _)) => timer.clone(),
                None => never(),
            };

            select! {
                recv(shutdown) -> _ => {
                    info!("Shutting down client...");
                    break;
                },
                recv(feed) -> msg => {
                    let event = msg.map_err(|e| SwapError::ChannelRecv(e.to_string()))?;
                    let outcome = self.on_feed(event);
                    if let Some(line) = view::render_refresh(&outcome) {
                        println!("{}", line);
                        print_lines(&self.status_lines());
                    }
                },
                recv(input) -> line => match line {
                    Ok(line) if line.trim().is_empty() => {},
                    Ok(line) => {
                        let flow = line
                            .parse::<ConsoleCommand>()
                            .and_then(|command| self.handle(command));
                        match flow {
                            Ok(Flow::Quit) => break,
                            Ok(Flow::Continue) => {},
                            Err(e) => {
                                warn!("Command `{}` failed: {}", line.trim(), e);
                                println!("! {}", e);
                            }
                        }
                    },
                    Err(_) => input_open = false,
                },
                recv(timer) -> _ => self.settle(),
            }
        }
        Ok(())
    }
}
