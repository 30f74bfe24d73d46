// Improvement potential. Support mouse input: hovering and dragging like in the browser.

use std::fmt;
use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;

use crossterm::style::{self, Stylize};
use crossterm::{cursor, execute, terminal};
use log::info;

use whales_chess::coord::Coord;
use whales_chess::coordinator::{GameSessionCoordinator, MoveAttempt};
use whales_chess::force::Force;
use whales_chess::move_client::ChannelMoveClient;
use whales_chess::piece::PieceKind;
use whales_chess::rules::MoveInput;
use whales_chess::session_state::decode_fragment;
use whales_chess::session_store::{FragmentStore, SessionStore};
use whales_chess::shakmaty_rules::ShakmatyRules;

use crate::client_config::ClientConfig;
use crate::file_store::{ConsoleStore, FileStore};
use crate::network::{self, ApiResponse, HttpTransport};
use crate::tui::TerminalView;


type Coordinator = GameSessionCoordinator<ShakmatyRules, TerminalView, ChannelMoveClient, ConsoleStore>;

enum IncomingEvent {
    Api(ApiResponse),
    Terminal(String),
    EndOfInput,
}

impl From<ApiResponse> for IncomingEvent {
    fn from(response: ApiResponse) -> Self { IncomingEvent::Api(response) }
}

const HELP: &str = "Commands: e2e4 | e7e8q | undo | new | settings <w|b> <opponent> | hint <square> | fragment | quit";

#[derive(Clone, PartialEq, Eq, Debug)]
enum Command {
    Move(MoveInput),
    Undo,
    NewGame,
    Settings { force: Force, opponent_id: String },
    Hint(Coord),
    Fragment,
    Quit,
}

fn parse_command(input: &str) -> Result<Command, String> {
    let words: Vec<&str> = input.split_whitespace().collect();
    match words.as_slice() {
        ["undo"] => Ok(Command::Undo),
        ["new"] => Ok(Command::NewGame),
        ["fragment"] => Ok(Command::Fragment),
        ["quit"] => Ok(Command::Quit),
        ["settings", color, opponent_id] => {
            let force = Force::from_letter(color).ok_or_else(|| format!("Invalid color: '{color}'"))?;
            Ok(Command::Settings { force, opponent_id: (*opponent_id).to_owned() })
        }
        ["hint", square] => Ok(Command::Hint(square.parse()?)),
        [notation] => Ok(Command::Move(notation.parse()?)),
        _ => Err(format!("Unknown command: '{input}'")),
    }
}

fn writeln_raw(stdout: &mut io::Stdout, v: impl fmt::Display) -> io::Result<()> {
    let s = v.to_string();
    for line in s.split('\n') {
        execute!(stdout, style::Print(line), cursor::MoveToNextLine(1))?;
    }
    Ok(())
}

fn render(stdout: &mut io::Stdout, coordinator: &Coordinator, message: &Option<String>) -> io::Result<()> {
    execute!(stdout, cursor::MoveTo(0, 0), terminal::Clear(terminal::ClearType::All))?;
    writeln_raw(stdout, coordinator.view().render())?;
    if let Some(message) = message {
        writeln_raw(stdout, message.clone().with(style::Color::Magenta))?;
    }
    writeln_raw(stdout, HELP.with(style::Color::DarkGrey))?;
    execute!(stdout, style::Print("> "))
}

// Session state for the promotion prompt: the move waiting for a piece choice.
struct PendingPromotion {
    from: Coord,
    to: Coord,
}

pub fn run(config: ClientConfig, fragment: Option<String>) -> anyhow::Result<()> {
    let transport = HttpTransport::new(&config)?;
    let mut store = match &config.state_file {
        Some(path) => ConsoleStore::File(FileStore::new(path)),
        None => ConsoleStore::Memory(FragmentStore::new()),
    };
    if let Some(fragment) = fragment {
        store.save(&decode_fragment(&fragment));
    }

    let (events_tx, events_rx) = mpsc::channel();
    let (traffic_tx, traffic_rx) = mpsc::channel();
    network::spawn_worker(transport, traffic_rx, events_tx.clone());
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if events_tx.send(IncomingEvent::Terminal(line)).is_err() {
                return;
            }
        }
        let _ = events_tx.send(IncomingEvent::EndOfInput);
    });

    let mut coordinator =
        Coordinator::new(TerminalView::new(), ChannelMoveClient::new(traffic_tx), store);
    let mut stdout = io::stdout();
    let mut message = None;
    let mut promotion: Option<PendingPromotion> = None;
    render(&mut stdout, &coordinator, &message)?;

    for event in events_rx {
        match event {
            IncomingEvent::Api(ApiResponse { id, response }) => {
                coordinator.process_api_response(id, response);
            }
            IncomingEvent::EndOfInput => break,
            IncomingEvent::Terminal(line) => {
                let input = line.trim();
                message = None;
                if let Some(PendingPromotion { from, to }) = promotion.take() {
                    match PieceKind::from_promotion_choice(input) {
                        Ok(Some(kind)) => {
                            let input = MoveInput::new(from, to, Some(kind));
                            message = make_move(&mut coordinator, input, &mut promotion);
                        }
                        Ok(None) | Err(_) => message = Some("Move cancelled".to_owned()),
                    }
                } else if !input.is_empty() {
                    match parse_command(input) {
                        Ok(Command::Quit) => break,
                        Ok(command) => {
                            message = execute_command(&mut coordinator, command, &mut promotion)
                        }
                        Err(err) => message = Some(err),
                    }
                }
            }
        }
        render(&mut stdout, &coordinator, &message)?;
    }
    info!("Bye");
    Ok(())
}

// Returns a message to show to the user, if any.
fn make_move(
    coordinator: &mut Coordinator, input: MoveInput, promotion: &mut Option<PendingPromotion>,
) -> Option<String> {
    let MoveInput { from, to, promote_to } = input;
    match coordinator.attempt_move(from, to, promote_to) {
        MoveAttempt { accepted: true, .. } => None,
        MoveAttempt { needs_promotion_choice: true, .. } => {
            *promotion = Some(PendingPromotion { from, to });
            Some("Promote to (q/r/b/n)?".to_owned())
        }
        _ => Some(format!("Illegal move: {from}{to}")),
    }
}

// Returns a message to show to the user, if any.
fn execute_command(
    coordinator: &mut Coordinator, command: Command, promotion: &mut Option<PendingPromotion>,
) -> Option<String> {
    coordinator.hover_exit();
    match command {
        Command::Move(input) => make_move(coordinator, input, promotion),
        Command::Undo => (!coordinator.undo()).then(|| "Nothing to undo".to_owned()),
        Command::NewGame => {
            coordinator.new_game();
            None
        }
        Command::Settings { force, opponent_id } => {
            coordinator.change_settings(force, opponent_id);
            None
        }
        Command::Hint(coord) => {
            coordinator.hover_square(coord);
            None
        }
        Command::Fragment => Some(format!("/play#{}", coordinator.session_state().to_fragment())),
        Command::Quit => None,
    }
}
