//! Interactive console: stdin commands in, display text out.

use passgate_core::FacingMode;
use passgate_hardware::mock::MockCameraHandle;
use passgate_scanner::{DisplayBoard, DisplayLine, GateCommand, GateEvent};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

const HELP: &str = "\
Commands:
  start                  start the camera
  switch                 toggle between front and back camera
  stop                   stop the camera
  reset                  clear every counter and binding
  assign <first> <last>  bind the next scanned code to a name
  devices                list cameras
Simulation:
  present <code>         hold a code in front of the cameras
  withdraw               take the code away
  deny | grant           refuse or allow camera permission
  unplug <facing>        disconnect the user/environment camera
  plug <facing>          reconnect it
  help | quit";

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Gate(GateCommand),
    Present(String),
    Withdraw,
    DenyPermission,
    GrantPermission,
    Unplug(FacingMode),
    Plug(FacingMode),
    Help,
    Quit,
}

pub fn print_help() {
    println!("{HELP}");
}

/// Parse one console line. Blank lines yield `Ok(None)`.
///
/// The code given to `present` is everything after the keyword and one
/// space, kept verbatim.
pub fn parse_line(line: &str) -> Result<Option<ConsoleCommand>, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim_start();
    let mut words = trimmed.split_whitespace();

    let Some(keyword) = words.next() else {
        return Ok(None);
    };

    let command = match keyword.to_ascii_lowercase().as_str() {
        "start" => ConsoleCommand::Gate(GateCommand::Start),
        "switch" => ConsoleCommand::Gate(GateCommand::SwitchCamera),
        "stop" => ConsoleCommand::Gate(GateCommand::Stop),
        "reset" => ConsoleCommand::Gate(GateCommand::Reset),
        "devices" => ConsoleCommand::Gate(GateCommand::ListDevices),
        // Blank names are passed through so the gate can reject them
        "assign" => ConsoleCommand::Gate(GateCommand::Assign {
            first_name: words.next().unwrap_or_default().to_string(),
            last_name: words.collect::<Vec<_>>().join(" "),
        }),
        "present" => {
            let code = trimmed[keyword.len()..]
                .strip_prefix(' ')
                .unwrap_or_default();
            ConsoleCommand::Present(code.to_string())
        }
        "withdraw" => ConsoleCommand::Withdraw,
        "deny" => ConsoleCommand::DenyPermission,
        "grant" => ConsoleCommand::GrantPermission,
        "unplug" | "plug" => {
            let facing = words
                .next()
                .ok_or_else(|| format!("usage: {keyword} <user|environment>"))?
                .parse::<FacingMode>()
                .map_err(|e| e.to_string())?;
            if keyword.eq_ignore_ascii_case("unplug") {
                ConsoleCommand::Unplug(facing)
            } else {
                ConsoleCommand::Plug(facing)
            }
        }
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => return Err(format!("unknown command '{other}', type 'help'")),
    };

    Ok(Some(command))
}

/// Read stdin until EOF, `quit` or Ctrl-C.
///
/// Dropping `commands` on return shuts the gate down.
pub async fn read_commands(commands: mpsc::Sender<GateCommand>, camera: MockCameraHandle) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = tokio::signal::ctrl_c() => {
                debug!("Interrupted");
                break;
            }
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "Failed to read stdin");
                break;
            }
        };

        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };

        match command {
            ConsoleCommand::Gate(command) => {
                if commands.send(command).await.is_err() {
                    break;
                }
            }
            ConsoleCommand::Present(code) => camera.present(code),
            ConsoleCommand::Withdraw => camera.withdraw(),
            ConsoleCommand::DenyPermission => camera.deny_permission(),
            ConsoleCommand::GrantPermission => camera.grant_permission(),
            ConsoleCommand::Unplug(facing) => camera.unplug(facing),
            ConsoleCommand::Plug(facing) => camera.plug(facing),
            ConsoleCommand::Help => print_help(),
            ConsoleCommand::Quit => break,
        }
    }
}

/// Print gate events until the gate shuts down.
pub async fn print_events(mut events: mpsc::Receiver<GateEvent>, json: bool) {
    let mut board = DisplayBoard::new();

    while let Some(event) = events.recv().await {
        if json {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{line}"),
                Err(e) => warn!(error = %e, "Failed to encode event"),
            }
            continue;
        }

        for line in render(&mut board, &event) {
            println!("{line}");
        }
    }
}

/// Text lines to print for one event.
///
/// Display lines are printed only when they change, so a code held in
/// view does not flood the terminal.
pub fn render(board: &mut DisplayBoard, event: &GateEvent) -> Vec<String> {
    let changed = board.apply(event);
    let mut out = Vec::new();

    match event {
        GateEvent::CameraStarted { facing } => out.push(format!("Camera started ({facing})")),
        GateEvent::CameraStopped => out.push("Camera stopped".to_string()),
        GateEvent::AssignmentPending { identity } => {
            out.push(format!("Waiting for a QR code to assign to {identity}"));
        }
        GateEvent::Devices { devices } => {
            out.extend(
                devices
                    .iter()
                    .map(|device| format!("{} [{}] {}", device.name, device.facing, device.model)),
            );
        }
        GateEvent::CameraUnavailable { reason, .. } => {
            debug!(%reason, "Camera unavailable");
        }
        GateEvent::NoCodeDetected | GateEvent::CodeDetected { .. } if changed => {
            out.push(board.line(DisplayLine::Code).to_string());
        }
        GateEvent::AccessDecided { .. } | GateEvent::AccessRefused { .. } if changed => {
            out.push(board.line(DisplayLine::Access).to_string());
        }
        GateEvent::IdentityRecognized { .. } | GateEvent::Assigned { .. } if changed => {
            out.push(board.line(DisplayLine::Identity).to_string());
        }
        _ => {}
    }

    while let Some(notice) = board.take_notice() {
        out.push(format!("! {notice}"));
    }

    out
}
