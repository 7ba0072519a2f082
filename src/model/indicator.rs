use std::io::{self, IsTerminal, Write};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::{
    cursor, execute, queue,
    style::Print,
    terminal::{Clear, ClearType},
};
use tracing::warn;

use crate::core::SessionContext;

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Spinner shown while a model request is outstanding.
///
/// Starting it raises the busy flag and spawns a thread that animates until
/// the flag clears. Dropping the guard clears the flag and joins the thread,
/// so the spinner stops and the cursor comes back on every exit path of the
/// request, including `?` returns.
pub struct BusyIndicator {
    context: Arc<SessionContext>,
    handle: Option<JoinHandle<()>>,
}

impl BusyIndicator {
    pub fn start(context: Arc<SessionContext>) -> Self {
        context.set_busy(true);

        let spinner_context = Arc::clone(&context);
        let handle = thread::Builder::new()
            .name("busy-indicator".to_string())
            .spawn(move || spin(&spinner_context))
            .map_err(|e| warn!("could not start busy indicator: {e}"))
            .ok();

        Self { context, handle }
    }
}

impl Drop for BusyIndicator {
    fn drop(&mut self) {
        self.context.set_busy(false);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("busy indicator thread panicked");
            }
        }
    }
}

fn spin(context: &SessionContext) {
    let mut stderr = io::stderr();
    let draw = stderr.is_terminal();

    if draw {
        let _ = execute!(stderr, cursor::Hide);
    }

    let mut frame = 0;
    while context.is_busy() {
        if draw {
            let _ = draw_frame(&mut stderr, frame);
        }
        frame += 1;
        thread::sleep(POLL_INTERVAL);
    }

    if draw {
        let _ = clear_line(&mut stderr);
    }
}

fn draw_frame(out: &mut impl Write, frame: usize) -> io::Result<()> {
    queue!(
        out,
        cursor::MoveToColumn(0),
        Print(FRAMES[frame % FRAMES.len()])
    )?;
    out.flush()
}

/// Wipes the spinner and shows the cursor again.
fn clear_line(out: &mut impl Write) -> io::Result<()> {
    execute!(
        out,
        cursor::MoveToColumn(0),
        Clear(ClearType::CurrentLine),
        cursor::Show
    )
}

/// Brings the cursor back if a spinner was interrupted mid-frame.
pub fn restore_cursor() {
    let _ = clear_line(&mut io::stderr());
}
