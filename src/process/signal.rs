use crate::model::indicator::restore_cursor;

/// SIGINT outside of a prompt read (model request, confirmation, running
/// command) ends the session. The cursor may be hidden by the busy
/// indicator at that point, so it is restored first.
pub fn install_interrupt_handler() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(|| {
        restore_cursor();
        println!();
        std::process::exit(0);
    })
}
