use log::error;
use ratatui::crossterm::event::{self, Event};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Spawn a blocking thread that collects terminal events and forwards them onto a channel.
///
/// The thread wakes at least every `poll_interval` to observe `shutdown`.
pub fn spawn_input_thread(
    tx: UnboundedSender<Event>,
    shutdown: Arc<AtomicBool>,
    poll_interval: Duration,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        while !shutdown.load(Ordering::SeqCst) {
            match event::poll(poll_interval) {
                Ok(true) => match event::read() {
                    Ok(ev) => {
                        if tx.send(ev).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        error!("input thread read error: {err}");
                        break;
                    }
                },
                Ok(false) => continue,
                Err(err) => {
                    error!("input thread poll error: {err}");
                    break;
                }
            }
        }
    })
}
