use std::{
    sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryIter},
    thread::{self, JoinHandle},
    time::Duration,
};

use log::{debug, error};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tick {
    pub tick_no: usize,
}

/// A cancellable periodic timer running on its own thread.
///
/// Ticks are delivered over a channel and consumed with [`Ticker::drain`] or
/// [`Ticker::recv`]. Cancelling, or dropping the ticker, stops the thread right away.
pub struct Ticker {
    cancel_tx: Option<Sender<()>>,
    tick_rx: Receiver<Tick>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn start(interval: Duration) -> Self {
        Self::start_with_waker(interval, || {})
    }

    /// Start a ticker that calls `waker` after each tick is queued, e.g. to request
    /// a repaint of the UI.
    pub fn start_with_waker(interval: Duration, waker: impl Fn() + Send + 'static) -> Self {
        let (cancel_tx, cancel_rx) = mpsc::channel::<()>();
        let (tick_tx, tick_rx) = mpsc::channel::<Tick>();

        let handle = thread::Builder::new()
            .name("windtunnel-ticker".to_string())
            .spawn(move || {
                let mut tick_no = 0;
                loop {
                    match cancel_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            tick_no += 1;
                            if tick_tx.send(Tick { tick_no }).is_err() {
                                debug!("ticker receiver gone, stopping");
                                break;
                            }
                            waker();
                        }
                        // explicit cancel or the ticker was dropped
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("ticker stopped after {} ticks", tick_no);
            });

        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                error!("Could not spawn ticker thread: {}", e);
                None
            }
        };

        Self {
            cancel_tx: Some(cancel_tx),
            tick_rx,
            handle,
        }
    }

    /// Ticks received since the last call, without blocking.
    pub fn drain(&self) -> TryIter<'_, Tick> {
        self.tick_rx.try_iter()
    }

    /// Wait for the next tick. `None` once the ticker has stopped and all ticks were consumed.
    pub fn recv(&self) -> Option<Tick> {
        self.tick_rx.recv().ok()
    }

    pub fn cancel(&mut self) {
        if let Some(cancel_tx) = self.cancel_tx.take() {
            let _ = cancel_tx.send(());
        }
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            error!("ticker thread panicked");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_tx.is_none()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}
