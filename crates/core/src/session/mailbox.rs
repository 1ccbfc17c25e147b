use std::fmt::Debug;
use std::sync::{Arc, Weak};

use tokio::select;
use tokio::sync::{mpsc, watch};

use super::SessionState;
use crate::error::SessionClosedError;

/// A command that the session task handles against its state.
pub(crate) trait Command: Send + Debug + 'static {
    fn handle(self: Box<Self>, state: &mut SessionState, mailbox: &Arc<Mailbox>);
}

pub(crate) struct MailboxParts {
    pub mailbox: Mailbox,
    pub cmd_rx: mpsc::UnboundedReceiver<Box<dyn Command>>,
    pub close_rx: watch::Receiver<bool>,
}

/// The sending side of a session task.
pub(crate) struct Mailbox {
    cmd_tx: mpsc::UnboundedSender<Box<dyn Command>>,
    close_tx: watch::Sender<bool>,
}

impl Mailbox {
    #[inline]
    pub fn new() -> MailboxParts {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (close_tx, close_rx) = watch::channel(false);
        MailboxParts {
            mailbox: Mailbox { cmd_tx, close_tx },
            cmd_rx,
            close_rx,
        }
    }

    #[inline]
    pub fn send<C: Command>(&self, cmd: C) -> Result<(), SessionClosedError> {
        if *self.close_tx.borrow() {
            return Err(SessionClosedError);
        }
        self.cmd_tx.send(Box::new(cmd)).map_err(|_| SessionClosedError)
    }

    #[inline]
    pub fn close(&self) {
        self.close_tx.send(true).ok();
    }
}

/// Runs the session until it is closed or every handle is gone.
///
/// Commands are handled one at a time, so the state is never observed
/// half-way through a command.
pub(crate) async fn run_session(
    mailbox: Weak<Mailbox>,
    mut state: SessionState,
    mut cmd_rx: mpsc::UnboundedReceiver<Box<dyn Command>>,
    mut close_rx: watch::Receiver<bool>,
) {
    debug!("started");
    loop {
        let cmd = select! {
            biased;

            _ = close_rx.changed() => {
                break;
            }
            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else {
                    break;
                };
                cmd
            }
        };
        trace!("received command: {cmd:?}");

        let Some(mailbox) = mailbox.upgrade() else {
            warn!("last handle has been dropped, discard the command");
            break;
        };
        let proc_span = trace_span!("proc cmd");
        proc_span.in_scope(|| {
            cmd.handle(&mut state, &mailbox);
            trace!("finished");
        });
    }
    state.abort_running_requests();
    debug!("will terminate");
}
