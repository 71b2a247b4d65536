/// What one microphone toggle press should do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MicAction {
    /// A stream is live; stop it.
    Stop,
    /// A permission prompt is still open; whatever it grants is discarded.
    Cancel,
    /// Ask for a stream tagged with this ticket.
    Open(u32),
}

/// Tracks the single outstanding `getUserMedia` request so a repeated press
/// can never leave two streams open.
#[derive(Clone, Debug, Default)]
pub struct MicRequests {
    pending: Option<u32>,
    next_ticket: u32,
}

impl MicRequests {
    pub fn press(&mut self, live: bool) -> MicAction {
        if live {
            return MicAction::Stop;
        }
        if self.pending.take().is_some() {
            return MicAction::Cancel;
        }
        let ticket = self.next_ticket;
        self.next_ticket = self.next_ticket.wrapping_add(1);
        self.pending = Some(ticket);
        MicAction::Open(ticket)
    }

    /// Called when request `ticket` resolves. True if the stream should be
    /// attached; false means it was cancelled or superseded and must be stopped.
    pub fn settle(&mut self, ticket: u32) -> bool {
        if self.pending == Some(ticket) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Void the open request, if any. True if one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }
}
