/// Order tag for one preview request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PreviewTicket(u64);

impl PreviewTicket {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Drops preview results that complete after a newer one has already been shown.
#[derive(Clone, Debug, Default)]
pub struct PreviewSequencer {
    issued: u64,
    shown: Option<u64>,
}

impl PreviewSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag a new request; tickets increase strictly.
    pub fn begin(&mut self) -> PreviewTicket {
        self.issued += 1;
        PreviewTicket(self.issued)
    }

    /// True if the result for `ticket` should be displayed.
    ///
    /// Accepting a ticket retires every older one.
    pub fn accept(&mut self, ticket: PreviewTicket) -> bool {
        if self.shown.is_some_and(|shown| ticket.0 <= shown) {
            return false;
        }
        self.shown = Some(ticket.0);
        true
    }

    /// True if no request was issued after `ticket`.
    pub fn is_latest(&self, ticket: PreviewTicket) -> bool {
        ticket.0 == self.issued
    }
}
