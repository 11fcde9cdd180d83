/// Support-ticket number in the request tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct TicketId(u64);

impl TicketId {
    /// Ticket `0` does not exist in the tracker and is read as "no ticket".
    pub fn parse(ticket: u64) -> Option<TicketId> {
        if ticket == 0 {
            return None;
        }

        Some(Self(ticket))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TicketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
