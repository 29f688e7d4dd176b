//! Reception lifecycle status.

define_wire_enum! {
    /// Lifecycle status of a reception.
    ///
    /// A reception starts `Open` and may move to `Closed` exactly once.
    /// There is no way back.
    pub enum ReceptionStatus as "reception status" in "reception_status" {
        /// Products may be added or removed.
        Open => "in_progress",
        /// Terminal.
        Closed => "close",
    }
}

impl ReceptionStatus {
    /// Whether products may still be added to or removed from the reception.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    /// Whether moving from `self` to `next` is a legal transition.
    ///
    /// The only edge is `Open -> Closed`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!((self, next), (Self::Open, Self::Closed))
    }
}
