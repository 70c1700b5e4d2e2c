/// How an emission interacts with the target scheduler's backpressure.
///
/// Set when the edge is soldered; never rewired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolderKind {
    /// Block the emitter while the target counter is at capacity.
    Default,
    /// Force past capacity. Guarantees progress at the cost of unbounded
    /// growth; reserved for breaking structural cycles.
    Inject,
    /// Drop the value when the target is full, without blocking.
    Offer,
}

impl SolderKind {
    /// Short stable label for logs and the diagram.
    pub fn as_label(self) -> &'static str {
        match self {
            SolderKind::Default => "default",
            SolderKind::Inject => "inject",
            SolderKind::Offer => "offer",
        }
    }
}
