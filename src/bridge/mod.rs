//! Connectivity bridge.
//!
//! Links the lock controller to the remote status/command store:
//!
//! ```text
//!  JOINING_NETWORK ──[joined]──▶ ESTABLISHING_SESSION ──[ready]──▶ OPERATIONAL
//!        ▲   │                           │                             │
//!        │ [failed]                  [5 s timeout]          [link or session lost]
//!        │   ▼                           ▼                             │
//!        └─[10 s]── DISCONNECTED ◀───────┴─────────────────────────────┘
//!
//!  OPERATIONAL ──[signal 111: factory reset]──▶ JOINING_NETWORK
//! ```

pub mod context;
pub mod service;
pub mod states;

pub use context::{BridgeContext, Mailbox};
pub use service::Bridge;

use crate::fsm::StateId;

/// Enumeration of all bridge states.
/// Must stay in sync with [`states::BRIDGE_TABLE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConnectivityState {
    JoiningNetwork = 0,
    EstablishingSession = 1,
    Operational = 2,
    Disconnected = 3,
}

impl ConnectivityState {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 4;

    pub const ALL: [Self; Self::COUNT] = [
        Self::JoiningNetwork,
        Self::EstablishingSession,
        Self::Operational,
        Self::Disconnected,
    ];
}

impl StateId for ConnectivityState {
    fn index(self) -> usize {
        self as usize
    }
}
