// ifwatch-core: the traffic sampling and rate derivation engine.
//
// Owns the per-device counter model, the concurrent polling scheduler,
// the rate/overflow arithmetic, and the row classification consumed by
// the display. Wire-level querying lives in ifwatch-snmp; rendering and
// input live in ifwatch-tui.

pub mod classify;
pub mod counter;
pub mod device;
pub mod error;
pub mod interface;
pub mod scheduler;
pub mod state;

// ── Primary re-exports ──────────────────────────────────────────────
pub use classify::{Classified, Row, classify};
pub use counter::Counter;
pub use device::{Device, DeviceView, InterfaceSource, PortView};
pub use error::CoreError;
pub use interface::{IfStatus, Interface};
pub use scheduler::{DeviceHandle, PollEvent, Scheduler};
pub use state::{DisplayState, RateKind, Unit};
