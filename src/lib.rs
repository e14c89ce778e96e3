// Library interface for windtunnel
// This allows integration tests to access internal modules

pub mod config;
pub mod errors;
pub mod identity;
pub mod measurement;
pub mod navigation;
pub mod session_guard;
pub mod ticker;
pub mod wing_profile;

// Re-export commonly used types
pub use errors::WindTunnelError;
pub use identity::{AuthError, IdentityProvider, LocalIdentityProvider, Principal, Subscription};
pub use measurement::{AngleUpperBound, Sample, TestRun, TestStatus, TickOutcome, compute_forces};
pub use navigation::{Navigator, Route, ScreenStack};
pub use session_guard::{SessionGuard, guard_decision};
pub use ticker::{Tick, Ticker};
pub use wing_profile::{WING_PROFILES, WingProfile, find_profile};
