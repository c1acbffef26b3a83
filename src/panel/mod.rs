//! The route panel: view state, the controller that drives it, and the change
//! feed that tells it when to refresh.

pub mod controller;
pub mod events;
pub mod poller;
pub mod state;

pub use controller::{CycleId, PanelController, PanelStep, settle};
pub use events::{ChangeSource, ISSUE_CHANGED, IssueChanged, IssueEvents, Subscription};
pub use poller::{ChangePoller, PollerGuard};
pub use state::{LOAD_FAILED_MESSAGE, MISSING_ADDRESS_MESSAGE, ViewState};
