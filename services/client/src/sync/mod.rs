pub mod controller;
pub mod state;
pub mod status;

// Re-export the pieces UI code actually touches: the controller itself and
// the status vocabulary its accessors speak.
pub use controller::{SyncController, SyncError};
pub use status::OpKey;
