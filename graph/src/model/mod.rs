pub mod adapter;
pub mod events;

pub use adapter::{FragmentController, GraphModel, RowView};
pub use events::{Listener, ListenerId, Listeners, UpdateEvent};
