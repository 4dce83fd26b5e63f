pub mod controller;
pub mod fragment;

pub use controller::{Element, VisibilityController};
pub use fragment::{AlwaysVisible, Fragment, FragmentManager};
