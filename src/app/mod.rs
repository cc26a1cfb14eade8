mod state;
pub mod tree;
pub mod viewport;

pub use state::{App, NavEvent, ViewKind};
pub use tree::{GroupKind, NodeContent, TreeNode};
pub use viewport::LineHeight;
