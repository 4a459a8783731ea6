//! The immutable, position-free tree layer.
//!
//! Green nodes never change after construction; every "mutation" builds a new
//! node that shares unchanged children by reference. Widths and flag bits are
//! computed once at construction so lookups stay O(1).

mod edit;
mod node;

pub use node::GreenNode;
