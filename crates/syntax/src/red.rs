//! The ephemeral, position-aware tree layer.
//!
//! A red node wraps a green node together with its parent and absolute
//! position. Red nodes are created lazily on traversal and cached per slot in
//! their parent, so repeated access converges on one instance per slot even
//! under concurrent readers. They stay meaningful only as long as their root's
//! green tree is the current one.

mod node;

pub use node::{RedChildren, RedNode, RedSlot};
