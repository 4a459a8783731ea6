//! The syntax tree facade: parsing, schema-driven binding, query-driven
//! batched editing, and undo/redo over a lossless green tree.

mod bind;
mod editor;
mod schema;
mod tree;

pub use crate::{
    bind::{bind, bind_at_path},
    editor::{Editor, InsertPosition},
    schema::{Schema, SyntaxDefinition},
    tree::SyntaxTree,
};
