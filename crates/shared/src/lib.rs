//! Domain and wire types shared by the frame client, the renderer stub, and the apps.

pub mod domain;
pub mod error;
pub mod protocol;
