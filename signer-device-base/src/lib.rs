// SPDX-License-Identifier: Apache-2.0

//! Device-side collaborators of the signing pipeline
//!
//! The approval flow talks to three things it does not own: the screen, the
//! secure element holding the keys, and the settings store. This crate defines
//! their interfaces and the small value types passed across them.

mod errors;
mod path;
mod screen;
mod secure_element;
mod settings;
mod ui;

pub use async_trait::async_trait;
pub use errors::*;
pub use path::*;
pub use screen::*;
pub use secure_element::*;
pub use settings::*;
pub use ui::*;
