//! All environment interaction stuff. Things like `Thinker`s that move parts of
//! the level or affect its appearance, lights, and line specials

pub mod ceiling;
pub mod generic;
pub mod lights;
pub mod specials;
