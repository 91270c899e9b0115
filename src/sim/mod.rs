pub mod event;
pub mod level;
pub mod levels;
pub mod physics;
pub mod session;
pub mod step;
