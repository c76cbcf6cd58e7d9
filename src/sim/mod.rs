pub mod editor;
pub mod event;
pub mod level;
pub mod step;
pub mod world;
