pub mod geom;
pub mod player;
pub mod tile;
