pub mod fuse;
pub mod select;
