pub mod prelude;

pub mod galleries;
pub mod images;
