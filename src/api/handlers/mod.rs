pub mod galleries;
pub mod health;
pub mod images;
