pub use super::galleries::Entity as Galleries;
pub use super::images::Entity as Images;
