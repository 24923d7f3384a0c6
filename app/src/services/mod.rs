pub mod background;
pub mod card;
pub mod session;
