pub use self::{board::*, drop::*, piece::*};

pub(crate) mod board;
pub(crate) mod drop;
pub(crate) mod piece;
