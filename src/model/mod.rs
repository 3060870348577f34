pub mod clean;
pub mod dump;
pub mod nullable;

pub use clean::{CleanDb, Game, GameRef, Image, Platform, Uid};
pub use dump::{DateError, DumpDb, GameId, GamesDbDate, LookupItem, LookupKind};
pub use nullable::{NullBool, NullInt, NullString, Nullable};
