pub mod admin;
pub mod error;
pub mod field_value;
pub mod ids;
pub mod room;
pub mod time;

pub use admin::AdminProfile;
pub use error::{CoreError, ValidationError};
pub use field_value::{Document, FieldValue};
pub use ids::*;
pub use room::{Gender, RoomFields, RoomNo, RoomRecord, ValidRoom};
