//! Member entities, positions, and editable profile fields.

pub mod field;
pub mod model;
pub mod position;

pub use field::EditableField;
pub use model::{Member, MemberInfo};
pub use position::Position;
