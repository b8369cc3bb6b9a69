// ordermart-core/src/domain/model/mod.rs

pub mod order;
pub mod table;
pub mod user;

pub use order::{Order, RawOrder, StatusClean};
pub use table::{ColumnDef, ColumnType, Table, Value};
pub use user::{User, UserTable};
