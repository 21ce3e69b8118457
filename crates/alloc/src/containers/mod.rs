mod cursor;
mod dynamic_array;
mod into_iter;

pub use cursor::{Cursor, RevCursor};
pub use dynamic_array::DynamicArray;
pub use into_iter::IntoIter;
