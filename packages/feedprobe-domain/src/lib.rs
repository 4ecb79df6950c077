pub mod cursor;
pub mod extract;
pub mod key;

pub use cursor::DecodedCursor;
pub use extract::{extract_catalog_ids, extract_cursor, extract_items, second_last_cursor};
pub use key::ItemKey;
