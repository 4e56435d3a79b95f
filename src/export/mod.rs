pub mod page;
pub mod table;

pub use page::write_page;
pub use table::write_csv;
