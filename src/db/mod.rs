pub mod connection;
pub mod leads;
pub mod records;
pub mod stats;

pub use connection::Database;
pub use leads::LeadRepository;
pub use records::RecordStore;
