pub mod crypto;
pub mod db;
pub mod events;
#[cfg(test)]
pub mod memory;
pub mod realtime;
pub mod scheduler;
