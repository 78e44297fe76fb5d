pub mod db;
pub mod riot;
pub mod summoners;
