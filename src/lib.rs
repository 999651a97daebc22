pub mod api; // REST surface
pub mod config;
pub mod gateway; // Weather + mandi price providers
pub mod knowledge; // Static remedy / tip / calendar tables
pub mod lookup; // Free-text matching over the knowledge base
pub mod pipeline; // Image preparation + classification
pub mod store; // Analysis and price-snapshot log
