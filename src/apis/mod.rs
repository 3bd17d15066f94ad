pub mod jsearch;
