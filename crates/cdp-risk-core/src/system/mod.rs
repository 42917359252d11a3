pub mod tcr;
