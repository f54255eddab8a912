pub mod correction;
