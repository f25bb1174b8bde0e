/// Grid planning for sheet cells.
pub mod grid;
