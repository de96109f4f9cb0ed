pub mod assemble;
pub mod generate;
