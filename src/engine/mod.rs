pub mod assembler;
pub mod optimizer;
pub mod partition;
pub mod scoring;
