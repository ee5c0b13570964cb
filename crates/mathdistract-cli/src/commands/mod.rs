pub mod generate;
pub mod init;
pub mod simulate;
pub mod summarize;
pub mod validate;
