pub mod coach;
pub mod config;
pub mod llm;
pub mod upload;
pub mod video;

#[cfg(test)]
pub(crate) mod testing;
