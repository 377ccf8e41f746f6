pub mod config;
pub mod form;
pub mod fs;
pub mod minify;
pub mod pipeline;

#[cfg(test)]
pub mod mock_server;
