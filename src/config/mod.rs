pub mod loader;
pub mod run;
pub mod types;

pub use loader::ConfigLoader;
pub use run::RunConfig;
