pub mod proc_loader;
pub mod proc_validator;
pub mod secrets;
pub mod service;
pub mod settings;
