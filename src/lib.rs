pub mod apt;
pub mod logger;
pub mod runtime;
pub mod stager;
pub mod supply;
