mod serve;

pub use serve::Serve;
