pub mod kit;
pub mod sample_loader;

pub use kit::KitDescriptor;
