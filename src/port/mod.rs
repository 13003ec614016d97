mod allocator;

pub use allocator::PortAllocator;
