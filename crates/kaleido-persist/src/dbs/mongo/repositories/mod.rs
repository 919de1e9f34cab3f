pub mod product;
pub mod thread;

pub use product::MongoProductRepository;
pub use thread::MongoThreadRepository;
