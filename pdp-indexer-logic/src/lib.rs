pub mod abi;
pub mod chain_source;
pub mod decode;
pub mod error;
pub mod handlers;
pub mod manifest;
pub mod reorg;
pub mod rpc;
pub mod scheduler;
pub mod settings;
pub mod store;
pub mod test_support;
pub mod tipset;

pub use chain_source::ChainSource;
pub use error::IndexerError;
pub use handlers::{HandlerContext, HandlerRegistry};
pub use manifest::Manifest;
pub use reorg::ReorgController;
pub use rpc::RpcClient;
pub use scheduler::Scheduler;
pub use settings::Settings;
pub use store::Store;
