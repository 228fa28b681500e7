//! Port traits between the core logic and the node's adapters
//!
//! These traits are implemented by the node binary (HTTP client, HTTP
//! server, asset directory) and the display crate (weather view).

mod assets;
mod endpoint;
mod transport;
mod view;

pub use assets::{
    AssetError, AssetStore, ByteSource, DirAssetStore, FileSource, MemoryAssetStore, MemorySource,
    SourceReader,
};
pub use endpoint::EndpointServer;
pub use transport::{FetchError, HttpTransport};
pub use view::WeatherView;
