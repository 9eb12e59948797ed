
pub use mock_ports::{MockAssetStore, MockClock};
