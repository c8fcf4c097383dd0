pub mod config;
pub mod dial;
pub mod gauge;
pub mod main_loop;
pub mod net;
pub mod pairing;
pub mod protocol;
pub mod recorder;
pub mod render_loop;
pub mod router;
pub mod state;
pub mod store;
pub mod surface;
pub mod transport;
pub mod zones;

pub use config::{DashboardConfig, LoopConfig, TransportKind};
pub use main_loop::{MainLoop, TickReport, UiEvent};
pub use net::MqttLink;
pub use pairing::PairingController;
pub use protocol::LinkEvent;
pub use recorder::SessionRecorder;
pub use render_loop::RenderLoop;
pub use router::TelemetryRouter;
pub use state::{DashboardState, DeviceList};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use surface::{Surface, SvgSurface};
pub use transport::{LinkError, Transport};
