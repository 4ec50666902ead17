// Timeline data contract shared by every service

pub mod external_timeline;
pub mod metrics;
pub mod preview;
pub mod workout;

pub use external_timeline::*;
pub use metrics::*;
pub use preview::*;
pub use workout::*;
