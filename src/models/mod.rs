//! Data models for the DCIM server

pub mod asset;
pub mod asset_log;
pub mod enums;
pub mod maintenance;
pub mod reference;
pub mod specification;
pub mod summary;
pub mod user;

// Re-export commonly used types
pub use asset::{Asset, AssetDerivedState, AssetInput, AssetView, WarrantyStatus};
pub use asset_log::{AssetLog, AssetLogEntry, NewAssetLog};
pub use enums::{AssetPriority, AssetStatus, LogEventType, MaintenanceStatus, MaintenanceType};
pub use maintenance::{MaintenanceRecord, MaintenanceView};
pub use reference::{AssetType, Certification, Location, Manufacturer};
pub use specification::AssetSpecification;
pub use summary::{HealthSummary, StatusSummary};
pub use user::{User, UserClaims, UserShort};
