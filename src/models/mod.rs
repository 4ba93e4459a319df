//! Data models for lifeos.
//!
//! Records are kept as untyped ordered mappings; everything that describes
//! how they are grouped, owned and exported lives here.

mod envelope;
mod preset;
mod record;
mod subscription;

pub use envelope::{ExportEnvelope, FORMAT_VERSION};
pub use preset::ExportPreset;
pub use record::{Record, Scope, UserId, record_id_key};
pub use subscription::PushSubscription;
