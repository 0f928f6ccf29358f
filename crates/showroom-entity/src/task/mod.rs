//! Media task rows: the durable unit of queued pipeline work.

pub mod model;
pub mod payload;
pub mod status;

pub use model::{CreateMediaTask, MediaTask};
pub use payload::{
    DeletePayload, EntityKind, EntityRef, StagedFile, TaskPayload, UploadManyPayload,
    UploadSinglePayload,
};
pub use status::{TaskKind, TaskStatus};
