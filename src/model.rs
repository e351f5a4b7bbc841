mod dream;
mod ids;
mod samples;
mod session;
pub(crate) mod timestamp;

pub use self::dream::{Dream, DreamStatus, ProgressEvent};
pub use self::ids::DreamId;
pub use self::session::{HealthStatus, Session, User};
