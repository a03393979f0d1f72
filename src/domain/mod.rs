pub mod user;
pub mod announcement;
pub mod payment;
pub mod message;

pub use user::*;
pub use announcement::*;
pub use payment::*;
pub use message::*;
