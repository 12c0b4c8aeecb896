//! Domain types shared across Orchard crates.

mod email;
mod id;
mod price;
mod role;
mod stamp;
mod status;
mod window;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use role::Role;
pub use stamp::{Audit, Stamp};
pub use status::{OrderStatus, PaymentMethod, PaymentStatus};
pub use window::{DateWindow, WindowError};
