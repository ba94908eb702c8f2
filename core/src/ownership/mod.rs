//! Owner identity and the weak owner → handle registry

mod registry;


pub use registry::{Attachment, Owner, OwnershipRegistry, SweepReport};
