pub mod envelope;
pub mod followup;
pub mod macros;
pub mod pointing;
pub mod source;
pub mod target;

pub use envelope::*;
pub use followup::*;
pub use pointing::*;
pub use source::*;
pub use target::*;

crate::define_id_type!(i64, GroupId);
crate::define_id_type!(i64, AllocationId);
crate::define_id_type!(i64, RequestId);
