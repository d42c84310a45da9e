pub mod binary;
pub mod classify;
pub mod codec;
pub mod convert;
pub mod formats;
pub mod hashid;
pub mod io;
pub mod record;

pub mod prelude {
    pub use crate::codec::{Codec, registry};
    pub use crate::convert::convert;
    pub use crate::record::{Dataset, Record};
}
