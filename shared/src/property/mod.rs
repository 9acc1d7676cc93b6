pub mod codec;
pub mod value;

pub use codec::PropertyCodec;
pub use value::PropertyValue;
