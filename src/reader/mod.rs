pub mod cfb;
pub mod stream;

pub use self::cfb::CfbReader;
pub use self::stream::StreamReader;
