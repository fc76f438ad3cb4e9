pub mod candle;
pub mod frame;

pub use candle::Candle;
pub use frame::Frame;
