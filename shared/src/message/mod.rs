//! Notification wire types
//!
//! [`ChannelKey`] names an audience; [`NotifyEvent`] is the payload pushed
//! to every session joined to one of the target channels.

pub mod channel;
pub mod payload;

pub use channel::ChannelKey;
pub use payload::NotifyEvent;
