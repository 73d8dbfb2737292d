use npmodel::RelayMessage;

use crate::ChannelGone;

/// Synchronous hand-off of a message to the relay.
///
/// Delivery is fire-and-forget: `Ok` only means the message left the
/// observer. An `Err` means the channel is permanently gone.
pub trait Channel: Send {
    fn deliver(&self, message: RelayMessage) -> Result<(), ChannelGone>;
}
