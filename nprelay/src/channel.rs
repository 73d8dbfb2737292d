use npmodel::RelayMessage;
use npobserver::{Channel, ChannelGone};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Observer side of the relay inbox.
///
/// Sending never blocks. Once the receiving relay is dropped every delivery
/// fails with [`ChannelGone`].
#[derive(Debug, Clone)]
pub struct RelayChannel {
    tx: UnboundedSender<RelayMessage>,
}

pub fn relay_channel() -> (RelayChannel, UnboundedReceiver<RelayMessage>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (RelayChannel { tx }, rx)
}

impl Channel for RelayChannel {
    fn deliver(&self, message: RelayMessage) -> Result<(), ChannelGone> {
        self.tx
            .send(message)
            .map_err(|_| ChannelGone("relay inbox closed".to_string()))
    }
}
