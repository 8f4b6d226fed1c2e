use crate::core::error::*;
use log::info;
use tokio::{sync::watch, task::JoinHandle};

/// Handle to a running ring service
pub struct ServerManager {
	pub addr: String,
	pub handle: JoinHandle<()>,
	// true means shutdown
	pub tx: watch::Sender<bool>
}

impl ServerManager {
	/// Wait for the listener to terminate
	pub async fn wait(self) -> RingResult<()> {
		self.handle.await?;
		info!("{}: server terminated", self.addr);
		Ok(())
	}

	/// Stop the server gracefully
	pub async fn stop(self) -> RingResult<()> {
		self.tx.send(true)?;
		self.wait().await
	}
}
