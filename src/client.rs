use crate::{core::error::*, rpc::RingServiceClient};
use tarpc::tokio_serde::formats::Bincode;

pub async fn setup_client(addr: &str) -> RingResult<RingServiceClient> {
	let transport = tarpc::serde_transport::tcp::connect(addr, Bincode::default).await?;
	Ok(RingServiceClient::new(tarpc::client::Config::default(), transport).spawn())
}
