use thiserror::Error;
use std::result::Result;

#[derive(Error, Debug)]
pub enum RingError {
	#[error("Virtual node count must be at least 1")]
	ZeroVirtualNodes,
	#[error("Store bucket count must be at least 1")]
	ZeroBuckets,
	#[error("RPC error")]
	RpcError(#[from] tarpc::client::RpcError),
	#[error("IO error")]
	IoError(#[from] std::io::Error),
	#[error("Server task failed")]
	JoinError(#[from] tokio::task::JoinError),
	#[error("Server already stopped")]
	ShutdownError(#[from] tokio::sync::watch::error::SendError<bool>)
}

pub type RingResult<T> = Result<T, RingError>;
