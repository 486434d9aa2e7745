// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Text embedding synapse
//!
//! Request and response types peers exchange with the miner, and the
//! handler that fills in `results` through the embedding client.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::RequestHandler;
pub use request::EmbeddingRequest;
pub use response::EmbeddingResponse;
