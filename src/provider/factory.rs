// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Provider factory for the command-line entry point

use alloy_network::EthereumWallet;
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_signer_local::PrivateKeySigner;

use crate::errors::RpcError;

/// Create an HTTP provider, optionally able to sign transactions
///
/// Without a signer the provider can scan and read allowances but every
/// `approve` fails. The concrete filler stack is erased so both cases share
/// one type.
///
/// # Errors
///
/// Returns [`RpcError::ProviderUrlInvalid`] if `rpc_url` does not parse.
///
/// # Examples
///
/// ```rust
/// use revokescan::provider::connect_http;
///
/// assert!(connect_http("not a url", None).is_err());
/// ```
pub fn connect_http(
    rpc_url: &str,
    signer: Option<PrivateKeySigner>,
) -> Result<DynProvider, RpcError> {
    let url: url::Url = rpc_url
        .parse()
        .map_err(|e: url::ParseError| RpcError::ProviderUrlInvalid(format!("{rpc_url}: {e}")))?;

    let provider = match signer {
        Some(signer) => ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url)
            .erased(),
        None => ProviderBuilder::new().connect_http(url).erased(),
    };

    Ok(provider)
}
